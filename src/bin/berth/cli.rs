//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Berth - install and self-test prebuilt include-what-you-use bundles
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install an extracted bundle into a prefix and verify it
    Install(InstallArgs),

    /// Show the steps an install would take, without writing anything
    Plan(PlanArgs),

    /// Re-run the self-test against an installed tree
    Verify(VerifyArgs),

    /// Show the discovered host clang toolchain
    Toolchain(ToolchainArgs),

    /// List supported releases
    Releases(ReleasesArgs),

    /// Check that the host can support an install
    Doctor(DoctorArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by commands that discover the toolchain.
#[derive(Args, Clone)]
pub struct SelectionArgs {
    /// Release to use (see `berth releases`)
    #[arg(long)]
    pub release: Option<String>,

    /// Path to the clang driver to probe
    #[arg(long)]
    pub clang: Option<PathBuf>,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Directory the prebuilt bundle was extracted into
    #[arg(long)]
    pub bundle: PathBuf,

    /// Installation prefix [default: /usr/local]
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Shared bin directory for nested layouts [default: <prefix>/bin]
    #[arg(long)]
    pub bin_dir: Option<PathBuf>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Install without running the self-test
    #[arg(long)]
    pub skip_verify: bool,

    /// Output format (human, json)
    #[arg(long, default_value = "human")]
    pub format: String,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output format (human, json)
    #[arg(long, default_value = "human")]
    pub format: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Installation prefix [default: /usr/local]
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Shared bin directory for nested layouts [default: <prefix>/bin]
    #[arg(long)]
    pub bin_dir: Option<PathBuf>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Fixture to analyze (transitive-includes, clean)
    #[arg(long, default_value = "transitive-includes")]
    pub fixture: String,

    /// Output format (human, json)
    #[arg(long, default_value = "human")]
    pub format: String,
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// Path to the clang driver to probe
    #[arg(long)]
    pub clang: Option<PathBuf>,

    /// Output format (human, json)
    #[arg(long, default_value = "human")]
    pub format: String,
}

#[derive(Args)]
pub struct ReleasesArgs {
    /// Output format (human, json)
    #[arg(long, default_value = "human")]
    pub format: String,
}

#[derive(Args)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
