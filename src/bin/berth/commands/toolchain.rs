//! `berth toolchain` command

use anyhow::Result;

use crate::cli::ToolchainArgs;
use berth::ops::{format_json, format_toolchain, OutputFormat};
use berth::toolchain::ToolchainLocator;
use berth::util::SystemExecutor;

pub fn execute(args: ToolchainArgs) -> Result<()> {
    let format = super::output_format(&args.format)?;
    let config = super::load_settings()?;

    let info = ToolchainLocator::new()
        .with_override(args.clang.or(config.toolchain.clang))
        .probe(&mut SystemExecutor)?;

    let output = match format {
        OutputFormat::Human => format_toolchain(&info),
        OutputFormat::Json => format_json(&info),
    };
    print!("{}", output);
    Ok(())
}
