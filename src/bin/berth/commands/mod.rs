//! Command implementations

pub mod completions;
pub mod doctor;
pub mod install;
pub mod plan;
pub mod releases;
pub mod toolchain;
pub mod verify;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::SelectionArgs;
use berth::core::DEFAULT_RELEASE;
use berth::ops::OutputFormat;
use berth::util::config::load_default_config;
use berth::util::Config;

/// Prefix used when neither `--prefix` nor `install.prefix` is set.
const DEFAULT_PREFIX: &str = "/usr/local";

/// Load `~/.berth/config.toml` merged with `.berth/config.toml`.
pub fn load_settings() -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(load_default_config(&cwd))
}

/// Release from the flag, then config, then the default.
pub fn release(selection: &SelectionArgs, config: &Config) -> String {
    selection
        .release
        .clone()
        .or_else(|| config.install.release.clone())
        .unwrap_or_else(|| DEFAULT_RELEASE.to_string())
}

/// Explicit clang driver from the flag or config.
pub fn clang(selection: &SelectionArgs, config: &Config) -> Option<PathBuf> {
    selection
        .clang
        .clone()
        .or_else(|| config.toolchain.clang.clone())
}

/// Install prefix from the flag, then config, then `/usr/local`.
pub fn prefix(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.or_else(|| config.install.prefix.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFIX))
}

/// Shared bin directory from the flag, then config, then `<prefix>/bin`.
pub fn bin_dir(flag: Option<PathBuf>, config: &Config, prefix: &std::path::Path) -> PathBuf {
    flag.or_else(|| config.install.bin_dir.clone())
        .unwrap_or_else(|| prefix.join("bin"))
}

pub fn output_format(value: &str) -> Result<OutputFormat> {
    value
        .parse()
        .with_context(|| format!("invalid output format: {}", value))
}
