//! `berth releases` command

use anyhow::Result;

use crate::cli::ReleasesArgs;
use berth::core::RELEASES;
use berth::ops::{format_json, format_releases, OutputFormat};

pub fn execute(args: ReleasesArgs) -> Result<()> {
    let output = match super::output_format(&args.format)? {
        OutputFormat::Human => format_releases(RELEASES),
        OutputFormat::Json => format_json(&RELEASES),
    };
    print!("{}", output);
    Ok(())
}
