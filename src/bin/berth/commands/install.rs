//! `berth install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use berth::ops::{format_install, format_json, install, InstallOptions, OutputFormat};
use berth::util::SystemExecutor;

pub fn execute(args: InstallArgs, verbose: bool) -> Result<()> {
    let format = super::output_format(&args.format)?;
    let config = super::load_settings()?;

    let prefix = super::prefix(args.prefix, &config);
    let bin_dir = super::bin_dir(args.bin_dir, &config, &prefix);

    let mut options = InstallOptions::new(args.bundle, prefix, bin_dir);
    options.release = super::release(&args.selection, &config);
    options.clang = super::clang(&args.selection, &config);
    options.skip_verify = args.skip_verify;

    let report = install(&options, &mut SystemExecutor)?;

    let output = match format {
        OutputFormat::Human => format_install(&report, verbose),
        OutputFormat::Json => format_json(&report),
    };
    print!("{}", output);
    Ok(())
}
