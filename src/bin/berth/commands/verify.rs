//! `berth verify` command

use anyhow::{anyhow, Result};

use crate::cli::VerifyArgs;
use berth::ops::{format_json, format_verification, verify_installed, OutputFormat, VerifyOptions};
use berth::util::SystemExecutor;
use berth::verify::Fixture;

pub fn execute(args: VerifyArgs, verbose: bool) -> Result<()> {
    let format = super::output_format(&args.format)?;
    let config = super::load_settings()?;

    let fixture = Fixture::named(&args.fixture).ok_or_else(|| {
        anyhow!(
            "unknown fixture `{}` (expected transitive-includes or clean)",
            args.fixture
        )
    })?;

    let prefix = super::prefix(args.prefix, &config);
    let bin_dir = super::bin_dir(args.bin_dir, &config, &prefix);

    let mut options = VerifyOptions::new(prefix, bin_dir);
    options.release = super::release(&args.selection, &config);
    options.clang = super::clang(&args.selection, &config);
    options.fixture = fixture;

    let outcome = verify_installed(&options, &mut SystemExecutor)?;

    let output = match format {
        OutputFormat::Human => format_verification(&outcome, verbose),
        OutputFormat::Json => format_json(&outcome),
    };
    print!("{}", output);
    Ok(())
}
