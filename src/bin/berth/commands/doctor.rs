//! `berth doctor` command

use anyhow::{Context, Result};

use crate::cli::DoctorArgs;
use berth::ops::{doctor, format_report, DoctorOptions};
use berth::util::SystemExecutor;

pub fn execute(args: DoctorArgs, verbose: bool) -> Result<()> {
    let config = super::load_settings()?;

    let options = DoctorOptions {
        release: super::release(&args.selection, &config),
        clang: super::clang(&args.selection, &config),
        cwd: std::env::current_dir().context("failed to get current directory")?,
    };

    let report = doctor(&options, &mut SystemExecutor)?;

    print!("{}", format_report(&report, verbose));

    // Failed checks predict a failed install
    if !report.ready() {
        std::process::exit(1);
    }

    Ok(())
}
