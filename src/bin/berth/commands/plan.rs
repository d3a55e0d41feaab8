//! `berth plan` command

use anyhow::Result;

use crate::cli::PlanArgs;
use berth::ops::{format_json, format_plan, plan, OutputFormat, PlanOptions};
use berth::util::SystemExecutor;

pub fn execute(args: PlanArgs) -> Result<()> {
    let format = super::output_format(&args.format)?;
    let config = super::load_settings()?;

    let options = PlanOptions {
        release: super::release(&args.selection, &config),
        clang: super::clang(&args.selection, &config),
    };

    let report = plan(&options, &mut SystemExecutor)?;

    let output = match format {
        OutputFormat::Human => format_plan(&report),
        OutputFormat::Json => format_json(&report),
    };
    print!("{}", output);
    Ok(())
}
