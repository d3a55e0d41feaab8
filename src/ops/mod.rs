//! High-level operations.
//!
//! This module contains the implementation of Berth commands.

pub mod doctor;
pub mod format;
pub mod install;
pub mod plan;

pub use doctor::{doctor, format_report, CheckResult, CheckStatus, DoctorOptions, DoctorReport};
pub use format::{
    format_install, format_json, format_plan, format_releases, format_toolchain,
    format_verification, OutputFormat,
};
pub use install::{install, verify_installed, InstallOptions, InstallReport, VerifyOptions};
pub use plan::{plan, PlanOptions, PlanReport};
