//! Berth - installer and self-test for prebuilt include-what-you-use bundles
//!
//! This crate provides the core library functionality for Berth: host
//! toolchain discovery, layout resolution, installation and verification.

pub mod core;
pub mod installer;
pub mod ops;
pub mod resolver;
pub mod toolchain;
pub mod util;
pub mod verify;

/// Test utilities and mocks for Berth unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock process executor and fake toolchain
/// and bundle trees.
#[cfg(test)]
pub mod test_support;

pub use core::{LayoutVariant, PathMapping, ToolRelease, ToolchainVersion};
pub use installer::{InstallationResult, Installer};
pub use resolver::{resolve, Resolution};
pub use toolchain::{ToolchainInfo, ToolchainLocator};
pub use verify::{Harness, VerificationOutcome};
