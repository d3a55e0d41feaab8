//! Core data structures for Berth.
//!
//! This module contains the foundational types used throughout Berth:
//! - Toolchain versions parsed from compiler banners
//! - The release compatibility table
//! - Layout variants and symbolic path mappings

pub mod layout;
pub mod release;
pub mod version;

pub use layout::{
    EntryKind, EntryPoints, LayoutVariant, Location, MappingEntry, PathMapping, Root,
};
pub use release::{find_release, ExitConvention, ToolRelease, DEFAULT_RELEASE, RELEASES};
pub use version::ToolchainVersion;
