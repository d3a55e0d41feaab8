//! Content hashing for installed trees.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Compute the SHA256 hash of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader
            .read(&mut buffer)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Accumulates a hash over the paths of a tree and what sits at each one.
///
/// Records are tagged by kind, so a file and a symlink that happen to carry
/// the same text never hash alike.
#[derive(Default)]
pub struct TreeFingerprint {
    hasher: Sha256,
}

impl TreeFingerprint {
    /// Start a fingerprint for a tree of the given layout.
    pub fn new(layout: &str) -> Self {
        let mut fp = TreeFingerprint::default();
        fp.field(layout);
        fp
    }

    fn field(&mut self, value: &str) {
        self.hasher.update(value.as_bytes());
        self.hasher.update(b"\0");
    }

    fn record(&mut self, path: &Path, kind: &str, detail: &str) {
        self.field(&path.to_string_lossy());
        self.field(kind);
        self.field(detail);
    }

    /// A regular file, hashed by content.
    pub fn file(&mut self, path: &Path) -> Result<()> {
        let digest = sha256_file(path)?;
        self.record(path, "file", &digest);
        Ok(())
    }

    /// A symlink, hashed by its link text (not its target's contents).
    pub fn symlink(&mut self, path: &Path, link_text: &Path) {
        self.record(path, "symlink", &link_text.to_string_lossy());
    }

    pub fn directory(&mut self, path: &Path) {
        self.record(path, "dir", "");
    }

    /// A path that should exist but does not.
    pub fn missing(&mut self, path: &Path) {
        self.record(path, "missing", "");
    }

    /// Finalize as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}
