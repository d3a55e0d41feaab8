//! Synthetic sources the harness analyzes.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A set of source files with known analyzer and fixer results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture {
    pub name: &'static str,
    /// Files relative to the fixture directory
    pub files: Vec<(PathBuf, String)>,
    /// The file handed to the analyzer
    pub main_source: PathBuf,
    /// Include edits the analyzer should suggest
    pub expected_suggestions: u32,
    /// Files the fixer should rewrite
    pub expected_edited_files: u32,
}

impl Fixture {
    /// A header pulling in three unused headers and a source relying on one
    /// of them transitively.
    ///
    /// The analyzer should suggest removing all three from the header and
    /// adding `<stdio.h>` to the source; the fixer then edits both files.
    pub fn transitive_includes() -> Self {
        Fixture {
            name: "transitive-includes",
            files: vec![
                (
                    PathBuf::from("demo.hpp"),
                    "#include <stdio.h>\n#include <stdarg.h>\n#include <locale>\n".to_string(),
                ),
                (
                    PathBuf::from("demo.cpp"),
                    "#include \"demo.hpp\"\n\nint main(void) { printf(\"hello world\"); }\n"
                        .to_string(),
                ),
            ],
            main_source: PathBuf::from("demo.cpp"),
            expected_suggestions: 4,
            expected_edited_files: 2,
        }
    }

    /// A self-contained source with nothing to fix.
    pub fn clean() -> Self {
        Fixture {
            name: "clean",
            files: vec![(
                PathBuf::from("clean.cpp"),
                "#include <stdio.h>\n\nint main(void) { printf(\"hello world\"); }\n".to_string(),
            )],
            main_source: PathBuf::from("clean.cpp"),
            expected_suggestions: 0,
            expected_edited_files: 0,
        }
    }

    /// Look up a built-in fixture by name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "transitive-includes" => Some(Fixture::transitive_includes()),
            "clean" => Some(Fixture::clean()),
            _ => None,
        }
    }

    /// Write every file below `dir`.
    pub fn write_to(&self, dir: &Path) -> io::Result<()> {
        for (path, contents) in &self.files {
            let full = dir.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, contents)?;
        }
        Ok(())
    }
}
