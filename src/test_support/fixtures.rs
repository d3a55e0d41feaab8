//! Test fixtures for common test scenarios.
//!
//! This module provides fake toolchain trees, fake prebuilt bundles and
//! canned process outputs for testing Berth.

use std::path::{Path, PathBuf};

use crate::util::ProcessOutput;

/// Create a fake clang toolchain under `root` and return the driver path.
///
/// Layout: `bin/clang`, `lib/clang/<version>/`, `include/c++/v1/`. On unix
/// the driver is an executable script printing a clang banner.
pub fn toolchain_tree(root: &Path, version: &str) -> PathBuf {
    let bin = root.join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    std::fs::create_dir_all(root.join("lib/clang").join(version)).unwrap();
    std::fs::create_dir_all(root.join("include/c++/v1")).unwrap();

    let clang = bin.join("clang");
    write_script(
        &clang,
        &format!("#!/bin/sh\necho \"clang version {version} (fake)\"\n"),
    );
    clang
}

/// A fake extracted bundle: `bin/include-what-you-use` and
/// `bin/fix_includes.py` as shell scripts with scripted exit codes.
#[derive(Debug, Clone)]
pub struct BundleFixture {
    /// Text the analyzer prints on stderr.
    pub analyzer_report: String,
    /// Exit code of the analyzer.
    pub analyzer_exit: i32,
    /// Line the fixer prints after draining stdin.
    pub fixer_report: String,
    /// Exit code of the fixer.
    pub fixer_exit: i32,
}

impl BundleFixture {
    /// Bundle whose tools behave like a healthy PlusTwo release run on the
    /// transitive-includes fixture.
    pub fn healthy() -> Self {
        BundleFixture {
            analyzer_report: outputs::TRANSITIVE_REPORT.to_string(),
            analyzer_exit: 6,
            fixer_report: "IWYU edited 2 files on your behalf.".to_string(),
            fixer_exit: 2,
        }
    }

    /// Bundle that behaves like a legacy release: analyzer always exits 1.
    pub fn legacy() -> Self {
        BundleFixture {
            analyzer_exit: 1,
            ..BundleFixture::healthy()
        }
    }

    pub fn with_analyzer(mut self, exit: i32, report: impl Into<String>) -> Self {
        self.analyzer_exit = exit;
        self.analyzer_report = report.into();
        self
    }

    pub fn with_fixer(mut self, exit: i32, report: impl Into<String>) -> Self {
        self.fixer_exit = exit;
        self.fixer_report = report.into();
        self
    }

    /// Write the bundle below `root` and return `root`.
    pub fn write_to(&self, root: &Path) -> PathBuf {
        let bin = root.join("bin");
        std::fs::create_dir_all(&bin).unwrap();

        write_script(
            &bin.join("include-what-you-use"),
            &format!(
                "#!/bin/sh\ncat >&2 <<'EOF'\n{}\nEOF\nexit {}\n",
                self.analyzer_report.trim_end(),
                self.analyzer_exit
            ),
        );
        write_script(
            &bin.join("fix_includes.py"),
            &format!(
                "#!/bin/sh\ncat >/dev/null\necho \"{}\"\nexit {}\n",
                self.fixer_report, self.fixer_exit
            ),
        );
        root.to_path_buf()
    }
}

/// Write `contents` to `path` and mark it executable.
pub fn write_script(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Canned process outputs.
pub mod outputs {
    use super::ProcessOutput;

    /// Analyzer report for the transitive-includes fixture.
    pub const TRANSITIVE_REPORT: &str = "\
demo.hpp should add these lines:

demo.hpp should remove these lines:
- #include <locale>  // lines 3-3
- #include <stdarg.h>  // lines 2-2
- #include <stdio.h>  // lines 1-1

The full include-list for demo.hpp:
---

demo.cpp should add these lines:
#include <stdio.h>  // for printf

demo.cpp should remove these lines:

The full include-list for demo.cpp:
#include <stdio.h>  // for printf
---";

    /// `clang --version` output for a given version.
    pub fn clang_version(version: &str) -> ProcessOutput {
        ProcessOutput::success(format!(
            "clang version {version}\nTarget: x86_64-pc-linux-gnu\nThread model: posix\n"
        ))
    }

    /// Analyzer run: report on stderr, scripted exit code.
    pub fn analyzer(exit: i32, report: &str) -> ProcessOutput {
        ProcessOutput::new(exit, "", report)
    }

    /// Fixer run reporting `edited` files.
    pub fn fixer(edited: u32) -> ProcessOutput {
        let noun = if edited == 1 { "file" } else { "files" };
        ProcessOutput::new(
            edited as i32,
            format!("IWYU edited {edited} {noun} on your behalf.\n"),
            "",
        )
    }
}
