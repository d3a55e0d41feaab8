//! Configuration file support for Berth.
//!
//! Berth supports two configuration file locations:
//! - Global: `~/.berth/config.toml` - User-wide defaults
//! - Project: `.berth/config.toml` - Directory-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Berth configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host toolchain settings
    pub toolchain: ToolchainSettings,

    /// Installation defaults
    pub install: InstallSettings,
}

/// Host toolchain settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the clang driver to probe (e.g., /usr/lib/llvm-3.9/bin/clang)
    pub clang: Option<PathBuf>,
}

/// Installation defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstallSettings {
    /// Installation prefix (e.g., /usr/local/Cellar/iwyu/0.7)
    pub prefix: Option<PathBuf>,

    /// Shared bin directory receiving the exposure symlinks
    pub bin_dir: Option<PathBuf>,

    /// Tool release to install (e.g., "0.7")
    pub release: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.toolchain.clang.is_some() {
            self.toolchain.clang = other.toolchain.clang;
        }
        if other.install.prefix.is_some() {
            self.install.prefix = other.install.prefix;
        }
        if other.install.bin_dir.is_some() {
            self.install.bin_dir = other.install.bin_dir;
        }
        if other.install.release.is_some() {
            self.install.release = other.install.release;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.berth/config.toml)
/// 2. Global config (~/.berth/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Load configuration from the standard locations relative to `cwd`.
pub fn load_default_config(cwd: &Path) -> Config {
    let project = project_config_path(cwd);
    match global_config_path() {
        Some(global) => load_config(&global, &project),
        None => load_config(&PathBuf::new(), &project),
    }
}

/// Get the global berth config directory (~/.berth).
fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".berth"))
}

/// Get the global config path (~/.berth/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.berth/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".berth").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
[toolchain]
clang = "/usr/lib/llvm-3.9/bin/clang"

[install]
prefix = "/opt/iwyu"
release = "0.7"
"#,
        )
        .unwrap();

        assert_eq!(
            config.toolchain.clang,
            Some(PathBuf::from("/usr/lib/llvm-3.9/bin/clang"))
        );
        assert_eq!(config.install.prefix, Some(PathBuf::from("/opt/iwyu")));
        assert_eq!(config.install.release.as_deref(), Some("0.7"));
        assert_eq!(config.install.bin_dir, None);
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(
            &global,
            "[install]\nprefix = \"/global\"\nbin_dir = \"/global/bin\"\n",
        )
        .unwrap();
        std::fs::write(&project, "[install]\nprefix = \"/project\"\n").unwrap();

        let config = load_config(&global, &project);
        assert_eq!(config.install.prefix, Some(PathBuf::from("/project")));
        assert_eq!(config.install.bin_dir, Some(PathBuf::from("/global/bin")));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[install\nprefix = ").unwrap();

        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_project_config_alone() {
        let tmp = TempDir::new().unwrap();
        let path = project_config_path(tmp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[install]\nrelease = \"0.6\"\n").unwrap();

        let config = load_config(&tmp.path().join("no-such-global.toml"), &path);

        assert_eq!(config.install.release.as_deref(), Some("0.6"));
        assert_eq!(config.toolchain.clang, None);
    }
}
