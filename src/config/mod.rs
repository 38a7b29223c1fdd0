//! Configuration file model and resolution.
//!
//! ```toml
//! [watch]
//! paths = ["/srv/inbox"]
//! recursive = false
//!
//! [output]
//! path = "output/path_watcher_output.txt"
//!
//! [log]
//! path = "log/path_watcher_log.txt"
//! level = "info"
//! ```

/// TOML parsing and semantic checks
pub mod parser;
/// Unknown and legacy key warnings
pub mod validator;

use crate::error::{Result, WatchError};
use crate::tracker::check_roots;
use crate::utils::paths::{expand_tilde, make_absolute};
use crate::{DEFAULT_LOG_FILE, DEFAULT_OUTPUT_FILE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Contents of the configuration file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// `[watch]` table
    #[serde(default)]
    pub watch: WatchConfig,

    /// `[output]` table
    #[serde(default)]
    pub output: OutputConfig,

    /// `[log]` table
    #[serde(default)]
    pub log: LogConfig,
}

/// Watch roots and traversal mode
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WatchConfig {
    /// Single watch root (shorthand for a one-element `paths`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Watch roots, each subscribed independently
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathBuf>,
    /// List every descendant instead of immediate children
    #[serde(default)]
    pub recursive: bool,
}

/// Output artifact location
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Listing file; relative paths resolve against the install directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Log file location and verbosity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogConfig {
    /// Log file; relative paths resolve against the install directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Log file verbosity
    #[serde(default)]
    pub level: LogLevel,
}

/// Verbosity of the log file. The console always logs at debug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    /// Every raw filesystem event
    Debug,
    /// Created/deleted/moved summaries only
    #[default]
    Info,
}

impl LogLevel {
    /// Matching `tracing` filter
    #[must_use]
    pub const fn as_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
        }
    }
}

impl FromStr for LogLevel {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            other => Err(WatchError::config(format!(
                "Invalid log level '{other}' (expected \"debug\" or \"info\")"
            ))),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = WatchError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => f.write_str("debug"),
            Self::Info => f.write_str("info"),
        }
    }
}

/// Fully resolved settings, ready to start a tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    /// Absolute watch roots in configuration order
    pub roots: Vec<PathBuf>,
    /// Traversal mode shared by every root
    pub recursive: bool,
    /// Absolute output artifact path
    pub output_path: PathBuf,
    /// Absolute log file path
    pub log_path: PathBuf,
    /// Log file verbosity
    pub log_level: LogLevel,
}

impl WatchConfig {
    /// All configured roots, `path` first, duplicates dropped.
    #[must_use]
    pub fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::with_capacity(self.paths.len() + 1);
        for root in self.path.iter().chain(self.paths.iter()) {
            if !roots.contains(root) {
                roots.push(root.clone());
            }
        }
        roots
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Configuration`] if the file does not exist, cannot be
    /// read, is not valid TOML, or names no watch root.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WatchError::config(format!(
                "Configuration file {} not found.",
                path.display()
            )));
        }

        parser::parse_config_file(path)
    }

    /// Resolve paths against `base_dir` (the install directory) and check that
    /// every watch root exists and can be listed.
    ///
    /// Watch roots are resolved against the current directory, output and log
    /// paths against `base_dir`; missing output/log paths fall back to the
    /// defaults under `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Configuration`] if no root is configured, or a root
    /// is missing, not a directory, or unreadable.
    pub fn resolve(&self, base_dir: &Path) -> Result<WatchSettings> {
        let configured = self.watch.roots();
        if configured.is_empty() {
            return Err(WatchError::config(
                "No watch root configured (set [watch] path or paths)",
            ));
        }

        let mut roots = Vec::with_capacity(configured.len());
        for root in &configured {
            let root = make_absolute(&expand_tilde(root)?)?;
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        check_roots(&roots)?;

        let output_path = resolve_against(
            self.output.path.as_deref(),
            base_dir,
            Path::new(DEFAULT_OUTPUT_FILE),
        )?;
        let log_path = resolve_against(
            self.log.path.as_deref(),
            base_dir,
            Path::new(DEFAULT_LOG_FILE),
        )?;

        Ok(WatchSettings {
            roots,
            recursive: self.watch.recursive,
            output_path,
            log_path,
            log_level: self.log.level,
        })
    }
}

fn resolve_against(configured: Option<&Path>, base_dir: &Path, default: &Path) -> Result<PathBuf> {
    let path = match configured {
        Some(path) => expand_tilde(path)?,
        None => default.to_path_buf(),
    };
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(base_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("debug", LogLevel::Debug)]
    #[case("DEBUG", LogLevel::Debug)]
    #[case("info", LogLevel::Info)]
    #[case(" Info ", LogLevel::Info)]
    fn test_log_level_parse(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(input.parse::<LogLevel>().unwrap(), expected);
    }

    #[test]
    fn test_log_level_rejects_unknown() {
        assert!("trace".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_roots_merge_path_and_paths() {
        let watch = WatchConfig {
            path: Some(PathBuf::from("/a")),
            paths: vec![PathBuf::from("/b"), PathBuf::from("/a")],
            recursive: false,
        };
        assert_eq!(watch.roots(), vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn test_resolve_defaults_under_base_dir() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            watch: WatchConfig {
                path: Some(temp.path().to_path_buf()),
                ..WatchConfig::default()
            },
            ..Config::default()
        };

        let settings = config.resolve(Path::new("/opt/path-watcher")).unwrap();
        assert_eq!(settings.roots, vec![temp.path().to_path_buf()]);
        assert_eq!(
            settings.output_path,
            Path::new("/opt/path-watcher").join(DEFAULT_OUTPUT_FILE)
        );
        assert_eq!(
            settings.log_path,
            Path::new("/opt/path-watcher").join(DEFAULT_LOG_FILE)
        );
        assert_eq!(settings.log_level, LogLevel::Info);
        assert!(!settings.recursive);
    }

    #[test]
    fn test_resolve_relative_output_against_base_dir() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            watch: WatchConfig {
                paths: vec![temp.path().to_path_buf()],
                recursive: true,
                ..WatchConfig::default()
            },
            output: OutputConfig {
                path: Some(PathBuf::from("listing.txt")),
            },
            log: LogConfig {
                path: Some(PathBuf::from("/var/log/watch.log")),
                level: LogLevel::Debug,
            },
        };

        let settings = config.resolve(Path::new("/base")).unwrap();
        assert_eq!(settings.output_path, PathBuf::from("/base/listing.txt"));
        assert_eq!(settings.log_path, PathBuf::from("/var/log/watch.log"));
        assert!(settings.recursive);
    }

    #[test]
    fn test_resolve_rejects_missing_root() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            watch: WatchConfig {
                path: Some(temp.path().join("missing")),
                ..WatchConfig::default()
            },
            ..Config::default()
        };

        let err = config.resolve(temp.path()).unwrap_err();
        assert!(matches!(err, WatchError::Configuration(_)));
    }

    #[test]
    fn test_resolve_rejects_file_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        let config = Config {
            watch: WatchConfig {
                path: Some(file),
                ..WatchConfig::default()
            },
            ..Config::default()
        };

        assert!(config.resolve(temp.path()).is_err());
    }

    #[test]
    fn test_resolve_requires_a_root() {
        let err = Config::default().resolve(Path::new("/base")).unwrap_err();
        assert!(err.to_string().contains("No watch root"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = Config::load(&temp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_nested_tables() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config/path_watcher.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            format!(
                "[watch]\npaths = [{:?}]\nrecursive = true\n\n[log]\nlevel = \"debug\"\n",
                temp.path().to_string_lossy()
            ),
        )
        .unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.watch.roots(), vec![temp.path().to_path_buf()]);
        assert!(loaded.watch.recursive);
        assert_eq!(loaded.log.level, LogLevel::Debug);
        assert!(loaded.output.path.is_none());
    }
}
