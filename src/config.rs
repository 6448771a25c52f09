//! Site settings module.
//!
//! Handles loading and validating `config.json` from the source root.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.json      # Site settings (required)
//! ├── Content/
//! ├── Views/
//! └── Static/
//! ```
//!
//! ## Configuration Options
//!
//! ```json
//! {
//!   "title": "My Site",
//!   "blog_title": "Notes",
//!   "watch": {
//!     "ignore": ["node_modules", "target"],
//!     "debounce_ms": 0
//!   }
//! }
//! ```
//!
//! `title` and `blog_title` are required. The `watch` section is optional and
//! only affects `build` in watch mode. Unknown keys are rejected to catch
//! typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site settings loaded from `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteSettings {
    /// Display title of the whole site.
    pub title: String,
    /// Heading of the post index page.
    pub blog_title: String,
    /// Watch mode tuning.
    #[serde(default)]
    pub watch: WatchSettings,
}

impl SiteSettings {
    /// Validate that the required titles are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if self.blog_title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "blog_title must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Watch mode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSettings {
    /// Base names that are neither watched nor descended into.
    pub ignore: Vec<String>,
    /// Events arriving within this window after a trigger share one rebuild.
    /// `0` rebuilds once per event.
    pub debounce_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            ignore: vec!["node_modules".to_string(), "target".to_string()],
            debounce_ms: 0,
        }
    }
}

impl WatchSettings {
    /// Coalescing window, `None` when disabled.
    pub fn debounce(&self) -> Option<Duration> {
        (self.debounce_ms > 0).then(|| Duration::from_millis(self.debounce_ms))
    }
}

/// Everything a build needs: where to read, where to write, and the site settings.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    pub settings: SiteSettings,
}

impl BuildConfig {
    /// Load `config.json` from `source` and pair it with the output directory.
    pub fn load(source: &Path, output: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            settings: load_settings(source)?,
        })
    }
}

/// Load and validate `config.json` from the given source root.
pub fn load_settings(root: &Path) -> Result<SiteSettings, ConfigError> {
    let path = root.join(CONFIG_FILE);
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let settings: SiteSettings =
        serde_json::from_str(&content).map_err(|source| ConfigError::Json { path, source })?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_minimal_settings() {
        let settings: SiteSettings =
            serde_json::from_str(r#"{"title": "T", "blog_title": "B"}"#).unwrap();
        assert_eq!(settings.title, "T");
        assert_eq!(settings.blog_title, "B");
        assert_eq!(settings.watch, WatchSettings::default());
    }

    #[test]
    fn parse_watch_section() {
        let settings: SiteSettings = serde_json::from_str(
            r#"{"title": "T", "blog_title": "B", "watch": {"debounce_ms": 250}}"#,
        )
        .unwrap();
        assert_eq!(settings.watch.debounce_ms, 250);
        // Unspecified defaults preserved
        assert_eq!(settings.watch.ignore, vec!["node_modules", "target"]);
    }

    #[test]
    fn debounce_disabled_by_default() {
        assert_eq!(WatchSettings::default().debounce(), None);
    }

    #[test]
    fn debounce_window_from_millis() {
        let watch = WatchSettings {
            debounce_ms: 300,
            ..WatchSettings::default()
        };
        assert_eq!(watch.debounce(), Some(Duration::from_millis(300)));
    }

    #[test]
    fn missing_blog_title_rejected() {
        let result = serde_json::from_str::<SiteSettings>(r#"{"title": "T"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected() {
        let result = serde_json::from_str::<SiteSettings>(
            r#"{"title": "T", "blog_title": "B", "theme": "dark"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_watch_key_rejected() {
        let result = serde_json::from_str::<SiteSettings>(
            r#"{"title": "T", "blog_title": "B", "watch": {"poll": true}}"#,
        );
        assert!(result.is_err());
    }

    // =========================================================================
    // load_settings tests
    // =========================================================================

    #[test]
    fn load_settings_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"{"title": "Site", "blog_title": "Blog"}"#,
        )
        .unwrap();

        let settings = load_settings(tmp.path()).unwrap();
        assert_eq!(settings.title, "Site");
        assert_eq!(settings.blog_title, "Blog");
    }

    #[test]
    fn load_settings_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_settings(tmp.path());
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn load_settings_invalid_json_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "{ not json").unwrap();
        let result = load_settings(tmp.path());
        assert!(matches!(result, Err(ConfigError::Json { .. })));
    }

    #[test]
    fn load_settings_empty_title_fails_validation() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"{"title": "  ", "blog_title": "Blog"}"#,
        )
        .unwrap();
        let result = load_settings(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn build_config_keeps_paths() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"{"title": "Site", "blog_title": "Blog"}"#,
        )
        .unwrap();
        let out = tmp.path().join("out");

        let config = BuildConfig::load(tmp.path(), &out).unwrap();
        assert_eq!(config.source, tmp.path());
        assert_eq!(config.output, out);
    }
}
