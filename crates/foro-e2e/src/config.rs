//! Suite configuration.
//!
//! Loaded from a TOML file with environment overrides, constructed
//! explicitly, or defaulted. Defaults match the forum deployment the
//! suite targets: `https://localhost` behind a self-signed certificate,
//! 10s element waits, 5s toast observation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::SessionConfig;
use crate::result::{ForoError, ForoResult};

fn default_base_url() -> String {
    "https://localhost".to_string()
}

fn default_element_timeout_ms() -> u64 {
    10_000
}

fn default_toast_timeout_ms() -> u64 {
    5_000
}

/// Configuration for a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Root URL of the forum under test
    pub base_url: String,
    /// Run the browser headless
    pub headless: bool,
    /// Default element wait in milliseconds
    pub element_timeout_ms: u64,
    /// Total toast observation timeout in milliseconds
    pub toast_timeout_ms: u64,
    /// Directory for diagnostic screenshots (None = capture disabled)
    pub screenshot_dir: Option<PathBuf>,
    /// Path of the fixture-cleanup store (None = store-backed cleanup off)
    pub store_path: Option<PathBuf>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            headless: false,
            element_timeout_ms: default_element_timeout_ms(),
            toast_timeout_ms: default_toast_timeout_ms(),
            screenshot_dir: None,
            store_path: None,
        }
    }
}

impl SuiteConfig {
    /// Load from a TOML file, then apply `FORO_*` environment overrides
    pub fn load(path: impl AsRef<Path>) -> ForoResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = toml::from_str(&raw).map_err(|e| ForoError::Config {
            message: format!("{}: {e}", path.as_ref().display()),
        })?;
        config.apply_env();
        Ok(config)
    }

    /// Apply `FORO_BASE_URL` / `FORO_HEADLESS` overrides from the environment
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("FORO_BASE_URL") {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(headless) = std::env::var("FORO_HEADLESS") {
            self.headless = matches!(headless.as_str(), "1" | "true" | "yes");
        }
    }

    /// Default element wait
    #[must_use]
    pub const fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    /// Toast observation timeout
    #[must_use]
    pub const fn toast_timeout(&self) -> Duration {
        Duration::from_millis(self.toast_timeout_ms)
    }

    /// Absolute URL for a path under the forum root
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Browser launch options derived from this config
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default().with_headless(self.headless)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, "https://localhost");
        assert!(!config.headless);
        assert_eq!(config.element_timeout(), Duration::from_secs(10));
        assert_eq!(config.toast_timeout(), Duration::from_secs(5));
        assert!(config.screenshot_dir.is_none());
    }

    #[test]
    fn test_url_for_joins_cleanly() {
        let mut config = SuiteConfig::default();
        assert_eq!(config.url_for("user/register"), "https://localhost/user/register");
        assert_eq!(config.url_for(""), "https://localhost/");
        config.base_url = "https://forum.test/".into();
        assert_eq!(config.url_for("thread/7"), "https://forum.test/thread/7");
    }

    #[test]
    fn test_load_toml_with_partial_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foro.toml");
        std::fs::write(
            &path,
            "base_url = \"https://staging.forum\"\nheadless = true\ntoast_timeout_ms = 8000\n",
        )
        .unwrap();

        let config = SuiteConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "https://staging.forum");
        assert!(config.headless);
        assert_eq!(config.toast_timeout(), Duration::from_secs(8));
        // unspecified keys keep defaults
        assert_eq!(config.element_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foro.toml");
        std::fs::write(&path, "base_url = [not toml").unwrap();
        let err = SuiteConfig::load(&path).unwrap_err();
        assert!(matches!(err, ForoError::Config { .. }));
    }

    #[test]
    fn test_session_config_inherits_headless() {
        let config = SuiteConfig {
            headless: true,
            ..SuiteConfig::default()
        };
        assert!(config.session_config().headless);
    }
}
