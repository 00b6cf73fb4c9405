//! Runtime configuration loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{XsError, Result};

/// Environment variable that overrides [`XsConfig::github_token`].
pub const TOKEN_ENV: &str = "XS_GITHUB_TOKEN";

/// Top-level configuration (`xs-terminal.toml`).
///
/// Every field has a default, so an empty file (or no file at all) yields a
/// working configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XsConfig {
    /// User name recorded in the session metadata.
    pub user: String,
    /// Home directory created in a fresh session; also the initial cwd.
    pub home: String,
    /// Directory backing the on-disk key-value store.
    pub storage_dir: PathBuf,
    /// Base URL of the GitHub REST API.
    pub api_base: String,
    /// Delay inserted before each directory entry during a clone.
    pub throttle_ms: u64,
    /// Deepest directory level a clone will descend into.
    pub max_depth: usize,
    /// Optional token attached to GitHub requests.
    pub github_token: Option<String>,
    /// User-Agent header sent to GitHub (required by the API).
    pub user_agent: String,
}

impl Default for XsConfig {
    fn default() -> Self {
        Self {
            user: "xs-user".to_string(),
            home: "/home/xs".to_string(),
            storage_dir: PathBuf::from(".xs-terminal"),
            api_base: "https://api.github.com".to_string(),
            throttle_ms: 100,
            max_depth: 64,
            github_token: None,
            user_agent: concat!("xs-terminal/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl XsConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::info!("Loaded config from {}", path.display());
        Self::from_toml(&text)
    }

    /// Apply the token override from the process environment, if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            let token = token.trim();
            if !token.is_empty() {
                self.github_token = Some(token.to_string());
            }
        }
        self
    }

    /// Throttle delay as a `Duration`.
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// The token, if one is configured and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.github_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    fn validate(&self) -> Result<()> {
        if !self.home.starts_with('/') {
            return Err(XsError::Config(format!(
                "home must be an absolute path: {}",
                self.home
            )));
        }
        if self.api_base.trim().is_empty() {
            return Err(XsError::Config("api_base must not be empty".to_string()));
        }
        if self.max_depth == 0 {
            return Err(XsError::Config("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = XsConfig::from_toml("").unwrap();
        assert_eq!(config.user, "xs-user");
        assert_eq!(config.home, "/home/xs");
        assert_eq!(config.throttle_ms, 100);
        assert_eq!(config.max_depth, 64);
        assert!(config.github_token.is_none());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = XsConfig::from_toml("user = \"ana\"\nthrottle_ms = 0\n").unwrap();
        assert_eq!(config.user, "ana");
        assert_eq!(config.throttle(), Duration::ZERO);
        assert_eq!(config.api_base, "https://api.github.com");
    }

    #[test]
    fn relative_home_rejected() {
        let err = XsConfig::from_toml("home = \"home/xs\"").unwrap_err();
        assert!(matches!(err, XsError::Config(_)));
    }

    #[test]
    fn zero_depth_rejected() {
        assert!(XsConfig::from_toml("max_depth = 0").is_err());
    }

    #[test]
    fn blank_token_is_none() {
        let config = XsConfig {
            github_token: Some("   ".to_string()),
            ..XsConfig::default()
        };
        assert!(config.token().is_none());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xs-terminal.toml");
        std::fs::write(&path, "storage_dir = \"/tmp/xs\"\n").unwrap();
        let config = XsConfig::load(&path).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/xs"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = XsConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, XsError::Io(_)));
    }
}
