use std::path::PathBuf;

use anyhow::{Context, Result};
use xs_types::config::XsConfig;

/// Environment variable naming the config file when no argument is given.
pub const CONFIG_ENV: &str = "XS_CONFIG";

/// Pick the config file: CLI argument first, then `XS_CONFIG`.
fn config_path(arg: Option<String>, env: Option<String>) -> Option<PathBuf> {
    arg.or(env)
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

/// Load the configuration, falling back to defaults when no file is named,
/// then apply environment overrides.
pub fn load_config(arg: Option<String>) -> Result<XsConfig> {
    let config = match config_path(arg, std::env::var(CONFIG_ENV).ok()) {
        Some(path) => XsConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            log::info!("No config file given, using defaults");
            XsConfig::default()
        },
    };
    Ok(config.with_env_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_wins_over_env() {
        let path = config_path(Some("a.toml".into()), Some("b.toml".into()));
        assert_eq!(path, Some(PathBuf::from("a.toml")));
    }

    #[test]
    fn env_used_without_argument() {
        let path = config_path(None, Some("b.toml".into()));
        assert_eq!(path, Some(PathBuf::from("b.toml")));
    }

    #[test]
    fn blank_means_defaults() {
        assert_eq!(config_path(None, None), None);
        assert_eq!(config_path(Some("  ".into()), None), None);
    }

    #[test]
    fn loads_file_from_argument() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("xs.toml");
        std::fs::write(&file, "user = \"ada\"\nthrottle_ms = 0\n").unwrap();
        let config = load_config(Some(file.to_string_lossy().into_owned())).unwrap();
        assert_eq!(config.user, "ada");
        assert_eq!(config.throttle_ms, 0);
        assert_eq!(config.home, "/home/xs");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Some("/definitely/not/here.toml".into())).unwrap_err();
        assert!(err.to_string().contains("loading config"));
    }
}
