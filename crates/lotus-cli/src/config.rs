//! Layered CLI configuration.
//!
//! Precedence, highest first: command-line flags, `LOTUS_*` environment
//! variables, `config.toml` in the data directory, built-in defaults.

use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use lotus_sync::RetryPolicy;

pub const REMOTE_URL_ENV: &str = "LOTUS_REMOTE_URL";
pub const PRINCIPAL_ENV: &str = "LOTUS_PRINCIPAL";

/// `config.toml` as written, before layering.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub remote_url: Option<String>,
    pub principal: Option<String>,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Retry knobs, all optional; anything unset keeps the built-in default.
#[derive(Debug, Default, Deserialize)]
pub struct RetryConfig {
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub readiness_timeout_ms: Option<u64>,
}

impl FileConfig {
    /// A missing file is an empty config; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config at {}", path.display()))
    }
}

/// Everything the commands need, fully resolved.
#[derive(Debug)]
pub struct Settings {
    pub remote_url: Option<String>,
    pub principal: Option<String>,
    pub policy: RetryPolicy,
}

pub fn resolve(
    flag_remote_url: Option<String>,
    flag_principal: Option<String>,
    file: &FileConfig,
) -> Settings {
    let remote_url = flag_remote_url
        .or_else(|| env_nonempty(REMOTE_URL_ENV))
        .or_else(|| file.remote_url.clone());
    let principal = flag_principal
        .or_else(|| env_nonempty(PRINCIPAL_ENV))
        .or_else(|| file.principal.clone());

    let defaults = RetryPolicy::default();
    let policy = RetryPolicy {
        max_retries: file.retry.max_retries.unwrap_or(defaults.max_retries),
        retry_delay: file
            .retry
            .retry_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_delay),
        poll_interval: file
            .retry
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval),
        readiness_timeout: file
            .retry
            .readiness_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.readiness_timeout),
    };

    Settings {
        remote_url,
        principal,
        policy,
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig::load(&dir.path().join("config.toml")).unwrap();
        assert!(config.remote_url.is_none());
        assert!(config.retry.max_retries.is_none());
    }

    #[test]
    fn test_full_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
remote_url = "https://sync.example.net"
principal = "tok-9"

[retry]
max_retries = 3
retry_delay_ms = 100
"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.remote_url.as_deref(), Some("https://sync.example.net"));
        assert_eq!(config.retry.max_retries, Some(3));
        assert_eq!(config.retry.retry_delay_ms, Some(100));
        assert_eq!(config.retry.poll_interval_ms, None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "remote_url = [not toml").unwrap();
        assert!(FileConfig::load(&path).is_err());
    }

    #[test]
    fn test_flag_beats_file() {
        let file = FileConfig {
            remote_url: Some("https://from-file.example.net".into()),
            ..FileConfig::default()
        };
        let settings = resolve(Some("https://from-flag.example.net".into()), None, &file);
        assert_eq!(
            settings.remote_url.as_deref(),
            Some("https://from-flag.example.net")
        );
    }

    #[test]
    fn test_file_fills_in_when_no_flag() {
        let file = FileConfig {
            principal: Some("tok-file".into()),
            ..FileConfig::default()
        };
        let settings = resolve(None, None, &file);
        assert_eq!(settings.principal.as_deref(), Some("tok-file"));
    }

    #[test]
    fn test_retry_knobs_layer_over_defaults() {
        let file = FileConfig {
            retry: RetryConfig {
                max_retries: Some(4),
                retry_delay_ms: Some(50),
                poll_interval_ms: None,
                readiness_timeout_ms: None,
            },
            ..FileConfig::default()
        };
        let settings = resolve(None, None, &file);
        assert_eq!(settings.policy.max_retries, 4);
        assert_eq!(settings.policy.retry_delay, Duration::from_millis(50));
        assert_eq!(
            settings.policy.poll_interval,
            RetryPolicy::default().poll_interval
        );
    }

    #[test]
    fn test_env_nonempty_ignores_empty_values() {
        // PATH is always present in a test environment
        assert!(env_nonempty("PATH").is_some());
        assert!(env_nonempty("LOTUS_TEST_VAR_THAT_IS_NEVER_SET").is_none());
    }
}
