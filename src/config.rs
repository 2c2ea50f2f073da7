//! Configuration Management
//!
//! Reads the cfclient configuration file. Secrets never live in it; they
//! come from flags or the environment.

use crate::cf::{ConnectionConfig, Grant};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// API endpoint, e.g. `https://api.run.pivotal.io`
    #[serde(default)]
    pub api: Option<String>,
    #[serde(default)]
    pub skip_ssl_validation: bool,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// OAuth client for the client-credentials grant
    #[serde(default)]
    pub client_id: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cfclient").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get effective API endpoint (CLI > config > CF_API)
    pub fn effective_api(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| self.api.clone())
            .or_else(|| std::env::var("CF_API").ok())
            .filter(|api| !api.trim().is_empty())
    }

    /// Transport configuration for `api`
    pub fn connection_config(&self, api: &str) -> Result<ConnectionConfig> {
        let mut config = ConnectionConfig::new(api)
            .with_context(|| format!("Invalid API endpoint {:?}", api))?
            .skip_ssl_validation(self.skip_ssl_validation);

        if let Some(proxy) = &self.proxy {
            config = config.proxy(proxy.clone());
        }
        if let Some(secs) = self.connect_timeout_secs {
            config = config.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.request_timeout_secs {
            config = config.request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Pick a grant: client credentials when a client id and secret are known,
    /// otherwise the user's password from CF_USERNAME / CF_PASSWORD
    pub fn grant(&self, client_id: Option<&str>, client_secret: Option<&str>) -> Result<Grant> {
        let client_id = client_id
            .map(str::to_string)
            .or_else(|| self.client_id.clone());
        let client_secret = client_secret
            .map(str::to_string)
            .or_else(|| std::env::var("CF_CLIENT_SECRET").ok());

        if let (Some(id), Some(secret)) = (client_id, client_secret) {
            return Ok(Grant::client_credentials(id, secret));
        }

        let username = std::env::var("CF_USERNAME").context(
            "No credentials configured. Set --client-id/--client-secret or CF_USERNAME/CF_PASSWORD",
        )?;
        let password = std::env::var("CF_PASSWORD").context("CF_PASSWORD is not set")?;
        Ok(Grant::password(username, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("cfclient-test-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_path("config.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"api": "https://api.example.com", "skip_ssl_validation": true, "request_timeout_secs": 5}"#,
        )
        .unwrap();

        let expected = Config {
            api: Some("https://api.example.com".into()),
            skip_ssl_validation: true,
            request_timeout_secs: Some(5),
            ..Default::default()
        };
        assert_eq!(Config::load_from(&path), expected);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_or_malformed_file_yields_default() {
        let path = temp_path("missing.json");
        assert_eq!(Config::load_from(&path), Config::default());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_cli_api_wins() {
        let config = Config {
            api: Some("https://from-config.example.com".into()),
            ..Default::default()
        };
        assert_eq!(
            config.effective_api(Some("https://from-cli.example.com")).as_deref(),
            Some("https://from-cli.example.com")
        );
        assert_eq!(
            config.effective_api(None).as_deref(),
            Some("https://from-config.example.com")
        );
    }

    #[test]
    fn test_connection_config_applies_settings() {
        let config = Config {
            skip_ssl_validation: true,
            connect_timeout_secs: Some(3),
            ..Default::default()
        };
        let connection = config.connection_config("https://api.example.com").unwrap();
        assert!(connection.skip_ssl_validation);
        assert_eq!(connection.connect_timeout, Duration::from_secs(3));

        assert!(config.connection_config("not a url").is_err());
    }

    #[test]
    fn test_explicit_client_credentials() {
        let grant = Config::default().grant(Some("id"), Some("secret")).unwrap();
        assert!(matches!(grant, Grant::ClientCredentials { .. }));
    }
}
