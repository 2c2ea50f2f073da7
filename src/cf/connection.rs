//! Connection context
//!
//! Holds the API address, the shared HTTP transport and the lazily
//! discovered root document. One context is shared (read-only) by every
//! resource client and by the token provider.

use super::errors::{map_error_response, sanitize_for_log};
use crate::error::{Error, ErrorKind, Result};
use reqwest::header::ACCEPT;
use reqwest::{Client, Proxy};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("cfclient/", env!("CARGO_PKG_VERSION"));

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Which root a request is issued against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// Cloud Controller v2 (`.../v2`)
    CloudControllerV2,
    /// Cloud Controller v3 (`.../v3`)
    CloudControllerV3,
    /// Token issuer
    Uaa,
}

/// Transport-level configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub api: Url,
    pub skip_ssl_validation: bool,
    pub proxy: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl ConnectionConfig {
    /// Configuration for the API at `api`, e.g. `https://api.run.pivotal.io`
    pub fn new(api: &str) -> Result<Self> {
        let api = Url::parse(api)
            .map_err(|e| Error::validation("api", format!("is not a valid URL: {}", e)))?;
        if api.cannot_be_a_base() {
            return Err(Error::validation("api", "must be an absolute http(s) URL"));
        }

        Ok(Self {
            api,
            skip_ssl_validation: false,
            proxy: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        })
    }

    pub fn skip_ssl_validation(mut self, skip: bool) -> Self {
        self.skip_ssl_validation = skip;
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Link {
    href: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RootLinks {
    #[serde(default)]
    cloud_controller_v2: Option<Link>,
    #[serde(default)]
    cloud_controller_v3: Option<Link>,
    #[serde(default)]
    uaa: Option<Link>,
    #[serde(default)]
    login: Option<Link>,
}

#[derive(Debug, Clone, Deserialize)]
struct RootDocument {
    #[serde(default)]
    links: RootLinks,
}

/// Resolved roots
#[derive(Debug, Clone)]
struct Roots {
    v2: Url,
    v3: Url,
    uaa: Option<Url>,
}

/// Shared connection state
#[derive(Debug)]
pub struct ConnectionContext {
    api: Url,
    http: Client,
    roots: OnceCell<Roots>,
}

impl ConnectionContext {
    /// Build the shared transport from `config`
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.skip_ssl_validation);

        if let Some(proxy) = &config.proxy {
            let proxy = Proxy::all(proxy.as_str())
                .map_err(|e| Error::validation("proxy", format!("is invalid: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| Error::transport("failed to create HTTP client", e))?;

        Ok(Self {
            api: config.api,
            http,
            roots: OnceCell::new(),
        })
    }

    pub fn api(&self) -> &Url {
        &self.api
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Resolve the root URL for `kind`, fetching the root document on first use
    pub async fn root(&self, kind: RootKind) -> Result<Url> {
        let roots = self.roots.get_or_try_init(|| self.discover()).await?;

        match kind {
            RootKind::CloudControllerV2 => Ok(roots.v2.clone()),
            RootKind::CloudControllerV3 => Ok(roots.v3.clone()),
            RootKind::Uaa => roots.uaa.clone().ok_or_else(|| {
                Error::authentication("root document does not advertise a token issuer", None)
            }),
        }
    }

    async fn discover(&self) -> Result<Roots> {
        tracing::debug!("Discovering API roots from {}", self.api);

        let response = self
            .http
            .get(self.api.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::transport("failed to fetch root document", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport("failed to read root document", e))?;

        if !status.is_success() {
            tracing::error!("Root discovery failed: {} - {}", status, sanitize_for_log(&body));
            return Err(map_error_response(status, &body).into());
        }

        let document: RootDocument = serde_json::from_str(&body).map_err(|e| {
            Error::from(ErrorKind::Transport {
                message: format!("malformed root document: {}", e),
                status: Some(status.as_u16()),
                body: Some(sanitize_for_log(&body)),
                source: None,
            })
        })?;

        let links = document.links;
        let roots = Roots {
            v2: self.link_or_default(links.cloud_controller_v2, "v2"),
            v3: self.link_or_default(links.cloud_controller_v3, "v3"),
            uaa: links
                .uaa
                .or(links.login)
                .and_then(|link| Url::parse(&link.href).ok()),
        };

        tracing::debug!("Resolved roots: v2={} v3={} uaa={:?}", roots.v2, roots.v3, roots.uaa);
        Ok(roots)
    }

    fn link_or_default(&self, link: Option<Link>, version: &str) -> Url {
        link.and_then(|link| Url::parse(&link.href).ok())
            .unwrap_or_else(|| {
                let mut url = self.api.clone();
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push(version);
                }
                url
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_rejects_relative_url() {
        let err = ConnectionConfig::new("api.example.com").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_config_defaults() {
        let config = ConnectionConfig::new("https://api.example.com").unwrap();
        assert!(!config.skip_ssl_validation);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.user_agent.starts_with("cfclient/"));
    }

    #[test]
    fn test_invalid_proxy_is_validation_error() {
        let config = ConnectionConfig::new("https://api.example.com")
            .unwrap()
            .proxy("http://[::1");
        let err = ConnectionContext::new(config).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_missing_links_fall_back_to_api_paths() {
        let config = ConnectionConfig::new("https://api.example.com/").unwrap();
        let context = ConnectionContext::new(config).unwrap();

        assert_eq!(
            context.link_or_default(None, "v2").as_str(),
            "https://api.example.com/v2"
        );
        assert_eq!(
            context
                .link_or_default(
                    Some(Link {
                        href: "https://cc.example.com/v3".to_string()
                    }),
                    "v3"
                )
                .as_str(),
            "https://cc.example.com/v3"
        );
    }
}
