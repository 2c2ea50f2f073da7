//! Authentication
//!
//! Bearer tokens are obtained from the platform's UAA token issuer using the
//! OAuth2 client-credentials or password grant. Tokens are cached until they
//! come within a safety margin of their expiry, and concurrent callers share
//! a single in-flight refresh.

use super::connection::{ConnectionContext, RootKind};
use super::errors::sanitize_for_log;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if the issuer does not report one (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Source of bearer tokens for API calls
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A token that is valid at the moment it is returned
    async fn token(&self, connection: &ConnectionContext) -> Result<String>;

    /// Report that `stale` was rejected by the API, so the next call refreshes
    async fn invalidate(&self, _stale: &str) {}
}

/// A pre-obtained token that is never refreshed
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self, _connection: &ConnectionContext) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// OAuth2 grant used to obtain a fresh token
#[derive(Clone)]
pub enum Grant {
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    Password {
        client_id: String,
        client_secret: String,
        username: String,
        password: String,
    },
}

impl Grant {
    /// The `cf` CLI client with a user's credentials
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Grant::Password {
            client_id: "cf".to_string(),
            client_secret: String::new(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn client_credentials(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Grant::ClientCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    fn client(&self) -> (&str, &str) {
        match self {
            Grant::ClientCredentials {
                client_id,
                client_secret,
            }
            | Grant::Password {
                client_id,
                client_secret,
                ..
            } => (client_id, client_secret),
        }
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        match self {
            Grant::ClientCredentials { .. } => vec![
                ("grant_type", "client_credentials".to_string()),
                ("response_type", "token".to_string()),
            ],
            Grant::Password {
                username, password, ..
            } => vec![
                ("grant_type", "password".to_string()),
                ("username", username.clone()),
                ("password", password.clone()),
                ("response_type", "token".to_string()),
            ],
        }
    }
}

impl std::fmt::Debug for Grant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secrets stay out of logs
        match self {
            Grant::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            Grant::Password {
                client_id, username, ..
            } => f
                .debug_struct("Password")
                .field("client_id", client_id)
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UaaErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn new(token: String, lifetime: Duration, margin: Duration) -> Self {
        Self {
            token,
            expires_at: Instant::now() + lifetime.saturating_sub(margin),
        }
    }

    /// Check if this cached token is still valid
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Token provider backed by the platform's UAA
#[derive(Debug)]
pub struct UaaTokenProvider {
    grant: Grant,
    expiry_margin: Duration,
    token_cache: RwLock<Option<CachedToken>>,
    /// Held for the whole exchange; guards the refresh token
    refresh: Mutex<Option<String>>,
}

impl UaaTokenProvider {
    pub fn new(grant: Grant) -> Self {
        Self {
            grant,
            expiry_margin: TOKEN_EXPIRY_BUFFER,
            token_cache: RwLock::new(None),
            refresh: Mutex::new(None),
        }
    }

    /// Override how long before expiry a cached token is considered stale
    pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = margin;
        self
    }

    async fn exchange(
        &self,
        connection: &ConnectionContext,
        refresh_token: Option<String>,
    ) -> Result<TokenResponse> {
        let mut endpoint = connection.root(RootKind::Uaa).await?;
        endpoint
            .path_segments_mut()
            .map_err(|_| Error::authentication("token issuer URL cannot be a base", None))?
            .pop_if_empty()
            .extend(["oauth", "token"]);

        if let Some(refresh_token) = refresh_token {
            let form = vec![
                ("grant_type", "refresh_token".to_string()),
                ("refresh_token", refresh_token.clone()),
            ];
            match self.post_form(connection, &endpoint, form).await {
                Ok(mut token) => {
                    // Issuers that do not rotate keep the current refresh token valid
                    token.refresh_token.get_or_insert(refresh_token);
                    return Ok(token);
                }
                Err(e) => {
                    tracing::debug!("Refresh token rejected ({}), using primary grant", e);
                }
            }
        }

        self.post_form(connection, &endpoint, self.grant.form()).await
    }

    async fn post_form(
        &self,
        connection: &ConnectionContext,
        endpoint: &url::Url,
        form: Vec<(&'static str, String)>,
    ) -> Result<TokenResponse> {
        let (client_id, client_secret) = self.grant.client();
        tracing::debug!("POST {} ({})", endpoint, form[0].1);

        let response = connection
            .http()
            .post(endpoint.clone())
            .basic_auth(client_id, Some(client_secret))
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::authentication(format!("token request failed: {}", e), None))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::authentication(format!("failed to read token response: {}", e), None)
        })?;

        if !status.is_success() {
            tracing::error!("Token request rejected: {} - {}", status, sanitize_for_log(&body));
            let message = match serde_json::from_str::<UaaErrorBody>(&body) {
                Ok(err) => format!(
                    "{}: {}",
                    err.error,
                    err.error_description.unwrap_or_default()
                ),
                Err(_) => format!("token issuer returned {}", status),
            };
            return Err(Error::authentication(message, Some(status.as_u16())));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::authentication(format!("malformed token response: {}", e), None))
    }
}

#[async_trait]
impl TokenProvider for UaaTokenProvider {
    async fn token(&self, connection: &ConnectionContext) -> Result<String> {
        // Check cache first - but only return if token is still valid
        let seen = {
            let cache = self.token_cache.read().await;
            match cache.as_ref() {
                Some(cached) if cached.is_valid() => return Ok(cached.token.clone()),
                Some(cached) => Some(cached.token.clone()),
                None => None,
            }
        };

        let mut refresh_token = self.refresh.lock().await;

        // Another caller may have refreshed while we waited for the lock
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() || Some(&cached.token) != seen.as_ref() {
                    return Ok(cached.token.clone());
                }
            }
        }

        tracing::debug!("Cached token missing or expired, fetching new token");
        // The stored refresh token is only replaced once an exchange succeeds
        let response = self.exchange(connection, refresh_token.clone()).await?;
        *refresh_token = response.refresh_token;

        let lifetime = response
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let cached = CachedToken::new(response.access_token, lifetime, self.expiry_margin);
        let token = cached.token.clone();

        *self.token_cache.write().await = Some(cached);

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            lifetime.saturating_sub(self.expiry_margin).as_secs() / 60
        );

        Ok(token)
    }

    async fn invalidate(&self, stale: &str) {
        let mut cache = self.token_cache.write().await;
        if cache.as_ref().is_some_and(|cached| cached.token == stale) {
            tracing::debug!("Dropping rejected token");
            *cache = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry_applies_margin() {
        let fresh = CachedToken::new("a".into(), Duration::from_secs(600), TOKEN_EXPIRY_BUFFER);
        assert!(fresh.is_valid());

        let inside_margin =
            CachedToken::new("b".into(), Duration::from_secs(30), TOKEN_EXPIRY_BUFFER);
        assert!(!inside_margin.is_valid());
    }

    #[test]
    fn test_grant_forms() {
        let form = Grant::client_credentials("id", "secret").form();
        assert_eq!(form[0], ("grant_type", "client_credentials".to_string()));

        let form = Grant::password("user", "pass").form();
        assert!(form.contains(&("username", "user".to_string())));
        assert!(form.contains(&("password", "pass".to_string())));
        assert_eq!(Grant::password("u", "p").client(), ("cf", ""));
    }

    #[test]
    fn test_grant_debug_hides_secrets() {
        let rendered = format!("{:?}", Grant::client_credentials("my-client", "hunter2"));
        assert!(rendered.contains("my-client"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_invalidate_only_drops_matching_token() {
        let provider = UaaTokenProvider::new(Grant::client_credentials("id", "secret"));
        tokio_test::block_on(async {
            *provider.token_cache.write().await = Some(CachedToken::new(
                "current".into(),
                Duration::from_secs(600),
                TOKEN_EXPIRY_BUFFER,
            ));

            provider.invalidate("older").await;
            assert!(provider.token_cache.read().await.is_some());

            provider.invalidate("current").await;
            assert!(provider.token_cache.read().await.is_none());
        });
    }
}
