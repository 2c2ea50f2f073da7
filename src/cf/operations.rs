//! Request execution
//!
//! [`Operations`] is the pipeline every resource call goes through:
//! validate the request, resolve the root, attach a bearer token, build the
//! URI, serialize the body, send, then either decode the success body or map
//! the error response. A `401` is answered with exactly one token refresh and
//! replay; nothing else is retried.

use super::auth::TokenProvider;
use super::connection::{ConnectionContext, RootKind};
use super::errors::{map_error_response, sanitize_for_log};
use super::pagination::{self, Page};
use super::request::Validate;
use super::uri::UriBuilder;
use crate::error::{CallSite, Error, ErrorKind, Result};
use futures::stream::BoxStream;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

/// Header carrying the per-call correlation id
const REQUEST_ID_HEADER: &str = "X-Vcap-Request-Id";

/// Response type for calls whose body is discarded; only the status matters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Void;

impl<'de> Deserialize<'de> for Void {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Void)
    }
}

/// Shared request pipeline bound to one API root
#[derive(Clone)]
pub struct Operations {
    connection: Arc<ConnectionContext>,
    tokens: Arc<dyn TokenProvider>,
    root: RootKind,
}

impl Operations {
    pub fn new(
        connection: Arc<ConnectionContext>,
        tokens: Arc<dyn TokenProvider>,
        root: RootKind,
    ) -> Self {
        Self {
            connection,
            tokens,
            root,
        }
    }

    pub async fn get<Req, Resp, F>(&self, site: CallSite, request: &Req, uri: F) -> Result<Resp>
    where
        Req: Validate,
        Resp: DeserializeOwned,
        F: FnOnce(&mut UriBuilder),
    {
        self.without_body(site, Method::GET, request, uri).await
    }

    pub async fn delete<Req, Resp, F>(&self, site: CallSite, request: &Req, uri: F) -> Result<Resp>
    where
        Req: Validate,
        Resp: DeserializeOwned,
        F: FnOnce(&mut UriBuilder),
    {
        self.without_body(site, Method::DELETE, request, uri).await
    }

    pub async fn post<Req, Resp, F>(&self, site: CallSite, request: &Req, uri: F) -> Result<Resp>
    where
        Req: Validate + Serialize,
        Resp: DeserializeOwned,
        F: FnOnce(&mut UriBuilder),
    {
        self.with_body(site, Method::POST, request, uri).await
    }

    pub async fn put<Req, Resp, F>(&self, site: CallSite, request: &Req, uri: F) -> Result<Resp>
    where
        Req: Validate + Serialize,
        Resp: DeserializeOwned,
        F: FnOnce(&mut UriBuilder),
    {
        self.with_body(site, Method::PUT, request, uri).await
    }

    pub async fn patch<Req, Resp, F>(&self, site: CallSite, request: &Req, uri: F) -> Result<Resp>
    where
        Req: Validate + Serialize,
        Resp: DeserializeOwned,
        F: FnOnce(&mut UriBuilder),
    {
        self.with_body(site, Method::PATCH, request, uri).await
    }

    /// Lazily stream every item of a paginated list, following `next` links
    pub fn list_all<Req, P, F>(
        &self,
        site: CallSite,
        request: &Req,
        uri: F,
    ) -> BoxStream<'static, Result<P::Item>>
    where
        Req: Validate,
        P: Page + DeserializeOwned + Send + 'static,
        P::Item: Send + 'static,
        F: FnOnce(&mut UriBuilder) + Send + 'static,
    {
        let start = request.validate().map(|()| uri).map_err(|e| e.at(site));
        pagination::paginate::<P, F>(self.clone(), site, start)
    }

    async fn without_body<Req, Resp, F>(
        &self,
        site: CallSite,
        method: Method,
        request: &Req,
        uri: F,
    ) -> Result<Resp>
    where
        Req: Validate,
        Resp: DeserializeOwned,
        F: FnOnce(&mut UriBuilder),
    {
        request.validate().map_err(|e| e.at(site))?;
        let url = self.resolve(site, uri).await?;
        self.execute(site, method, url, None).await
    }

    async fn with_body<Req, Resp, F>(
        &self,
        site: CallSite,
        method: Method,
        request: &Req,
        uri: F,
    ) -> Result<Resp>
    where
        Req: Validate + Serialize,
        Resp: DeserializeOwned,
        F: FnOnce(&mut UriBuilder),
    {
        request.validate().map_err(|e| e.at(site))?;
        let body = serde_json::to_vec(request)
            .map_err(|e| Error::validation("body", format!("cannot be serialized: {}", e)).at(site))?;
        let url = self.resolve(site, uri).await?;
        self.execute(site, method, url, Some(body)).await
    }

    /// Root for this resource plus whatever the caller appends
    pub(crate) async fn resolve<F>(&self, site: CallSite, uri: F) -> Result<Url>
    where
        F: FnOnce(&mut UriBuilder),
    {
        let root = self
            .connection
            .root(self.root)
            .await
            .map_err(|e| e.at(site))?;
        let mut builder = UriBuilder::new(root);
        uri(&mut builder);
        Ok(builder.build())
    }

    /// Issue one logical call, replaying once on `401`
    pub(crate) async fn execute<Resp>(
        &self,
        site: CallSite,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("cf_call", %site, %method, %request_id);

        async {
            let mut replayed = false;
            loop {
                let token = self
                    .tokens
                    .token(&self.connection)
                    .await
                    .map_err(|e| e.at(site))?;

                tracing::debug!("{} {}", method, url);

                let mut request = self
                    .connection
                    .http()
                    .request(method.clone(), url.clone())
                    .bearer_auth(&token)
                    .header(ACCEPT, "application/json")
                    .header(REQUEST_ID_HEADER, request_id.to_string());
                if let Some(body) = &body {
                    request = request
                        .header(CONTENT_TYPE, "application/json")
                        .body(body.clone());
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| Error::transport("failed to send request", e).at(site))?;

                let status = response.status();
                let text = response
                    .text()
                    .await
                    .map_err(|e| Error::transport("failed to read response body", e).at(site))?;

                if status.is_success() {
                    return decode(status, &text).map_err(|e| e.at(site));
                }

                if status == StatusCode::UNAUTHORIZED && !replayed {
                    tracing::debug!("Token rejected, refreshing and replaying once");
                    self.tokens.invalidate(&token).await;
                    replayed = true;
                    continue;
                }

                tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
                return Err(Error::from(map_error_response(status, &text)).at(site));
            }
        }
        .instrument(span)
        .await
    }
}

/// Decode a success body; an empty body decodes as JSON `null`
fn decode<Resp: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Resp> {
    let body = if body.trim().is_empty() { "null" } else { body };

    serde_json::from_str(body).map_err(|e| {
        ErrorKind::Transport {
            message: format!("failed to decode response body: {}", e),
            status: Some(status.as_u16()),
            body: Some(sanitize_for_log(body)),
            source: None,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_void_accepts_empty_and_any_body() {
        assert_eq!(decode::<Void>(StatusCode::NO_CONTENT, "").unwrap(), Void);
        assert_eq!(
            decode::<Void>(StatusCode::ACCEPTED, r#"{"metadata":{"guid":"job"}}"#).unwrap(),
            Void
        );
    }

    #[test]
    fn test_optional_response_from_empty_body() {
        let decoded: Option<Value> = decode(StatusCode::ACCEPTED, "  ").unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_malformed_success_body_is_transport_error() {
        #[derive(Debug, Deserialize)]
        struct Named {
            #[allow(dead_code)]
            name: String,
        }

        let err = decode::<Named>(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.status(), Some(200));
    }
}
