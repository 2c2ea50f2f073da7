//! Cloud Controller API plumbing
//!
//! This module provides the request pipeline shared by every resource
//! client: connection state, authentication, URI construction, execution,
//! pagination and error mapping.
//!
//! # Module Structure
//!
//! - [`connection`] - Shared transport, configuration and root discovery
//! - [`auth`] - Bearer token providers with cached, coalesced refresh
//! - [`uri`] - URI builder and the query-parameter mapping trait
//! - [`request`] - Request validation
//! - [`operations`] - The execution pipeline (auth, send, decode, replay on 401)
//! - [`pagination`] - Lazy item streams over paginated list endpoints
//! - [`errors`] - Mapping of error responses to structured errors
//!
//! # Example
//!
//! ```ignore
//! use cfclient::cf::{ConnectionConfig, ConnectionContext, Grant, UaaTokenProvider};
//!
//! async fn example() -> cfclient::Result<()> {
//!     let connection = ConnectionContext::new(ConnectionConfig::new("https://api.example.com")?)?;
//!     let tokens = UaaTokenProvider::new(Grant::client_credentials("id", "secret"));
//!     let client = cfclient::CloudFoundryClient::new(connection, tokens);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod connection;
pub mod errors;
pub mod operations;
pub mod pagination;
pub mod request;
pub mod uri;

pub use auth::{Grant, StaticTokenProvider, TokenProvider, UaaTokenProvider};
pub use connection::{ConnectionConfig, ConnectionContext, RootKind};
pub use errors::map_error_response;
pub use operations::{Operations, Void};
pub use pagination::Page;
pub use request::{require, require_id, Validate};
pub use uri::{QueryParameters, UriBuilder};
