//! Typed client for the Cloud Foundry Cloud Controller API
//!
//! Typed request structs are turned into authenticated HTTP calls, list
//! endpoints are exposed as lazy item streams, and error responses come back
//! as structured [`Error`]s naming the resource operation that failed.
//!
//! # Example
//!
//! ```ignore
//! use cfclient::cf::{ConnectionConfig, ConnectionContext, Grant, UaaTokenProvider};
//! use cfclient::resource::service_keys::GetServiceKeyRequest;
//! use cfclient::CloudFoundryClient;
//!
//! async fn example() -> cfclient::Result<()> {
//!     let connection = ConnectionContext::new(ConnectionConfig::new("https://api.example.com")?)?;
//!     let tokens = UaaTokenProvider::new(Grant::password("admin", "secret"));
//!     let client = CloudFoundryClient::new(connection, tokens);
//!
//!     let key = client
//!         .service_keys()
//!         .get(&GetServiceKeyRequest::new("79aa4b11-99f3-484b-adfc-a63fa818c4d1"))
//!         .await?;
//!     println!("{:?}", key.entity);
//!     Ok(())
//! }
//! ```

pub mod cf;
pub mod client;
pub mod config;
pub mod error;
pub mod resource;

pub use client::CloudFoundryClient;
pub use error::{ApiError, CallSite, Error, ErrorKind, Result};
