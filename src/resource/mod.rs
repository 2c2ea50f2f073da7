//! Resource clients
//!
//! Each resource family is a set of flat request/response structs plus a
//! client whose methods are one-line mappings onto the shared pipeline:
//! a call site, an HTTP verb, a path and a response shape.
//!
//! # Resources
//!
//! - [`service_instances`] - `/v2/service_instances`
//! - [`service_keys`] - `/v2/service_keys`
//! - [`service_brokers`] - `/v2/service_brokers`
//! - [`service_bindings`] - `/v3/service_bindings`
//!
//! # Example
//!
//! ```ignore
//! use cfclient::resource::service_keys::ListServiceKeysRequest;
//! use futures::TryStreamExt;
//!
//! async fn all_keys(client: &cfclient::CloudFoundryClient) -> cfclient::Result<usize> {
//!     let keys: Vec<_> = client
//!         .service_keys()
//!         .list_all(&ListServiceKeysRequest::default())
//!         .try_collect()
//!         .await?;
//!     Ok(keys.len())
//! }
//! ```

pub mod common;
pub mod service_bindings;
pub mod service_brokers;
pub mod service_instances;
pub mod service_keys;

pub use common::{
    LastOperation, Link, ListResponse, Metadata, OrderDirection, PaginatedResponse, Pagination,
    PaginationParameters, PaginationParametersV3, Resource, ToOneRelationship,
};
pub use service_bindings::ServiceBindingsV3;
pub use service_brokers::ServiceBrokers;
pub use service_instances::ServiceInstances;
pub use service_keys::ServiceKeys;
