//! Cloud Foundry client
//!
//! Entry point combining the shared connection and token provider, handing
//! out resource clients bound to the right API root.

use crate::cf::{ConnectionContext, Operations, RootKind, TokenProvider};
use crate::resource::{ServiceBindingsV3, ServiceBrokers, ServiceInstances, ServiceKeys};
use std::sync::Arc;

/// Main Cloud Foundry client
#[derive(Clone)]
pub struct CloudFoundryClient {
    connection: Arc<ConnectionContext>,
    tokens: Arc<dyn TokenProvider>,
}

impl CloudFoundryClient {
    pub fn new(connection: ConnectionContext, tokens: impl TokenProvider + 'static) -> Self {
        Self::from_shared(Arc::new(connection), Arc::new(tokens))
    }

    /// Build a client over an existing connection and token provider
    pub fn from_shared(connection: Arc<ConnectionContext>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { connection, tokens }
    }

    pub fn connection(&self) -> &ConnectionContext {
        &self.connection
    }

    pub fn service_instances(&self) -> ServiceInstances {
        ServiceInstances::new(self.operations(RootKind::CloudControllerV2))
    }

    pub fn service_keys(&self) -> ServiceKeys {
        ServiceKeys::new(self.operations(RootKind::CloudControllerV2))
    }

    pub fn service_brokers(&self) -> ServiceBrokers {
        ServiceBrokers::new(self.operations(RootKind::CloudControllerV2))
    }

    pub fn service_bindings_v3(&self) -> ServiceBindingsV3 {
        ServiceBindingsV3::new(self.operations(RootKind::CloudControllerV3))
    }

    fn operations(&self, root: RootKind) -> Operations {
        Operations::new(self.connection.clone(), self.tokens.clone(), root)
    }
}
