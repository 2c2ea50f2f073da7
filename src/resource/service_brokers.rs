//! Service brokers (v2)

use super::common::{ListResponse, PaginationParameters, Resource};
use crate::cf::{require, require_id, Operations, QueryParameters, UriBuilder, Validate, Void};
use crate::error::{CallSite, Result};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

const CREATE: CallSite = CallSite::new("service_brokers", "create");
const DELETE: CallSite = CallSite::new("service_brokers", "delete");
const GET: CallSite = CallSite::new("service_brokers", "get");
const LIST: CallSite = CallSite::new("service_brokers", "list");
const UPDATE: CallSite = CallSite::new("service_brokers", "update");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBrokerEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_username: Option<String>,
    #[serde(rename = "space_guid", default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

pub type ServiceBrokerResource = Resource<ServiceBrokerEntity>;
pub type CreateServiceBrokerResponse = ServiceBrokerResource;
pub type GetServiceBrokerResponse = ServiceBrokerResource;
pub type UpdateServiceBrokerResponse = ServiceBrokerResource;
pub type ListServiceBrokersResponse = ListResponse<ServiceBrokerResource>;

#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateServiceBrokerRequest {
    pub name: String,
    pub broker_url: String,
    pub auth_username: String,
    pub auth_password: String,
    /// Registers a space-scoped broker
    #[serde(rename = "space_guid", skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

impl std::fmt::Debug for CreateServiceBrokerRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateServiceBrokerRequest")
            .field("name", &self.name)
            .field("broker_url", &self.broker_url)
            .field("auth_username", &self.auth_username)
            .field("space_id", &self.space_id)
            .finish_non_exhaustive()
    }
}

impl Validate for CreateServiceBrokerRequest {
    fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("broker_url", &self.broker_url)?;
        require("auth_username", &self.auth_username)?;
        require("auth_password", &self.auth_password)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteServiceBrokerRequest {
    pub service_broker_id: String,
}

impl DeleteServiceBrokerRequest {
    pub fn new(service_broker_id: impl Into<String>) -> Self {
        Self {
            service_broker_id: service_broker_id.into(),
        }
    }
}

impl Validate for DeleteServiceBrokerRequest {
    fn validate(&self) -> Result<()> {
        require_id("service_broker_id", &self.service_broker_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetServiceBrokerRequest {
    pub service_broker_id: String,
}

impl GetServiceBrokerRequest {
    pub fn new(service_broker_id: impl Into<String>) -> Self {
        Self {
            service_broker_id: service_broker_id.into(),
        }
    }
}

impl Validate for GetServiceBrokerRequest {
    fn validate(&self) -> Result<()> {
        require_id("service_broker_id", &self.service_broker_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListServiceBrokersRequest {
    pub names: Vec<String>,
    pub space_ids: Vec<String>,
    pub pagination: PaginationParameters,
}

impl Validate for ListServiceBrokersRequest {}

impl QueryParameters for ListServiceBrokersRequest {
    fn append_query(&self, uri: &mut UriBuilder) {
        uri.filter("name", &self.names)
            .filter("space_guid", &self.space_ids);
        self.pagination.append_query(uri);
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateServiceBrokerRequest {
    #[serde(skip)]
    pub service_broker_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_password: Option<String>,
}

impl std::fmt::Debug for UpdateServiceBrokerRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateServiceBrokerRequest")
            .field("service_broker_id", &self.service_broker_id)
            .field("name", &self.name)
            .field("broker_url", &self.broker_url)
            .field("auth_username", &self.auth_username)
            .finish_non_exhaustive()
    }
}

impl Validate for UpdateServiceBrokerRequest {
    fn validate(&self) -> Result<()> {
        require_id("service_broker_id", &self.service_broker_id)
    }
}

/// Client for `/v2/service_brokers`
#[derive(Clone)]
pub struct ServiceBrokers {
    operations: Operations,
}

impl ServiceBrokers {
    pub fn new(operations: Operations) -> Self {
        Self { operations }
    }

    pub async fn create(
        &self,
        request: &CreateServiceBrokerRequest,
    ) -> Result<CreateServiceBrokerResponse> {
        self.operations
            .post(CREATE, request, |uri| {
                uri.path_segment("service_brokers");
            })
            .await
    }

    pub async fn delete(&self, request: &DeleteServiceBrokerRequest) -> Result<Void> {
        self.operations
            .delete(DELETE, request, |uri| {
                uri.path_segments(["service_brokers", request.service_broker_id.as_str()]);
            })
            .await
    }

    pub async fn get(&self, request: &GetServiceBrokerRequest) -> Result<GetServiceBrokerResponse> {
        self.operations
            .get(GET, request, |uri| {
                uri.path_segments(["service_brokers", request.service_broker_id.as_str()]);
            })
            .await
    }

    pub async fn list(
        &self,
        request: &ListServiceBrokersRequest,
    ) -> Result<ListServiceBrokersResponse> {
        self.operations
            .get(LIST, request, |uri| {
                uri.path_segment("service_brokers");
                request.append_query(uri);
            })
            .await
    }

    pub fn list_all(
        &self,
        request: &ListServiceBrokersRequest,
    ) -> BoxStream<'static, Result<ServiceBrokerResource>> {
        let query = request.clone();
        self.operations
            .list_all::<_, ListServiceBrokersResponse, _>(LIST, request, move |uri| {
                uri.path_segment("service_brokers");
                query.append_query(uri);
            })
    }

    pub async fn update(
        &self,
        request: &UpdateServiceBrokerRequest,
    ) -> Result<UpdateServiceBrokerResponse> {
        self.operations
            .put(UPDATE, request, |uri| {
                uri.path_segments(["service_brokers", request.service_broker_id.as_str()]);
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_body_omits_id_and_absent_fields() {
        let request = UpdateServiceBrokerRequest {
            service_broker_id: "broker-1".into(),
            name: Some("renamed".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"name": "renamed"}));
    }

    #[test]
    fn test_debug_hides_password() {
        let request = CreateServiceBrokerRequest {
            name: "broker".into(),
            broker_url: "https://broker.example.com".into(),
            auth_username: "admin".into(),
            auth_password: "s3cret".into(),
            space_id: None,
        };
        assert!(!format!("{:?}", request).contains("s3cret"));
        assert!(request.validate().is_ok());
    }
}
