//! Service bindings (v3)

use super::common::{LastOperation, Link, PaginatedResponse, PaginationParametersV3, ToOneRelationship};
use crate::cf::{require, require_id, Operations, QueryParameters, UriBuilder, Validate, Void};
use crate::error::{CallSite, Error, Result};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

const CREATE: CallSite = CallSite::new("service_bindings", "create");
const DELETE: CallSite = CallSite::new("service_bindings", "delete");
const GET: CallSite = CallSite::new("service_bindings", "get");
const LIST: CallSite = CallSite::new("service_bindings", "list");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceBindingType {
    App,
    Key,
}

impl fmt::Display for ServiceBindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceBindingType::App => f.write_str("app"),
            ServiceBindingType::Key => f.write_str("key"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBindingRelationships {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<ToOneRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_instance: Option<ToOneRelationship>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceBindingResource {
    #[serde(rename = "guid", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ServiceBindingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<LastOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<ServiceBindingRelationships>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, Link>,
}

/// `None` when the broker accepted the binding asynchronously
pub type CreateServiceBindingResponse = Option<ServiceBindingResource>;
pub type GetServiceBindingResponse = ServiceBindingResource;
pub type ListServiceBindingsResponse = PaginatedResponse<ServiceBindingResource>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateServiceBindingRequest {
    #[serde(rename = "type")]
    pub kind: ServiceBindingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub relationships: ServiceBindingRelationships,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

impl CreateServiceBindingRequest {
    /// Bind `service_instance_id` to an app
    pub fn app(service_instance_id: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            kind: ServiceBindingType::App,
            name: None,
            relationships: ServiceBindingRelationships {
                app: Some(ToOneRelationship::to(app_id)),
                service_instance: Some(ToOneRelationship::to(service_instance_id)),
            },
            parameters: None,
        }
    }

    /// A service key for `service_instance_id`
    pub fn key(service_instance_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: ServiceBindingType::Key,
            name: Some(name.into()),
            relationships: ServiceBindingRelationships {
                app: None,
                service_instance: Some(ToOneRelationship::to(service_instance_id)),
            },
            parameters: None,
        }
    }
}

impl Validate for CreateServiceBindingRequest {
    fn validate(&self) -> Result<()> {
        let relationships = &self.relationships;
        let service_instance = relationships
            .service_instance
            .as_ref()
            .and_then(|r| r.guid())
            .unwrap_or_default();
        require("relationships.service_instance", service_instance)?;

        match self.kind {
            ServiceBindingType::App => {
                let app = relationships.app.as_ref().and_then(|r| r.guid()).unwrap_or_default();
                require("relationships.app", app)
            }
            ServiceBindingType::Key => {
                if relationships.app.is_some() {
                    return Err(Error::validation(
                        "relationships.app",
                        "must be absent for key bindings",
                    ));
                }
                require("name", self.name.as_deref().unwrap_or_default())
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteServiceBindingRequest {
    pub service_binding_id: String,
}

impl DeleteServiceBindingRequest {
    pub fn new(service_binding_id: impl Into<String>) -> Self {
        Self {
            service_binding_id: service_binding_id.into(),
        }
    }
}

impl Validate for DeleteServiceBindingRequest {
    fn validate(&self) -> Result<()> {
        require_id("service_binding_id", &self.service_binding_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetServiceBindingRequest {
    pub service_binding_id: String,
}

impl GetServiceBindingRequest {
    pub fn new(service_binding_id: impl Into<String>) -> Self {
        Self {
            service_binding_id: service_binding_id.into(),
        }
    }
}

impl Validate for GetServiceBindingRequest {
    fn validate(&self) -> Result<()> {
        require_id("service_binding_id", &self.service_binding_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListServiceBindingsRequest {
    pub names: Vec<String>,
    pub service_instance_ids: Vec<String>,
    pub service_instance_names: Vec<String>,
    pub app_ids: Vec<String>,
    pub app_names: Vec<String>,
    pub kind: Option<ServiceBindingType>,
    pub pagination: PaginationParametersV3,
}

impl Validate for ListServiceBindingsRequest {}

impl QueryParameters for ListServiceBindingsRequest {
    fn append_query(&self, uri: &mut UriBuilder) {
        uri.query_list("names", &self.names)
            .query_list("service_instance_guids", &self.service_instance_ids)
            .query_list("service_instance_names", &self.service_instance_names)
            .query_list("app_guids", &self.app_ids)
            .query_list("app_names", &self.app_names)
            .query_opt("type", self.kind);
        self.pagination.append_query(uri);
    }
}

/// Client for `/v3/service_bindings`
#[derive(Clone)]
pub struct ServiceBindingsV3 {
    operations: Operations,
}

impl ServiceBindingsV3 {
    pub fn new(operations: Operations) -> Self {
        Self { operations }
    }

    pub async fn create(
        &self,
        request: &CreateServiceBindingRequest,
    ) -> Result<CreateServiceBindingResponse> {
        self.operations
            .post(CREATE, request, |uri| {
                uri.path_segment("service_bindings");
            })
            .await
    }

    pub async fn delete(&self, request: &DeleteServiceBindingRequest) -> Result<Void> {
        self.operations
            .delete(DELETE, request, |uri| {
                uri.path_segments(["service_bindings", request.service_binding_id.as_str()]);
            })
            .await
    }

    pub async fn get(&self, request: &GetServiceBindingRequest) -> Result<GetServiceBindingResponse> {
        self.operations
            .get(GET, request, |uri| {
                uri.path_segments(["service_bindings", request.service_binding_id.as_str()]);
            })
            .await
    }

    pub async fn list(
        &self,
        request: &ListServiceBindingsRequest,
    ) -> Result<ListServiceBindingsResponse> {
        self.operations
            .get(LIST, request, |uri| {
                uri.path_segment("service_bindings");
                request.append_query(uri);
            })
            .await
    }

    pub fn list_all(
        &self,
        request: &ListServiceBindingsRequest,
    ) -> BoxStream<'static, Result<ServiceBindingResource>> {
        let query = request.clone();
        self.operations
            .list_all::<_, ListServiceBindingsResponse, _>(LIST, request, move |uri| {
                uri.path_segment("service_bindings");
                query.append_query(uri);
            })
    }
}
