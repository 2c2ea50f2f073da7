//! Service keys (v2)

use super::common::{ListResponse, PaginationParameters, Resource};
use crate::cf::{require, require_id, Operations, QueryParameters, UriBuilder, Validate, Void};
use crate::error::{CallSite, Result};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CREATE: CallSite = CallSite::new("service_keys", "create");
const DELETE: CallSite = CallSite::new("service_keys", "delete");
const GET: CallSite = CallSite::new("service_keys", "get");
const LIST: CallSite = CallSite::new("service_keys", "list");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceKeyEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Map<String, Value>>,
    #[serde(rename = "service_instance_guid", default, skip_serializing_if = "Option::is_none")]
    pub service_instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_instance_url: Option<String>,
}

pub type ServiceKeyResource = Resource<ServiceKeyEntity>;
pub type CreateServiceKeyResponse = ServiceKeyResource;
pub type GetServiceKeyResponse = ServiceKeyResource;
pub type ListServiceKeysResponse = ListResponse<ServiceKeyResource>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateServiceKeyRequest {
    pub name: String,
    #[serde(rename = "service_instance_guid")]
    pub service_instance_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

impl CreateServiceKeyRequest {
    pub fn new(name: impl Into<String>, service_instance_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service_instance_id: service_instance_id.into(),
            parameters: None,
        }
    }
}

impl Validate for CreateServiceKeyRequest {
    fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("service_instance_id", &self.service_instance_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteServiceKeyRequest {
    pub service_key_id: String,
}

impl DeleteServiceKeyRequest {
    pub fn new(service_key_id: impl Into<String>) -> Self {
        Self {
            service_key_id: service_key_id.into(),
        }
    }
}

impl Validate for DeleteServiceKeyRequest {
    fn validate(&self) -> Result<()> {
        require_id("service_key_id", &self.service_key_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetServiceKeyRequest {
    pub service_key_id: String,
}

impl GetServiceKeyRequest {
    pub fn new(service_key_id: impl Into<String>) -> Self {
        Self {
            service_key_id: service_key_id.into(),
        }
    }
}

impl Validate for GetServiceKeyRequest {
    fn validate(&self) -> Result<()> {
        require_id("service_key_id", &self.service_key_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListServiceKeysRequest {
    pub names: Vec<String>,
    pub service_instance_ids: Vec<String>,
    pub pagination: PaginationParameters,
}

impl Validate for ListServiceKeysRequest {}

impl QueryParameters for ListServiceKeysRequest {
    fn append_query(&self, uri: &mut UriBuilder) {
        uri.filter("name", &self.names)
            .filter("service_instance_guid", &self.service_instance_ids);
        self.pagination.append_query(uri);
    }
}

/// Client for `/v2/service_keys`
#[derive(Clone)]
pub struct ServiceKeys {
    operations: Operations,
}

impl ServiceKeys {
    pub fn new(operations: Operations) -> Self {
        Self { operations }
    }

    pub async fn create(&self, request: &CreateServiceKeyRequest) -> Result<CreateServiceKeyResponse> {
        self.operations
            .post(CREATE, request, |uri| {
                uri.path_segment("service_keys");
            })
            .await
    }

    pub async fn delete(&self, request: &DeleteServiceKeyRequest) -> Result<Void> {
        self.operations
            .delete(DELETE, request, |uri| {
                uri.path_segments(["service_keys", request.service_key_id.as_str()]);
            })
            .await
    }

    pub async fn get(&self, request: &GetServiceKeyRequest) -> Result<GetServiceKeyResponse> {
        self.operations
            .get(GET, request, |uri| {
                uri.path_segments(["service_keys", request.service_key_id.as_str()]);
            })
            .await
    }

    /// One page of service keys
    pub async fn list(&self, request: &ListServiceKeysRequest) -> Result<ListServiceKeysResponse> {
        self.operations
            .get(LIST, request, |uri| {
                uri.path_segment("service_keys");
                request.append_query(uri);
            })
            .await
    }

    /// Every service key matching `request`, across all pages
    pub fn list_all(
        &self,
        request: &ListServiceKeysRequest,
    ) -> BoxStream<'static, Result<ServiceKeyResource>> {
        let query = request.clone();
        self.operations
            .list_all::<_, ListServiceKeysResponse, _>(LIST, request, move |uri| {
                uri.path_segment("service_keys");
                query.append_query(uri);
            })
    }
}
