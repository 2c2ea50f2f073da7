//! Service instances (v2)
//!
//! Create, update and delete accept `accepts_incomplete`, which lets brokers
//! provision asynchronously; progress is then reported through
//! [`LastOperation`].

use super::common::{LastOperation, ListResponse, PaginationParameters, Resource};
use crate::cf::{require, require_id, Operations, QueryParameters, UriBuilder, Validate, Void};
use crate::error::{CallSite, Result};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CREATE: CallSite = CallSite::new("service_instances", "create");
const DELETE: CallSite = CallSite::new("service_instances", "delete");
const GET: CallSite = CallSite::new("service_instances", "get");
const LIST: CallSite = CallSite::new("service_instances", "list");
const UPDATE: CallSite = CallSite::new("service_instances", "update");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstanceEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Map<String, Value>>,
    #[serde(rename = "space_guid", default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<LastOperation>,
    #[serde(rename = "service_plan_guid", default, skip_serializing_if = "Option::is_none")]
    pub service_plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_plan_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_bindings_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_keys_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes_url: Option<String>,
}

pub type ServiceInstanceResource = Resource<ServiceInstanceEntity>;
pub type CreateServiceInstanceResponse = ServiceInstanceResource;
pub type GetServiceInstanceResponse = ServiceInstanceResource;
pub type UpdateServiceInstanceResponse = ServiceInstanceResource;
pub type ListServiceInstancesResponse = ListResponse<ServiceInstanceResource>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateServiceInstanceRequest {
    #[serde(skip)]
    pub accepts_incomplete: Option<bool>,
    pub name: String,
    #[serde(rename = "service_plan_guid")]
    pub service_plan_id: String,
    #[serde(rename = "space_guid")]
    pub space_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Validate for CreateServiceInstanceRequest {
    fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("service_plan_id", &self.service_plan_id)?;
        require("space_id", &self.space_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteServiceInstanceRequest {
    pub service_instance_id: String,
    pub accepts_incomplete: Option<bool>,
    /// Remove the instance without contacting the broker
    pub purge: Option<bool>,
    /// Also delete bindings, keys and routes
    pub recursive: Option<bool>,
}

impl DeleteServiceInstanceRequest {
    pub fn new(service_instance_id: impl Into<String>) -> Self {
        Self {
            service_instance_id: service_instance_id.into(),
            ..Default::default()
        }
    }
}

impl Validate for DeleteServiceInstanceRequest {
    fn validate(&self) -> Result<()> {
        require_id("service_instance_id", &self.service_instance_id)
    }
}

impl QueryParameters for DeleteServiceInstanceRequest {
    fn append_query(&self, uri: &mut UriBuilder) {
        uri.query_opt("accepts_incomplete", self.accepts_incomplete)
            .query_opt("purge", self.purge)
            .query_opt("recursive", self.recursive);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetServiceInstanceRequest {
    pub service_instance_id: String,
}

impl GetServiceInstanceRequest {
    pub fn new(service_instance_id: impl Into<String>) -> Self {
        Self {
            service_instance_id: service_instance_id.into(),
        }
    }
}

impl Validate for GetServiceInstanceRequest {
    fn validate(&self) -> Result<()> {
        require_id("service_instance_id", &self.service_instance_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListServiceInstancesRequest {
    pub names: Vec<String>,
    pub space_ids: Vec<String>,
    pub service_plan_ids: Vec<String>,
    pub organization_ids: Vec<String>,
    pub gateway_names: Vec<String>,
    pub service_binding_ids: Vec<String>,
    pub service_key_ids: Vec<String>,
    pub pagination: PaginationParameters,
}

impl Validate for ListServiceInstancesRequest {}

impl QueryParameters for ListServiceInstancesRequest {
    fn append_query(&self, uri: &mut UriBuilder) {
        uri.filter("name", &self.names)
            .filter("space_guid", &self.space_ids)
            .filter("service_plan_guid", &self.service_plan_ids)
            .filter("organization_guid", &self.organization_ids)
            .filter("gateway_name", &self.gateway_names)
            .filter("service_binding_guid", &self.service_binding_ids)
            .filter("service_key_guid", &self.service_key_ids);
        self.pagination.append_query(uri);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateServiceInstanceRequest {
    #[serde(skip)]
    pub service_instance_id: String,
    #[serde(skip)]
    pub accepts_incomplete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "service_plan_guid", skip_serializing_if = "Option::is_none")]
    pub service_plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Validate for UpdateServiceInstanceRequest {
    fn validate(&self) -> Result<()> {
        require_id("service_instance_id", &self.service_instance_id)
    }
}

/// Client for `/v2/service_instances`
#[derive(Clone)]
pub struct ServiceInstances {
    operations: Operations,
}

impl ServiceInstances {
    pub fn new(operations: Operations) -> Self {
        Self { operations }
    }

    pub async fn create(
        &self,
        request: &CreateServiceInstanceRequest,
    ) -> Result<CreateServiceInstanceResponse> {
        self.operations
            .post(CREATE, request, |uri| {
                uri.path_segment("service_instances")
                    .query_opt("accepts_incomplete", request.accepts_incomplete);
            })
            .await
    }

    pub async fn delete(&self, request: &DeleteServiceInstanceRequest) -> Result<Void> {
        self.operations
            .delete(DELETE, request, |uri| {
                uri.path_segments(["service_instances", request.service_instance_id.as_str()]);
                request.append_query(uri);
            })
            .await
    }

    pub async fn get(
        &self,
        request: &GetServiceInstanceRequest,
    ) -> Result<GetServiceInstanceResponse> {
        self.operations
            .get(GET, request, |uri| {
                uri.path_segments(["service_instances", request.service_instance_id.as_str()]);
            })
            .await
    }

    pub async fn list(
        &self,
        request: &ListServiceInstancesRequest,
    ) -> Result<ListServiceInstancesResponse> {
        self.operations
            .get(LIST, request, |uri| {
                uri.path_segment("service_instances");
                request.append_query(uri);
            })
            .await
    }

    pub fn list_all(
        &self,
        request: &ListServiceInstancesRequest,
    ) -> BoxStream<'static, Result<ServiceInstanceResource>> {
        let query = request.clone();
        self.operations
            .list_all::<_, ListServiceInstancesResponse, _>(LIST, request, move |uri| {
                uri.path_segment("service_instances");
                query.append_query(uri);
            })
    }

    pub async fn update(
        &self,
        request: &UpdateServiceInstanceRequest,
    ) -> Result<UpdateServiceInstanceResponse> {
        self.operations
            .put(UPDATE, request, |uri| {
                uri.path_segments(["service_instances", request.service_instance_id.as_str()])
                    .query_opt("accepts_incomplete", request.accepts_incomplete);
            })
            .await
    }
}
