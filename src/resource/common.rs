//! Shared wire types
//!
//! Envelope, metadata and paging types used by more than one resource.

use crate::cf::{Page, QueryParameters, UriBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// v2
// =============================================================================

/// v2 resource metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "guid", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// v2 resource: metadata plus a resource-specific entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource<E> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<E>,
}

impl<E> Resource<E> {
    pub fn id(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.id.as_deref())
    }
}

/// v2 list-response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<R> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_url: Option<String>,
    #[serde(default = "Vec::new")]
    pub resources: Vec<R>,
}

impl<R> Page for ListResponse<R> {
    type Item = R;

    fn into_parts(self) -> (Vec<R>, Option<String>) {
        (self.resources, self.next_url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => f.write_str("asc"),
            OrderDirection::Desc => f.write_str("desc"),
        }
    }
}

/// v2 paging parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationParameters {
    pub page: Option<u32>,
    pub results_per_page: Option<u32>,
    pub order_direction: Option<OrderDirection>,
}

impl QueryParameters for PaginationParameters {
    fn append_query(&self, uri: &mut UriBuilder) {
        uri.query_opt("page", self.page)
            .query_opt("results-per-page", self.results_per_page)
            .query_opt("order-direction", self.order_direction);
    }
}

/// State of the last asynchronous operation on a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastOperation {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

// =============================================================================
// v3
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// v3 paging metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Link>,
}

/// v3 list-response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<R> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default = "Vec::new")]
    pub resources: Vec<R>,
}

impl<R> Page for PaginatedResponse<R> {
    type Item = R;

    fn into_parts(self) -> (Vec<R>, Option<String>) {
        let next = self.pagination.and_then(|p| p.next).map(|link| link.href);
        (self.resources, next)
    }
}

/// v3 paging parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationParametersV3 {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Field to order by; prefix with `-` for descending
    pub order_by: Option<String>,
}

impl QueryParameters for PaginationParametersV3 {
    fn append_query(&self, uri: &mut UriBuilder) {
        uri.query_opt("page", self.page)
            .query_opt("per_page", self.per_page)
            .query_opt("order_by", self.order_by.as_deref());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipData {
    pub guid: String,
}

/// v3 to-one relationship
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToOneRelationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RelationshipData>,
}

impl ToOneRelationship {
    pub fn to(guid: impl Into<String>) -> Self {
        Self {
            data: Some(RelationshipData { guid: guid.into() }),
        }
    }

    pub fn guid(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.guid.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;

    #[test]
    fn test_v2_envelope_parts() {
        let page: ListResponse<serde_json::Value> = serde_json::from_value(json!({
            "total_results": 3,
            "total_pages": 2,
            "prev_url": null,
            "next_url": "/v2/service_keys?page=2",
            "resources": [{"a": 1}, {"a": 2}]
        }))
        .unwrap();

        assert_eq!(page.total_pages, Some(2));
        assert!(page.prev_url.is_none());
        let (items, next) = page.into_parts();
        assert_eq!(items.len(), 2);
        assert_eq!(next.as_deref(), Some("/v2/service_keys?page=2"));
    }

    #[test]
    fn test_v3_envelope_without_next() {
        let page: PaginatedResponse<serde_json::Value> = serde_json::from_value(json!({
            "pagination": {
                "total_results": 1,
                "total_pages": 1,
                "first": {"href": "https://api.example.com/v3/service_bindings?page=1"},
                "last": {"href": "https://api.example.com/v3/service_bindings?page=1"},
                "next": null,
                "previous": null
            },
            "resources": [{"guid": "x"}]
        }))
        .unwrap();

        let (items, next) = page.into_parts();
        assert_eq!(items.len(), 1);
        assert!(next.is_none());
    }

    #[test]
    fn test_paging_parameters() {
        let mut uri = UriBuilder::new(Url::parse("https://api.example.com/v2").unwrap());
        PaginationParameters {
            page: Some(3),
            results_per_page: Some(50),
            order_direction: Some(OrderDirection::Desc),
        }
        .append_query(&mut uri);
        assert_eq!(
            uri.build().query(),
            Some("page=3&results-per-page=50&order-direction=desc")
        );

        let mut uri = UriBuilder::new(Url::parse("https://api.example.com/v3").unwrap());
        PaginationParametersV3 {
            per_page: Some(10),
            order_by: Some("-created_at".into()),
            ..Default::default()
        }
        .append_query(&mut uri);
        assert_eq!(uri.build().query(), Some("per_page=10&order_by=-created_at"));
    }

    #[test]
    fn test_metadata_renames_guid() {
        let metadata: Metadata = serde_json::from_value(json!({
            "guid": "abc",
            "url": "/v2/service_keys/abc",
            "created_at": "2015-07-27T22:43:22Z"
        }))
        .unwrap();
        assert_eq!(metadata.id.as_deref(), Some("abc"));
        assert!(metadata.updated_at.is_none());
    }
}
