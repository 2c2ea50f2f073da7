//! Wire-format tests against recorded Cloud Controller payloads

use cfclient::cf::{ConnectionConfig, ConnectionContext, StaticTokenProvider};
use cfclient::resource::service_bindings::{ServiceBindingResource, ServiceBindingType};
use cfclient::resource::service_keys::{CreateServiceKeyRequest, CreateServiceKeyResponse};
use cfclient::CloudFoundryClient;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREATE_KEY_REQUEST: &str = include_str!("fixtures/v2/service_keys/POST_request.json");
const CREATE_KEY_RESPONSE: &str = include_str!("fixtures/v2/service_keys/POST_response.json");
const GET_BINDING_RESPONSE: &str = include_str!("fixtures/v3/service_bindings/GET_response.json");

fn fixture(raw: &str) -> Value {
    serde_json::from_str(raw).expect("fixture should be valid JSON")
}

fn create_key_request() -> CreateServiceKeyRequest {
    CreateServiceKeyRequest::new("name-960", "132944c8-c31d-4bb8-9155-ae4e2ebe1a0c")
}

#[test]
fn test_create_service_key_request_matches_fixture() {
    let body = serde_json::to_value(create_key_request()).unwrap();
    assert_eq!(body, fixture(CREATE_KEY_REQUEST));
}

#[test]
fn test_create_service_key_response_keeps_every_field() {
    let response: CreateServiceKeyResponse = serde_json::from_str(CREATE_KEY_RESPONSE).unwrap();

    let metadata = response.metadata.as_ref().unwrap();
    assert_eq!(metadata.id.as_deref(), Some("79aa4b11-99f3-484b-adfc-a63fa818c4d1"));
    assert_eq!(metadata.created_at.as_deref(), Some("2015-07-27T22:43:22Z"));
    assert_eq!(metadata.updated_at, None);

    let entity = response.entity.as_ref().unwrap();
    assert_eq!(entity.name.as_deref(), Some("name-960"));
    assert_eq!(
        entity.credentials.as_ref().and_then(|c| c.get("creds-key-392")),
        Some(&json!("creds-val-392"))
    );

    // Absent fields are omitted on the way out; null is the only difference
    let mut expected = fixture(CREATE_KEY_RESPONSE);
    expected["metadata"]
        .as_object_mut()
        .unwrap()
        .remove("updated_at");
    assert_eq!(serde_json::to_value(&response).unwrap(), expected);
}

#[test]
fn test_service_binding_keeps_every_field() {
    let binding: ServiceBindingResource = serde_json::from_str(GET_BINDING_RESPONSE).unwrap();

    assert_eq!(binding.id.as_deref(), Some("dde5ad2a-d8f4-44dc-a56f-0452d744f1c3"));
    assert_eq!(binding.kind, Some(ServiceBindingType::App));
    assert_eq!(
        binding.last_operation.as_ref().and_then(|op| op.state.as_deref()),
        Some("succeeded")
    );
    let relationships = binding.relationships.as_ref().unwrap();
    assert_eq!(
        relationships.service_instance.as_ref().and_then(|r| r.guid()),
        Some("8bfe4c1b-9e18-45b1-83be-124163f31f9e")
    );
    assert_eq!(binding.links.len(), 4);

    assert_eq!(serde_json::to_value(&binding).unwrap(), fixture(GET_BINDING_RESPONSE));
}

#[tokio::test]
async fn test_create_service_key_over_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": {"cloud_controller_v2": {"href": format!("{}/v2", server.uri())}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/service_keys"))
        .and(body_json(fixture(CREATE_KEY_REQUEST)))
        .respond_with(ResponseTemplate::new(201).set_body_raw(CREATE_KEY_RESPONSE, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let connection = ConnectionContext::new(ConnectionConfig::new(&server.uri()).unwrap()).unwrap();
    let client = CloudFoundryClient::new(connection, StaticTokenProvider::new("test-token"));

    let created = client.service_keys().create(&create_key_request()).await.unwrap();

    let expected: CreateServiceKeyResponse = serde_json::from_str(CREATE_KEY_RESPONSE).unwrap();
    assert_eq!(created, expected);
}
