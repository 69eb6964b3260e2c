//! Tests for the imeicheck.net client against a mocked API
//!
//! Run with: cargo test --test lookup_client_test

use std::time::Duration;

use imeibot::core::config::LookupConfig;
use imeibot::core::Imei;
use imeibot::lookup::{ImeiCheckClient, LookupClient, LookupError};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ImeiCheckClient {
    let config = LookupConfig {
        api_token: SecretString::from("test-token".to_string()),
        base_url: Url::parse(&server.uri()).unwrap(),
        service_id: 12,
        timeout: Duration::from_secs(5),
    };
    ImeiCheckClient::new(&config).unwrap()
}

fn imei() -> Imei {
    Imei::parse("356735111052198").unwrap()
}

#[tokio::test]
async fn test_check_posts_device_and_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/checks"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept-Language", "en"))
        .and(body_json(json!({ "deviceId": "356735111052198", "serviceId": 12 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "abc",
            "status": "successful",
            "properties": { "deviceName": "iPhone 11" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).check(&imei()).await.unwrap();

    assert_eq!(
        result,
        "{\"id\":\"abc\"\n\"status\":\"successful\"\n\"properties\":{\"deviceName\":\"iPhone 11\"}}"
    );
}

#[tokio::test]
async fn test_check_maps_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/checks"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthenticated."))
        .mount(&server)
        .await;

    let err = client_for(&server).check(&imei()).await.unwrap_err();

    match err {
        LookupError::Status { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(body, "Unauthenticated.");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_check_returns_non_json_body_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/checks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("queued"))
        .mount(&server)
        .await;

    let result = client_for(&server).check(&imei()).await.unwrap();

    assert_eq!(result, "queued");
}

#[tokio::test]
async fn test_list_services() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/services"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 12, "title": "Apple Basic Info", "price": "0.04" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let services = client_for(&server).list_services().await.unwrap();

    assert_eq!(services[0]["id"], 12);
    assert_eq!(services[0]["title"], "Apple Basic Info");
}
