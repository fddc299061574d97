#![allow(clippy::unwrap_used, clippy::float_cmp)]
// Integration tests for `CloudClient` using wiremock.

use chrono::NaiveDate;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use calora_api::models::{BucketResolution, ZoneOperatingMode};
use calora_api::{AuthSession, CloudClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CloudClient) {
    let server = MockServer::start().await;
    let identity = Url::parse(&format!("{}/auth/", server.uri())).unwrap();
    let api = Url::parse(&format!("{}/api/v1/", server.uri())).unwrap();
    let client =
        CloudClient::with_endpoints(reqwest::Client::new(), identity, api, "vaillant", "germany");
    (server, client)
}

const TOKEN_PATH: &str = "/auth/realms/vaillant-germany-b2c/protocol/openid-connect/token";

fn token_body(expires_in: i64) -> serde_json::Value {
    json!({
        "access_token": "at-1",
        "refresh_token": "rt-1",
        "expires_in": expires_in,
        "token_type": "Bearer"
    })
}

async fn login(server: &MockServer, client: &CloudClient) -> AuthSession {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(600)))
        .mount(server)
        .await;

    let secret: secrecy::SecretString = "pw".to_string().into();
    client.login("user@example.com", &secret).await.unwrap()
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_id=myvaillant"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(600)))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "pw".to_string().into();
    let session = client.login("user@example.com", &secret).await.unwrap();

    assert!(!session.is_expired());
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid user credentials"
        })))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let result = client.login("user@example.com", &secret).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(
                message.contains("401"),
                "expected status in message, got: {message}"
            );
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_refresh_rotates_session() {
    let (server, client) = setup().await;
    let session = login(&server, &client).await;

    server.reset().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-2",
            "refresh_token": "rt-2",
            "expires_in": 600
        })))
        .mount(&server)
        .await;

    let refreshed = client.refresh(&session).await.unwrap();
    assert!(refreshed.expires_at >= session.expires_at);
}

#[tokio::test]
async fn test_refresh_refused() {
    let (server, client) = setup().await;
    let session = login(&server, &client).await;

    server.reset().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let result = client.refresh(&session).await;
    assert!(
        matches!(result, Err(Error::RefreshRefused { .. })),
        "expected RefreshRefused, got: {result:?}"
    );
}

// ── Systems tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_systems() {
    let (server, client) = setup().await;
    let session = login(&server, &client).await;

    let body = json!([{
        "systemId": "sys-1",
        "waterPressure": 1.7,
        "devices": [
            { "deviceUuid": "dev-1", "deviceType": "BOILER", "name": "ecoTEC" }
        ],
        "zones": [{
            "index": 0,
            "name": "Living room",
            "currentRoomTemperature": 20.5,
            "desiredRoomTemperatureSetpoint": 21.0,
            "heating": { "operationModeHeating": "TIME_CONTROLLED" },
            "associatedCircuit": { "currentCircuitFlowTemperature": 44.5 }
        }]
    }]);

    Mock::given(method("GET"))
        .and(path("/api/v1/systems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let systems = client.get_systems(&session).await.unwrap();

    assert_eq!(systems.len(), 1);
    assert_eq!(systems[0].system_id, "sys-1");
    assert_eq!(systems[0].water_pressure, Some(1.7));
    assert_eq!(systems[0].devices[0].device_type, "BOILER");
    assert_eq!(systems[0].zones[0].name, "Living room");
    assert_eq!(
        systems[0].zones[0]
            .associated_circuit
            .as_ref()
            .unwrap()
            .current_circuit_flow_temperature,
        Some(44.5)
    );
}

#[tokio::test]
async fn test_get_systems_token_rejected() {
    let (server, client) = setup().await;
    let session = login(&server, &client).await;

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/systems"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get_systems(&session).await;
    assert!(
        matches!(result, Err(ref e) if e.is_auth_expired()),
        "expected auth-expired error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_get_systems_bad_payload() {
    let (server, client) = setup().await;
    let session = login(&server, &client).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/systems"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = client.get_systems(&session).await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => {
            assert!(body.contains("maintenance"));
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Bucket tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_device_buckets_query() {
    let (server, client) = setup().await;
    let session = login(&server, &client).await;

    let body = json!([{
        "operationMode": "DOMESTIC_HOT_WATER",
        "energyType": "CONSUMED_PRIMARY_ENERGY",
        "data": [{
            "startDate": "2024-03-01T00:00:00Z",
            "endDate": "2024-03-31T23:59:59Z",
            "value": 12345.0
        }]
    }]);

    Mock::given(method("GET"))
        .and(path("/api/v1/emf/v2/sys-1/devices/dev-1/buckets"))
        .and(query_param("resolution", "MONTH"))
        .and(query_param("startDate", "2024-03-01T00:00:00Z"))
        .and(query_param("endDate", "2024-03-31T23:59:59Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 31)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap();

    let buckets = client
        .get_device_buckets(&session, "sys-1", "dev-1", BucketResolution::Month, start, end)
        .await
        .unwrap();

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].operation_mode, "DOMESTIC_HOT_WATER");
    assert_eq!(buckets[0].data[0].value, 12345.0);
}

// ── Zone control tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_set_zone_heating_mode() {
    let (server, client) = setup().await;
    let session = login(&server, &client).await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/systems/sys-1/tli/zones/0/heating-operation-mode"))
        .and(body_json(json!({ "operationMode": "OFF" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_zone_heating_mode(&session, "sys-1", 0, ZoneOperatingMode::Off)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_zone_manual_setpoint_rejection() {
    let (server, client) = setup().await;
    let session = login(&server, &client).await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/systems/sys-1/tli/zones/1/manual-mode-setpoint"))
        .and(body_json(json!({ "setpoint": 21.5, "type": "HEATING" })))
        .respond_with(ResponseTemplate::new(409).set_body_string("zone busy"))
        .mount(&server)
        .await;

    let result = client
        .set_zone_manual_setpoint(&session, "sys-1", 1, 21.5)
        .await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 409);
            assert!(message.contains("zone busy"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
