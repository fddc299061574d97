//! Route table and handlers.
//!
//! Every handler is a thin shim: parse path params, call the facade,
//! render the outcome. Status semantics follow the API's original
//! consumers' expectations: always JSON, always 200, errors as
//! `{"error": "<message>"}` bodies.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, Local};
use serde::Serialize;
use serde_json::json;

use calora_core::{CoreError, HeatingService};

type SharedService = Arc<HeatingService>;

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/boiler-consumption/:year/:month", get(boiler_consumption))
        .route(
            "/boiler-consumption-current-month",
            get(boiler_consumption_current_month),
        )
        .route("/zones", get(zones))
        .route("/zone-info/:index", get(zone_info))
        .route("/zone-update/:index/:mode", get(zone_update))
        .route("/zone-set-temp/:index/:temp", get(zone_set_temp))
        .route("/get-water-pressure", get(water_pressure))
        .route("/get-system-info", get(system_info))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(service)
}

// ── Handlers ────────────────────────────────────────────────────────

async fn boiler_consumption(
    State(service): State<SharedService>,
    Path((year, month)): Path<(i32, u32)>,
) -> Response {
    reply(service.gas_consumption(month, year).await)
}

async fn boiler_consumption_current_month(State(service): State<SharedService>) -> Response {
    let now = Local::now();
    reply(service.gas_consumption(now.month(), now.year()).await)
}

async fn zones(State(service): State<SharedService>) -> Response {
    reply(service.zones().await)
}

async fn zone_info(
    State(service): State<SharedService>,
    Path(index): Path<usize>,
) -> Response {
    reply(service.zone_info(index).await)
}

async fn zone_update(
    State(service): State<SharedService>,
    Path((index, mode)): Path<(usize, String)>,
) -> Response {
    reply(service.update_zone_mode(index, &mode).await)
}

async fn zone_set_temp(
    State(service): State<SharedService>,
    Path((index, temp)): Path<(usize, f64)>,
) -> Response {
    reply(service.update_zone_temperature(index, temp).await)
}

async fn water_pressure(State(service): State<SharedService>) -> Response {
    reply(service.water_pressure().await)
}

async fn system_info(State(service): State<SharedService>) -> Response {
    reply(service.system_info().await)
}

// ── Reply mapping ───────────────────────────────────────────────────

/// Render a facade outcome as the wire shape consumers rely on.
fn reply<T: Serialize>(result: Result<T, CoreError>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(e) => Json(json!({ "error": e.to_string() })).into_response(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path as mock_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use calora_api::CloudClient;
    use calora_core::VendorCredentials;

    async fn setup() -> (MockServer, Router) {
        let server = MockServer::start().await;
        let identity = Url::parse(&format!("{}/auth/", server.uri())).unwrap();
        let api = Url::parse(&format!("{}/api/v1/", server.uri())).unwrap();
        let client = CloudClient::with_endpoints(
            reqwest::Client::new(),
            identity,
            api,
            "vaillant",
            "germany",
        );
        let credentials = VendorCredentials {
            username: "user@example.com".into(),
            password: "pw".to_string().into(),
            brand: "vaillant".into(),
            country: "germany".into(),
        };
        let service = Arc::new(HeatingService::with_client(client, credentials));
        (server, router(service))
    }

    async fn mount_happy_path(server: &MockServer) {
        Mock::given(method("POST"))
            .and(mock_path(
                "/auth/realms/vaillant-germany-b2c/protocol/openid-connect/token",
            ))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at",
                "refresh_token": "rt",
                "expires_in": 600
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(mock_path("/api/v1/systems"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "systemId": "sys-1",
                "waterPressure": 1.7,
                "devices": [],
                "zones": [{
                    "index": 0,
                    "name": "Living room",
                    "currentRoomTemperature": 20.5,
                    "desiredRoomTemperatureSetpoint": 21.0,
                    "heating": { "operationModeHeating": "MANUAL" }
                }]
            }])))
            .mount(server)
            .await;
    }

    async fn get_json(app: Router, uri: &str) -> (u16, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn zones_route_returns_zone_list() {
        let (server, app) = setup().await;
        mount_happy_path(&server).await;

        let (status, body) = get_json(app, "/zones").await;

        assert_eq!(status, 200);
        assert_eq!(body, json!({ "zones": [{ "index": 0, "name": "Living room" }] }));
    }

    #[tokio::test]
    async fn invalid_mode_renders_error_body_with_ok_status() {
        let (server, app) = setup().await;
        mount_happy_path(&server).await;

        let (status, body) = get_json(app, "/zone-update/0/bogus").await;

        assert_eq!(status, 200);
        assert_eq!(body, json!({ "error": "Invalid mode" }));
    }

    #[tokio::test]
    async fn zone_out_of_range_renders_not_found_body() {
        let (server, app) = setup().await;
        mount_happy_path(&server).await;

        let (status, body) = get_json(app, "/zone-info/7").await;

        assert_eq!(status, 200);
        assert_eq!(body, json!({ "error": "Zone not found" }));
    }

    #[tokio::test]
    async fn set_temp_route_acknowledges() {
        let (server, app) = setup().await;
        mount_happy_path(&server).await;

        Mock::given(method("PATCH"))
            .and(mock_path("/api/v1/systems/sys-1/tli/zones/0/manual-mode-setpoint"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = get_json(app, "/zone-set-temp/0/21.5").await;

        assert_eq!(status, 200);
        assert_eq!(
            body,
            json!({ "message": "Temperature for zone Living room set to 21.5°C" })
        );
    }

    #[tokio::test]
    async fn favicon_is_empty_no_content() {
        let (_server, app) = setup().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/favicon.ico")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
