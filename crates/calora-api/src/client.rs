// Vendor cloud HTTP client
//
// Wraps `reqwest::Client` with realm/API URL construction, bearer-token
// injection, and response decoding. Auth flows (login/refresh/logout)
// are implemented as inherent methods in `auth.rs` to keep this module
// focused on transport mechanics.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::AuthSession;
use crate::error::Error;
use crate::models::{BucketResolution, DeviceBuckets, System, ZoneOperatingMode};
use crate::transport::TransportConfig;

/// Production identity service root (Keycloak realms live under it).
const DEFAULT_IDENTITY_BASE: &str = "https://identity.vaillant-group.com/auth/";

/// Production end-user app API root.
const DEFAULT_API_BASE: &str =
    "https://api.vaillant-group.com/service-connected-control/end-user-app-api/v1/";

/// Query timestamps use second precision; the vendor rejects offsets.
const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Raw HTTP client for the vendor's identity realm and end-user API.
///
/// Holds no session state: every API call takes the [`AuthSession`] to
/// authenticate with, so callers control token lifecycle. One instance
/// owns the process's single vendor connection pool.
pub struct CloudClient {
    http: reqwest::Client,
    identity_base: Url,
    api_base: Url,
    /// Realm name, `{brand}-{country}-b2c`.
    realm: String,
}

impl CloudClient {
    /// Create a client against the production endpoints.
    pub fn new(brand: &str, country: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            identity_base: Url::parse(DEFAULT_IDENTITY_BASE)?,
            api_base: Url::parse(DEFAULT_API_BASE)?,
            realm: format!("{brand}-{country}-b2c"),
        })
    }

    /// Create a client with explicit endpoints and a pre-built
    /// `reqwest::Client`.
    ///
    /// Use this to point the client at a mock server in tests.
    pub fn with_endpoints(
        http: reqwest::Client,
        identity_base: Url,
        api_base: Url,
        brand: &str,
        country: &str,
    ) -> Self {
        Self {
            http,
            identity_base: normalize(identity_base),
            api_base: normalize(api_base),
            realm: format!("{brand}-{country}-b2c"),
        }
    }

    /// The underlying HTTP client (for auth flows).
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    pub(crate) fn token_url(&self) -> Result<Url, Error> {
        self.realm_url("protocol/openid-connect/token")
    }

    pub(crate) fn logout_url(&self) -> Result<Url, Error> {
        self.realm_url("protocol/openid-connect/logout")
    }

    fn realm_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self
            .identity_base
            .join(&format!("realms/{}/", self.realm))?
            .join(path)?)
    }

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.api_base.join(path)?)
    }

    // ── End-user API endpoints ───────────────────────────────────────

    /// Fetch all systems visible to the account.
    pub async fn get_systems(&self, session: &AuthSession) -> Result<Vec<System>, Error> {
        self.get(session, "systems", &[]).await
    }

    /// Fetch aggregated measurement buckets for one device.
    ///
    /// The window is `[start, end]`, second precision, and the response
    /// carries one series per (operation mode, energy type) pair; the
    /// caller filters for the dimensions it wants.
    pub async fn get_device_buckets(
        &self,
        session: &AuthSession,
        system_id: &str,
        device_uuid: &str,
        resolution: BucketResolution,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<DeviceBuckets>, Error> {
        let path = format!("emf/v2/{system_id}/devices/{device_uuid}/buckets");
        let params = [
            ("resolution", resolution.to_string()),
            ("startDate", start.format(QUERY_TIME_FORMAT).to_string()),
            ("endDate", end.format(QUERY_TIME_FORMAT).to_string()),
        ];
        self.get(session, &path, &params).await
    }

    /// Change a zone's heating operating mode.
    pub async fn set_zone_heating_mode(
        &self,
        session: &AuthSession,
        system_id: &str,
        zone_index: usize,
        mode: ZoneOperatingMode,
    ) -> Result<(), Error> {
        let path = format!("systems/{system_id}/tli/zones/{zone_index}/heating-operation-mode");
        self.patch(session, &path, &json!({ "operationMode": mode }))
            .await
    }

    /// Set a zone's manual-mode heating setpoint in °C.
    pub async fn set_zone_manual_setpoint(
        &self,
        session: &AuthSession,
        system_id: &str,
        zone_index: usize,
        setpoint: f64,
    ) -> Result<(), Error> {
        let path = format!("systems/{system_id}/tli/zones/{zone_index}/manual-mode-setpoint");
        self.patch(session, &path, &json!({ "setpoint": setpoint, "type": "HEATING" }))
            .await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        session: &AuthSession,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!(%url, "GET");

        let mut req = self.http.get(url).header("Authorization", session.bearer());
        if !params.is_empty() {
            req = req.query(params);
        }
        let resp = req.send().await?;

        Self::handle_response(resp).await
    }

    async fn patch(
        &self,
        session: &AuthSession,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        let url = self.api_url(path)?;
        debug!(%url, "PATCH");

        let resp = self
            .http
            .patch(url)
            .header("Authorization", session.bearer())
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "access token rejected (HTTP 401)".into(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }
        Ok(())
    }

    /// Check status, then decode the JSON body.
    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "access token rejected (HTTP 401)".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        Self::decode(resp).await
    }

    /// Decode a success response, keeping the raw body on failure.
    pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

/// Ensure a trailing slash so `Url::join` treats the last segment as a
/// directory.
fn normalize(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// First 200 characters of an error body, for log/error messages.
fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
