// ── Query facade ──
//
// The service object the gateway talks to. Owns the vendor client, the
// session manager, and the TTL cache. Every read follows the same
// template: cache check → ensure authenticated → fetch → shape → cache
// → return. Writes always go live and never touch the cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use calora_api::models::{BucketResolution, System, ZoneOperatingMode};
use calora_api::{AuthSession, CloudClient, TransportConfig};

use crate::cache::{TtlCache, ttl};
use crate::config::{ServiceConfig, VendorCredentials};
use crate::error::CoreError;
use crate::model::{
    FlowTemperature, GasConsumption, SystemSnapshot, UpdateAck, WaterPressure, ZoneDetail,
    ZoneList, ZoneSummary,
};
use crate::session::SessionManager;

/// Bucket dimensions the consumption query filters for.
const BOILER_DEVICE_TYPE: &str = "BOILER";
const HOT_WATER_MODE: &str = "DOMESTIC_HOT_WATER";
const PRIMARY_ENERGY: &str = "CONSUMED_PRIMARY_ENERGY";

/// Raw bucket values are in 10^-4 m³.
const CUBIC_METER_DIVISOR: f64 = 10_000.0;

/// Authenticated, TTL-cached facade over the vendor cloud.
///
/// One instance per process; the explicit context object that replaces
/// shared mutable globals. Cheap operations when caches are warm, one
/// vendor round-trip per cold read.
pub struct HeatingService {
    client: Arc<CloudClient>,
    session: SessionManager,
    cache: TtlCache,
}

impl HeatingService {
    /// Build a service against the production vendor endpoints.
    pub fn new(config: ServiceConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let client = CloudClient::new(
            &config.credentials.brand,
            &config.credentials.country,
            &transport,
        )?;
        Ok(Self::with_client(client, config.credentials))
    }

    /// Build a service around an existing client (tests point this at a
    /// mock server).
    pub fn with_client(client: CloudClient, credentials: VendorCredentials) -> Self {
        let client = Arc::new(client);
        Self {
            session: SessionManager::new(Arc::clone(&client), credentials),
            client,
            cache: TtlCache::new(),
        }
    }

    /// Access the underlying cache.
    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// Close the vendor session. Called once, on process shutdown.
    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }

    // ── Read operations ──────────────────────────────────────────────

    /// Boiler gas consumption for one calendar month, in m³.
    pub async fn gas_consumption(
        &self,
        month: u32,
        year: i32,
    ) -> Result<GasConsumption, CoreError> {
        let key = format!("gas-consumption:{year}-{month:02}");
        if let Some(hit) = self.cache_lookup::<GasConsumption>(&key) {
            return Ok(hit);
        }

        let (start, end) = month_window(year, month)
            .ok_or_else(|| CoreError::Internal(format!("invalid month: {month}")))?;

        debug!(year, month, "fetching gas consumption");
        let session = self.session.ensure_authenticated().await?;
        let system = self
            .first_system(&session)
            .await?
            .ok_or(CoreError::NoBoilerData)?;

        let boiler = system
            .devices
            .iter()
            .find(|d| d.device_type == BOILER_DEVICE_TYPE)
            .ok_or(CoreError::NoBoilerData)?;

        let series = self
            .client
            .get_device_buckets(
                &session,
                &system.system_id,
                &boiler.device_uuid,
                BucketResolution::Month,
                start,
                end,
            )
            .await?;

        let bucket = series
            .iter()
            .find(|s| s.operation_mode == HOT_WATER_MODE && s.energy_type == PRIMARY_ENERGY)
            .and_then(|s| s.data.first())
            .ok_or(CoreError::NoBoilerData)?;

        let result = GasConsumption {
            consumption_m3: bucket.value / CUBIC_METER_DIVISOR,
        };
        info!(consumption_m3 = result.consumption_m3, "gas consumption fetched");

        self.cache_store(&key, &result, ttl::GAS_CONSUMPTION);
        Ok(result)
    }

    /// Current system water pressure.
    pub async fn water_pressure(&self) -> Result<WaterPressure, CoreError> {
        let key = "water-pressure";
        if let Some(hit) = self.cache_lookup::<WaterPressure>(key) {
            return Ok(hit);
        }

        debug!("fetching water pressure");
        let session = self.session.ensure_authenticated().await?;
        let system = self
            .first_system(&session)
            .await?
            .ok_or(CoreError::PressureUnavailable)?;

        let pressure = system
            .water_pressure
            .ok_or(CoreError::PressureUnavailable)?;

        let result = WaterPressure { pressure };
        self.cache_store(key, &result, ttl::WATER_PRESSURE);
        Ok(result)
    }

    /// All zones, in the vendor's native order.
    pub async fn zones(&self) -> Result<ZoneList, CoreError> {
        let key = "zones";
        if let Some(hit) = self.cache_lookup::<ZoneList>(key) {
            return Ok(hit);
        }

        debug!("fetching zones");
        let session = self.session.ensure_authenticated().await?;
        let system = self
            .first_system(&session)
            .await?
            .ok_or(CoreError::ZonesUnavailable)?;

        let result = ZoneList {
            zones: system
                .zones
                .iter()
                .enumerate()
                .map(|(index, zone)| ZoneSummary {
                    index,
                    name: zone.name.clone(),
                })
                .collect(),
        };

        self.cache_store(key, &result, ttl::ZONE_LIST);
        Ok(result)
    }

    /// Detail for one zone, addressed by positional index.
    pub async fn zone_info(&self, index: usize) -> Result<ZoneDetail, CoreError> {
        let key = format!("zone-info:{index}");
        if let Some(hit) = self.cache_lookup::<ZoneDetail>(&key) {
            return Ok(hit);
        }

        debug!(index, "fetching zone info");
        let session = self.session.ensure_authenticated().await?;
        let system = self
            .first_system(&session)
            .await?
            .ok_or(CoreError::ZoneNotFound)?;

        let zone = system.zones.get(index).ok_or(CoreError::ZoneNotFound)?;

        let result = ZoneDetail {
            index,
            name: zone.name.clone(),
            current_temperature: zone.current_room_temperature,
            desired_temperature: zone.desired_room_temperature_setpoint,
            heating_state: zone.heating.operation_mode_heating.clone(),
        };

        self.cache_store(&key, &result, ttl::ZONE_INFO);
        Ok(result)
    }

    /// Flow temperature of the circuit a zone draws from.
    ///
    /// "Zone not found" and "flow temperature unavailable" are distinct
    /// outcomes: the first means the index is out of range, the second
    /// that the zone exists but its circuit reports no reading.
    pub async fn zone_flow_temperature(&self, index: usize) -> Result<FlowTemperature, CoreError> {
        let key = format!("flow-temperature:{index}");
        if let Some(hit) = self.cache_lookup::<FlowTemperature>(&key) {
            return Ok(hit);
        }

        debug!(index, "fetching zone flow temperature");
        let session = self.session.ensure_authenticated().await?;
        let system = self
            .first_system(&session)
            .await?
            .ok_or(CoreError::ZoneNotFound)?;

        let zone = system.zones.get(index).ok_or(CoreError::ZoneNotFound)?;

        let flow_temperature = zone
            .associated_circuit
            .as_ref()
            .and_then(|c| c.current_circuit_flow_temperature)
            .ok_or(CoreError::FlowTemperatureUnavailable)?;

        let result = FlowTemperature { flow_temperature };
        self.cache_store(&key, &result, ttl::FLOW_TEMPERATURE);
        Ok(result)
    }

    /// Full-system snapshot with the versioned projection schema.
    pub async fn system_info(&self) -> Result<SystemSnapshot, CoreError> {
        let key = "system-info";
        if let Some(hit) = self.cache_lookup::<SystemSnapshot>(key) {
            return Ok(hit);
        }

        debug!("fetching system info");
        let session = self.session.ensure_authenticated().await?;
        let system = self
            .first_system(&session)
            .await?
            .ok_or(CoreError::NoSystem)?;

        let result = SystemSnapshot::from(&system);
        self.cache_store(key, &result, ttl::SYSTEM_INFO);
        Ok(result)
    }

    // ── Write operations (never cached) ──────────────────────────────

    /// Change a zone's heating operating mode.
    ///
    /// The mode string is validated before anything goes over the wire;
    /// an unrecognized mode costs no vendor call. Cached read results
    /// are deliberately left alone -- stale reads until natural TTL
    /// expiry are accepted.
    pub async fn update_zone_mode(&self, index: usize, mode: &str) -> Result<UpdateAck, CoreError> {
        let Ok(parsed) = mode.parse::<ZoneOperatingMode>() else {
            warn!(mode, "invalid mode");
            return Err(CoreError::InvalidMode);
        };

        debug!(index, mode, "updating zone mode");
        let session = self.session.ensure_authenticated().await?;
        let system = self
            .first_system(&session)
            .await?
            .ok_or(CoreError::ZoneNotFound)?;

        let zone = system.zones.get(index).ok_or(CoreError::ZoneNotFound)?;

        if let Err(e) = self
            .client
            .set_zone_heating_mode(&session, &system.system_id, zone.index, parsed)
            .await
        {
            warn!(zone = %zone.name, error = %e, "mode update failed");
            return Err(CoreError::ModeUpdateFailed {
                zone: zone.name.clone(),
                cause: e.to_string(),
            });
        }

        debug!(zone = %zone.name, mode, "zone mode updated");
        Ok(UpdateAck {
            message: format!("Zone {} mode set to {mode}", zone.name),
        })
    }

    /// Set a zone's manual heating setpoint in °C.
    pub async fn update_zone_temperature(
        &self,
        index: usize,
        temperature: f64,
    ) -> Result<UpdateAck, CoreError> {
        debug!(index, temperature, "updating zone temperature");
        let session = self.session.ensure_authenticated().await?;
        let system = self
            .first_system(&session)
            .await?
            .ok_or(CoreError::ZoneNotFound)?;

        let zone = system.zones.get(index).ok_or(CoreError::ZoneNotFound)?;

        if let Err(e) = self
            .client
            .set_zone_manual_setpoint(&session, &system.system_id, zone.index, temperature)
            .await
        {
            warn!(zone = %zone.name, error = %e, "setpoint update failed");
            return Err(CoreError::SetpointUpdateFailed {
                zone: zone.name.clone(),
                cause: e.to_string(),
            });
        }

        debug!(zone = %zone.name, temperature, "zone setpoint updated");
        Ok(UpdateAck {
            // {:?} keeps the trailing .0 on whole setpoints.
            message: format!("Temperature for zone {} set to {temperature:?}°C", zone.name),
        })
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// The single system this process operates on.
    ///
    /// The vendor can return several; only the first is ever consulted.
    async fn first_system(&self, session: &AuthSession) -> Result<Option<System>, CoreError> {
        let mut systems = self.client.get_systems(session).await?;
        if systems.is_empty() {
            return Ok(None);
        }
        Ok(Some(systems.swap_remove(0)))
    }

    fn cache_lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.cache.get(key)?;
        match serde_json::from_value(value) {
            Ok(hit) => {
                debug!(key, "cache hit");
                Some(hit)
            }
            Err(e) => {
                // Shape changed between versions; treat as a miss.
                warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    fn cache_store<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(json) => self.cache.set(key, json, ttl),
            Err(e) => warn!(key, error = %e, "cache store skipped"),
        }
    }
}

/// Calendar-month window `[first instant, last instant]`.
///
/// December rolls the end boundary into January of the following year.
fn month_window(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.and_hms_opt(0, 0, 0)?
        - chrono::Duration::seconds(1);

    Some((start, end))
}
