// ── Wire models for the end-user app API ──
//
// Field names mirror the vendor's camelCase JSON. Everything the facade
// does not consume stays out of these structs; unknown fields are
// ignored by serde, so vendor schema additions don't break decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One physical installation: devices, zones, and live readings.
///
/// The vendor can report several systems per account; the facade only
/// ever consults the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    pub system_id: String,
    /// Current water pressure in bar, when the system reports one.
    pub water_pressure: Option<f64>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

/// A physical device within a system (boiler, heat pump, control unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_uuid: String,
    /// Vendor type tag, e.g. "BOILER" or "CONTROL".
    pub device_type: String,
    pub name: Option<String>,
}

/// A controllable heating area, addressed by positional index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub index: usize,
    pub name: String,
    pub current_room_temperature: Option<f64>,
    pub desired_room_temperature_setpoint: Option<f64>,
    #[serde(default)]
    pub heating: ZoneHeating,
    pub associated_circuit: Option<Circuit>,
}

/// Heating sub-state of a zone.
///
/// `operation_mode_heating` is kept as the raw vendor string -- the
/// vendor ships mode values beyond the three the facade can set, and
/// reads must not fail on them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneHeating {
    #[serde(default)]
    pub operation_mode_heating: Option<String>,
}

/// The hydraulic circuit a zone draws from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circuit {
    pub current_circuit_flow_temperature: Option<f64>,
}

/// One measurement series for a device: a bucket list plus the
/// dimensions it was aggregated under.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBuckets {
    pub operation_mode: String,
    pub energy_type: String,
    #[serde(default)]
    pub data: Vec<Bucket>,
}

/// An aggregated measurement over a fixed time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub value: f64,
}

/// Zone heating operating modes the facade can set.
///
/// Parses case-insensitively from route strings ("manual",
/// "TIME_CONTROLLED", ...) and serializes to the vendor's
/// SCREAMING_SNAKE_CASE on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneOperatingMode {
    Manual,
    Off,
    TimeControlled,
}

/// Aggregation resolution for bucket queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum BucketResolution {
    Hour,
    Day,
    Month,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn zone_operating_mode_parses_case_insensitively() {
        assert_eq!("manual".parse::<ZoneOperatingMode>().unwrap(), ZoneOperatingMode::Manual);
        assert_eq!("OFF".parse::<ZoneOperatingMode>().unwrap(), ZoneOperatingMode::Off);
        assert_eq!(
            "Time_Controlled".parse::<ZoneOperatingMode>().unwrap(),
            ZoneOperatingMode::TimeControlled
        );
        assert!("bogus".parse::<ZoneOperatingMode>().is_err());
    }

    #[test]
    fn zone_operating_mode_wire_name() {
        assert_eq!(ZoneOperatingMode::TimeControlled.to_string(), "TIME_CONTROLLED");
        assert_eq!(BucketResolution::Month.to_string(), "MONTH");
    }

    #[test]
    fn system_decodes_with_missing_collections() {
        let system: System = serde_json::from_str(
            r#"{"systemId": "sys-1", "waterPressure": 1.7}"#,
        )
        .unwrap();
        assert_eq!(system.system_id, "sys-1");
        assert!(system.devices.is_empty());
        assert!(system.zones.is_empty());
    }
}
