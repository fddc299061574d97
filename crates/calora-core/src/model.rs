// ── Facade result shapes ──
//
// Every query operation returns one of these, and the gateway
// serializes them verbatim. They are the public schema of the service:
// a deliberate, fixed projection of the vendor's models, so vendor
// schema drift shows up here as a compile-time change instead of a
// silent output change.

use serde::{Deserialize, Serialize};

use calora_api::models::System;

/// Monthly boiler gas consumption, in cubic meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasConsumption {
    pub consumption_m3: f64,
}

/// Current system water pressure, in bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterPressure {
    pub pressure: f64,
}

/// One row of the zone list: positional index plus display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub index: usize,
    pub name: String,
}

/// Zones in the vendor's native order (0-based).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneList {
    pub zones: Vec<ZoneSummary>,
}

/// Detail view of a single zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDetail {
    pub index: usize,
    pub name: String,
    pub current_temperature: Option<f64>,
    pub desired_temperature: Option<f64>,
    /// Raw vendor heating mode string, e.g. "TIME_CONTROLLED".
    pub heating_state: Option<String>,
}

/// Current flow temperature of a zone's circuit, in °C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTemperature {
    pub flow_temperature: f64,
}

/// Acknowledgement for a successful write operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAck {
    pub message: String,
}

// ── System snapshot projection ───────────────────────────────────────

/// Schema version of [`SystemSnapshot`]. Bump on any field change.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Full-system view with an explicit, versioned field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub schema_version: u32,
    pub system_id: String,
    pub water_pressure: Option<f64>,
    pub devices: Vec<DeviceSnapshot>,
    pub zones: Vec<ZoneSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub device_uuid: String,
    pub device_type: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub index: usize,
    pub name: String,
    pub current_temperature: Option<f64>,
    pub desired_temperature: Option<f64>,
    pub heating_state: Option<String>,
    pub flow_temperature: Option<f64>,
}

impl From<&System> for SystemSnapshot {
    fn from(system: &System) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            system_id: system.system_id.clone(),
            water_pressure: system.water_pressure,
            devices: system
                .devices
                .iter()
                .map(|d| DeviceSnapshot {
                    device_uuid: d.device_uuid.clone(),
                    device_type: d.device_type.clone(),
                    name: d.name.clone(),
                })
                .collect(),
            zones: system
                .zones
                .iter()
                .enumerate()
                .map(|(index, z)| ZoneSnapshot {
                    index,
                    name: z.name.clone(),
                    current_temperature: z.current_room_temperature,
                    desired_temperature: z.desired_room_temperature_setpoint,
                    heating_state: z.heating.operation_mode_heating.clone(),
                    flow_temperature: z
                        .associated_circuit
                        .as_ref()
                        .and_then(|c| c.current_circuit_flow_temperature),
                })
                .collect(),
        }
    }
}
