//! Outbound wire payloads.
//!
//! Field names follow the backend's camelCase contract. Every field is
//! always present: failed sensor reads are substituted with the documented
//! sentinels (`0` / `false`) before a payload is built, never omitted.

use serde::Serialize;

/// One fused sensor report, published to `office/sensor/data` each
/// collection cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryPayload<'a> {
    pub device_id: &'a str,
    /// Illuminance in lux; sentinel 0 on read failure.
    pub light: f32,
    /// Degrees Celsius; sentinel 0 on read failure.
    pub temperature: f32,
    /// Relative humidity percent; sentinel 0 on read failure.
    pub humidity: f32,
    /// Hazard input; sentinel false on read failure.
    pub flame: bool,
    /// Boolean state of the RGB indicator.
    pub rgb_status: bool,
    /// Wrapping node clock, milliseconds.
    pub timestamp: u32,
}

/// Hazard notification, published to `office/alarm` on a rising edge only.
/// Alarms are never retracted; the backend owns de-escalation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmEvent<'a> {
    pub device_id: &'a str,
    pub alarm_type: &'a str,
    pub level: &'a str,
    pub message: &'a str,
    pub timestamp: u32,
}

/// Liveness heartbeat, published to `office/device/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload<'a> {
    pub device_id: &'a str,
    /// `"ONLINE"` when the station link is associated, else `"OFFLINE"`.
    pub status: &'a str,
    /// Dotted-quad address, or null while the link is down.
    pub ip: Option<String>,
    pub uptime_ms: u32,
    pub timestamp: u32,
}
