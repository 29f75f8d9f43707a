//! System configuration parameters.
//!
//! All tunable parameters for the office node. `NodeConfig` is fixed at
//! startup; the runtime-mutable intervals live in [`TuningParams`], which
//! only the config channel writes.

use serde::{Deserialize, Serialize};

// --- Broker topics (shared with the backend) ---
pub const TOPIC_SENSOR_DATA: &str = "office/sensor/data";
pub const TOPIC_CONTROL_CMD: &str = "office/control/cmd";
pub const TOPIC_ALARM: &str = "office/alarm";
pub const TOPIC_DEVICE_STATUS: &str = "office/device/status";
pub const TOPIC_CONFIG_UPDATE: &str = "office/config/update";

/// Core node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Identity ---
    /// Device identity; doubles as the broker client id and the filter
    /// applied to inbound control commands.
    pub device_id: String,

    // --- Network ---
    pub wifi_ssid: String,
    pub wifi_password: String,
    pub broker_host: String,
    pub broker_port: u16,
    pub keepalive_secs: u16,

    // --- Task periods (milliseconds) ---
    /// Hazard check period.
    pub fire_alarm_period_ms: u32,
    /// Device status heartbeat period.
    pub heartbeat_period_ms: u32,
    /// Default telemetry report period (runtime-overridable, see
    /// [`TuningParams`]).
    pub sensor_report_period_ms: u32,

    // --- Connectivity timing (milliseconds) ---
    /// Total budget for association + address acquisition.
    pub link_timeout_ms: u32,
    /// Poll granularity while waiting for the link.
    pub link_poll_ms: u32,
    /// Fixed backoff after a failed link attempt.
    pub link_retry_ms: u32,
    /// Fixed backoff after a failed session attempt.
    pub session_retry_ms: u32,

    // --- Control loop ---
    /// Idle sleep between loop iterations.
    pub idle_sleep_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            device_id: "W601_001".to_string(),

            wifi_ssid: "OfficeAP".to_string(),
            wifi_password: "changeme123".to_string(),
            broker_host: "192.168.8.75".to_string(),
            broker_port: 1883,
            keepalive_secs: 60,

            fire_alarm_period_ms: 1_000,
            heartbeat_period_ms: 30_000,
            sensor_report_period_ms: 10_000,

            link_timeout_ms: 20_000,
            link_poll_ms: 200,
            link_retry_ms: 3_000,
            session_retry_ms: 5_000,

            idle_sleep_ms: 100,
        }
    }
}

/// Runtime-tunable intervals, mutated only by the config channel and read
/// fresh at the start of each cycle (never cached across cycles).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuningParams {
    /// Telemetry collection interval in milliseconds
    /// (wire key `data.collect.interval`, supplied in seconds).
    pub data_collect_interval_ms: u32,
}

impl Default for TuningParams {
    fn default() -> Self {
        Self {
            data_collect_interval_ms: 10_000,
        }
    }
}
