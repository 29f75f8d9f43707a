//! Inbound wire types.
//!
//! Control commands arrive on a topic shared by every node in the office,
//! so each message carries the target `deviceId`; the router drops
//! messages addressed elsewhere without logging them as errors.

use serde::Deserialize;

/// A control command from the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlCommand {
    pub device_id: String,
    pub action: Action,
}

/// The fixed actuator action set. Anything else on the wire maps to
/// [`Action::Unknown`] and is ignored by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    RgbOn,
    RgbOff,
    BuzzerOn,
    BuzzerOff,
    #[serde(other)]
    Unknown,
}
