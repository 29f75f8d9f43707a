//! Port traits — the boundary between node logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ node logic (scheduler / manager / modules)
//! ```
//!
//! Driven adapters (network drivers, ADC channels, simulated or real)
//! implement these traits. The connectivity manager and sensor drivers
//! consume them via generics, so the node logic never touches hardware
//! directly and runs unchanged against test doubles.
//!
//! The hardware-bus and pin seams use `embedded-hal` traits directly
//! (`I2c`, `DelayNs`, `InputPin`, `OutputPin`); only the seams the HAL does
//! not cover are defined here.

use core::net::Ipv4Addr;

use crate::error::{CommsError, SensorError};

/// Longest topic string the node handles.
pub const MAX_TOPIC_LEN: usize = 48;

// ───────────────────────────────────────────────────────────────
// Station link port (driven adapter: radio/NIC → node)
// ───────────────────────────────────────────────────────────────

/// Link-layer driver: station association and address state.
pub trait NetLink {
    /// Begin association with the configured access point. Returns once the
    /// request is accepted by the driver; completion is observed through
    /// [`is_associated`](Self::is_associated) and [`address`](Self::address).
    fn associate(&mut self) -> Result<(), CommsError>;

    /// Whether the station is currently associated.
    fn is_associated(&mut self) -> bool;

    /// Current network address, if any. `0.0.0.0` is the driver's
    /// placeholder before address acquisition completes.
    fn address(&mut self) -> Option<Ipv4Addr>;
}

// ───────────────────────────────────────────────────────────────
// Session link port (driven adapter: broker socket → node)
// ───────────────────────────────────────────────────────────────

/// One inbound publish delivered by the session driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: heapless::String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8>,
}

/// Session-layer driver: the publish/subscribe socket to the broker.
///
/// Identity, server and keepalive are fixed at adapter construction. The
/// driver performs no reconnection of its own — the connectivity manager
/// owns that policy and simply abandons a failed socket.
pub trait SessionLink {
    /// Open the socket and perform the session handshake.
    fn connect(&mut self) -> Result<(), CommsError>;

    /// Register interest in `topic` with the broker.
    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError>;

    /// Publish `payload` to `topic`.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;

    /// Non-blocking check for one inbound message.
    fn poll(&mut self) -> Result<Option<InboundMessage>, CommsError>;
}

// ───────────────────────────────────────────────────────────────
// ADC port (driven adapter: analog input → node)
// ───────────────────────────────────────────────────────────────

/// Single ADC channel. `embedded-hal` 1.0 has no blocking ADC trait, so the
/// seam is defined here; the raw value is the converter's native scale.
pub trait AdcChannel {
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}
