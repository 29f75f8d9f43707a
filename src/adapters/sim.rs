//! Deterministic hardware simulation for host runs.
//!
//! Every model exposes an `Rc<Cell<_>>` injection handle so the binary (or
//! a test) can steer the simulated world from outside while the drivers
//! own the adapter, mirroring how the real peripherals are owned. All
//! variation is counter-driven — no randomness, so a sim run is exactly
//! reproducible.

use core::cell::Cell;
use core::net::Ipv4Addr;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::i2c::{self, ErrorType as I2cErrorType, I2c, Operation};
use log::{debug, info};

use crate::app::ports::{AdcChannel, InboundMessage, NetLink, SessionLink, MAX_TOPIC_LEN};
use crate::config::{TOPIC_CONFIG_UPDATE, TOPIC_CONTROL_CMD};
use crate::error::{CommsError, SensorError};

// ───────────────────────────────────────────────────────────────
// AHT10 device model
// ───────────────────────────────────────────────────────────────

/// Calibration opcode; flips the model's calibration bit on.
const OP_CALIBRATE: u8 = 0xE1;

#[derive(Debug)]
pub struct SimBusError;

impl i2c::Error for SimBusError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

/// Bus-level model of the AHT10: answers a measurement trigger with a
/// 6-byte status+data burst encoding the ambient truth.
pub struct SimI2cBus {
    ambient: Rc<Cell<(f32, f32)>>,
    calibrated: Rc<Cell<bool>>,
    fail: Rc<Cell<bool>>,
    reads: u32,
}

impl SimI2cBus {
    /// `ambient` is `(temperature_c, humidity_pct)`.
    pub fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            ambient: Rc::new(Cell::new((temperature_c, humidity_pct))),
            calibrated: Rc::new(Cell::new(false)),
            fail: Rc::new(Cell::new(false)),
            reads: 0,
        }
    }

    /// Handle to steer the ambient truth.
    pub fn ambient_handle(&self) -> Rc<Cell<(f32, f32)>> {
        Rc::clone(&self.ambient)
    }

    /// Handle to force bus transaction failures.
    pub fn fail_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.fail)
    }
}

/// Pack `(status, temperature_c, humidity_pct)` into the device's 6-byte
/// burst layout (inverse of the driver's fixed-point decode).
pub fn encode_burst(status: u8, temperature_c: f32, humidity_pct: f32) -> [u8; 6] {
    let temp_raw = (((temperature_c + 50.0) / 200.0) * (1u32 << 20) as f32) as u32 & 0xF_FFFF;
    let hum_raw = ((humidity_pct / 100.0) * (1u32 << 20) as f32) as u32 & 0xF_FFFF;
    [
        status,
        (hum_raw >> 12) as u8,
        (hum_raw >> 4) as u8,
        (((hum_raw & 0xF) << 4) as u8) | ((temp_raw >> 16) as u8),
        (temp_raw >> 8) as u8,
        temp_raw as u8,
    ]
}

impl I2cErrorType for SimI2cBus {
    type Error = SimBusError;
}

impl I2c for SimI2cBus {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail.get() {
            return Err(SimBusError);
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    // The trigger and soft-reset opcodes need no modelling:
                    // a read always reflects the ambient truth.
                    if bytes.first() == Some(&OP_CALIBRATE) {
                        self.calibrated.set(true);
                    }
                }
                Operation::Read(buf) => {
                    self.reads = self.reads.wrapping_add(1);
                    // Small counter-driven drift keeps host telemetry alive.
                    let osc = (self.reads % 16) as f32 * 0.02;
                    let (t, h) = self.ambient.get();
                    let status = if self.calibrated.get() { 0x08 } else { 0x00 };
                    let burst = encode_burst(status, t + osc, h + osc);
                    buf.copy_from_slice(&burst[..buf.len()]);
                }
            }
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// ADC and GPIO models
// ───────────────────────────────────────────────────────────────

/// ADC channel returning a steerable raw value.
pub struct SimAdc {
    raw: Rc<Cell<u16>>,
    fail: Rc<Cell<bool>>,
}

impl SimAdc {
    pub fn new(raw: u16) -> Self {
        Self {
            raw: Rc::new(Cell::new(raw)),
            fail: Rc::new(Cell::new(false)),
        }
    }

    pub fn raw_handle(&self) -> Rc<Cell<u16>> {
        Rc::clone(&self.raw)
    }

    pub fn fail_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.fail)
    }
}

impl AdcChannel for SimAdc {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        if self.fail.get() {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(self.raw.get())
    }
}

/// Input pin whose active-low level is steered through a handle
/// (`true` = driven low).
pub struct SimInputPin {
    low: Rc<Cell<bool>>,
}

impl SimInputPin {
    pub fn new(low: bool) -> Self {
        Self {
            low: Rc::new(Cell::new(low)),
        }
    }

    pub fn handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.low)
    }
}

impl PinErrorType for SimInputPin {
    type Error = core::convert::Infallible;
}

impl InputPin for SimInputPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.low.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.low.get())
    }
}

/// Output pin that records its level (`true` = driven high).
pub struct SimOutputPin {
    high: Rc<Cell<bool>>,
}

impl SimOutputPin {
    pub fn new() -> Self {
        Self {
            high: Rc::new(Cell::new(false)),
        }
    }

    pub fn handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.high)
    }
}

impl Default for SimOutputPin {
    fn default() -> Self {
        Self::new()
    }
}

impl PinErrorType for SimOutputPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high.set(true);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Network models
// ───────────────────────────────────────────────────────────────

/// Station link that associates on the second poll and then acquires an
/// address two polls later — exercises the manager's wait loop without
/// stalling a host run.
pub struct SimNetLink {
    ssid: String,
    polls: u32,
    associated: bool,
}

impl SimNetLink {
    /// Credentials are fixed at construction, as on the real radio; the
    /// simulation accepts any passphrase.
    pub fn new(ssid: &str, _passphrase: &str) -> Self {
        Self {
            ssid: ssid.to_string(),
            polls: 0,
            associated: false,
        }
    }
}

impl NetLink for SimNetLink {
    fn associate(&mut self) -> Result<(), CommsError> {
        debug!("sim link: association requested to '{}'", self.ssid);
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        self.polls = self.polls.wrapping_add(1);
        if self.polls >= 2 {
            self.associated = true;
        }
        self.associated
    }

    fn address(&mut self) -> Option<Ipv4Addr> {
        if !self.associated {
            return None;
        }
        if self.polls >= 4 {
            Some(Ipv4Addr::new(192, 168, 8, 120))
        } else {
            Some(Ipv4Addr::UNSPECIFIED)
        }
    }
}

/// Loopback broker: logs outbound traffic and scripts periodic inbound
/// control/config messages by poll counter.
pub struct SimBroker {
    polls: u32,
    toggles: u32,
    client_id: String,
    endpoint: String,
    keepalive_secs: u16,
}

impl SimBroker {
    pub fn new(client_id: &str, host: &str, port: u16, keepalive_secs: u16) -> Self {
        Self {
            polls: 0,
            toggles: 0,
            client_id: client_id.to_string(),
            endpoint: format!("{host}:{port}"),
            keepalive_secs,
        }
    }

    fn scripted_inbound(&mut self) -> Option<(&'static str, String)> {
        // Every 400th poll (~40 s at the default idle sleep) toggle the
        // indicator; every 1000th, retune the collection interval.
        if self.polls % 1_000 == 500 {
            return Some((TOPIC_CONFIG_UPDATE, r#"{"data.collect.interval":5}"#.to_string()));
        }
        if self.polls % 400 == 200 {
            self.toggles = self.toggles.wrapping_add(1);
            let action = if self.toggles % 2 == 1 { "rgb_on" } else { "rgb_off" };
            return Some((
                TOPIC_CONTROL_CMD,
                format!(r#"{{"deviceId":"{}","action":"{action}"}}"#, self.client_id),
            ));
        }
        None
    }
}

impl SessionLink for SimBroker {
    fn connect(&mut self) -> Result<(), CommsError> {
        info!(
            "sim broker: '{}' connected to {} (keepalive {}s)",
            self.client_id, self.endpoint, self.keepalive_secs
        );
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        info!("sim broker: subscribed to '{topic}'");
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        info!(
            "sim broker: publish '{topic}' {}",
            core::str::from_utf8(payload).unwrap_or("<non-utf8>")
        );
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<InboundMessage>, CommsError> {
        self.polls = self.polls.wrapping_add(1);
        let Some((topic, payload)) = self.scripted_inbound() else {
            return Ok(None);
        };
        let mut owned: heapless::String<MAX_TOPIC_LEN> = heapless::String::new();
        owned.push_str(topic).map_err(|()| CommsError::PollFailed)?;
        Ok(Some(InboundMessage {
            topic: owned,
            payload: payload.into_bytes(),
        }))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
