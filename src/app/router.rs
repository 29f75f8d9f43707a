//! Inbound message router: the control command and config update channels.
//!
//! Everything arriving here is untrusted wire input. The policy is drop,
//! never propagate: a malformed message, a command addressed to another
//! device, or an unknown action/key is logged at debug level and discarded
//! — the control loop must keep running regardless of what the broker
//! delivers.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use crate::app::commands::{Action, ControlCommand};
use crate::app::ports::InboundMessage;
use crate::config::{TuningParams, TOPIC_CONFIG_UPDATE, TOPIC_CONTROL_CMD};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::rgb_led::RgbLed;

pub struct CommandRouter {
    device_id: String,
}

impl CommandRouter {
    pub fn new(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
        }
    }

    /// Dispatch one inbound message by topic.
    pub fn dispatch(
        &self,
        msg: &InboundMessage,
        led: &mut RgbLed<impl OutputPin, impl DelayNs>,
        buzzer: &mut Buzzer<impl OutputPin, impl DelayNs>,
        params: &mut TuningParams,
    ) {
        match msg.topic.as_str() {
            TOPIC_CONTROL_CMD => self.handle_control(&msg.payload, led, buzzer),
            TOPIC_CONFIG_UPDATE => self.handle_config(&msg.payload, params),
            other => debug!("message on unexpected topic '{other}' dropped"),
        }
    }

    fn handle_control(
        &self,
        payload: &[u8],
        led: &mut RgbLed<impl OutputPin, impl DelayNs>,
        buzzer: &mut Buzzer<impl OutputPin, impl DelayNs>,
    ) {
        let cmd: ControlCommand = match serde_json::from_slice(payload) {
            Ok(cmd) => cmd,
            Err(e) => {
                debug!("control message dropped, parse failed: {e}");
                return;
            }
        };
        // The control topic is shared by every node; a mismatch is routine,
        // not an error.
        if cmd.device_id != self.device_id {
            return;
        }

        let result = match cmd.action {
            Action::RgbOn => led.white(),
            Action::RgbOff => led.off(),
            Action::BuzzerOn => buzzer.on(),
            Action::BuzzerOff => buzzer.off(),
            Action::Unknown => {
                debug!("unknown control action ignored");
                return;
            }
        };
        match result {
            Ok(()) => info!("control: applied {:?}", cmd.action),
            Err(e) => warn!("control: {:?} failed: {e}", cmd.action),
        }
    }

    fn handle_config(&self, payload: &[u8], params: &mut TuningParams) {
        let update: serde_json::Map<String, serde_json::Value> =
            match serde_json::from_slice(payload) {
                Ok(map) => map,
                Err(e) => {
                    debug!("config update dropped, parse failed: {e}");
                    return;
                }
            };

        for (key, value) in &update {
            match key.as_str() {
                "data.collect.interval" => {
                    let Some(secs) = value.as_u64() else {
                        debug!("config '{key}' value {value} not an unsigned integer, ignored");
                        continue;
                    };
                    // Values are applied as supplied; only the unit
                    // conversion is guarded against overflow.
                    let ms = u32::try_from(secs)
                        .unwrap_or(u32::MAX)
                        .saturating_mul(1_000);
                    params.data_collect_interval_ms = ms;
                    info!("config: data collect interval set to {secs}s ({ms}ms)");
                }
                _ => debug!("unknown config key '{key}' ignored"),
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
