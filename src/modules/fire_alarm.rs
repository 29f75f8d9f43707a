//! Hazard watch: flame edge detection, local indication, alarm publish.
//!
//! The alarm event goes out exactly once per rising edge. While the hazard
//! persists the node repeats a short local indication every evaluation
//! cycle, but the broker sees nothing further — and nothing is published
//! when the hazard clears; the backend treats alarms as never retracted.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, error, warn};

use crate::app::messages::AlarmEvent;
use crate::app::ports::{NetLink, SessionLink};
use crate::config::TOPIC_ALARM;
use crate::drivers::buzzer::Buzzer;
use crate::drivers::rgb_led::RgbLed;
use crate::error::Result;
use crate::net::ConnectivityManager;
use crate::sensors::flame::FlameSensor;

/// Red-blink on-time and off-time per indication burst.
const BLINK_INTERVAL_MS: u32 = 150;
/// Audible pulse length per indication burst.
const BEEP_MS: u32 = 100;

pub struct FireAlarmModule {
    last_flame: bool,
}

impl FireAlarmModule {
    pub fn new() -> Self {
        Self { last_flame: false }
    }

    /// One evaluation cycle.
    pub fn run(
        &mut self,
        flame: &mut FlameSensor<impl InputPin>,
        led: &mut RgbLed<impl OutputPin, impl DelayNs>,
        buzzer: &mut Buzzer<impl OutputPin, impl DelayNs>,
        net: &mut ConnectivityManager<impl NetLink, impl SessionLink, impl DelayNs>,
        device_id: &str,
        now: u32,
    ) -> Result<()> {
        // A failed read counts as no flame: the hazard path must not latch
        // on a flaky input, and the error itself is only worth a log line.
        let flame_now = match flame.detected() {
            Ok(f) => f,
            Err(e) => {
                debug!("flame read failed: {e}");
                false
            }
        };

        if flame_now {
            // Bounded local indication, repeated while the hazard persists.
            if let Err(e) = led.blink_red(1, BLINK_INTERVAL_MS) {
                warn!("alarm indication (LED) failed: {e}");
            }
            if let Err(e) = buzzer.beep(BEEP_MS) {
                warn!("alarm indication (buzzer) failed: {e}");
            }
        }

        if flame_now != self.last_flame {
            self.last_flame = flame_now;
            if flame_now {
                error!("flame detected, raising alarm");
                let event = AlarmEvent {
                    device_id,
                    alarm_type: "FIRE",
                    level: "CRITICAL",
                    message: "Flame detected",
                    timestamp: now,
                };
                net.publish_json(TOPIC_ALARM, &event)?;
            }
        }
        Ok(())
    }
}
