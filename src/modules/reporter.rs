//! Telemetry aggregator: one fused sensor report per collection cycle.
//!
//! Every sensor is attempted independently — a failure substitutes the
//! documented sentinel (0 / false) for that field only and never aborts
//! the others or the publish. A single flaky sensor must not silence the
//! whole node.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::messages::TelemetryPayload;
use crate::app::ports::{AdcChannel, NetLink, SessionLink};
use crate::config::TOPIC_SENSOR_DATA;
use crate::drivers::rgb_led::RgbLed;
use crate::error::Result;
use crate::net::ConnectivityManager;
use crate::sensors::aht10::Aht10;
use crate::sensors::flame::FlameSensor;
use crate::sensors::light::LightSensor;

pub struct ReporterModule;

impl ReporterModule {
    pub fn new() -> Self {
        Self
    }

    /// Compose and publish one telemetry payload.
    pub fn run(
        &mut self,
        light: &mut LightSensor<impl AdcChannel>,
        env: &mut Aht10<impl I2c, impl DelayNs>,
        flame: &mut FlameSensor<impl InputPin>,
        led: &RgbLed<impl OutputPin, impl DelayNs>,
        net: &mut ConnectivityManager<impl NetLink, impl SessionLink, impl DelayNs>,
        device_id: &str,
        now: u32,
    ) -> Result<()> {
        let lux = match light.read_lux() {
            Ok(v) => v,
            Err(e) => {
                warn!("light read failed: {e}");
                0.0
            }
        };
        let (temperature, humidity) = match env.read() {
            Ok(pair) => pair,
            Err(e) => {
                warn!("environment read failed: {e}");
                (0.0, 0.0)
            }
        };
        let flame_now = match flame.detected() {
            Ok(f) => f,
            Err(e) => {
                warn!("flame read failed: {e}");
                false
            }
        };

        let payload = TelemetryPayload {
            device_id,
            light: lux,
            temperature,
            humidity,
            flame: flame_now,
            rgb_status: led.is_on(),
            timestamp: now,
        };
        net.publish_json(TOPIC_SENSOR_DATA, &payload)?;
        Ok(())
    }
}
