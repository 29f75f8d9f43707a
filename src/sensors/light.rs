//! Analog light sensor on a SAR-ADC channel.
//!
//! The raw-to-voltage conversion uses the board's published ADC calibration;
//! the voltage-to-lux mapping is a simple linear approximation for a
//! photoresistor front-end, clamped to the 0..=1000 lux reporting range.

use crate::app::ports::AdcChannel;
use crate::error::SensorError;

const ADC_MID: f32 = 8192.0;
const ADC_GAIN: f32 = 2.25 / 1.2;
const ADC_OFFSET_V: f32 = 1.584;
const FULL_SCALE_V: f32 = 3.3;
const MAX_LUX: f32 = 1000.0;

pub struct LightSensor<A> {
    adc: A,
}

impl<A: AdcChannel> LightSensor<A> {
    pub fn new(adc: A) -> Self {
        Self { adc }
    }

    /// Calibrated input voltage.
    pub fn read_voltage(&mut self) -> Result<f32, SensorError> {
        let raw = self.adc.read_raw()?;
        Ok((f32::from(raw) - ADC_MID) / ADC_MID * ADC_GAIN + ADC_OFFSET_V)
    }

    /// Illuminance in lux, clamped to 0..=1000.
    pub fn read_lux(&mut self) -> Result<f32, SensorError> {
        let voltage = self.read_voltage()?;
        let lux = voltage / FULL_SCALE_V * MAX_LUX;
        Ok(lux.clamp(0.0, MAX_LUX))
    }
}
