//! Digital flame detector.
//!
//! Common flame modules pull their output low when a flame is detected, so
//! the input is read active-low through a pulled-up GPIO.

use embedded_hal::digital::InputPin;

use crate::error::SensorError;

pub struct FlameSensor<P> {
    pin: P,
}

impl<P: InputPin> FlameSensor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Whether a flame is currently detected.
    pub fn detected(&mut self) -> Result<bool, SensorError> {
        self.pin.is_low().map_err(|_| SensorError::GpioReadFailed)
    }
}
