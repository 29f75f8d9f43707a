//! Piezo buzzer, push-pull GPIO, active-high.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct Buzzer<P, D> {
    pin: P,
    delay: D,
    on: bool,
}

impl<P: OutputPin, D: DelayNs> Buzzer<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            pin,
            delay,
            on: false,
        }
    }

    pub fn on(&mut self) -> Result<(), ActuatorError> {
        self.pin.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = true;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = false;
        Ok(())
    }

    /// Blocking beep of `duration_ms`. Leaves the buzzer silent.
    pub fn beep(&mut self, duration_ms: u32) -> Result<(), ActuatorError> {
        self.on()?;
        self.delay.delay_ms(duration_ms);
        self.off()
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
