//! RGB indicator LED.
//!
//! The board wires the three channels active-low: driving a pin low lights
//! that channel. The driver tracks whether any channel is lit — that
//! boolean is what telemetry reports as `rgbStatus`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct RgbLed<P, D> {
    r: P,
    g: P,
    b: P,
    delay: D,
    lit: bool,
}

impl<P: OutputPin, D: DelayNs> RgbLed<P, D> {
    /// Takes ownership of the three channel pins. Call [`off`](Self::off)
    /// after construction to force a known level.
    pub fn new(r: P, g: P, b: P, delay: D) -> Self {
        Self {
            r,
            g,
            b,
            delay,
            lit: false,
        }
    }

    fn set_channels(&mut self, r_on: bool, g_on: bool, b_on: bool) -> Result<(), ActuatorError> {
        // Active-low: on = low.
        set_level(&mut self.r, r_on)?;
        set_level(&mut self.g, g_on)?;
        set_level(&mut self.b, b_on)?;
        self.lit = r_on || g_on || b_on;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.set_channels(false, false, false)
    }

    pub fn white(&mut self) -> Result<(), ActuatorError> {
        self.set_channels(true, true, true)
    }

    pub fn red(&mut self) -> Result<(), ActuatorError> {
        self.set_channels(true, false, false)
    }

    /// Blocking red blink: `times` cycles of red/off at `interval_ms` each.
    /// Leaves the LED off.
    pub fn blink_red(&mut self, times: u8, interval_ms: u32) -> Result<(), ActuatorError> {
        for _ in 0..times {
            self.red()?;
            self.delay.delay_ms(interval_ms);
            self.off()?;
            self.delay.delay_ms(interval_ms);
        }
        Ok(())
    }

    /// Whether any channel is currently lit.
    pub fn is_on(&self) -> bool {
        self.lit
    }
}

fn set_level<P: OutputPin>(pin: &mut P, on: bool) -> Result<(), ActuatorError> {
    let result = if on { pin.set_low() } else { pin.set_high() };
    result.map_err(|_| ActuatorError::GpioWriteFailed)
}
