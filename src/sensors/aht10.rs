//! AHT10 temperature/humidity protocol decoder.
//!
//! A small bus-level state machine over the calibrated-measurement device:
//!
//! ```text
//! Uninitialized ──initialize()──▶ Idle ──trigger──▶ Measuring
//!                                  ▲                   │ status bit 3
//!                                  │          ┌────────┴────────┐
//!                                  │          ▼                 ▼
//!                              (re-init)  Calibrated       Uncalibrated
//! ```
//!
//! A read against an uncalibrated device re-runs the init sequence and
//! fails with the distinguished [`SensorError::NotCalibrated`]; the caller
//! retries on its own schedule. Measurements are 20-bit fixed-point fields
//! packed across the 6-byte status+data burst.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;

/// Fixed bus address of the device.
pub const AHT10_ADDR: u8 = 0x38;

const CMD_NORMAL: [u8; 3] = [0xA8, 0x00, 0x00];
const CMD_CALIBRATE: [u8; 3] = [0xE1, 0x08, 0x00];
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x00, 0x00];

/// Settle after the normal-mode command.
const SETTLE_NORMAL_MS: u32 = 350;
/// Settle after the calibration command (longer; the device runs its
/// internal calibration routine during this window).
const SETTLE_CALIBRATE_MS: u32 = 450;

/// Status-byte calibration check: bit 3 set, busy/mode bits 5 and 6 clear.
const STATUS_CAL_MASK: u8 = 0x68;
const STATUS_CAL_OK: u8 = 0x08;

/// Bound on re-reads of an all-zero measurement burst. The unbounded
/// equivalent would spin forever on a wedged bus.
const ZERO_BURST_RETRIES: u8 = 3;

/// Protocol state, tracked for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureState {
    Uninitialized,
    Idle,
    Measuring,
    Calibrated,
    Uncalibrated,
}

pub struct Aht10<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    state: MeasureState,
}

impl<I2C: I2c, D: DelayNs> Aht10<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: AHT10_ADDR,
            state: MeasureState::Uninitialized,
        }
    }

    pub fn state(&self) -> MeasureState {
        self.state
    }

    /// Soft-reset into normal mode, then start the calibration routine.
    /// Blocks for the two fixed settle delays.
    pub fn initialize(&mut self) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &CMD_NORMAL)
            .map_err(|_| SensorError::Bus)?;
        self.delay.delay_ms(SETTLE_NORMAL_MS);
        self.i2c
            .write(self.address, &CMD_CALIBRATE)
            .map_err(|_| SensorError::Bus)?;
        self.delay.delay_ms(SETTLE_CALIBRATE_MS);
        self.state = MeasureState::Idle;
        Ok(())
    }

    /// Trigger one measurement and decode `(temperature_c, humidity_pct)`.
    ///
    /// An uncalibrated status re-initialises the device and fails only this
    /// read. A burst whose shared middle byte is zero is re-read up to
    /// [`ZERO_BURST_RETRIES`] times — guards against a transient all-zero
    /// capture — then fails with [`SensorError::ZeroedBurst`].
    pub fn read(&mut self) -> Result<(f32, f32), SensorError> {
        self.i2c
            .write(self.address, &CMD_TRIGGER)
            .map_err(|_| SensorError::Bus)?;
        self.state = MeasureState::Measuring;

        let mut burst = [0u8; 6];
        self.i2c
            .read(self.address, &mut burst)
            .map_err(|_| SensorError::Bus)?;

        if burst[0] & STATUS_CAL_MASK != STATUS_CAL_OK {
            self.state = MeasureState::Uncalibrated;
            self.initialize()?;
            return Err(SensorError::NotCalibrated);
        }

        let mut retries = 0;
        while burst[2] == 0 {
            if retries == ZERO_BURST_RETRIES {
                self.state = MeasureState::Idle;
                return Err(SensorError::ZeroedBurst);
            }
            retries += 1;
            self.i2c
                .read(self.address, &mut burst)
                .map_err(|_| SensorError::Bus)?;
        }

        self.state = MeasureState::Calibrated;
        Ok((decode_temperature(&burst), decode_humidity(&burst)))
    }
}

/// `((b3 & 0xF) << 16 | b4 << 8 | b5) * 200 / 2^20 - 50`
fn decode_temperature(burst: &[u8; 6]) -> f32 {
    let raw = u32::from(burst[3] & 0x0F) << 16 | u32::from(burst[4]) << 8 | u32::from(burst[5]);
    raw as f32 * 200.0 / (1u32 << 20) as f32 - 50.0
}

/// `(b1 << 12 | b2 << 4 | (b3 & 0xF0) >> 4) * 100 / 2^20`
fn decode_humidity(burst: &[u8; 6]) -> f32 {
    let raw = u32::from(burst[1]) << 12
        | u32::from(burst[2]) << 4
        | u32::from((burst[3] & 0xF0) >> 4);
    raw as f32 * 100.0 / (1u32 << 20) as f32
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
