//! Sensor drivers: the AHT10 bus protocol decoder and the thin ADC/GPIO
//! sensors. Each driver is generic over its `embedded-hal` seam (or the
//! local [`AdcChannel`](crate::app::ports::AdcChannel) port) so the same
//! code runs against real buses, the host simulation, and test doubles.

pub mod aht10;
pub mod flame;
pub mod light;
