//! Host time adapter.
//!
//! Wraps `std::time::Instant` into the node's wrapping u32 millisecond
//! clock and the `embedded-hal` delay port.

use embedded_hal::delay::DelayNs;

use crate::clock::Monotonic;

/// Monotonic clock backed by `Instant`. The u32 truncation reproduces the
/// wrap-around behaviour of a hardware tick counter.
pub struct HostClock {
    start: std::time::Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Monotonic for HostClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// Blocking delay backed by `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostDelay;

impl DelayNs for HostDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}
