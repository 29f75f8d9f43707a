//! Device status heartbeat.

use embedded_hal::delay::DelayNs;

use crate::app::messages::StatusPayload;
use crate::app::ports::{NetLink, SessionLink};
use crate::config::TOPIC_DEVICE_STATUS;
use crate::error::Result;
use crate::net::ConnectivityManager;

pub struct HeartbeatModule {
    start_ms: u32,
}

impl HeartbeatModule {
    /// `now` fixes the uptime epoch.
    pub fn new(now: u32) -> Self {
        Self { start_ms: now }
    }

    /// Publish one status payload reflecting the live link state.
    pub fn run(
        &mut self,
        net: &mut ConnectivityManager<impl NetLink, impl SessionLink, impl DelayNs>,
        device_id: &str,
        now: u32,
    ) -> Result<()> {
        let online = net.is_link_up();
        let payload = StatusPayload {
            device_id,
            status: if online { "ONLINE" } else { "OFFLINE" },
            ip: net.address().map(|a| a.to_string()),
            uptime_ms: now.wrapping_sub(self.start_ms),
            timestamp: now,
        };
        net.publish_json(TOPIC_DEVICE_STATUS, &payload)?;
        Ok(())
    }
}
