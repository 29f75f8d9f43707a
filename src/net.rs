//! Connectivity manager — unified station-link and broker-session state.
//!
//! One component owns both layers so the duty modules see a single
//! `ensure → use` surface:
//!
//! ```text
//!   ensure_link ──▶ associate + poll (≤20 s) for link AND address
//!   ensure_session ──▶ single connect attempt ──▶ replay pending topics
//!   publish / poll ──▶ any I/O failure demotes the session immediately
//! ```
//!
//! "Recorded intent" (the pending-topic table) is deliberately separate
//! from "live session": callers subscribe whenever they like, before the
//! network is ready or after a drop, and the manager replays the table in
//! insertion order on every session (re-)establishment. A failed socket is
//! abandoned, never closed — the next `ensure_session` opens a fresh one.

use core::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};
use serde::Serialize;

use crate::app::ports::{InboundMessage, NetLink, SessionLink, MAX_TOPIC_LEN};
use crate::config::NodeConfig;
use crate::error::CommsError;

/// Maximum distinct topics the node subscribes to.
const MAX_SUBSCRIPTIONS: usize = 8;

pub struct ConnectivityManager<L, S, D> {
    link: L,
    session: S,
    delay: D,

    link_up: bool,
    session_up: bool,
    /// Insertion-ordered, duplicate-free recorded subscription intent.
    pending: heapless::Vec<heapless::String<MAX_TOPIC_LEN>, MAX_SUBSCRIPTIONS>,

    link_timeout_ms: u32,
    link_poll_ms: u32,
    link_retry_ms: u32,
    session_retry_ms: u32,
}

impl<L: NetLink, S: SessionLink, D: DelayNs> ConnectivityManager<L, S, D> {
    pub fn new(link: L, session: S, delay: D, config: &NodeConfig) -> Self {
        Self {
            link,
            session,
            delay,
            link_up: false,
            session_up: false,
            pending: heapless::Vec::new(),
            link_timeout_ms: config.link_timeout_ms,
            link_poll_ms: config.link_poll_ms,
            link_retry_ms: config.link_retry_ms,
            session_retry_ms: config.session_retry_ms,
        }
    }

    // ── Link layer ────────────────────────────────────────────

    /// Bring the station link up if it is not already. Best-effort: a
    /// failure is logged and backed off here, never raised.
    pub fn ensure_link(&mut self) -> bool {
        if self.link.is_associated() {
            self.link_up = true;
            return true;
        }
        self.link_up = false;
        match self.associate_and_wait() {
            Ok(addr) => {
                self.link_up = true;
                info!("link up, address {addr}");
                true
            }
            Err(e) => {
                warn!("link attempt failed: {e}");
                self.delay.delay_ms(self.link_retry_ms);
                false
            }
        }
    }

    /// Associate and poll until both the link is up and a non-placeholder
    /// address is held, or the budget is exhausted.
    fn associate_and_wait(&mut self) -> Result<Ipv4Addr, CommsError> {
        self.link.associate()?;
        let attempts = self.link_timeout_ms / self.link_poll_ms;
        for _ in 0..attempts {
            if self.link.is_associated() {
                // Associated is not enough: address acquisition can lag
                // behind or fail outright on some access points.
                if let Some(addr) = self.link.address() {
                    if addr != Ipv4Addr::UNSPECIFIED {
                        return Ok(addr);
                    }
                }
            }
            self.delay.delay_ms(self.link_poll_ms);
        }
        if self.link.is_associated() {
            Err(CommsError::NoAddress)
        } else {
            Err(CommsError::AssociateFailed)
        }
    }

    /// Live link state, queried from the driver and cached.
    pub fn is_link_up(&mut self) -> bool {
        self.link_up = self.link.is_associated();
        self.link_up
    }

    /// Current address from the link driver, placeholder filtered out.
    pub fn address(&mut self) -> Option<Ipv4Addr> {
        self.link
            .address()
            .filter(|a| *a != Ipv4Addr::UNSPECIFIED)
    }

    // ── Session layer ─────────────────────────────────────────

    /// Bring the broker session up if it is not already. One connect
    /// attempt per call; a failure sleeps one fixed backoff interval —
    /// fixed rather than exponential, which keeps the cooperative loop's
    /// worst-case stall bounded and predictable.
    pub fn ensure_session(&mut self) -> bool {
        if self.session_up {
            return true;
        }
        match self.open_and_replay() {
            Ok(()) => {
                self.session_up = true;
                info!("session up, {} subscription(s) replayed", self.pending.len());
                true
            }
            Err(e) => {
                self.session_up = false;
                warn!("session attempt failed: {e}");
                self.delay.delay_ms(self.session_retry_ms);
                false
            }
        }
    }

    fn open_and_replay(&mut self) -> Result<(), CommsError> {
        self.session.connect()?;
        for topic in &self.pending {
            self.session.subscribe(topic)?;
        }
        Ok(())
    }

    pub fn is_session_up(&self) -> bool {
        self.session_up
    }

    /// Register interest in `topic`. The intent is always recorded
    /// (idempotently, preserving first-seen order); it is forwarded on the
    /// wire only when a session is live. A wire failure demotes the
    /// session; the recorded intent survives for replay.
    pub fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        self.record_topic(topic);
        if !self.session_up {
            debug!("session down; postponed subscribe to '{topic}'");
            return Ok(());
        }
        match self.session.subscribe(topic) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("subscribe to '{topic}' failed, session demoted: {e}");
                self.session_up = false;
                Err(e)
            }
        }
    }

    fn record_topic(&mut self, topic: &str) {
        if self.pending.iter().any(|t| t.as_str() == topic) {
            return;
        }
        let mut owned: heapless::String<MAX_TOPIC_LEN> = heapless::String::new();
        if owned.push_str(topic).is_err() {
            warn!("topic '{topic}' exceeds {MAX_TOPIC_LEN} bytes, not recorded");
            return;
        }
        if self.pending.push(owned).is_err() {
            warn!("subscription table full, '{topic}' not recorded");
        }
    }

    /// Publish raw bytes. Requires a live session; any wire failure
    /// demotes the session so the next `ensure_session` reopens it.
    pub fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.session_up {
            return Err(CommsError::SessionClosed);
        }
        match self.session.publish(topic, payload) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("publish to '{topic}' failed, session demoted: {e}");
                self.session_up = false;
                Err(e)
            }
        }
    }

    /// Serialise `value` as JSON and publish it.
    pub fn publish_json<T: Serialize>(&mut self, topic: &str, value: &T) -> Result<(), CommsError> {
        let payload = serde_json::to_vec(value).map_err(|_| CommsError::Encode)?;
        self.publish(topic, &payload)
    }

    /// Non-blocking check for one inbound message. Returns `None` when the
    /// session is down or idle; a wire failure demotes the session.
    pub fn poll(&mut self) -> Option<InboundMessage> {
        if !self.session_up {
            return None;
        }
        match self.session.poll() {
            Ok(msg) => msg,
            Err(e) => {
                warn!("inbound poll failed, session demoted: {e}");
                self.session_up = false;
                None
            }
        }
    }

    /// Recorded subscription intent, in first-seen order.
    pub fn pending_topics(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|t| t.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
