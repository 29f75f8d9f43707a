//! Host-side adapters behind the port traits.
//!
//! `host_time` supplies the wall-clock/delay ports; `sim` supplies
//! deterministic device models so the node binary runs end-to-end on a
//! development machine with no hardware attached.

pub mod host_time;
pub mod sim;
