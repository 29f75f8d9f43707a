//! Local indicator drivers. Thin wrappers over `OutputPin` that track the
//! boolean on/off state the rest of the node reports and toggles.

pub mod buzzer;
pub mod rgb_led;
