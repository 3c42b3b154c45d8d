//! Actuation logic
//!
//! Pure mapping from normalized commands to raw outputs, and the
//! per-channel state that tracks what was requested and what was applied.
//! The pin writes themselves live in `platter-drivers`.

pub mod channel;
pub mod interlock;
pub mod mapping;

pub use channel::{ChannelState, Transition};
pub use interlock::{
    phase_of, resolve, safe_stop, BrakeOutput, ChannelCommand, ChannelPhase, Direction, RawState,
};
pub use mapping::{map_duty, UI_MAX};
