//! Per-channel actuation state
//!
//! A channel starts in [`ChannelPhase::Braking`] with its raw outputs
//! unknown until the first successful write. Writes are planned first
//! ([`ChannelState::plan_command`], [`ChannelState::plan_stop`]), applied to
//! the pins by the caller, then committed or marked as faulted.
//!
//! Releasing the brake resumes the currently requested speed. No pre-brake
//! speed is remembered.

use super::interlock::{
    phase_of, resolve, safe_stop, ChannelCommand, ChannelPhase, Direction, RawState,
};
use crate::config::ActuationConfig;

/// A planned write: what to apply and the state it leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Requested state after the write
    pub command: ChannelCommand,
    /// Raw outputs to apply
    pub raw: RawState,
    /// Phase after the write
    pub phase: ChannelPhase,
}

/// State of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    requested: ChannelCommand,
    applied: Option<RawState>,
    phase: ChannelPhase,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelState {
    /// Create the startup state: braking, speed zero, outputs not yet written
    pub const fn new() -> Self {
        Self {
            requested: ChannelCommand::stopped(Direction::Forward),
            applied: None,
            phase: ChannelPhase::Braking,
        }
    }

    /// Last requested (clamped) command
    pub fn requested(&self) -> ChannelCommand {
        self.requested
    }

    /// Last successfully applied raw outputs, or `None` if unknown
    pub fn applied(&self) -> Option<RawState> {
        self.applied
    }

    /// Current phase
    pub fn phase(&self) -> ChannelPhase {
        self.phase
    }

    /// Check if the raw outputs are known
    pub fn is_known(&self) -> bool {
        self.applied.is_some()
    }

    /// Plan applying a command
    pub fn plan_command(
        &self,
        command: ChannelCommand,
        config: &ActuationConfig,
        range: u16,
    ) -> Transition {
        let command = command.clamped();
        Transition {
            command,
            raw: resolve(command, config, range),
            phase: phase_of(command, config, range),
        }
    }

    /// Plan the safe stop
    ///
    /// Keeps the applied direction level; falls back to the requested
    /// direction when the outputs are unknown.
    pub fn plan_stop(&self, config: &ActuationConfig, range: u16) -> Transition {
        let direction = self
            .applied
            .map(|raw| raw.direction)
            .unwrap_or_else(|| self.requested.direction.level());

        Transition {
            command: ChannelCommand::stopped(self.requested.direction),
            raw: safe_stop(direction, config, range),
            phase: ChannelPhase::Braking,
        }
    }

    /// Record a transition whose writes all succeeded
    pub fn commit(&mut self, transition: Transition) {
        self.requested = transition.command;
        self.applied = Some(transition.raw);
        self.phase = transition.phase;
    }

    /// Record a failed write: the outputs are unknown from now on
    ///
    /// The requested state is kept so the failure can be reported against it.
    pub fn fault(&mut self, transition: Transition) {
        self.requested = transition.command;
        self.applied = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuation::interlock::BrakeOutput;
    use crate::config::{BrakeMode, DutyRange};
    use platter_hal::Level;

    const RANGE: u16 = 255;

    fn config() -> ActuationConfig {
        ActuationConfig {
            speed_duty: DutyRange::new(0, 178),
            brake: BrakeMode::digital(1),
        }
    }

    #[test]
    fn test_initial_state_is_braking() {
        let state = ChannelState::new();
        assert_eq!(state.phase(), ChannelPhase::Braking);
        assert_eq!(state.requested().speed, 0);
        assert!(!state.is_known());
    }

    #[test]
    fn test_stopped_to_running_to_braking() {
        let config = config();
        let mut state = ChannelState::new();

        let stop = state.plan_stop(&config, RANGE);
        state.commit(stop);
        assert_eq!(state.phase(), ChannelPhase::Braking);

        let idle = state.plan_command(ChannelCommand::new(0, Direction::Forward, 0), &config, RANGE);
        state.commit(idle);
        assert_eq!(state.phase(), ChannelPhase::Stopped);

        let run = state.plan_command(ChannelCommand::new(60, Direction::Forward, 0), &config, RANGE);
        state.commit(run);
        assert!(matches!(state.phase(), ChannelPhase::Running { .. }));

        let brake = state.plan_command(ChannelCommand::new(60, Direction::Forward, 100), &config, RANGE);
        state.commit(brake);
        assert_eq!(state.phase(), ChannelPhase::Braking);
        assert_eq!(state.applied().unwrap().speed_duty, 178);
    }

    #[test]
    fn test_brake_release_resumes_requested_speed() {
        let config = config();
        let mut state = ChannelState::new();

        let run = state.plan_command(ChannelCommand::new(80, Direction::Forward, 0), &config, RANGE);
        state.commit(run);
        let brake = state.plan_command(ChannelCommand::new(80, Direction::Forward, 100), &config, RANGE);
        state.commit(brake);

        // The release command carries speed 20; the earlier 80 is not restored
        let release = state.plan_command(ChannelCommand::new(20, Direction::Forward, 0), &config, RANGE);
        state.commit(release);
        assert_eq!(
            state.phase(),
            ChannelPhase::Running {
                direction: Direction::Forward,
                duty: 36,
            }
        );
    }

    #[test]
    fn test_stop_keeps_applied_direction() {
        let config = config();
        let mut state = ChannelState::new();

        let run = state.plan_command(ChannelCommand::new(50, Direction::Reverse, 0), &config, RANGE);
        state.commit(run);

        let stop = state.plan_stop(&config, RANGE);
        assert_eq!(stop.raw.direction, Level::High);
        assert_eq!(stop.raw.speed_duty, 0);
        assert_eq!(stop.raw.brake, BrakeOutput::Level(Level::High));
        assert_eq!(stop.command.direction, Direction::Reverse);
    }

    #[test]
    fn test_fault_marks_unknown() {
        let config = config();
        let mut state = ChannelState::new();

        let run = state.plan_command(ChannelCommand::new(50, Direction::Forward, 0), &config, RANGE);
        state.commit(run);
        assert!(state.is_known());

        let next = state.plan_command(ChannelCommand::new(90, Direction::Forward, 0), &config, RANGE);
        state.fault(next);
        assert!(!state.is_known());
        assert_eq!(state.requested().speed, 90);

        // A successful stop brings the outputs back to a known state
        let stop = state.plan_stop(&config, RANGE);
        state.commit(stop);
        assert!(state.is_known());
        assert_eq!(state.phase(), ChannelPhase::Braking);
    }
}
