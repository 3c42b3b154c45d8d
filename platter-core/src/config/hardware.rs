//! Hardware configuration types
//!
//! Channel layout, pin assignments, and the top-level configuration.

use core::fmt;

use heapless::Vec;
use platter_hal::PinId;

use super::types::{ActuationConfig, BrakeMode, PwmConfig};

/// Maximum channels per config
pub const MAX_CHANNELS: usize = 8;

/// Default control time-box: 2 minutes
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Default timeout check interval
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

/// Channel (motor) identifier, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(pub u8);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pins driving one motor
///
/// The handles are opaque to the core; only the pin driver interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPins {
    /// Speed PWM output (hardware PWM capable)
    pub speed: PinId,
    /// Brake output (digital or PWM, see [`BrakeMode`])
    pub brake: PinId,
    /// Direction output
    pub direction: PinId,
}

impl ChannelPins {
    /// Create a pin assignment from raw handles
    pub const fn new(speed: u8, brake: u8, direction: u8) -> Self {
        Self {
            speed: PinId(speed),
            brake: PinId(brake),
            direction: PinId(direction),
        }
    }

    fn iter(&self) -> impl Iterator<Item = PinId> {
        [self.speed, self.brake, self.direction].into_iter()
    }
}

/// Channel hardware configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Channel identifier
    pub id: ChannelId,
    /// Pin assignment
    pub pins: ChannelPins,
    /// Duty mapping and brake parameters
    pub actuation: ActuationConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No channels configured
    NoChannels,
    /// More than [`MAX_CHANNELS`] channels
    TooManyChannels,
    /// Channel id 0 is reserved
    ZeroChannelId,
    /// The same channel id appears twice
    DuplicateChannel(ChannelId),
    /// The same pin is assigned twice
    DuplicatePin(PinId),
    /// PWM range of zero
    ZeroPwmRange,
    /// PWM frequency of zero
    ZeroPwmFrequency,
    /// Control timeout of zero
    ZeroTimeout,
    /// Tick interval of zero
    ZeroTickInterval,
    /// Digital brake threshold above 100
    ThresholdOutOfRange(ChannelId),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoChannels => f.write_str("no channels configured"),
            ConfigError::TooManyChannels => {
                write!(f, "more than {} channels configured", MAX_CHANNELS)
            }
            ConfigError::ZeroChannelId => f.write_str("channel id 0 is not allowed"),
            ConfigError::DuplicateChannel(id) => write!(f, "channel {} defined twice", id),
            ConfigError::DuplicatePin(pin) => write!(f, "pin {} assigned twice", pin),
            ConfigError::ZeroPwmRange => f.write_str("pwm range must be greater than zero"),
            ConfigError::ZeroPwmFrequency => {
                f.write_str("pwm frequency must be greater than zero")
            }
            ConfigError::ZeroTimeout => f.write_str("control timeout must be greater than zero"),
            ConfigError::ZeroTickInterval => {
                f.write_str("tick interval must be greater than zero")
            }
            ConfigError::ThresholdOutOfRange(id) => {
                write!(f, "channel {} brake threshold above 100", id)
            }
        }
    }
}

/// Complete controller configuration
///
/// Read once at startup; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatterConfig {
    /// Channel configurations
    pub channels: Vec<ChannelConfig, MAX_CHANNELS>,
    /// Shared PWM settings
    pub pwm: PwmConfig,
    /// Control time-box per session (ms)
    pub timeout_ms: u64,
    /// Interval between timeout checks (ms)
    pub tick_interval_ms: u64,
}

impl Default for PlatterConfig {
    /// Three-channel Pi Zero 2 W wiring
    fn default() -> Self {
        let mut channels = Vec::new();
        for (id, pins) in [
            (1, ChannelPins::new(18, 23, 24)),
            (2, ChannelPins::new(13, 25, 8)),
            (3, ChannelPins::new(12, 16, 7)),
        ] {
            let _ = channels.push(ChannelConfig {
                id: ChannelId(id),
                pins,
                actuation: ActuationConfig::default(),
            });
        }

        Self {
            channels,
            pwm: PwmConfig::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl PlatterConfig {
    /// Create a configuration without channels
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            ..Self::default()
        }
    }

    /// Find a channel by id
    pub fn find_channel(&self, id: ChannelId) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Add a channel
    pub fn add_channel(&mut self, channel: ChannelConfig) -> Result<(), ConfigError> {
        self.channels
            .push(channel)
            .map_err(|_| ConfigError::TooManyChannels)
    }

    /// Check the configuration for inconsistencies
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        if self.pwm.range == 0 {
            return Err(ConfigError::ZeroPwmRange);
        }
        if self.pwm.frequency_hz == 0 {
            return Err(ConfigError::ZeroPwmFrequency);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }

        for (i, channel) in self.channels.iter().enumerate() {
            if channel.id.0 == 0 {
                return Err(ConfigError::ZeroChannelId);
            }
            if let BrakeMode::Digital {
                apply_threshold, ..
            } = channel.actuation.brake
            {
                if apply_threshold > 100 {
                    return Err(ConfigError::ThresholdOutOfRange(channel.id));
                }
            }

            let earlier = &self.channels[..i];
            if earlier.iter().any(|c| c.id == channel.id) {
                return Err(ConfigError::DuplicateChannel(channel.id));
            }
            for (j, pin) in channel.pins.iter().enumerate() {
                let reused_here = channel.pins.iter().take(j).any(|p| p == pin);
                let reused_earlier = earlier.iter().any(|c| c.pins.iter().any(|p| p == pin));
                if reused_here || reused_earlier {
                    return Err(ConfigError::DuplicatePin(pin));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::DutyRange;

    fn channel(id: u8, pins: ChannelPins) -> ChannelConfig {
        ChannelConfig {
            id: ChannelId(id),
            pins,
            actuation: ActuationConfig::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = PlatterConfig::default();
        assert_eq!(config.channels.len(), 3);
        assert_eq!(config.timeout_ms, 120_000);
        assert_eq!(config.validate(), Ok(()));

        let ch2 = config.find_channel(ChannelId(2)).unwrap();
        assert_eq!(ch2.pins, ChannelPins::new(13, 25, 8));
        assert!(config.find_channel(ChannelId(4)).is_none());
    }

    #[test]
    fn test_empty_config() {
        let config = PlatterConfig::new();
        assert!(config.channels.is_empty());
        assert_eq!(config.validate(), Err(ConfigError::NoChannels));
    }

    #[test]
    fn test_duplicate_channel() {
        let mut config = PlatterConfig::new();
        config.add_channel(channel(1, ChannelPins::new(1, 2, 3))).unwrap();
        config.add_channel(channel(1, ChannelPins::new(4, 5, 6))).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateChannel(ChannelId(1)))
        );
    }

    #[test]
    fn test_duplicate_pin_across_channels() {
        let mut config = PlatterConfig::new();
        config.add_channel(channel(1, ChannelPins::new(1, 2, 3))).unwrap();
        config.add_channel(channel(2, ChannelPins::new(4, 3, 6))).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(PinId(3))));
    }

    #[test]
    fn test_duplicate_pin_within_channel() {
        let mut config = PlatterConfig::new();
        config.add_channel(channel(1, ChannelPins::new(1, 1, 3))).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(PinId(1))));
    }

    #[test]
    fn test_rejects_zero_values() {
        let mut config = PlatterConfig::default();
        config.timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));

        let mut config = PlatterConfig::default();
        config.pwm.range = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPwmRange));

        let mut config = PlatterConfig::default();
        config.tick_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickInterval));

        let mut config = PlatterConfig::new();
        config.add_channel(channel(0, ChannelPins::new(1, 2, 3))).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::ZeroChannelId));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = PlatterConfig::new();
        let mut ch = channel(1, ChannelPins::new(1, 2, 3));
        ch.actuation = ActuationConfig {
            speed_duty: DutyRange::new(0, 255),
            brake: BrakeMode::digital(101),
        };
        config.add_channel(ch).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigError::ThresholdOutOfRange(ChannelId(1)))
        );
    }

    #[test]
    fn test_too_many_channels() {
        let mut config = PlatterConfig::new();
        for i in 0..MAX_CHANNELS as u8 {
            config
                .add_channel(channel(i + 1, ChannelPins::new(i * 3, i * 3 + 1, i * 3 + 2)))
                .unwrap();
        }
        assert_eq!(
            config.add_channel(channel(99, ChannelPins::new(90, 91, 92))),
            Err(ConfigError::TooManyChannels)
        );
    }
}
