//! Configuration file schema
//!
//! Mirrors the layout of platter.toml. Every key is optional; missing keys
//! fall back to the global section and then to the built-in defaults.
//! Unknown keys are rejected, and so are brake keys the section's brake
//! mode does not use (`active_level` under `mode = "pwm"`). Keys a channel
//! inherits from the global `[brake]` section are ignored if the channel
//! switches mode.

use serde::Deserialize;

use platter_core::config::{
    ActuationConfig, BrakeMode, ChannelConfig, ChannelId, ChannelPins, DutyRange,
    PlatterConfig, PwmConfig, DEFAULT_APPLY_THRESHOLD, DEFAULT_SPEED_DUTY_MAX,
    DEFAULT_TICK_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
use platter_hal::Level;

use super::loader::LoadError;

/// Top level of the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Control time-box per session, in seconds
    pub timeout_secs: Option<u64>,
    /// Interval between timeout checks
    pub tick_interval_ms: Option<u64>,
    #[serde(default)]
    pub pwm: PwmSection,
    #[serde(default)]
    pub speed: SpeedSection,
    #[serde(default)]
    pub brake: BrakeSection,
    #[serde(default, rename = "channel")]
    pub channels: Vec<ChannelSection>,
}

/// PWM settings shared by every channel
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PwmSection {
    pub frequency_hz: Option<u32>,
    pub range: Option<u16>,
}

/// Speed duty window
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeedSection {
    pub duty_min: Option<u16>,
    pub duty_max: Option<u16>,
}

/// Brake output settings
///
/// `duty_min`/`duty_max` apply to PWM mode, `active_level` and
/// `apply_threshold` to digital mode.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrakeSection {
    pub mode: Option<BrakeModeName>,
    pub duty_min: Option<u16>,
    pub duty_max: Option<u16>,
    pub active_level: Option<LevelName>,
    pub apply_threshold: Option<u8>,
}

/// `mode` key of a brake section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrakeModeName {
    Pwm,
    Digital,
}

impl BrakeModeName {
    /// Name as written in the file
    pub fn as_str(self) -> &'static str {
        match self {
            BrakeModeName::Pwm => "pwm",
            BrakeModeName::Digital => "digital",
        }
    }
}

/// `active_level` key of a digital brake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelName {
    High,
    Low,
}

impl From<LevelName> for Level {
    fn from(level: LevelName) -> Self {
        match level {
            LevelName::High => Level::High,
            LevelName::Low => Level::Low,
        }
    }
}

/// One `[[channel]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelSection {
    pub id: u8,
    pub speed_pin: u8,
    pub brake_pin: u8,
    pub direction_pin: u8,
    /// Overrides the global `[speed]` keys for this channel
    #[serde(default)]
    pub speed: SpeedSection,
    /// Overrides the global `[brake]` keys for this channel
    #[serde(default)]
    pub brake: BrakeSection,
}

impl SpeedSection {
    fn or(self, global: SpeedSection) -> SpeedSection {
        SpeedSection {
            duty_min: self.duty_min.or(global.duty_min),
            duty_max: self.duty_max.or(global.duty_max),
        }
    }

    fn resolve(self) -> DutyRange {
        DutyRange::new(
            self.duty_min.unwrap_or(0),
            self.duty_max.unwrap_or(DEFAULT_SPEED_DUTY_MAX),
        )
    }
}

impl BrakeSection {
    fn or(self, global: BrakeSection) -> BrakeSection {
        BrakeSection {
            mode: self.mode.or(global.mode),
            duty_min: self.duty_min.or(global.duty_min),
            duty_max: self.duty_max.or(global.duty_max),
            active_level: self.active_level.or(global.active_level),
            apply_threshold: self.apply_threshold.or(global.apply_threshold),
        }
    }

    fn mode(&self) -> BrakeModeName {
        self.mode.unwrap_or(BrakeModeName::Pwm)
    }

    /// First key set in this section that `mode` has no use for
    fn stray_key(&self, mode: BrakeModeName) -> Option<&'static str> {
        let keys = match mode {
            BrakeModeName::Pwm => [
                ("active_level", self.active_level.is_some()),
                ("apply_threshold", self.apply_threshold.is_some()),
            ],
            BrakeModeName::Digital => [
                ("duty_min", self.duty_min.is_some()),
                ("duty_max", self.duty_max.is_some()),
            ],
        };
        keys.into_iter().find(|&(_, set)| set).map(|(key, _)| key)
    }

    fn check(
        &self,
        section: impl FnOnce() -> String,
        mode: BrakeModeName,
    ) -> Result<(), LoadError> {
        match self.stray_key(mode) {
            Some(key) => Err(LoadError::BrakeKeyMismatch {
                section: section(),
                key,
                mode: mode.as_str(),
            }),
            None => Ok(()),
        }
    }

    fn resolve(self, range: u16) -> BrakeMode {
        match self.mode() {
            BrakeModeName::Pwm => BrakeMode::Pwm {
                duty: DutyRange::new(self.duty_min.unwrap_or(0), self.duty_max.unwrap_or(range)),
            },
            BrakeModeName::Digital => BrakeMode::Digital {
                active_level: self.active_level.map_or(Level::High, Level::from),
                apply_threshold: self.apply_threshold.unwrap_or(DEFAULT_APPLY_THRESHOLD),
            },
        }
    }
}

impl ConfigFile {
    /// Build and validate the runtime configuration
    pub fn into_config(self) -> Result<PlatterConfig, LoadError> {
        let defaults = PwmConfig::default();
        let pwm = PwmConfig {
            frequency_hz: self.pwm.frequency_hz.unwrap_or(defaults.frequency_hz),
            range: self.pwm.range.unwrap_or(defaults.range),
        };

        let mut config = PlatterConfig::new();
        config.pwm = pwm;
        config.timeout_ms = self
            .timeout_secs
            .map_or(DEFAULT_TIMEOUT_MS, |secs| secs.saturating_mul(1_000));
        config.tick_interval_ms = self.tick_interval_ms.unwrap_or(DEFAULT_TICK_INTERVAL_MS);

        self.brake.check(|| "brake".into(), self.brake.mode())?;

        for channel in &self.channels {
            let brake = channel.brake.or(self.brake);
            channel
                .brake
                .check(|| format!("channel {} brake", channel.id), brake.mode())?;

            config.add_channel(ChannelConfig {
                id: ChannelId(channel.id),
                pins: ChannelPins::new(channel.speed_pin, channel.brake_pin, channel.direction_pin),
                actuation: ActuationConfig {
                    speed_duty: channel.speed.or(self.speed).resolve(),
                    brake: brake.resolve(pwm.range),
                },
            })?;
        }

        config.validate()?;
        Ok(config)
    }
}
