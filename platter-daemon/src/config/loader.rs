//! Configuration loading
//!
//! Reads the configuration from a file given on the command line, or falls
//! back to the copy of platter.toml compiled into the binary.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use platter_core::config::{BrakeMode, ConfigError, PlatterConfig};

use super::file::ConfigFile;

/// Embedded default configuration (compiled into the binary)
pub const EMBEDDED_CONFIG: &str = include_str!("../../platter.toml");

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(ConfigError),
    #[error("[{section}] {key} does not apply to {mode} brake mode")]
    BrakeKeyMismatch {
        section: String,
        key: &'static str,
        mode: &'static str,
    },
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}

/// Parse and validate configuration text
pub fn parse_config(text: &str) -> Result<PlatterConfig, LoadError> {
    let file: ConfigFile = toml::from_str(text)?;
    file.into_config()
}

/// Load the configuration from `path`, or the embedded default if `None`
pub fn load_config(path: Option<&Path>) -> Result<PlatterConfig, LoadError> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            info!("Loading configuration from {}", path.display());
            parse_config(&text)?
        }
        None => {
            info!("Using embedded configuration");
            parse_config(EMBEDDED_CONFIG)?
        }
    };

    log_summary(&config);
    Ok(config)
}

fn log_summary(config: &PlatterConfig) {
    info!(
        "timeout {} ms, tick {} ms, pwm {} Hz range {}",
        config.timeout_ms, config.tick_interval_ms, config.pwm.frequency_hz, config.pwm.range
    );
    for channel in config.channels.iter() {
        let brake = match channel.actuation.brake {
            BrakeMode::Digital { .. } => "digital",
            BrakeMode::Pwm { .. } => "pwm",
        };
        info!(
            "channel {}: speed {} brake {} direction {}, speed duty {}..{}, {} brake",
            channel.id,
            channel.pins.speed,
            channel.pins.brake,
            channel.pins.direction,
            channel.actuation.speed_duty.min,
            channel.actuation.speed_duty.max,
            brake
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platter_core::config::{ChannelId, DutyRange};
    use platter_hal::{Level, PinId};

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = parse_config(EMBEDDED_CONFIG).unwrap();
        assert_eq!(config, PlatterConfig::default());
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config = parse_config(
            r#"
            [[channel]]
            id = 1
            speed_pin = 18
            brake_pin = 23
            direction_pin = 24
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout_ms, 120_000);
        assert_eq!(config.tick_interval_ms, 1_000);
        assert_eq!(config.channels.len(), 1);
        assert_eq!(
            config.channels[0].actuation.brake,
            BrakeMode::Pwm {
                duty: DutyRange::new(0, 255)
            }
        );
    }

    #[test]
    fn test_channel_overrides() {
        let config = parse_config(
            r#"
            timeout_secs = 30

            [brake]
            mode = "digital"
            active_level = "low"

            [[channel]]
            id = 1
            speed_pin = 18
            brake_pin = 23
            direction_pin = 24

            [[channel]]
            id = 2
            speed_pin = 13
            brake_pin = 25
            direction_pin = 8
            speed = { duty_max = 255 }
            brake = { apply_threshold = 50 }
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout_ms, 30_000);
        let ch1 = config.find_channel(ChannelId(1)).unwrap();
        assert_eq!(
            ch1.actuation.brake,
            BrakeMode::Digital {
                active_level: Level::Low,
                apply_threshold: 1,
            }
        );
        assert_eq!(ch1.actuation.speed_duty, DutyRange::new(0, 178));

        let ch2 = config.find_channel(ChannelId(2)).unwrap();
        assert_eq!(ch2.actuation.speed_duty, DutyRange::new(0, 255));
        assert_eq!(
            ch2.actuation.brake,
            BrakeMode::Digital {
                active_level: Level::Low,
                apply_threshold: 50,
            }
        );
    }

    #[test]
    fn test_rejects_unknown_key() {
        let err = parse_config("timeout_sec = 10").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_rejects_duplicate_pin() {
        let err = parse_config(
            r#"
            [[channel]]
            id = 1
            speed_pin = 18
            brake_pin = 23
            direction_pin = 24

            [[channel]]
            id = 2
            speed_pin = 24
            brake_pin = 25
            direction_pin = 8
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid(ConfigError::DuplicatePin(PinId(24)))
        ));
    }

    #[test]
    fn test_rejects_empty_config() {
        let err = parse_config("").unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::NoChannels)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: no channels configured"
        );
    }

    #[test]
    fn test_rejects_brake_key_of_other_mode() {
        let err = parse_config(
            r#"
            [brake]
            mode = "pwm"
            active_level = "low"

            [[channel]]
            id = 1
            speed_pin = 18
            brake_pin = 23
            direction_pin = 24
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::BrakeKeyMismatch {
                key: "active_level",
                mode: "pwm",
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "[brake] active_level does not apply to pwm brake mode"
        );

        let err = parse_config(
            r#"
            [[channel]]
            id = 2
            speed_pin = 13
            brake_pin = 25
            direction_pin = 8
            brake = { mode = "digital", duty_max = 200 }
            "#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[channel 2 brake] duty_max does not apply to digital brake mode"
        );
    }

    #[test]
    fn test_channel_mode_switch_ignores_inherited_keys() {
        let config = parse_config(
            r#"
            [brake]
            duty_max = 200

            [[channel]]
            id = 1
            speed_pin = 18
            brake_pin = 23
            direction_pin = 24
            brake = { mode = "digital" }
            "#,
        )
        .unwrap();
        assert_eq!(config.channels[0].actuation.brake, BrakeMode::digital(1));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/platter.toml"))).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
