//! Actuation errors

use core::fmt;

use platter_core::config::{ChannelId, ConfigError};
use platter_hal::PinError;

/// Actuation layer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationError {
    /// The configuration was rejected at startup
    InvalidConfig(ConfigError),
    /// The channel is not configured
    InvalidChannel(ChannelId),
    /// A pin write failed; the channel's outputs are unknown
    Fault {
        /// Affected channel
        channel: ChannelId,
        /// Underlying pin error
        error: PinError,
    },
    /// The pin driver could not be released
    ReleaseFailed(PinError),
}

impl ActuationError {
    /// Channel the error refers to, if any
    pub fn channel(&self) -> Option<ChannelId> {
        match *self {
            ActuationError::InvalidConfig(_) | ActuationError::ReleaseFailed(_) => None,
            ActuationError::InvalidChannel(channel) | ActuationError::Fault { channel, .. } => {
                Some(channel)
            }
        }
    }
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuationError::InvalidConfig(e) => write!(f, "invalid configuration: {}", e),
            ActuationError::InvalidChannel(id) => write!(f, "invalid channel {}", id),
            ActuationError::Fault { channel, error } => {
                write!(f, "channel {} apply failed: {}", channel, error)
            }
            ActuationError::ReleaseFailed(e) => write!(f, "pin release failed: {}", e),
        }
    }
}

impl From<ConfigError> for ActuationError {
    fn from(e: ConfigError) -> Self {
        ActuationError::InvalidConfig(e)
    }
}
