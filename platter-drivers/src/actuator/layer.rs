//! Actuation layer
//!
//! Every channel sits behind its own blocking mutex, so two commands for
//! the same channel are strictly serialized and a channel's three writes
//! never interleave with another command. The pin driver is a single
//! shared resource behind a second mutex; it is always locked after a
//! channel lock, never before.
//!
//! How much runs in parallel depends on the raw mutex. With
//! `CriticalSectionRawMutex` on the `critical-section` std backend every
//! lock is the same process-wide critical section, so all actuation (and
//! the scheduler) is serialized.
//!
//! A channel whose write failed keeps its requested state but its outputs
//! become unknown until the next successful command or stop.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;
use log::{debug, info, warn};

use platter_core::actuation::{BrakeOutput, ChannelCommand, ChannelState, RawState, Transition};
use platter_core::config::{
    BrakeMode, ChannelConfig, ChannelId, ChannelPins, ConfigError, PlatterConfig, PwmConfig,
    MAX_CHANNELS,
};
use platter_hal::{PinDriver, PinError};

use super::error::ActuationError;

struct Slot<M: RawMutex> {
    config: ChannelConfig,
    state: Mutex<M, RefCell<ChannelState>>,
}

struct Pins<D> {
    driver: D,
    released: bool,
}

/// Owner of every channel's state and of the pin driver
pub struct ActuationLayer<M: RawMutex, D: PinDriver> {
    slots: Vec<Slot<M>, MAX_CHANNELS>,
    pins: Mutex<M, RefCell<Pins<D>>>,
    range: u16,
}

impl<M: RawMutex, D: PinDriver> ActuationLayer<M, D> {
    /// Take over the pin driver and bring every channel into the braking state
    ///
    /// Sets PWM frequency and range on each channel's speed output (and on
    /// the brake output in PWM brake mode), then applies the safe stop.
    pub fn new(config: &PlatterConfig, driver: D) -> Result<Self, ActuationError> {
        config.validate()?;

        let mut slots = Vec::new();
        for channel in config.channels.iter() {
            let slot = Slot {
                config: *channel,
                state: Mutex::new(RefCell::new(ChannelState::new())),
            };
            if slots.push(slot).is_err() {
                return Err(ConfigError::TooManyChannels.into());
            }
        }

        let layer = Self {
            slots,
            pins: Mutex::new(RefCell::new(Pins {
                driver,
                released: false,
            })),
            range: config.pwm.range,
        };

        for slot in layer.slots.iter() {
            layer
                .configure_pwm(&slot.config, &config.pwm)
                .map_err(|error| ActuationError::Fault {
                    channel: slot.config.id,
                    error,
                })?;
            layer.stop_slot(slot)?;
        }

        info!(
            "actuation ready: {} channels, pwm {} Hz range {}",
            layer.slots.len(),
            config.pwm.frequency_hz,
            config.pwm.range
        );
        Ok(layer)
    }

    /// PWM range shared by all channels
    pub fn range(&self) -> u16 {
        self.range
    }

    /// Configured channel ids, in configuration order
    pub fn channel_ids(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.slots.iter().map(|slot| slot.config.id)
    }

    /// Static configuration of a channel
    pub fn channel_config(&self, id: ChannelId) -> Option<&ChannelConfig> {
        self.find(id).ok().map(|slot| &slot.config)
    }

    /// Snapshot of a channel's state
    pub fn channel_state(&self, id: ChannelId) -> Option<ChannelState> {
        let slot = self.find(id).ok()?;
        Some(slot.state.lock(|state| *state.borrow()))
    }

    /// Apply a command to one channel
    ///
    /// Speed and brake are clamped into 0-100 first. Returns the raw outputs
    /// that were written.
    pub fn set_channel(
        &self,
        id: ChannelId,
        command: ChannelCommand,
    ) -> Result<RawState, ActuationError> {
        let slot = self.find(id)?;
        slot.state.lock(|state| {
            let mut state = state.borrow_mut();
            let transition = state.plan_command(command, &slot.config.actuation, self.range);
            self.apply(&slot.config, &mut state, transition)
        })
    }

    /// Force one channel to speed zero with the brake fully engaged
    pub fn stop_channel(&self, id: ChannelId) -> Result<RawState, ActuationError> {
        let slot = self.find(id)?;
        self.stop_slot(slot)
    }

    /// Stop every channel
    ///
    /// Every channel is attempted even if an earlier one fails; the first
    /// failure is returned.
    pub fn stop_all(&self) -> Result<(), ActuationError> {
        let mut first_error = None;
        for slot in self.slots.iter() {
            if let Err(e) = self.stop_slot(slot) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("all channels stopped");
                Ok(())
            }
        }
    }

    /// Stop every channel and release the pin driver
    ///
    /// Safe to call more than once; later calls do nothing.
    pub fn shutdown(&self) -> Result<(), ActuationError> {
        if self.is_released() {
            return Ok(());
        }

        let stopped = self.stop_all();
        let released = self.pins.lock(|pins| {
            let mut pins = pins.borrow_mut();
            if pins.released {
                return Ok(());
            }
            pins.released = true;
            pins.driver.release()
        });

        info!("actuation shut down");
        stopped?;
        released.map_err(|error| {
            warn!("pin driver release failed: {}", error);
            ActuationError::ReleaseFailed(error)
        })
    }

    /// Check if [`shutdown`](Self::shutdown) released the pin driver
    pub fn is_released(&self) -> bool {
        self.pins.lock(|pins| pins.borrow().released)
    }

    /// Run a closure with exclusive access to the pin driver
    pub fn with_driver<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        self.pins.lock(|pins| f(&mut pins.borrow_mut().driver))
    }

    fn find(&self, id: ChannelId) -> Result<&Slot<M>, ActuationError> {
        self.slots
            .iter()
            .find(|slot| slot.config.id == id)
            .ok_or(ActuationError::InvalidChannel(id))
    }

    fn stop_slot(&self, slot: &Slot<M>) -> Result<RawState, ActuationError> {
        slot.state.lock(|state| {
            let mut state = state.borrow_mut();
            let transition = state.plan_stop(&slot.config.actuation, self.range);
            self.apply(&slot.config, &mut state, transition)
        })
    }

    /// Write a transition and record its outcome; caller holds the channel lock
    fn apply(
        &self,
        config: &ChannelConfig,
        state: &mut ChannelState,
        transition: Transition,
    ) -> Result<RawState, ActuationError> {
        match self.write_raw(config.pins, transition.raw) {
            Ok(()) => {
                state.commit(transition);
                debug!("channel {}: {:?}", config.id, transition.raw);
                Ok(transition.raw)
            }
            Err(error) => {
                state.fault(transition);
                warn!("channel {} apply failed: {}", config.id, error);
                Err(ActuationError::Fault {
                    channel: config.id,
                    error,
                })
            }
        }
    }

    fn write_raw(&self, pins: ChannelPins, raw: RawState) -> Result<(), PinError> {
        self.with_live_driver(|driver| {
            driver.set_level(pins.direction, raw.direction)?;
            driver.set_duty(pins.speed, raw.speed_duty)?;
            match raw.brake {
                BrakeOutput::Level(level) => driver.set_level(pins.brake, level),
                BrakeOutput::Duty(duty) => driver.set_duty(pins.brake, duty),
            }
        })
    }

    fn configure_pwm(&self, config: &ChannelConfig, pwm: &PwmConfig) -> Result<(), PinError> {
        let pwm_brake = matches!(config.actuation.brake, BrakeMode::Pwm { .. });
        self.with_live_driver(|driver| {
            driver.set_frequency(config.pins.speed, pwm.frequency_hz)?;
            driver.set_range(config.pins.speed, pwm.range)?;
            if pwm_brake {
                driver.set_frequency(config.pins.brake, pwm.frequency_hz)?;
                driver.set_range(config.pins.brake, pwm.range)?;
            }
            Ok(())
        })
    }

    fn with_live_driver(
        &self,
        f: impl FnOnce(&mut D) -> Result<(), PinError>,
    ) -> Result<(), PinError> {
        self.pins.lock(|pins| {
            let mut pins = pins.borrow_mut();
            if pins.released {
                return Err(PinError::Released);
            }
            f(&mut pins.driver)
        })
    }
}
