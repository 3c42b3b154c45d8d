//! Thread-safe access scheduler
//!
//! Wraps an [`AccessQueue`] in a single blocking mutex. Every operation
//! holds the lock for its whole duration, so joins, leaves, queries and
//! the periodic tick are linearizable and a tick can never rotate a session
//! that is being removed at the same time.
//!
//! The `*_with` variants run a closure before the lock is released. Work
//! that must not interleave with a change of controller (applying a
//! command, stopping the outputs on a handover) goes there.
//!
//! The raw mutex type is chosen by the application. On a hosted target use
//! `CriticalSectionRawMutex` with the `critical-section` std implementation.

use alloc::vec::Vec;
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use log::{debug, info};

use super::queue::{AccessQueue, ControlWindow, SessionId};

/// Shared access scheduler
pub struct AccessScheduler<M: RawMutex> {
    queue: Mutex<M, RefCell<AccessQueue>>,
    timeout_ms: u64,
}

impl<M: RawMutex> AccessScheduler<M> {
    /// Create a scheduler with the given control time-box
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            queue: Mutex::new(RefCell::new(AccessQueue::new(timeout_ms))),
            timeout_ms,
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut AccessQueue) -> R) -> R {
        self.queue.lock(|queue| f(&mut queue.borrow_mut()))
    }

    /// Control time-box (ms)
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Register a session; returns its position (0 = controlling)
    pub fn join(&self, session: SessionId, now_ms: u64) -> usize {
        let position = self.with(|q| q.join(session, now_ms));
        debug!("session {} at position {}", session, position);
        position
    }

    /// Remove a session
    ///
    /// Returns the position the session held. Does not notify anyone; the
    /// caller re-reads [`current_controller`](Self::current_controller)
    /// afterwards.
    pub fn leave(&self, session: SessionId, now_ms: u64) -> Option<usize> {
        self.leave_with(session, now_ms, |_| ())
            .map(|(position, ())| position)
    }

    /// Remove a session and run `f` with its former position under the lock
    pub fn leave_with<R>(
        &self,
        session: SessionId,
        now_ms: u64,
        f: impl FnOnce(usize) -> R,
    ) -> Option<(usize, R)> {
        let left = self.with(|q| {
            let position = q.leave(session, now_ms)?;
            Some((position, f(position)))
        });
        if let Some((position, _)) = &left {
            debug!("session {} left the queue from position {}", session, position);
        }
        left
    }

    /// Check if a session holds the controls
    pub fn is_controller(&self, session: SessionId) -> bool {
        self.with(|q| q.is_controller(session))
    }

    /// Run `f` while `session` holds the controls
    ///
    /// No tick or leave can move the controls until `f` returns. `None` if
    /// `session` is not the controller.
    pub fn with_controller<R>(&self, session: SessionId, f: impl FnOnce() -> R) -> Option<R> {
        self.with(|q| q.is_controller(session).then(f))
    }

    /// Session currently holding the controls
    pub fn current_controller(&self) -> Option<SessionId> {
        self.with(|q| q.current_controller())
    }

    /// Position of a session, `None` if not queued
    pub fn position_of(&self, session: SessionId) -> Option<usize> {
        self.with(|q| q.position_of(session))
    }

    /// Number of queued sessions
    pub fn len(&self) -> usize {
        self.with(|q| q.len())
    }

    /// Check if nobody is queued
    pub fn is_empty(&self) -> bool {
        self.with(|q| q.is_empty())
    }

    /// Snapshot of the queue order, controller first
    pub fn sessions(&self) -> Vec<SessionId> {
        self.with(|q| q.sessions())
    }

    /// The controller's window
    pub fn control_window(&self) -> Option<ControlWindow> {
        self.with(|q| q.control_window())
    }

    /// Periodic timeout check; returns the evicted session
    pub fn tick(&self, now_ms: u64) -> Option<SessionId> {
        self.tick_with(now_ms, |_| ()).map(|(session, ())| session)
    }

    /// Periodic timeout check running `handover` before anyone can act as
    /// the new controller
    pub fn tick_with<R>(
        &self,
        now_ms: u64,
        handover: impl FnOnce(SessionId) -> R,
    ) -> Option<(SessionId, R)> {
        let evicted = self.with(|q| {
            let session = q.tick(now_ms)?;
            Some((session, handover(session)))
        });
        if let Some((session, _)) = &evicted {
            info!("session {} timed out after {} ms", session, self.timeout_ms);
        }
        evicted
    }

    /// Time left in a controller's window
    pub fn time_remaining(&self, session: SessionId, now_ms: u64) -> Option<u64> {
        self.with(|q| q.time_remaining(session, now_ms))
    }
}
