//! Access queue
//!
//! Ordered list of sessions waiting for the controls. Index 0 is the
//! controller; everyone else waits in arrival order. The controller's
//! control window records when it took over, and the periodic [`tick`]
//! rotates a controller out once its time-box is used up and someone else
//! is waiting.
//!
//! All timestamps are monotonic milliseconds supplied by the caller.
//!
//! [`tick`]: AccessQueue::tick

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;

use log::warn;

/// Transport-assigned session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// When the current controller took over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlWindow {
    /// Session at index 0
    pub session: SessionId,
    /// Start of its control window (ms)
    pub started_ms: u64,
}

/// Queue of sessions plus the controller's window
#[derive(Debug, Clone)]
pub struct AccessQueue {
    sessions: VecDeque<SessionId>,
    window: Option<ControlWindow>,
    timeout_ms: u64,
}

impl AccessQueue {
    /// Create an empty queue with the given control time-box
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            sessions: VecDeque::new(),
            window: None,
            timeout_ms,
        }
    }

    /// Control time-box (ms)
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Add a session to the back of the queue
    ///
    /// Returns its position; 0 means it now holds the controls. Joining
    /// again returns the current position without reordering.
    pub fn join(&mut self, session: SessionId, now_ms: u64) -> usize {
        if let Some(position) = self.position_of(session) {
            return position;
        }

        self.sessions.push_back(session);
        let position = self.sessions.len() - 1;
        if position == 0 {
            self.start_window(now_ms);
        }
        position
    }

    /// Remove a session
    ///
    /// If it was the controller, the next session's window starts at
    /// `now_ms`. Returns the position the session held, `None` if it was
    /// not queued.
    pub fn leave(&mut self, session: SessionId, now_ms: u64) -> Option<usize> {
        let position = self.position_of(session)?;

        self.sessions.remove(position);
        if self.window.is_some_and(|w| w.session == session) {
            self.window = None;
        }
        if position == 0 {
            self.start_window(now_ms);
        }
        Some(position)
    }

    /// Check if a session holds the controls
    pub fn is_controller(&self, session: SessionId) -> bool {
        self.sessions.front() == Some(&session)
    }

    /// Session at index 0
    pub fn current_controller(&self) -> Option<SessionId> {
        self.sessions.front().copied()
    }

    /// Position of a session (0 = controller)
    pub fn position_of(&self, session: SessionId) -> Option<usize> {
        self.sessions.iter().position(|&s| s == session)
    }

    /// Number of queued sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if nobody is queued
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The controller's window
    pub fn control_window(&self) -> Option<ControlWindow> {
        self.window
    }

    /// Queue order, controller first
    pub fn sessions(&self) -> Vec<SessionId> {
        self.sessions.iter().copied().collect()
    }

    /// Timeout check
    ///
    /// With at least two sessions queued and the controller's time-box used
    /// up, the controller moves to the back (everyone else keeps their
    /// relative order), the new head's window starts at `now_ms`, and the
    /// evicted session is returned. A lone controller is never evicted.
    pub fn tick(&mut self, now_ms: u64) -> Option<SessionId> {
        if self.sessions.len() < 2 {
            return None;
        }

        let controller = *self.sessions.front()?;
        let window = match self.window {
            Some(window) if window.session == controller => window,
            _ => {
                warn!(
                    "controller {} has no control window, skipping timeout",
                    controller
                );
                return None;
            }
        };

        if now_ms.saturating_sub(window.started_ms) < self.timeout_ms {
            return None;
        }

        self.sessions.rotate_left(1);
        self.start_window(now_ms);
        Some(controller)
    }

    /// Time left in a controller's window
    ///
    /// `None` if the session is not the controller or nobody is waiting
    /// (no timeout applies then).
    pub fn time_remaining(&self, session: SessionId, now_ms: u64) -> Option<u64> {
        if !self.is_controller(session) || self.sessions.len() < 2 {
            return None;
        }

        match self.window {
            Some(window) if window.session == session => {
                let elapsed = now_ms.saturating_sub(window.started_ms);
                Some(self.timeout_ms.saturating_sub(elapsed))
            }
            _ => Some(self.timeout_ms),
        }
    }

    fn start_window(&mut self, now_ms: u64) {
        self.window = self.sessions.front().map(|&session| ControlWindow {
            session,
            started_ms: now_ms,
        });
    }
}
