//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod dispatch;
pub mod notify;
pub mod tick;

pub use dispatch::dispatch_task;
pub use notify::notify_task;
pub use tick::tick_task;

use embassy_time::Instant;

/// Monotonic milliseconds since the time driver started
pub fn now_ms() -> u64 {
    Instant::now().as_millis()
}
