//! Tick task for the control time-box
//!
//! Checks the controller's window at a fixed cadence and forwards the
//! resulting handover notifications.

use embassy_time::{Duration, Ticker};
use log::{info, trace};

use super::now_ms;
use crate::channels::OUTBOUND;
use crate::PlatterCoordinator;

/// Tick task - periodic timeout check
#[embassy_executor::task]
pub async fn tick_task(coordinator: &'static PlatterCoordinator, interval_ms: u64) {
    info!("Tick task started ({} ms)", interval_ms);

    let mut ticker = Ticker::every(Duration::from_millis(interval_ms));

    loop {
        ticker.next().await;

        let now_ms = now_ms();
        trace!("tick at {} ms", now_ms);
        for notification in coordinator.tick(now_ms) {
            OUTBOUND.send(notification).await;
        }
    }
}
