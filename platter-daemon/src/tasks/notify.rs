//! Notification sink
//!
//! Drains the outbound queue. Without a transport attached the
//! notifications are only logged.

use log::info;

use crate::channels::OUTBOUND;

/// Notify task - delivers outbound notifications
#[embassy_executor::task]
pub async fn notify_task() {
    info!("Notify task started");

    loop {
        let notification = OUTBOUND.receive().await;
        info!("{}", notification);
    }
}
