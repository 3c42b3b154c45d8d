//! Inbound event dispatch
//!
//! Feeds session events from the transport (and the signal handler) into
//! the coordinator and queues the notifications it produces.

use log::info;

use platter_daemon::Dispatch;

use super::now_ms;
use crate::channels::{INBOUND, OUTBOUND, SHUTDOWN_DONE};
use crate::PlatterCoordinator;

/// Dispatch task - applies inbound events until shutdown
#[embassy_executor::task]
pub async fn dispatch_task(coordinator: &'static PlatterCoordinator) {
    info!("Dispatch task started");

    loop {
        let event = INBOUND.receive().await;

        match coordinator.dispatch(event, now_ms()) {
            Dispatch::Notify(notifications) => {
                for notification in notifications {
                    OUTBOUND.send(notification).await;
                }
            }
            Dispatch::Stopped(code) => {
                SHUTDOWN_DONE.signal(code);
                return;
            }
        }
    }
}
