//! Handle on a background notification delivery.

use notifications::{NotificationDispatcher, NotificationReport, OrderNotice};
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Background delivery of an order's notifications.
///
/// The delivery runs to completion whether or not the handle is kept; dropping or detaching
/// it never cancels the task.
#[derive(Debug)]
pub struct NotificationTask {
    handle: JoinHandle<NotificationReport>,
}

impl NotificationTask {
    pub(crate) fn spawn(dispatcher: NotificationDispatcher, notice: OrderNotice) -> Self {
        let handle = tokio::spawn(
            async move { dispatcher.notify(&notice).await }.in_current_span(),
        );
        Self { handle }
    }

    /// Waits for delivery to finish.
    ///
    /// Returns `None` if the task panicked.
    pub async fn wait(self) -> Option<NotificationReport> {
        match self.handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(error = %e, "Notification task did not complete");
                None
            }
        }
    }

    /// Lets the delivery finish on its own.
    pub fn detach(self) {
        drop(self.handle);
    }
}
