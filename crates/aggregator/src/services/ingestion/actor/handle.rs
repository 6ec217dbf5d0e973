use tokio::sync::{mpsc, oneshot};

use super::messages::{IngestionError, IngestionMessage};
use crate::services::ingestion::TickReport;

/// Public interface of the ingestion actor
///
/// Messages are handled between ticks, so a call made while a batch is in
/// flight waits for that batch to finish.
#[derive(Clone)]
pub struct IngestionHandle {
    sender: mpsc::Sender<IngestionMessage>,
}

impl IngestionHandle {
    pub fn new(sender: mpsc::Sender<IngestionMessage>) -> Self {
        Self { sender }
    }

    /// Run a tick immediately and return its report
    pub async fn trigger(&self) -> Result<TickReport, IngestionError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(IngestionMessage::TriggerTick { reply })
            .await
            .map_err(|_| IngestionError::ServiceUnavailable)?;
        rx.await.map_err(|_| IngestionError::ServiceUnavailable)
    }

    /// Stop the scheduler. Returns after in-flight work has drained; a
    /// scheduler that already stopped is not an error.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self
            .sender
            .send(IngestionMessage::Shutdown { reply })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }
}
