use tokio::sync::oneshot;

use crate::services::ingestion::TickReport;

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("Ingestion service unavailable")]
    ServiceUnavailable,
}

/// Ingestion actor messages
pub enum IngestionMessage {
    /// Run a tick now, outside the regular cadence
    TriggerTick {
        reply: oneshot::Sender<TickReport>,
    },

    /// Stop the actor once the current batch has drained
    Shutdown { reply: oneshot::Sender<()> },
}
