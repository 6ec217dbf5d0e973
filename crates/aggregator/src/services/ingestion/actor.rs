mod handle;
mod messages;
mod runner;

pub use handle::IngestionHandle;
pub use messages::{IngestionError, IngestionMessage};
pub use runner::{spawn_ingestion_actor, IngestionActor};
