use async_trait::async_trait;

use crate::clients::{entities::SavedTrack, errors::Result};

/// Name of the collection holding saved tracks
pub const SAVED_TRACKS_COLLECTION: &str = "saved_tracks";

/// Backend for the saved tracks collection. Every call is a single attempt;
/// failures are returned to the caller and never retried.
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Insert a new record and return the id the store assigned to it.
    async fn add(&self, label: &str) -> Result<String>;

    /// Delete a record. Deleting an id that does not exist succeeds.
    async fn remove(&self, id: &str) -> Result<()>;

    /// All current records. Records that cannot be read as a label are skipped.
    async fn list(&self) -> Result<Vec<SavedTrack>>;
}
