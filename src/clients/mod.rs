/// Spotify catalog client: artist search and top tracks
pub mod catalog;
/// Data entities for tracks, artists and saved records
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Saved tracks in a Firebase Realtime Database
pub mod firebase;
/// Saved tracks kept in memory for the current session
pub mod memory_store;
/// Storage trait for the saved tracks collection
pub mod store;

pub use catalog::{CatalogClient, CatalogConfig};
pub use firebase::{FirebaseStore, StoreConfig};
pub use memory_store::MemoryStore;
pub use store::TrackStore;
