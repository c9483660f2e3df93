//! Trackshelf - look up an artist's top tracks and keep a list of saved ones
//!
//! This library fetches top tracks from the Spotify Web API and stores the
//! tracks a user picks in a Firebase Realtime Database collection.

/// Client modules for the catalog API and the saved tracks store
pub mod clients;
/// Search and saved-list workflow driven by the presentation layer
pub mod workflow;
