use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::clients::{
    CatalogClient, FirebaseStore, TrackStore,
    entities::{ArtistQuery, SavedTrack},
    errors::{CatalogStage, Error, Result},
};

/// Notice shown when a search is submitted without an artist name
pub const EMPTY_QUERY_NOTICE: &str = "Please enter an artist name";

// Configuration for the WorkflowController
pub struct Config {
    pub catalog: CatalogClient,
    pub store: Arc<dyn TrackStore>,
}

#[derive(Default)]
pub struct ConfigBuilder {
    catalog: Option<CatalogClient>,
    store: Option<Arc<dyn TrackStore>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn catalog(mut self, catalog: CatalogClient) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn TrackStore>) -> Self {
        self.store = Some(store);
        self
    }

    // Missing parts are built from environment variables
    pub fn build(self) -> Result<Config> {
        let catalog = match self.catalog {
            Some(c) => c,
            None => CatalogClient::try_default()?,
        };
        let store = match self.store {
            Some(s) => s,
            None => Arc::new(FirebaseStore::try_default()?),
        };
        Ok(Config { catalog, store })
    }
}

/// Which of the two screens is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Search,
    SavedList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(String),
    /// Already saved during this session, the store was not called
    AlreadyAdded,
    /// The label is the placeholder of a failed search, not a track
    NotATrack,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The store rejected the removal and the record was put back
    Restored,
}

/// Text shown in place of the result list when a search fails
pub fn placeholder_for(err: &Error) -> String {
    match err {
        Error::EmptyQuery => EMPTY_QUERY_NOTICE.to_string(),
        Error::ArtistNotFound(_) => "No artist found".to_string(),
        Error::Transport {
            stage: CatalogStage::ArtistSearch,
            source,
        } => format!("Failed to fetch artist: {source}"),
        Error::Transport {
            stage: CatalogStage::TopTracks,
            source,
        } => format!("Failed to fetch tracks: {source}"),
        Error::Parse {
            stage: CatalogStage::ArtistSearch,
            ..
        } => "Error parsing response".to_string(),
        Error::Parse {
            stage: CatalogStage::TopTracks,
            ..
        } => "Error parsing tracks".to_string(),
        other => other.to_string(),
    }
}

/// Session state behind the search and saved-list screens.
///
/// Every action completes its request before it touches the state, and
/// failures never escape: they end up as a placeholder entry, a notice or a
/// log line.
pub struct WorkflowController {
    catalog: CatalogClient,
    store: Arc<dyn TrackStore>,
    view: View,
    // Labels of the last search, or the placeholder that replaced them
    track_results: std::result::Result<Vec<String>, String>,
    saved_tracks: Vec<SavedTrack>,
    // Labels saved during this session. The store stays authoritative.
    added_tracks: HashSet<String>,
    notice: Option<String>,
}

impl WorkflowController {
    pub fn new(config: Config) -> Self {
        WorkflowController {
            catalog: config.catalog,
            store: config.store,
            view: View::Search,
            track_results: Ok(Vec::new()),
            saved_tracks: Vec::new(),
            added_tracks: HashSet::new(),
            notice: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Rows of the search view: the found tracks or a single placeholder
    pub fn track_results(&self) -> &[String] {
        match &self.track_results {
            Ok(labels) => labels,
            Err(placeholder) => std::slice::from_ref(placeholder),
        }
    }

    /// Tracks of the last search that can be added. Empty after a failure.
    pub fn found_tracks(&self) -> &[String] {
        match &self.track_results {
            Ok(labels) => labels,
            Err(_) => &[],
        }
    }

    pub fn search_error(&self) -> Option<&str> {
        self.track_results.as_ref().err().map(String::as_str)
    }

    pub fn saved_tracks(&self) -> &[SavedTrack] {
        &self.saved_tracks
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_added(&self, label: &str) -> bool {
        self.added_tracks.contains(label)
    }

    pub async fn submit_search(&mut self, name: &str) {
        if let Err(err) = ArtistQuery::parse(name) {
            debug!("Ignoring search: {err}");
            self.notice = Some(placeholder_for(&err));
            return;
        }
        self.notice = None;

        self.track_results = match self.catalog.fetch_tracks_for_artist(name).await {
            Ok(tracks) => {
                info!("Found {} top tracks for {name:?}", tracks.len());
                Ok(tracks.iter().map(|t| t.label()).collect())
            }
            Err(err) => {
                match &err {
                    Error::ArtistNotFound(_) => info!("{err}"),
                    _ => error!("Search for {name:?} failed: {err}"),
                }
                Err(placeholder_for(&err))
            }
        };
    }

    pub async fn add_track(&mut self, label: &str) -> AddOutcome {
        self.notice = None;
        if self.search_error() == Some(label) {
            warn!("Refusing to save search placeholder {label:?}");
            return AddOutcome::NotATrack;
        }
        if self.added_tracks.contains(label) {
            debug!("{label:?} was already added in this session");
            return AddOutcome::AlreadyAdded;
        }

        match self.store.add(label).await {
            Ok(id) => {
                info!("Track added: {label}");
                self.added_tracks.insert(label.to_string());
                AddOutcome::Added(id)
            }
            Err(err) => {
                error!("Failed to add track {label:?}: {err}");
                AddOutcome::Failed
            }
        }
    }

    pub async fn view_saved(&mut self) {
        self.notice = None;
        self.saved_tracks = match self.store.list().await {
            Ok(tracks) => tracks,
            Err(err) => {
                error!("Failed to fetch saved tracks: {err}");
                Vec::new()
            }
        };
        self.view = View::SavedList;
    }

    pub fn back_to_search(&mut self) {
        self.notice = None;
        self.saved_tracks.clear();
        self.view = View::Search;
    }

    // The record leaves the snapshot before the store answers. If the store
    // fails, it goes back where it was.
    pub async fn remove_track(&mut self, id: &str) -> RemoveOutcome {
        let removed = self
            .saved_tracks
            .iter()
            .position(|t| t.id == id)
            .map(|index| (index, self.saved_tracks.remove(index)));

        match self.store.remove(id).await {
            Ok(()) => {
                info!("Track removed: {id}");
                RemoveOutcome::Removed
            }
            Err(err) => {
                warn!("Failed to remove track {id}: {err}");
                if let Some((index, track)) = removed {
                    let index = index.min(self.saved_tracks.len());
                    self.saved_tracks.insert(index, track);
                }
                RemoveOutcome::Restored
            }
        }
    }
}
