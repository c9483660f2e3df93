use std::collections::BTreeMap;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::clients::{
    entities::SavedTrack,
    errors::{Error, Result},
    store::{SAVED_TRACKS_COLLECTION, TrackStore},
};

// Characters Firebase does not allow in a key
const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

#[derive(Deserialize, Debug)]
struct PushResponse {
    name: String,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub auth: Option<String>,
    pub collection: String,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        StoreConfig {
            database_url: database_url.into().trim_end_matches('/').to_string(),
            auth: None,
            collection: SAVED_TRACKS_COLLECTION.to_string(),
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    pub fn try_default() -> Result<Self> {
        let database_url = std::env::var("FIREBASE_DATABASE_URL").map_err(|_| {
            Error::ConfigurationError(
                "FIREBASE_DATABASE_URL is not set. Use --memory for a session-only store.".into(),
            )
        })?;
        let mut config = StoreConfig::new(database_url);
        if let Ok(auth) = std::env::var("FIREBASE_AUTH") {
            config = config.with_auth(auth);
        }
        Ok(config)
    }
}

// The url carries the `auth` secret, keep it out of error messages and logs
fn store_request_error(err: reqwest::Error) -> Error {
    Error::StoreRequest(err.without_url())
}

/// Saved tracks kept in a Firebase Realtime Database, accessed over its REST API.
pub struct FirebaseStore {
    http: Client,
    config: StoreConfig,
}

impl FirebaseStore {
    pub fn new(config: StoreConfig) -> Self {
        FirebaseStore::with_http(config, Client::new())
    }

    pub fn with_http(config: StoreConfig, http: Client) -> Self {
        FirebaseStore { http, config }
    }

    pub fn try_default() -> Result<Self> {
        Ok(FirebaseStore::new(StoreConfig::try_default()?))
    }

    fn collection_url(&self) -> Result<Url> {
        self.url(None)
    }

    fn record_url(&self, id: &str) -> Result<Url> {
        self.url(Some(id))
    }

    // Path segments are percent-encoded, so any key maps to exactly one record
    fn url(&self, record: Option<&str>) -> Result<Url> {
        let invalid = || {
            Error::ConfigurationError(format!(
                "Invalid database url {:?}",
                self.config.database_url
            ))
        };
        let mut url = Url::parse(&self.config.database_url).map_err(|_| invalid())?;
        {
            let mut path = url.path_segments_mut().map_err(|()| invalid())?;
            path.pop_if_empty();
            match record {
                Some(id) => path
                    .push(&self.config.collection)
                    .push(&format!("{id}.json")),
                None => path.push(&format!("{}.json", self.config.collection)),
            };
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            Some(auth) => request.query(&[("auth", auth.as_str())]),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        self.authorized(request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(store_request_error)
    }
}

#[async_trait]
impl TrackStore for FirebaseStore {
    async fn add(&self, label: &str) -> Result<String> {
        let response = self
            .send(self.http.post(self.collection_url()?).json(label))
            .await?;
        let pushed: PushResponse = response.json().await.map_err(store_request_error)?;
        debug!("Stored {label:?} under {}", pushed.name);
        Ok(pushed.name)
    }

    async fn remove(&self, id: &str) -> Result<()> {
        if id.is_empty() || id.contains(FORBIDDEN_KEY_CHARS) {
            return Err(Error::StoreError(format!("Invalid record id {id:?}")));
        }
        self.send(self.http.delete(self.record_url(id)?)).await?;
        debug!("Removed record {id}");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SavedTrack>> {
        let response = self.send(self.http.get(self.collection_url()?)).await?;
        // An empty collection comes back as `null`
        let records: Option<BTreeMap<String, Value>> =
            response.json().await.map_err(store_request_error)?;

        let tracks = records
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(id, value)| match value {
                Value::String(label) => Some(SavedTrack::new(id, label)),
                other => {
                    warn!("Skipping malformed saved track {id}: {other}");
                    None
                }
            })
            .collect::<Vec<_>>();
        debug!("Listed {} saved tracks", tracks.len());
        Ok(tracks)
    }
}
