use futures::TryFutureExt;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::clients::{
    entities::{Artist, ArtistId, ArtistQuery, Track},
    errors::{CatalogStage, Error, Result},
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com";
pub const DEFAULT_MARKET: &str = "US";

#[derive(Deserialize, Debug)]
struct ApiArtistRef {
    id: String,
}

#[derive(Deserialize, Debug)]
struct ArtistPage {
    items: Vec<ApiArtistRef>,
}

#[derive(Deserialize, Debug)]
struct ArtistSearchResponse {
    artists: ArtistPage,
}

#[derive(Deserialize, Debug)]
struct ApiArtist {
    name: String,
}

#[derive(Deserialize, Debug)]
struct ApiTrack {
    name: String,
    artists: Vec<ApiArtist>,
}

#[derive(Deserialize, Debug)]
struct TopTracksResponse {
    tracks: Vec<ApiTrack>,
}

impl TryFrom<ApiTrack> for Track {
    type Error = Error;

    fn try_from(t: ApiTrack) -> Result<Track> {
        let artist = t.artists.into_iter().next().ok_or_else(|| Error::Parse {
            stage: CatalogStage::TopTracks,
            detail: format!("track {:?} has no artists", t.name),
        })?;
        Ok(Track {
            name: t.name,
            artist: Artist { name: artist.name },
        })
    }
}

/// Connection settings for the catalog API. The bearer token is used as is;
/// obtaining or refreshing it is up to the caller.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub token: String,
    pub base_url: String,
    pub market: String,
}

impl CatalogConfig {
    pub fn new(token: impl Into<String>) -> Self {
        CatalogConfig {
            token: token.into(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            market: DEFAULT_MARKET.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    // Build the config from environment variables or raise a configuration error
    pub fn try_default() -> Result<Self> {
        let token = std::env::var("SPOTIFY_ACCESS_TOKEN").map_err(|_| {
            Error::ConfigurationError(
                "SPOTIFY_ACCESS_TOKEN is not set. Check README.md for details.".into(),
            )
        })?;
        let mut config = CatalogConfig::new(token);
        if let Ok(base_url) = std::env::var("SPOTIFY_API_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(market) = std::env::var("SPOTIFY_MARKET") {
            config = config.with_market(market);
        }
        Ok(config)
    }
}

pub struct CatalogClient {
    http: Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Self {
        CatalogClient::with_http(config, Client::new())
    }

    pub fn with_http(config: CatalogConfig, http: Client) -> Self {
        CatalogClient { http, config }
    }

    pub fn try_default() -> Result<Self> {
        Ok(CatalogClient::new(CatalogConfig::try_default()?))
    }

    // Resolve an artist name to the id of the single best match
    pub async fn search_artist(&self, name: &str) -> Result<ArtistId> {
        let query = ArtistQuery::parse(name)?;
        debug!("Searching catalog for artist {:?}", query.as_str());

        let url = format!("{}/v1/search", self.config.base_url);
        let response: ArtistSearchResponse = self
            .get_json(
                &url,
                &[("q", query.as_str()), ("type", "artist"), ("limit", "1")],
                CatalogStage::ArtistSearch,
            )
            .await?;

        match response.artists.items.into_iter().next() {
            Some(artist) => {
                debug!("Artist {:?} resolved to {}", query.as_str(), artist.id);
                Ok(ArtistId(artist.id))
            }
            None => Err(Error::ArtistNotFound(query.as_str().to_string())),
        }
    }

    // Fetch the artist's top tracks in the given market, in catalog order
    pub async fn top_tracks(&self, artist_id: &ArtistId, market: &str) -> Result<Vec<Track>> {
        debug!("Fetching top tracks for artist {artist_id} in market {market}");
        let url = format!(
            "{}/v1/artists/{}/top-tracks",
            self.config.base_url,
            artist_id.as_str()
        );
        let response: TopTracksResponse = self
            .get_json(&url, &[("market", market)], CatalogStage::TopTracks)
            .await?;

        let tracks = response
            .tracks
            .into_iter()
            .map(Track::try_from)
            .collect::<Result<Vec<_>>>()?;
        debug!("Fetched {} top tracks for artist {artist_id}", tracks.len());
        Ok(tracks)
    }

    // Artist lookup followed by top tracks. The second request is only sent
    // once the first one produced an id.
    pub async fn fetch_tracks_for_artist(&self, name: &str) -> Result<Vec<Track>> {
        let market = self.config.market.as_str();
        self.search_artist(name)
            .and_then(|artist_id| async move { self.top_tracks(&artist_id, market).await })
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        stage: CatalogStage,
    ) -> Result<T> {
        let body = self
            .http
            .get(url)
            .bearer_auth(&self.config.token)
            .query(query)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| Error::Transport { stage, source })?
            .text()
            .await
            .map_err(|source| Error::Transport { stage, source })?;

        serde_json::from_str(&body).map_err(|e| Error::Parse {
            stage,
            detail: e.to_string(),
        })
    }
}
