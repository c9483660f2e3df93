use std::fmt;

use thiserror::Error;

/// Which of the two catalog requests failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStage {
    ArtistSearch,
    TopTracks,
}

impl fmt::Display for CatalogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogStage::ArtistSearch => f.write_str("artist search"),
            CatalogStage::TopTracks => f.write_str("top tracks"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Artist name must not be empty")]
    EmptyQuery,

    #[error("No artist found for {0:?}")]
    ArtistNotFound(String),

    #[error("Catalog {stage} request failed: {source}")]
    Transport {
        stage: CatalogStage,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse catalog {stage} response: {detail}")]
    Parse { stage: CatalogStage, detail: String },

    #[error("Store request failed: {0}")]
    StoreRequest(#[source] reqwest::Error),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}
