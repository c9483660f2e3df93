use std::fmt;

use crate::clients::errors::{Error, Result};

/// Separator between track and artist names in a display label
pub const LABEL_SEPARATOR: &str = " by ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub artist: Artist, // first listed artist only
}

impl Track {
    /// Display form of the track, e.g. `"One More Time by Daft Punk"`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{LABEL_SEPARATOR}{}", self.name, self.artist.name)
    }
}

/// A record of the saved tracks collection. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedTrack {
    pub id: String,
    pub label: String,
}

impl SavedTrack {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        SavedTrack {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Catalog identifier of an artist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistId(pub String);

impl ArtistId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Artist name as typed by the user. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistQuery(String);

impl ArtistQuery {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(ArtistQuery(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
