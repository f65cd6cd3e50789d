//! Library items as handed over by a [`LibraryProvider`](crate::library::LibraryProvider).

use serde::{Deserialize, Serialize};

/// One catalog entry, snapshotted once per run.
///
/// The display `name` is the identity used downstream: buckets de-duplicate on
/// it and playlist sinks look tracks up by it. Two distinct tracks with the
/// same name cannot be told apart.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// May be empty.
    #[serde(default)]
    pub artist: String,
    /// May be empty.
    #[serde(default)]
    pub genre: String,
}

impl Item {
    #[must_use]
    pub fn new(name: impl Into<String>, artist: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artist: artist.into(),
            genre: genre.into(),
        }
    }

    /// Memoization key for score lookups within a single run.
    #[must_use]
    pub fn key(&self) -> ItemKey {
        ItemKey {
            name: self.name.clone(),
            artist: self.artist.clone(),
            genre: self.genre.clone(),
        }
    }
}

/// Structured `(name, artist, genre)` key.
///
/// Covers every field scoring reads, so items sharing a key always score alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub name: String,
    pub artist: String,
    pub genre: String,
}
