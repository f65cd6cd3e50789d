//! Collaborator seams: where items come from and where playlists go.
//!
//! The engine never talks to a media player itself. Embedders implement
//! [`LibraryProvider`] and [`PlaylistSink`] for their application; the
//! in-memory versions here serve tests, benchmarks and simple embeddings.

use crate::item::Item;
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashSet};

/// Source of the full item corpus.
pub trait LibraryProvider {
    /// Return every item in the library, in a stable order.
    ///
    /// Duplicate display names are allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the library cannot be reached or read.
    fn fetch_all(&self) -> Result<Vec<Item>>;
}

/// Destination for finished playlists.
pub trait PlaylistSink {
    /// Replace the playlist `category` with `items`, in order.
    ///
    /// Must be idempotent: writing the same arguments twice leaves the same
    /// state as writing them once.
    ///
    /// # Errors
    ///
    /// Returns an error if the playlist could not be written.
    fn write(&mut self, category: &str, items: &[String]) -> Result<()>;
}

/// A library held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLibrary {
    items: Vec<Item>,
    unavailable: Option<String>,
}

impl MemoryLibrary {
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        Self { items, unavailable: None }
    }

    /// A library whose every fetch fails with `reason`.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            unavailable: Some(reason.into()),
        }
    }
}

impl LibraryProvider for MemoryLibrary {
    fn fetch_all(&self) -> Result<Vec<Item>> {
        match &self.unavailable {
            Some(reason) => Err(anyhow!("Library unavailable: {reason}")),
            None => Ok(self.items.clone()),
        }
    }
}

/// Playlists kept in a map, keyed by category name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    playlists: BTreeMap<String, Vec<String>>,
    failing: HashSet<String>,
    writes: usize,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `category` fail.
    #[must_use]
    pub fn failing_on(mut self, category: impl Into<String>) -> Self {
        self.failing.insert(category.into());
        self
    }

    #[must_use]
    pub fn playlist(&self, category: &str) -> Option<&[String]> {
        self.playlists.get(category).map(Vec::as_slice)
    }

    #[must_use]
    pub fn playlists(&self) -> &BTreeMap<String, Vec<String>> {
        &self.playlists
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PlaylistSink for MemorySink {
    fn write(&mut self, category: &str, items: &[String]) -> Result<()> {
        if self.failing.contains(category) {
            return Err(anyhow!("Playlist '{category}' could not be written"));
        }
        self.playlists.insert(category.to_string(), items.to_vec());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_library_round_trip() {
        let items = vec![Item::new("A", "X", "Rock"), Item::new("A", "Y", "Pop")];
        let library = MemoryLibrary::new(items.clone());
        assert_eq!(library.fetch_all().unwrap(), items);

        let broken = MemoryLibrary::unavailable("not running");
        assert!(broken.fetch_all().unwrap_err().to_string().contains("not running"));
    }

    #[test]
    fn test_memory_sink_overwrites() {
        let mut sink = MemorySink::new();
        let first = vec!["A".to_string(), "B".to_string()];
        sink.write("Calming", &first).unwrap();
        sink.write("Calming", &first).unwrap();
        assert_eq!(sink.playlist("Calming"), Some(first.as_slice()));
        assert_eq!(sink.playlists().len(), 1);

        sink.write("Calming", &["C".to_string()]).unwrap();
        assert_eq!(sink.playlist("Calming"), Some(&["C".to_string()][..]));
    }

    #[test]
    fn test_memory_sink_failure() {
        let mut sink = MemorySink::new().failing_on("Heartbreak");
        assert!(sink.write("Heartbreak", &[]).is_err());
        assert!(sink.playlist("Heartbreak").is_none());
        assert_eq!(sink.writes(), 0);
    }
}
