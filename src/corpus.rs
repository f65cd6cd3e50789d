//! Corpus Index: the taste profile of a set of seed items.
//!
//! Counts artists and genres across the seeds and keeps the most frequent
//! ones. Equal counts rank by first appearance in the seeds, so the index is a
//! pure function of the seed order.

use crate::item::Item;
use std::collections::HashMap;

/// Weight of an artist match when ranking expansion candidates.
pub const ARTIST_AFFINITY: u32 = 2;
/// Weight of a genre match when ranking expansion candidates.
pub const GENRE_AFFINITY: u32 = 1;

/// Most frequent artists and genres of a seed set, lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusIndex {
    /// Most frequent first.
    pub top_artists: Vec<String>,
    /// Most frequent first.
    pub top_genres: Vec<String>,
}

impl CorpusIndex {
    /// Build the index from `seeds`, keeping `artist_limit` artists and
    /// `genre_limit` genres. Empty fields are ignored.
    #[must_use]
    pub fn build<'a, I>(seeds: I, artist_limit: usize, genre_limit: usize) -> Self
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let mut artists = FrequencyTable::default();
        let mut genres = FrequencyTable::default();

        for item in seeds {
            artists.add(&item.artist);
            genres.add(&item.genre);
        }

        Self {
            top_artists: artists.most_common(artist_limit),
            top_genres: genres.most_common(genre_limit),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top_artists.is_empty() && self.top_genres.is_empty()
    }

    #[must_use]
    pub fn has_artist(&self, artist: &str) -> bool {
        contains_folded(&self.top_artists, artist)
    }

    #[must_use]
    pub fn has_genre(&self, genre: &str) -> bool {
        contains_folded(&self.top_genres, genre)
    }

    /// Similarity of `item` to the seeds: +2 for a top artist, +1 for a top genre.
    #[must_use]
    pub fn affinity(&self, item: &Item) -> u32 {
        let artist = if self.has_artist(&item.artist) { ARTIST_AFFINITY } else { 0 };
        let genre = if self.has_genre(&item.genre) { GENRE_AFFINITY } else { 0 };
        artist + genre
    }
}

fn contains_folded(values: &[String], needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    let needle = needle.to_lowercase();
    values.iter().any(|value| *value == needle)
}

/// Counts keyed by lowercased value, remembering first-seen order.
#[derive(Default)]
struct FrequencyTable {
    counts: HashMap<String, (usize, usize)>,
}

impl FrequencyTable {
    fn add(&mut self, raw: &str) {
        let value = raw.trim();
        if value.is_empty() {
            return;
        }
        let order = self.counts.len();
        self.counts
            .entry(value.to_lowercase())
            .or_insert((0, order))
            .0 += 1;
    }

    fn most_common(self, limit: usize) -> Vec<String> {
        let mut entries: Vec<(String, (usize, usize))> = self.counts.into_iter().collect();
        entries.sort_by(|(_, (count_a, seen_a)), (_, (count_b, seen_b))| {
            count_b.cmp(count_a).then(seen_a.cmp(seen_b))
        });
        entries.into_iter().take(limit).map(|(value, _)| value).collect()
    }
}
