//! # Bucket Expansion
//!
//! Pads under-sized category buckets with items that fit the taste profile of
//! what is already there.
//!
//! ## Phases
//!
//! 1. **Similarity**: build a [`CorpusIndex`] from the bucket, rank every other
//!    corpus item by artist/genre affinity and take the best, up to
//!    `similarity_cap`.
//! 2. **Keyword correlation**: scan the corpus in order and take items the
//!    category's own signals score above zero, up to `correlation_cap`.
//! 3. **Second similarity pass**: phase 1 again, seeded by the enlarged bucket.
//!
//! Expansion stops after phase 3 even if the bucket is still short. A short
//! bucket is a partial result, not an error. Every phase ranks by score and
//! then corpus order, so the outcome depends only on the inputs.

use crate::bucket::Bucket;
use crate::config::{ExpansionConfig, ScoringLimits};
use crate::corpus::CorpusIndex;
use crate::item::Item;
use crate::scorer;
use crate::taxonomy::Category;
use log::debug;

/// Result of expanding one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub names: Vec<String>,
    /// Items added by the two similarity passes.
    pub from_similarity: usize,
    /// Items added by keyword correlation.
    pub from_correlation: usize,
    /// The corpus ran out before the target was reached.
    pub partial: bool,
}

/// Expands buckets against one shared, read-only corpus.
#[derive(Debug)]
pub struct Expander<'a> {
    corpus: &'a [Item],
    config: &'a ExpansionConfig,
    limits: &'a ScoringLimits,
}

/// Bucket names plus the records behind them, which seed the taste profile.
struct Members<'a> {
    bucket: Bucket,
    records: Vec<&'a Item>,
}

impl<'a> Members<'a> {
    fn push(&mut self, item: &'a Item) -> bool {
        let added = self.bucket.push(&item.name);
        if added {
            self.records.push(item);
        }
        added
    }

    fn len(&self) -> usize {
        self.bucket.len()
    }

    fn is_empty(&self) -> bool {
        self.bucket.is_empty()
    }
}

impl<'a> Expander<'a> {
    #[must_use]
    pub fn new(corpus: &'a [Item], config: &'a ExpansionConfig, limits: &'a ScoringLimits) -> Self {
        Self { corpus, config, limits }
    }

    /// Grow the bucket made of `current` towards `target_size` items.
    ///
    /// `current` holds the records actually placed in the bucket, so a name
    /// shared by several corpus items seeds the similarity passes with the
    /// artist and genre of the one that was classified. Later records with an
    /// already-seen name are ignored.
    ///
    /// The result starts with the names of `current`, never holds a name
    /// twice, never exceeds `target_size`, and only adds names present in the
    /// corpus.
    #[must_use]
    pub fn expand(&self, category: &Category, current: &[&'a Item], target_size: usize) -> Expansion {
        let mut members = Members {
            bucket: Bucket::new(),
            records: Vec::with_capacity(target_size),
        };
        for &item in current {
            members.push(item);
        }

        if members.len() >= target_size {
            members.bucket.truncate(target_size);
            return Expansion {
                names: members.bucket.into_names(),
                ..Expansion::default()
            };
        }

        let assigned = members.len();
        let mut from_similarity = 0;
        let mut from_correlation = 0;

        if assigned > 0 {
            from_similarity += self.similarity_pass(&mut members, target_size);
        }
        if members.len() < target_size {
            from_correlation += self.correlation_pass(category, &mut members, target_size);
        }
        if members.len() < target_size && !members.is_empty() {
            from_similarity += self.similarity_pass(&mut members, target_size);
        }

        let partial = members.len() < target_size;
        debug!(
            "Expanded '{}' from {} to {} items ({} similar, {} correlated{})",
            category.name,
            assigned,
            members.len(),
            from_similarity,
            from_correlation,
            if partial { ", partial" } else { "" }
        );

        Expansion {
            names: members.bucket.into_names(),
            from_similarity,
            from_correlation,
            partial,
        }
    }

    fn similarity_pass(&self, members: &mut Members<'a>, target_size: usize) -> usize {
        let index = CorpusIndex::build(
            members.records.iter().copied(),
            self.config.top_artists,
            self.config.top_genres,
        );
        if index.is_empty() {
            return 0;
        }

        let mut candidates: Vec<(u32, &'a Item)> = self
            .corpus
            .iter()
            .filter(|item| !members.bucket.contains(&item.name))
            .map(|item| (index.affinity(item), item))
            .filter(|&(affinity, _)| affinity > 0)
            .collect();
        // Stable: equal affinity keeps corpus order.
        candidates.sort_by(|(a, _), (b, _)| b.cmp(a));

        let quota = (target_size - members.len()).min(self.config.similarity_cap);
        take_into(members, candidates.into_iter().map(|(_, item)| item), quota)
    }

    fn correlation_pass(&self, category: &Category, members: &mut Members<'a>, target_size: usize) -> usize {
        let quota = (target_size - members.len()).min(self.config.correlation_cap);
        // Names already in the bucket are rejected by `take_into`.
        let correlated = self
            .corpus
            .iter()
            .filter(|item| scorer::score(item, category, self.limits) > 0.0);
        take_into(members, correlated, quota)
    }
}

fn take_into<'a>(members: &mut Members<'a>, candidates: impl Iterator<Item = &'a Item>, quota: usize) -> usize {
    let mut added = 0;
    for item in candidates {
        if added >= quota {
            break;
        }
        if members.push(item) {
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{SignalKind, SignalRule};

    fn punk() -> Category {
        Category::new(
            "Punk",
            vec![
                SignalRule::new(SignalKind::GenreTerm, "punk", 20.0),
                SignalRule::new(SignalKind::NameKeyword, "rage", 10.0),
            ],
        )
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    /// First corpus record for each name.
    fn seeds<'c>(corpus: &'c [Item], wanted: &[&str]) -> Vec<&'c Item> {
        wanted
            .iter()
            .map(|name| corpus.iter().find(|item| item.name == *name).unwrap())
            .collect()
    }

    #[test]
    fn test_partial_result_when_corpus_runs_out() {
        let corpus = vec![
            Item::new("A", "ScreamBand", "Noise"),
            Item::new("B", "ScreamBand", "Noise"),
            Item::new("C", "ScreamBand", "Lounge"),
            Item::new("D", "ScreamBand", "Lounge"),
            Item::new("E", "Crooner", "Jazz"),
            Item::new("F", "Pianist", "Classical"),
        ];
        let config = ExpansionConfig::default();
        let limits = ScoringLimits::default();
        let expander = Expander::new(&corpus, &config, &limits);

        let expansion = expander.expand(&punk(), &seeds(&corpus, &["A", "B"]), 5);
        assert_eq!(expansion.names, names(&["A", "B", "C", "D"]));
        assert_eq!(expansion.from_similarity, 2);
        assert_eq!(expansion.from_correlation, 0);
        assert!(expansion.partial);
    }

    #[test]
    fn test_top_artist_tie_goes_to_first_seeded() {
        let corpus = vec![
            Item::new("A", "Howler", "Noise"),
            Item::new("B", "Whisperer", "Noise"),
            Item::new("C", "Howler", "Lounge"),
            Item::new("D", "Howler", "Lounge"),
            Item::new("E", "Whisperer", "Folk"),
            Item::new("F", "Pianist", "Classical"),
        ];
        let config = ExpansionConfig {
            top_artists: 1,
            ..ExpansionConfig::default()
        };
        let limits = ScoringLimits::default();
        let expander = Expander::new(&corpus, &config, &limits);

        // Howler and Whisperer tie in the seeds; Howler was seen first.
        let expansion = expander.expand(&punk(), &seeds(&corpus, &["A", "B"]), 5);
        assert_eq!(expansion.names, names(&["A", "B", "C", "D"]));
        assert_eq!(expansion.from_similarity, 2);
        assert!(expansion.partial);

        let expansion = expander.expand(&punk(), &seeds(&corpus, &["B", "A"]), 5);
        assert_eq!(expansion.names, names(&["B", "A", "E"]));
        assert!(expansion.partial);
    }

    #[test]
    fn test_duplicate_names_seed_from_the_placed_record() {
        let corpus = vec![
            Item::new("Song", "First", "Rock"),
            Item::new("Song", "Second", "Jazz"),
            Item::new("Follows First", "First", "Rock"),
            Item::new("Follows Second", "Second", "Jazz"),
        ];
        let config = ExpansionConfig::default();
        let limits = ScoringLimits::default();
        let expander = Expander::new(&corpus, &config, &limits);

        let expansion = expander.expand(&punk(), &[&corpus[1]], 2);
        assert_eq!(expansion.names, names(&["Song", "Follows Second"]));
    }

    #[test]
    fn test_similarity_ranks_artist_over_genre() {
        let corpus = vec![
            Item::new("Seed", "Band", "Rock"),
            Item::new("Genre Only", "Other", "Rock"),
            Item::new("Artist Only", "Band", "Jazz"),
            Item::new("Both", "Band", "Rock"),
        ];
        let config = ExpansionConfig::default();
        let limits = ScoringLimits::default();
        let expander = Expander::new(&corpus, &config, &limits);

        let expansion = expander.expand(&punk(), &seeds(&corpus, &["Seed"]), 3);
        assert_eq!(expansion.names, names(&["Seed", "Both", "Artist Only"]));
        assert!(!expansion.partial);
    }

    #[test]
    fn test_empty_bucket_uses_keyword_correlation_then_similarity() {
        let corpus = vec![
            Item::new("Quiet", "Someone", "Ambient"),
            Item::new("Rage", "Loud", "Noise"),
            Item::new("Louder", "Loud", "Rock"),
            Item::new("Anthem", "Band", "Pop Punk"),
        ];
        let config = ExpansionConfig {
            correlation_cap: 1,
            ..ExpansionConfig::default()
        };
        let limits = ScoringLimits::default();
        let expander = Expander::new(&corpus, &config, &limits);

        let expansion = expander.expand(&punk(), &[], 3);
        // "Rage" correlates; the second similarity pass then follows its artist.
        assert_eq!(expansion.names, names(&["Rage", "Louder"]));
        assert_eq!(expansion.from_correlation, 1);
        assert_eq!(expansion.from_similarity, 1);
        assert!(expansion.partial);
    }

    #[test]
    fn test_caps_at_target_and_never_duplicates() {
        let corpus: Vec<Item> = (0..50)
            .map(|i| Item::new(format!("Song {}", i % 30), "Band", "Punk"))
            .collect();
        let config = ExpansionConfig::default();
        let limits = ScoringLimits::default();
        let expander = Expander::new(&corpus, &config, &limits);

        let current = seeds(&corpus, &["Song 0", "Song 1"]);
        let expansion = expander.expand(&punk(), &current, 40);
        let unique: std::collections::HashSet<_> = expansion.names.iter().collect();

        assert_eq!(unique.len(), expansion.names.len());
        assert_eq!(expansion.names.len(), 30);
        assert!(expansion.names.len() <= 40);
        assert_eq!(&expansion.names[..2], names(&["Song 0", "Song 1"]).as_slice());
    }

    #[test]
    fn test_full_bucket_is_only_truncated() {
        let corpus = vec![Item::new("A", "X", "Punk")];
        let placed = vec![Item::new("A", "X", "Punk"), Item::new("B", "Y", ""), Item::new("C", "Z", "")];
        let current: Vec<&Item> = placed.iter().collect();
        let config = ExpansionConfig::default();
        let limits = ScoringLimits::default();
        let expander = Expander::new(&corpus, &config, &limits);

        let expansion = expander.expand(&punk(), &current, 2);
        assert_eq!(expansion.names, names(&["A", "B"]));
        assert!(!expansion.partial);
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let corpus: Vec<Item> = (0..200)
            .map(|i| Item::new(format!("Track {i}"), format!("Artist {}", i % 17), format!("Genre {}", i % 7)))
            .collect();
        let config = ExpansionConfig::default();
        let limits = ScoringLimits::default();
        let expander = Expander::new(&corpus, &config, &limits);
        let current = seeds(&corpus, &["Track 3", "Track 20", "Track 37", "Track 8"]);

        let first = expander.expand(&punk(), &current, 40);
        for _ in 0..5 {
            assert_eq!(expander.expand(&punk(), &current, 40), first);
        }
    }
}
