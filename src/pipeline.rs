//! # Classification Pipeline
//!
//! Orchestrates one run: score every item against every category, select each
//! item's categories, accumulate buckets, expand the ones below target size,
//! cap every bucket at the maximum size and hand the non-empty ones to a
//! [`PlaylistSink`].
//!
//! ## Usage
//!
//! ```
//! use moodsort::item::Item;
//! use moodsort::library::{MemoryLibrary, MemorySink};
//! use moodsort::pipeline::Pipeline;
//!
//! let library = MemoryLibrary::new(vec![
//!     Item::new("Rage Against Everything", "ScreamBand", "Hardcore Punk"),
//!     Item::new("Calm Waters", "Drift", "Ambient"),
//! ]);
//! let mut sink = MemorySink::new();
//!
//! let report = Pipeline::with_defaults().run(&library, &mut sink)?;
//! assert_eq!(report.total_items, 2);
//! assert!(sink.playlist("Angry/Mad").is_some());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Scoring and expansion fan out over rayon's thread pool. Both only read
//! shared data and write to their own slot, so results match a sequential run.

use crate::bucket::Bucket;
use crate::config::EngineConfig;
use crate::expander::Expander;
use crate::item::Item;
use crate::library::{LibraryProvider, PlaylistSink};
use crate::scorer::ScoreMemo;
use crate::selector;
use crate::taxonomy::Taxonomy;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;

/// Buckets straight out of classification, before expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// One bucket per taxonomy category, in declaration order.
    pub buckets: Vec<Bucket>,
    /// For each bucket, positions in the classified slice of the items whose
    /// names it holds. Expansion seeds from these records.
    pub members: Vec<Vec<usize>>,
    /// Names of items no category claimed, in corpus order.
    pub unclassified: Vec<String>,
}

/// A finished playlist for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub category: String,
    /// Items placed by classification, before expansion.
    pub assigned: usize,
    pub items: Vec<String>,
    /// Expansion could not reach the target size.
    pub partial: bool,
}

/// What happened to one category during [`Pipeline::run`].
#[derive(Debug)]
pub struct PlaylistOutcome {
    pub category: String,
    pub assigned: usize,
    pub final_len: usize,
    pub partial: bool,
    /// `None` when the sink accepted the playlist.
    pub write_error: Option<anyhow::Error>,
}

/// Per-run summary returned to the caller.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub total_items: usize,
    pub unclassified: usize,
    /// Written (or attempted) playlists, in taxonomy order.
    pub outcomes: Vec<PlaylistOutcome>,
    /// Categories that ended up empty and were not sent to the sink.
    pub skipped: Vec<String>,
}

impl PipelineReport {
    pub fn written(&self) -> impl Iterator<Item = &PlaylistOutcome> + '_ {
        self.outcomes.iter().filter(|outcome| outcome.write_error.is_none())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PlaylistOutcome> + '_ {
        self.outcomes.iter().filter(|outcome| outcome.write_error.is_some())
    }

    #[must_use]
    pub fn all_written(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// The classification and expansion engine, bound to one taxonomy.
#[derive(Debug, Clone)]
pub struct Pipeline {
    taxonomy: Taxonomy,
    config: EngineConfig,
}

impl Pipeline {
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or refers to categories the
    /// taxonomy does not declare.
    pub fn new(taxonomy: Taxonomy, config: EngineConfig) -> Result<Self> {
        config
            .validate_against(&taxonomy)
            .context("Engine configuration rejected")?;
        Ok(Self { taxonomy, config })
    }

    /// Built-in moods with default tunables.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            taxonomy: Taxonomy::default_moods(),
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score and select every item into buckets.
    #[must_use]
    pub fn classify(&self, items: &[Item]) -> Classification {
        let limits = &self.config.scoring;
        let memo = ScoreMemo::build(items, &self.taxonomy, limits);
        debug!("Scored {} distinct items out of {}", memo.len(), items.len());

        let mut classification = Classification {
            buckets: vec![Bucket::new(); self.taxonomy.len()],
            members: vec![Vec::new(); self.taxonomy.len()],
            unclassified: Vec::new(),
        };

        for (position, item) in items.iter().enumerate() {
            let scores = memo.scores(item, &self.taxonomy, limits);
            let chosen = selector::select_indices(&scores, &self.taxonomy, &self.config.selection);
            if chosen.is_empty() {
                classification.unclassified.push(item.name.clone());
            }
            for index in chosen {
                if classification.buckets[index].push(&item.name) {
                    classification.members[index].push(position);
                }
            }
        }

        classification
    }

    /// Expand under-sized buckets against `items`, then cap every bucket.
    ///
    /// `items` must be the slice `classification` was built from.
    #[must_use]
    pub fn expand(&self, classification: &Classification, items: &[Item]) -> Vec<Playlist> {
        let expansion = &self.config.expansion;
        let expander = Expander::new(items, expansion, &self.config.scoring);

        classification
            .buckets
            .par_iter()
            .zip(self.taxonomy.categories().par_iter())
            .enumerate()
            .map(|(index, (bucket, category))| {
                let assigned = bucket.len();
                let (mut names, partial) = if assigned < expansion.target_size {
                    let seeds: Vec<&Item> = classification
                        .members
                        .get(index)
                        .into_iter()
                        .flatten()
                        .filter_map(|&position| items.get(position))
                        .collect();
                    let grown = expander.expand(category, &seeds, expansion.target_size);
                    (grown.names, grown.partial)
                } else {
                    (bucket.names().to_vec(), false)
                };
                names.truncate(expansion.max_size);

                Playlist {
                    category: category.name.clone(),
                    assigned,
                    items: names,
                    partial,
                }
            })
            .collect()
    }

    /// Classify, expand and cap: the whole computation without any I/O.
    ///
    /// Returns one playlist per category in taxonomy order, empty ones
    /// included.
    #[must_use]
    pub fn build_playlists(&self, items: &[Item]) -> Vec<Playlist> {
        let classification = self.classify(items);
        self.expand(&classification, items)
    }

    /// Fetch the library, build playlists and write each non-empty one.
    ///
    /// A failed write is logged and recorded in the report; remaining
    /// categories are still written. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns an error only if the library cannot be fetched.
    pub fn run(&self, provider: &dyn LibraryProvider, sink: &mut dyn PlaylistSink) -> Result<PipelineReport> {
        let items = provider.fetch_all().context("Failed to fetch library items")?;
        info!("Loaded {} items", items.len());

        let classification = self.classify(&items);
        info!(
            "Classified {} items into {} categories ({} unclassified)",
            items.len(),
            self.taxonomy.len(),
            classification.unclassified.len()
        );

        let mut report = PipelineReport {
            total_items: items.len(),
            unclassified: classification.unclassified.len(),
            ..PipelineReport::default()
        };

        for playlist in self.expand(&classification, &items) {
            if playlist.items.is_empty() {
                debug!("Skipping empty category '{}'", playlist.category);
                report.skipped.push(playlist.category);
                continue;
            }

            if playlist.partial {
                warn!(
                    "'{}' has only {} of {} items; the library has nothing more that fits",
                    playlist.category,
                    playlist.items.len(),
                    self.config.expansion.target_size
                );
            }

            let write_error = match sink.write(&playlist.category, &playlist.items) {
                Ok(()) => {
                    info!("Wrote '{}' ({} items)", playlist.category, playlist.items.len());
                    None
                }
                Err(error) => {
                    warn!("Failed to write '{}': {error:#}", playlist.category);
                    Some(error)
                }
            };

            report.outcomes.push(PlaylistOutcome {
                category: playlist.category,
                assigned: playlist.assigned,
                final_len: playlist.items.len(),
                partial: playlist.partial,
                write_error,
            });
        }

        Ok(report)
    }
}
