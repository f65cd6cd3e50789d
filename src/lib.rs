//! Mood playlists from a music library.
//!
//! Core modules:
//! - [`taxonomy`] - Mood categories and their weighted signal rules
//! - [`scorer`] - Item-to-category affinity scoring
//! - [`selector`] - Turning scores into category assignments
//! - [`corpus`] - Artist/genre taste profile of a set of items
//! - [`expander`] - Padding small buckets with similar items
//! - [`pipeline`] - The whole run, from library to playlists
//!
//! ### Supporting Modules
//!
//! - [`config`] - Engine tunables and configuration files
//! - [`item`] - Library item snapshots
//! - [`bucket`] - Ordered, duplicate-free name lists
//! - [`library`] - Library provider and playlist sink seams
//!
//! ## Quick Start Example
//!
//! ```
//! use moodsort::config::EngineConfig;
//! use moodsort::item::Item;
//! use moodsort::library::{MemoryLibrary, MemorySink};
//! use moodsort::pipeline::Pipeline;
//! use moodsort::taxonomy::Taxonomy;
//!
//! let pipeline = Pipeline::new(Taxonomy::default_moods(), EngineConfig::default())?;
//!
//! let library = MemoryLibrary::new(vec![
//!     Item::new("Love Me Tender", "Elvis Presley", "Pop"),
//!     Item::new("Study Session", "Lo-Fi Beats", "Lo-Fi"),
//! ]);
//! let mut sink = MemorySink::new();
//!
//! let report = pipeline.run(&library, &mut sink)?;
//! for outcome in report.written() {
//!     println!("{}: {} items", outcome.category, outcome.final_len);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Algorithm Details
//!
//! ### Scoring
//! - Genre term: first match only (default weight 20)
//! - Name keywords: per distinct hit, capped at three (default weight 10)
//! - Artist pattern: first match only (default weight 5)
//! - Theme term in the name: first match only (default weight 20)
//! - Exclusion term in the genre: the category scores zero
//!
//! ### Selection
//! - Scores below the floor are ignored
//! - Categories within `closeness_ratio` of the best are admitted, at most
//!   `max_categories` of them, ties in taxonomy order
//! - Items nothing claims stay unclassified (or go to a fallback category)
//!
//! ### Expansion
//! - Similarity pass: same top artists (+2) and genres (+1) as the bucket
//! - Keyword correlation: anything the category's own signals match
//! - A second similarity pass, then stop; short buckets are partial results
//!
//! ## Error Handling
//!
//! Fallible functions return `anyhow::Result`. Bad taxonomies and tunables
//! are rejected when loaded; scoring and expansion never fail. A playlist the
//! sink refuses is reported per category without stopping the run.
//!
//! ## Logging
//!
//! Uses the `log` facade. Install any logger (e.g. `env_logger`) and set
//! `RUST_LOG=moodsort=debug` to follow expansion, or `trace` for per-item
//! score breakdowns.

pub mod bucket;
pub mod config;
pub mod corpus;
pub mod expander;
pub mod item;
pub mod library;
pub mod pipeline;
pub mod scorer;
pub mod selector;
pub mod taxonomy;

pub use item::Item;
pub use pipeline::{Pipeline, PipelineReport, Playlist};
pub use taxonomy::Taxonomy;
