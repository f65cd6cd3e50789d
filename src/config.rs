//! # Configuration Module
//!
//! Engine tunables and the on-disk location they are read from.
//!
//! ## Data Storage
//!
//! Optional configuration files live in the platform config directory:
//! - Linux: `~/.config/moodsort/`
//! - macOS: `~/Library/Application Support/moodsort/`
//! - Windows: `%APPDATA%\moodsort\`
//!
//! `engine.json` holds an [`EngineConfig`] and `taxonomy.json` a
//! [`Taxonomy`](crate::taxonomy::Taxonomy). Every field is optional; missing
//! sections fall back to their defaults.

use crate::taxonomy::Taxonomy;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the engine configuration inside [`get_config_dir`].
pub const ENGINE_FILE: &str = "engine.json";
/// File name of the taxonomy inside [`get_config_dir`].
pub const TAXONOMY_FILE: &str = "taxonomy.json";

/// Returns the platform-appropriate configuration directory, creating it if
/// needed.
///
/// # Errors
///
/// Fails if the system config directory cannot be determined or the
/// `moodsort` subdirectory cannot be created.
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system config directory. Please ensure your platform supports standard config directories."
        )
    })?;

    let moodsort_dir = config_dir.join("moodsort");
    fs::create_dir_all(&moodsort_dir).with_context(|| {
        format!(
            "Failed to create moodsort config directory at {}. Please check file permissions.",
            moodsort_dir.display()
        )
    })?;

    Ok(moodsort_dir)
}

/// Limits applied while scoring a single item against a category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringLimits {
    /// Distinct name keywords counted before further hits are ignored.
    pub name_keyword_cap: usize,
}

impl Default for ScoringLimits {
    fn default() -> Self {
        Self { name_keyword_cap: 3 }
    }
}

/// How per-category scores become an item's category set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Absolute minimum score; must be > 0.
    pub floor: f64,
    /// Admit categories scoring at least `top * closeness_ratio`.
    pub closeness_ratio: f64,
    /// Hard cap on categories per item.
    pub max_categories: usize,
    /// Bucket for items that clear no floor. `None` leaves them unclassified.
    pub fallback_category: Option<String>,
    /// When set, the top category must lead the runner-up by this much, and
    /// only the top category is admitted. The runner-up need not clear `floor`.
    pub min_lead: Option<f64>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            floor: 10.0,
            closeness_ratio: 0.6,
            max_categories: 2,
            fallback_category: None,
            min_lead: None,
        }
    }
}

/// Bucket sizing and expansion phase limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Minimum size expansion tries to reach.
    pub target_size: usize,
    /// Hard cap applied to every bucket after expansion.
    pub max_size: usize,
    /// Most items a single similarity pass may add.
    pub similarity_cap: usize,
    /// Most items the keyword-correlation fallback may add.
    pub correlation_cap: usize,
    /// Artists kept in a corpus index.
    pub top_artists: usize,
    /// Genres kept in a corpus index.
    pub top_genres: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            target_size: 40,
            max_size: 40,
            similarity_cap: 30,
            correlation_cap: 10,
            top_artists: 10,
            top_genres: 5,
        }
    }
}

/// All engine tunables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringLimits,
    pub selection: SelectionPolicy,
    pub expansion: ExpansionConfig,
}

impl EngineConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse engine configuration JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine configuration {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid engine configuration in {}", path.display()))
    }

    /// Load `engine.json` from `dir` if present, defaults otherwise.
    pub fn load_or_default_from(dir: &Path) -> Result<Self> {
        let path = dir.join(ENGINE_FILE);
        if path.exists() {
            info!("Loading engine configuration from {}", path.display());
            Self::load(&path)
        } else {
            debug!("No engine configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load `engine.json` from the platform config directory if present.
    pub fn load_or_default() -> Result<Self> {
        Self::load_or_default_from(&get_config_dir()?)
    }

    /// Check the tunables for values that would make the engine misbehave.
    pub fn validate(&self) -> Result<()> {
        let selection = &self.selection;
        if !(selection.floor.is_finite() && selection.floor > 0.0) {
            bail!("Selection floor must be a positive number, got {}", selection.floor);
        }
        if !(selection.closeness_ratio > 0.0 && selection.closeness_ratio <= 1.0) {
            bail!("Closeness ratio must be in (0, 1], got {}", selection.closeness_ratio);
        }
        if selection.max_categories == 0 {
            bail!("Selection must admit at least one category per item");
        }
        if let Some(lead) = selection.min_lead {
            if !(lead.is_finite() && lead >= 0.0) {
                bail!("Minimum lead must be a non-negative number, got {lead}");
            }
        }
        if self.expansion.max_size == 0 {
            bail!("Maximum bucket size must be at least 1");
        }
        Ok(())
    }

    /// Validate, including references into `taxonomy`.
    pub fn validate_against(&self, taxonomy: &Taxonomy) -> Result<()> {
        self.validate()?;
        if let Some(fallback) = &self.selection.fallback_category {
            if taxonomy.get(fallback).is_none() {
                bail!("Fallback category '{fallback}' is not declared in the taxonomy");
            }
        }
        Ok(())
    }
}

/// Load `taxonomy.json` from `dir` if present, the built-in moods otherwise.
pub fn load_taxonomy_or_default_from(dir: &Path) -> Result<Taxonomy> {
    let path = dir.join(TAXONOMY_FILE);
    if path.exists() {
        info!("Loading mood taxonomy from {}", path.display());
        Taxonomy::load(&path)
    } else {
        debug!("No taxonomy at {}, using built-in moods", path.display());
        Ok(Taxonomy::default_moods())
    }
}
