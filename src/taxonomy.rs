//! # Mood Taxonomy
//!
//! The static configuration every other stage reads: a list of mood categories,
//! each carrying weighted signal rules. A taxonomy is built once (from JSON or
//! from [`Taxonomy::default_moods`]), validated at construction, and then passed
//! by reference into scoring, selection and expansion. It is never mutated.
//!
//! ## JSON Layout
//!
//! ```json
//! {
//!   "categories": [
//!     {
//!       "name": "Angry/Mad",
//!       "rules": [
//!         { "kind": "genre_term", "term": "punk", "weight": 20.0 },
//!         { "kind": "name_keyword", "term": "rage", "weight": 10.0 },
//!         { "kind": "exclusion_term", "term": "ballad" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Which item field a rule looks at and how it contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Matched against the genre; first hit only.
    GenreTerm,
    /// Matched against the display name; one hit per distinct keyword, capped.
    NameKeyword,
    /// Matched against the artist; first hit only.
    ArtistPattern,
    /// Mood/intent words matched against the display name; first hit only.
    ThemeTerm,
    /// Matched against the genre; a hit vetoes the whole category.
    ExclusionTerm,
}

/// A single weighted substring rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRule {
    pub kind: SignalKind,
    pub term: String,
    /// Ignored for [`SignalKind::ExclusionTerm`].
    #[serde(default)]
    pub weight: f64,
}

impl SignalRule {
    #[must_use]
    pub fn new(kind: SignalKind, term: impl Into<String>, weight: f64) -> Self {
        Self {
            kind,
            term: term.into(),
            weight,
        }
    }

    #[must_use]
    pub fn exclusion(term: impl Into<String>) -> Self {
        Self::new(SignalKind::ExclusionTerm, term, 0.0)
    }
}

/// A named mood bucket and its ordered signal rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub rules: Vec<SignalRule>,
}

impl Category {
    #[must_use]
    pub fn new(name: impl Into<String>, rules: Vec<SignalRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// Rules of one kind, in declaration order.
    pub fn rules_of(&self, kind: SignalKind) -> impl Iterator<Item = &SignalRule> + '_ {
        self.rules.iter().filter(move |rule| rule.kind == kind)
    }

    fn normalize(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            bail!("Category name cannot be empty");
        }
        if self.rules.is_empty() {
            bail!("Category '{}' has no signal rules", self.name);
        }
        for rule in &mut self.rules {
            rule.term = rule.term.trim().to_lowercase();
            if rule.term.is_empty() {
                bail!("Category '{}' has a {:?} rule with an empty term", self.name, rule.kind);
            }
            if rule.kind != SignalKind::ExclusionTerm && !(rule.weight.is_finite() && rule.weight > 0.0) {
                bail!(
                    "Category '{}' rule '{}' has invalid weight {} (must be finite and > 0)",
                    self.name,
                    rule.term,
                    rule.weight
                );
            }
        }
        Ok(self)
    }
}

#[derive(Deserialize)]
struct RawTaxonomy {
    categories: Vec<Category>,
}

impl TryFrom<RawTaxonomy> for Taxonomy {
    type Error = anyhow::Error;

    fn try_from(raw: RawTaxonomy) -> Result<Self> {
        Self::new(raw.categories)
    }
}

/// Validated, immutable set of categories in declaration order.
///
/// Declaration order matters: it breaks score ties during selection and fixes
/// the order in which playlists are emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTaxonomy")]
pub struct Taxonomy {
    categories: Vec<Category>,
}

impl Taxonomy {
    /// Validate and normalize categories into a taxonomy.
    ///
    /// Terms are trimmed and lowercased so scoring can compare against
    /// lowercased item fields directly.
    ///
    /// # Errors
    ///
    /// Fails when the list is empty, a category has no rules, a name is empty
    /// or duplicated, a term is empty, or a weight is not a positive number.
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            bail!("Taxonomy must declare at least one category");
        }

        let mut seen = HashSet::new();
        let categories = categories
            .into_iter()
            .map(Category::normalize)
            .collect::<Result<Vec<_>>>()?;

        for category in &categories {
            if !seen.insert(category.name.clone()) {
                bail!("Duplicate category name '{}' in taxonomy", category.name);
            }
        }

        Ok(Self { categories })
    }

    /// Parse a taxonomy from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse mood taxonomy JSON")
    }

    /// Read and parse a taxonomy file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read taxonomy file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid taxonomy in {}", path.display()))
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|category| category.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.categories.iter().map(|category| category.name.as_str())
    }

    /// The six built-in moods.
    ///
    /// Genre terms are worth 20, themes 20, name keywords 10 each and artist
    /// patterns 5 (a handful of signature artists are worth more).
    #[must_use]
    pub fn default_moods() -> Self {
        let categories = vec![
            mood(
                "Angry/Mad",
                &[
                    "metal", "hardcore", "punk", "nu metal", "industrial", "grunge",
                    "alternative metal", "death metal", "thrash", "screamo",
                ],
                &[
                    "rage", "angry", "mad", "hate", "kill", "die", "war", "fight", "violence",
                    "revenge", "fury", "aggressive", "scream", "break",
                ],
                &[("metal", ARTIST), ("hardcore", ARTIST), ("punk", ARTIST), ("slayer", ARTIST), ("rage", ARTIST), ("kill", ARTIST)],
                &["anger", "frustration", "aggression", "rebellion", "destruction"],
                &["pop", "ballad", "soft", "acoustic", "jazz", "classical"],
            ),
            mood(
                "Heartbreak",
                &["ballad", "soul", "r&b", "country", "folk", "acoustic", "blues", "indie"],
                &[
                    "heartbreak", "breakup", "goodbye", "tears", "cry", "hurt", "pain", "lonely",
                    "alone", "missing", "gone", "lost", "sad", "broken", "leave", "away", "regret",
                    "sorry",
                ],
                &[("adele", 15.0), ("ballad", ARTIST), ("soul", ARTIST), ("country", ARTIST), ("folk", ARTIST)],
                &["loss", "sadness", "loneliness", "rejection", "betrayal", "separation"],
                &["metal", "hardcore", "punk", "edm", "dance"],
            ),
            mood(
                "Workout/Go Time",
                &["hip hop", "rap", "edm", "electronic", "dance", "house", "techno", "trap", "pop", "rock"],
                &[
                    "go", "run", "move", "jump", "fire", "hype", "pump", "energy", "power",
                    "strength", "workout", "gym", "beat", "bass", "drop",
                ],
                &[("rap", ARTIST), ("hip hop", ARTIST), ("dj", ARTIST), ("edm", ARTIST), ("electronic", ARTIST)],
                &["motivation", "determination", "victory", "winning", "champion"],
                &["ballad", "classical", "ambient", "meditation"],
            ),
            mood(
                "Calming",
                &["ambient", "new age", "meditation", "spa", "yoga", "chill", "lounge"],
                &[
                    "calm", "peace", "quiet", "still", "soft", "gentle", "soothing", "tranquil",
                    "serene", "zen", "meditation", "relax",
                ],
                &[("ambient", ARTIST), ("meditation", ARTIST), ("zen", ARTIST), ("spa", ARTIST), ("yoga", ARTIST), ("enya", 10.0)],
                &["relaxation", "tranquility", "serenity", "mindfulness", "nature"],
                &["metal", "hardcore", "punk", "rap", "hip hop"],
            ),
            mood(
                "In Love",
                &["pop", "r&b", "soul", "jazz", "smooth", "ballad", "soft rock"],
                &[
                    "love", "heart", "kiss", "hug", "together", "forever", "soulmate", "darling",
                    "baby", "sweet", "tender", "romance", "devotion",
                ],
                &[("pop", ARTIST), ("r&b", ARTIST), ("soul", ARTIST), ("jazz", ARTIST)],
                &["romantic", "affection", "passion", "wedding", "marriage"],
                &["metal", "hardcore", "punk", "death metal"],
            ),
            mood(
                "While Doing Homework",
                &[
                    "classical", "instrumental", "lo-fi", "ambient", "jazz", "piano", "post-rock",
                    "cinematic", "soundtrack",
                ],
                &[
                    "study", "focus", "piano", "classical", "instrumental", "no lyrics",
                    "background", "concentration",
                ],
                &[("classical", ARTIST), ("piano", ARTIST), ("orchestra", ARTIST), ("instrumental", ARTIST), ("lo-fi", ARTIST)],
                &["productivity", "academic", "background music"],
                &["rap", "hip hop", "metal", "hardcore"],
            ),
        ];

        Self { categories }
    }
}

const GENRE: f64 = 20.0;
const KEYWORD: f64 = 10.0;
const ARTIST: f64 = 5.0;
const THEME: f64 = 20.0;

fn mood(
    name: &str,
    genres: &[&str],
    keywords: &[&str],
    artists: &[(&str, f64)],
    themes: &[&str],
    excludes: &[&str],
) -> Category {
    let rules = genres
        .iter()
        .map(|term| SignalRule::new(SignalKind::GenreTerm, *term, GENRE))
        .chain(keywords.iter().map(|term| SignalRule::new(SignalKind::NameKeyword, *term, KEYWORD)))
        .chain(artists.iter().map(|(term, weight)| SignalRule::new(SignalKind::ArtistPattern, *term, *weight)))
        .chain(themes.iter().map(|term| SignalRule::new(SignalKind::ThemeTerm, *term, THEME)))
        .chain(excludes.iter().map(|term| SignalRule::exclusion(*term)))
        .collect();

    Category::new(name, rules)
}
