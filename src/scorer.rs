//! Affinity scoring of items against mood categories.
//!
//! A score is the sum of independent, individually bounded contributions:
//!
//! ```text
//! score(item, category) = match excluded(genre) {
//!     true  => 0,
//!     false => genre_hit + capped(name_keyword_hits) + artist_hit + theme_hit
//! }
//! ```
//!
//! All matching is case-insensitive substring matching on the raw fields. An
//! empty field simply never matches.

use crate::config::ScoringLimits;
use crate::item::{Item, ItemKey};
use crate::taxonomy::{Category, SignalKind, Taxonomy};
use log::trace;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Per-signal contributions of one score, for logging and inspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// Matched genre term and its weight.
    pub genre: Option<(String, f64)>,
    /// Matched name keywords (distinct, capped) and their weights.
    pub name_keywords: Vec<(String, f64)>,
    pub artist: Option<(String, f64)>,
    pub theme: Option<(String, f64)>,
    /// Exclusion term that vetoed the category.
    pub excluded_by: Option<String>,
    pub total: f64,
}

impl ScoreBreakdown {
    #[must_use]
    pub fn is_excluded(&self) -> bool {
        self.excluded_by.is_some()
    }

    /// Human-readable summary of the scoring
    #[must_use]
    pub fn summary(&self) -> String {
        if let Some(term) = &self.excluded_by {
            return format!("excluded by '{term}' → 0");
        }
        let mut parts = Vec::new();
        if let Some((term, weight)) = &self.genre {
            parts.push(format!("genre:{term}→{weight:.1}"));
        }
        for (term, weight) in &self.name_keywords {
            parts.push(format!("name:{term}→{weight:.1}"));
        }
        if let Some((term, weight)) = &self.artist {
            parts.push(format!("artist:{term}→{weight:.1}"));
        }
        if let Some((term, weight)) = &self.theme {
            parts.push(format!("theme:{term}→{weight:.1}"));
        }
        if parts.is_empty() {
            return "no match → 0".to_string();
        }
        format!("{} = {:.1}", parts.join(" + "), self.total)
    }
}

/// Score one item against one category, keeping the contributions.
#[must_use]
pub fn score_breakdown(item: &Item, category: &Category, limits: &ScoringLimits) -> ScoreBreakdown {
    let name = item.name.to_lowercase();
    let artist = item.artist.to_lowercase();
    let genre = item.genre.to_lowercase();

    // Exclusions veto outright; nothing else needs evaluating.
    if let Some((term, _)) = first_match(category, SignalKind::ExclusionTerm, &genre) {
        return ScoreBreakdown {
            excluded_by: Some(term),
            ..ScoreBreakdown::default()
        };
    }

    let mut breakdown = ScoreBreakdown {
        genre: first_match(category, SignalKind::GenreTerm, &genre),
        artist: first_match(category, SignalKind::ArtistPattern, &artist),
        theme: first_match(category, SignalKind::ThemeTerm, &name),
        ..ScoreBreakdown::default()
    };

    if !name.is_empty() {
        for rule in category.rules_of(SignalKind::NameKeyword) {
            if breakdown.name_keywords.len() >= limits.name_keyword_cap {
                break;
            }
            let already_counted = breakdown.name_keywords.iter().any(|(term, _)| *term == rule.term);
            if !already_counted && name.contains(rule.term.as_str()) {
                breakdown.name_keywords.push((rule.term.clone(), rule.weight));
            }
        }
    }

    breakdown.total = breakdown.genre.iter().map(|(_, w)| w).sum::<f64>()
        + breakdown.name_keywords.iter().map(|(_, w)| w).sum::<f64>()
        + breakdown.artist.iter().map(|(_, w)| w).sum::<f64>()
        + breakdown.theme.iter().map(|(_, w)| w).sum::<f64>();

    breakdown
}

/// Score one item against one category.
///
/// # Examples
///
/// ```
/// use moodsort::config::ScoringLimits;
/// use moodsort::item::Item;
/// use moodsort::scorer::score;
/// use moodsort::taxonomy::{Category, SignalKind, SignalRule};
///
/// let category = Category::new("Angry", vec![
///     SignalRule::new(SignalKind::GenreTerm, "punk", 20.0),
///     SignalRule::new(SignalKind::NameKeyword, "rage", 10.0),
/// ]);
/// let item = Item::new("Rage Against Everything", "ScreamBand", "Hardcore Punk");
///
/// assert_eq!(score(&item, &category, &ScoringLimits::default()), 30.0);
/// ```
#[must_use]
pub fn score(item: &Item, category: &Category, limits: &ScoringLimits) -> f64 {
    score_breakdown(item, category, limits).total
}

/// Scores against every category, in taxonomy order.
#[must_use]
pub fn score_all(item: &Item, taxonomy: &Taxonomy, limits: &ScoringLimits) -> Vec<f64> {
    taxonomy
        .categories()
        .iter()
        .map(|category| {
            let breakdown = score_breakdown(item, category, limits);
            if breakdown.total > 0.0 || breakdown.is_excluded() {
                trace!("'{}' vs '{}': {}", item.name, category.name, breakdown.summary());
            }
            breakdown.total
        })
        .collect()
}

fn first_match(category: &Category, kind: SignalKind, field: &str) -> Option<(String, f64)> {
    if field.is_empty() {
        return None;
    }
    category
        .rules_of(kind)
        .find(|rule| field.contains(rule.term.as_str()))
        .map(|rule| (rule.term.clone(), rule.weight))
}

/// Per-run memo of category scores keyed by [`ItemKey`].
///
/// Built once per pipeline run and dropped with it, so nothing leaks between
/// runs. Repeated tracks with identical metadata are scored once.
#[derive(Debug, Clone, Default)]
pub struct ScoreMemo {
    scores: HashMap<ItemKey, Vec<f64>>,
}

impl ScoreMemo {
    /// Score every distinct item once; distinct items are scored in parallel.
    #[must_use]
    pub fn build(items: &[Item], taxonomy: &Taxonomy, limits: &ScoringLimits) -> Self {
        let mut seen = HashSet::new();
        let distinct: Vec<&Item> = items.iter().filter(|item| seen.insert(item.key())).collect();

        let scores = distinct
            .par_iter()
            .map(|item| (item.key(), score_all(item, taxonomy, limits)))
            .collect();

        Self { scores }
    }

    /// Cached scores for `item`, if its key was part of the build.
    #[must_use]
    pub fn get(&self, item: &Item) -> Option<&[f64]> {
        self.scores.get(&item.key()).map(Vec::as_slice)
    }

    /// Cached scores for `item`, computing them when the key is unknown.
    #[must_use]
    pub fn scores(&self, item: &Item, taxonomy: &Taxonomy, limits: &ScoringLimits) -> Vec<f64> {
        match self.get(item) {
            Some(cached) => cached.to_vec(),
            None => score_all(item, taxonomy, limits),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::SignalRule;

    fn angry() -> Category {
        Category::new(
            "Angry",
            vec![
                SignalRule::new(SignalKind::GenreTerm, "punk", 20.0),
                SignalRule::new(SignalKind::GenreTerm, "hardcore", 15.0),
                SignalRule::new(SignalKind::NameKeyword, "rage", 10.0),
                SignalRule::new(SignalKind::NameKeyword, "hate", 10.0),
                SignalRule::new(SignalKind::NameKeyword, "war", 10.0),
                SignalRule::new(SignalKind::NameKeyword, "fight", 10.0),
                SignalRule::new(SignalKind::ArtistPattern, "scream", 5.0),
                SignalRule::new(SignalKind::ArtistPattern, "band", 4.0),
                SignalRule::new(SignalKind::ThemeTerm, "fury", 25.0),
                SignalRule::new(SignalKind::ThemeTerm, "anger", 25.0),
                SignalRule::exclusion("pop"),
            ],
        )
    }

    #[test]
    fn test_genre_and_keyword_scenario() {
        let item = Item::new("Rage Against Everything", "Nobody", "Hardcore Punk");
        let breakdown = score_breakdown(&item, &angry(), &ScoringLimits::default());

        // First declared genre term wins, no stacking with "hardcore".
        assert_eq!(breakdown.genre, Some(("punk".to_string(), 20.0)));
        assert_eq!(breakdown.name_keywords.len(), 1);
        assert_eq!(breakdown.total, 30.0);
    }

    #[test]
    fn test_name_keywords_are_capped() {
        let item = Item::new("Rage Hate War Fight", "", "");
        let limits = ScoringLimits { name_keyword_cap: 3 };
        assert_eq!(score(&item, &angry(), &limits), 30.0);

        let limits = ScoringLimits { name_keyword_cap: 2 };
        assert_eq!(score(&item, &angry(), &limits), 20.0);
    }

    #[test]
    fn test_artist_and_theme_contribute_once() {
        let item = Item::new("Fury and Anger", "Scream Band", "");
        let breakdown = score_breakdown(&item, &angry(), &ScoringLimits::default());
        assert_eq!(breakdown.artist, Some(("scream".to_string(), 5.0)));
        assert_eq!(breakdown.theme, Some(("fury".to_string(), 25.0)));
        assert_eq!(breakdown.total, 30.0);
    }

    #[test]
    fn test_exclusion_is_a_hard_veto() {
        let item = Item::new("Rage Fury", "ScreamBand", "Pop Punk");
        let breakdown = score_breakdown(&item, &angry(), &ScoringLimits::default());
        assert!(breakdown.is_excluded());
        assert_eq!(breakdown.total, 0.0);
        assert!(breakdown.summary().contains("excluded"));
    }

    #[test]
    fn test_empty_metadata_scores_zero() {
        let item = Item::default();
        for category in Taxonomy::default_moods().categories() {
            assert_eq!(score(&item, category, &ScoringLimits::default()), 0.0);
        }
        assert_eq!(score(&item, &angry(), &ScoringLimits::default()), 0.0);
    }

    #[test]
    fn test_scores_are_never_negative() {
        let taxonomy = Taxonomy::default_moods();
        let items = [
            Item::new("Love Me Tender", "Elvis", "Rock"),
            Item::new("Calm Piano Study", "Yiruma", "Classical"),
            Item::new("Kill the Lights", "DJ Power", "EDM"),
            Item::new("", "", "Death Metal"),
        ];
        for item in &items {
            for value in score_all(item, &taxonomy, &ScoringLimits::default()) {
                assert!(value >= 0.0 && value.is_finite());
            }
        }
    }

    #[test]
    fn test_memo_shares_scores_only_between_identical_items() {
        let taxonomy = Taxonomy::new(vec![angry()]).unwrap();
        let limits = ScoringLimits::default();
        let items = vec![
            Item::new("Rage", "Band", "Punk"),
            Item::new("Rage", "Band", "Pop"),
            Item::new("Rage", "Band", "Punk"),
            Item::new("Quiet", "Other", ""),
        ];

        let memo = ScoreMemo::build(&items, &taxonomy, &limits);
        assert_eq!(memo.len(), 3);
        assert_eq!(memo.get(&items[0]), Some(&[34.0][..]));
        assert_eq!(memo.get(&items[2]), memo.get(&items[0]));
        // Same name and artist, but the genre is vetoed.
        assert_eq!(memo.get(&items[1]), Some(&[0.0][..]));

        let unknown = Item::new("War", "", "");
        assert!(memo.get(&unknown).is_none());
        assert_eq!(memo.scores(&unknown, &taxonomy, &limits), vec![10.0]);
    }

    #[test]
    fn test_memo_matches_direct_scoring_in_any_order() {
        let taxonomy = Taxonomy::new(vec![angry()]).unwrap();
        let limits = ScoringLimits::default();
        let vetoed = Item::new("Rage", "Band", "Pop Ballad");
        let genuine = Item::new("Rage", "Band", "Punk");

        for items in [vec![genuine.clone(), vetoed.clone()], vec![vetoed.clone(), genuine.clone()]] {
            let memo = ScoreMemo::build(&items, &taxonomy, &limits);
            for item in &items {
                assert_eq!(memo.scores(item, &taxonomy, &limits), score_all(item, &taxonomy, &limits));
            }
        }
    }
}
