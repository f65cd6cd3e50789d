//! Category selection: from per-category scores to an item's category set.

use crate::config::SelectionPolicy;
use crate::taxonomy::Taxonomy;
use std::cmp::Ordering;

/// Pick the categories an item belongs to.
///
/// `scores` are aligned with `taxonomy.categories()`. Categories below
/// `policy.floor` are discarded, the rest must reach
/// `top * policy.closeness_ratio`. Results are ordered by score, ties in
/// taxonomy declaration order, and truncated to `policy.max_categories`.
///
/// Returns indices into the taxonomy. An empty result means unclassified,
/// unless the policy names a fallback category.
#[must_use]
pub fn select_indices(scores: &[f64], taxonomy: &Taxonomy, policy: &SelectionPolicy) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, score)| score >= policy.floor)
        .collect();

    // Stable: equal scores keep declaration order.
    ranked.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let Some(&(winner, top)) = ranked.first() else {
        return fallback(taxonomy, policy);
    };

    if let Some(lead) = policy.min_lead {
        // The runner-up counts even when it sits below the floor.
        let runner_up = scores
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != winner)
            .map(|(_, &score)| score)
            .fold(0.0, f64::max);
        return if top - runner_up >= lead { vec![winner] } else { Vec::new() };
    }

    let threshold = top * policy.closeness_ratio;
    ranked
        .into_iter()
        .take_while(|&(_, score)| score >= threshold)
        .take(policy.max_categories)
        .map(|(index, _)| index)
        .collect()
}

/// [`select_indices`], resolved to category names.
///
/// # Examples
///
/// ```
/// use moodsort::config::SelectionPolicy;
/// use moodsort::selector::select;
/// use moodsort::taxonomy::Taxonomy;
///
/// let taxonomy = Taxonomy::default_moods();
/// let scores = [30.0, 0.0, 25.0, 5.0, 0.0, 0.0];
/// let chosen = select(&scores, &taxonomy, &SelectionPolicy::default());
/// assert_eq!(chosen, vec!["Angry/Mad", "Workout/Go Time"]);
/// ```
#[must_use]
pub fn select<'t>(scores: &[f64], taxonomy: &'t Taxonomy, policy: &SelectionPolicy) -> Vec<&'t str> {
    select_indices(scores, taxonomy, policy)
        .into_iter()
        .filter_map(|index| taxonomy.categories().get(index))
        .map(|category| category.name.as_str())
        .collect()
}

fn fallback(taxonomy: &Taxonomy, policy: &SelectionPolicy) -> Vec<usize> {
    policy
        .fallback_category
        .as_deref()
        .and_then(|name| taxonomy.position(name))
        .into_iter()
        .collect()
}
