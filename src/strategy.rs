//! Strategy evaluation: what the solved tree says a hand does at a node.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{TrainerError, TrainerResult};
use crate::solution::{DecisionNode, NodeId};

/// A hand whose top action reaches this frequency has exactly one correct answer.
pub const PURE_THRESHOLD: f64 = 0.90;

/// Two-sided EV band used to pick instructive training hands.
///
/// Decisions with near-zero EV are too marginal and ones with extreme EV are
/// too obvious; anything falling in either band qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvBounds {
    pub min_positive: f64,
    pub max_positive: f64,
    pub min_negative: f64,
    pub max_negative: f64,
}

impl Default for EvBounds {
    fn default() -> Self {
        EvBounds {
            min_positive: 0.07,
            max_positive: 1.00,
            min_negative: -1.00,
            max_negative: -0.07,
        }
    }
}

impl EvBounds {
    pub fn contains(&self, ev: f64) -> bool {
        (ev >= self.min_positive && ev <= self.max_positive)
            || (ev >= self.min_negative && ev <= self.max_negative)
    }
}

/// First index of the largest value.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Action frequencies of a hand; empty when the node has no data for it.
pub fn frequencies(node: &DecisionNode, hand: &str) -> Vec<f64> {
    node.hand(hand).map(|h| h.played.clone()).unwrap_or_default()
}

pub fn evs<'a>(node: &'a DecisionNode, hand: &str) -> Option<&'a [f64]> {
    node.hand(hand).and_then(|h| h.evs.as_deref())
}

pub fn total_frequency(node: &DecisionNode, hand: &str) -> f64 {
    node.hand(hand).map_or(0.0, |h| h.total_frequency())
}

pub fn dominant_action_index(node: &DecisionNode, hand: &str) -> Option<usize> {
    node.hand(hand).and_then(|h| argmax(&h.played))
}

pub fn max_frequency(node: &DecisionNode, hand: &str) -> f64 {
    node.hand(hand)
        .and_then(|h| h.played.iter().copied().reduce(f64::max))
        .unwrap_or(0.0)
}

pub fn is_pure_strategy(node: &DecisionNode, hand: &str) -> bool {
    max_frequency(node, hand) >= PURE_THRESHOLD
}

/// EV-range test. With two actions any action's EV may fall in a band; with
/// three or more only the most frequent action is tested.
pub fn is_in_range(node: &DecisionNode, hand: &str, bounds: &EvBounds) -> bool {
    let Some(data) = node.hand(hand) else {
        return false;
    };
    let Some(evs) = data.evs.as_deref() else {
        return false;
    };
    if node.actions.len() <= 2 {
        evs.iter().any(|&ev| bounds.contains(ev))
    } else {
        argmax(&data.played)
            .and_then(|i| evs.get(i))
            .map_or(false, |&ev| bounds.contains(ev))
    }
}

pub fn max_ev(node: &DecisionNode, hand: &str) -> Option<f64> {
    evs(node, hand).and_then(|e| e.iter().copied().reduce(f64::max))
}

/// Difference between the two best EVs, if the hand has at least two.
pub fn top_ev_gap(node: &DecisionNode, hand: &str) -> Option<f64> {
    let mut sorted: Vec<f64> = evs(node, hand)?.to_vec();
    if sorted.len() < 2 {
        return None;
    }
    sorted.sort_by(|a, b| b.total_cmp(a));
    Some(sorted[0] - sorted[1])
}

/// Coin-flip hands: the two best actions are nearly worth the same.
pub fn is_marginal(node: &DecisionNode, hand: &str, min_gap: f64) -> bool {
    top_ev_gap(node, hand).map_or(false, |gap| gap < min_gap)
}

/// Hands that reach this node with nonzero total frequency.
pub fn playable_range(node: &DecisionNode) -> Vec<String> {
    node.hands
        .par_iter()
        .filter(|(_, data)| data.total_frequency() > 0.0)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Check that a hand has one frequency and one EV per action.
pub fn validate(node: &DecisionNode, hand: &str, node_id: NodeId) -> TrainerResult<()> {
    let data = node.hand(hand).ok_or_else(|| TrainerError::HandNotFound {
        hand: hand.to_string(),
        node: node_id,
    })?;
    let actions = node.actions.len();
    let evs = data.evs.as_ref().map_or(actions, |e| e.len());
    if data.played.len() != actions || evs != actions {
        return Err(TrainerError::LengthMismatch {
            hand: hand.to_string(),
            played: data.played.len(),
            evs,
            actions,
        });
    }
    Ok(())
}

/// Summary of one hand's strategy at a node.
#[derive(Debug, Clone, PartialEq)]
pub struct HandStrategy {
    pub hand: String,
    pub frequencies: Vec<f64>,
    pub evs: Option<Vec<f64>>,
    pub dominant: Option<usize>,
    pub pure: bool,
}

pub fn summarize(node: &DecisionNode, hand: &str) -> Option<HandStrategy> {
    let data = node.hand(hand)?;
    Some(HandStrategy {
        hand: hand.to_string(),
        frequencies: data.played.clone(),
        evs: data.evs.clone(),
        dominant: argmax(&data.played),
        pure: is_pure_strategy(node, hand),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[0.1, 0.3, 0.3]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn bands_exclude_marginal_and_extreme() {
        let b = EvBounds::default();
        assert!(b.contains(0.07));
        assert!(b.contains(-1.0));
        assert!(!b.contains(0.0));
        assert!(!b.contains(0.05));
        assert!(!b.contains(1.5));
        assert!(!b.contains(-1.2));
    }
}
