//! Answer scoring against the solved strategy.
//!
//! A pure hand (top action at or above 90%) has one correct answer: the top
//! action. A mixed hand accepts any action the solver ever takes with it.

use serde::{Deserialize, Serialize};

use crate::error::{TrainerError, TrainerResult};
use crate::labels::{is_all_in, round1};
use crate::solution::{ActionKind, DecisionNode, SolutionMeta};
use crate::strategy::{argmax, is_pure_strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoringRule {
    /// 1 point when correct, 0 otherwise.
    #[default]
    Binary,
    /// Chosen frequency relative to the top frequency, in `[0, 1]`.
    /// Kept for reproducing older point totals.
    Proportional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub is_correct: bool,
    pub points: f64,
    pub chosen_ev: Option<f64>,
    pub chosen_index: usize,
    pub chosen_frequency: f64,
    pub dominant_index: Option<usize>,
    pub pure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelKind {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

/// Split a label like "Raise 2.5", "call", "All-in 15bb" into kind and size.
pub fn parse_label(label: &str) -> TrainerResult<(LabelKind, Option<f64>)> {
    let lower = label.trim().to_lowercase().replace("all-in", "allin").replace("all in", "allin");
    let mut words = lower.split_whitespace();
    let kind = match words.next() {
        Some("fold") | Some("f") => LabelKind::Fold,
        Some("check") | Some("x") => LabelKind::Check,
        Some("call") | Some("c") => LabelKind::Call,
        Some("raise") | Some("bet") | Some("r") => LabelKind::Raise,
        Some("allin") | Some("shove") | Some("jam") => LabelKind::AllIn,
        _ => return Err(TrainerError::UnknownAction(label.to_string())),
    };
    let size = words
        .map(|w| w.trim_end_matches("bb"))
        .find_map(|w| w.parse::<f64>().ok());
    Ok((kind, size))
}

/// Index of the node action a label refers to. Raises match on their size in
/// big blinds, rounded to one decimal.
pub fn resolve_action(meta: &SolutionMeta, node: &DecisionNode, label: &str) -> TrainerResult<usize> {
    let unknown = || TrainerError::UnknownAction(label.to_string());
    let (kind, size) = parse_label(label)?;
    let raises: Vec<usize> = node
        .actions
        .iter()
        .enumerate()
        .filter(|(_, a)| a.kind == ActionKind::Raise)
        .map(|(i, _)| i)
        .collect();
    let sized = |bb: f64| {
        raises
            .iter()
            .copied()
            .find(|&i| (round1(meta.to_bb(node.actions[i].amount)) - round1(bb)).abs() < 1e-6)
    };

    match (kind, size) {
        (LabelKind::Fold, _) => node.action_index(ActionKind::Fold).ok_or_else(unknown),
        (LabelKind::Check, _) => node.action_index(ActionKind::Check).ok_or_else(unknown),
        (LabelKind::Call, _) => node.action_index(ActionKind::Call).ok_or_else(unknown),
        (LabelKind::Raise | LabelKind::AllIn, Some(bb)) => sized(bb).ok_or_else(unknown),
        (LabelKind::Raise, None) if raises.len() == 1 => Ok(raises[0]),
        (LabelKind::Raise, None) => Err(unknown()),
        (LabelKind::AllIn, None) => raises
            .iter()
            .copied()
            .find(|&i| is_all_in(meta, node.player, &node.actions[i]))
            .or_else(|| {
                raises
                    .iter()
                    .copied()
                    .max_by(|&a, &b| node.actions[a].amount.total_cmp(&node.actions[b].amount))
            })
            .ok_or_else(unknown),
    }
}

/// Score the action at `idx` for `hand`.
pub fn score_index(
    node: &DecisionNode,
    hand: &str,
    idx: usize,
    rule: ScoringRule,
) -> TrainerResult<ScoreResult> {
    let data = node
        .hand(hand)
        .ok_or_else(|| TrainerError::NoStrategy(hand.to_string()))?;
    let chosen_frequency = data.played.get(idx).copied().unwrap_or(0.0);
    let max_frequency = data.played.iter().copied().fold(0.0, f64::max);
    let dominant_index = argmax(&data.played);
    let pure = is_pure_strategy(node, hand);

    let is_correct = if pure {
        dominant_index == Some(idx)
    } else {
        chosen_frequency > 0.0
    };
    let points = match rule {
        ScoringRule::Binary => {
            if is_correct {
                1.0
            } else {
                0.0
            }
        }
        ScoringRule::Proportional if max_frequency > 0.0 => chosen_frequency / max_frequency,
        ScoringRule::Proportional => 0.0,
    };

    Ok(ScoreResult {
        is_correct,
        points,
        chosen_ev: data.evs.as_ref().and_then(|e| e.get(idx).copied()),
        chosen_index: idx,
        chosen_frequency,
        dominant_index,
        pure,
    })
}

pub fn score(
    meta: &SolutionMeta,
    node: &DecisionNode,
    hand: &str,
    label: &str,
    rule: ScoringRule,
) -> TrainerResult<ScoreResult> {
    let idx = resolve_action(meta, node, label)?;
    score_index(node, hand, idx, rule)
}

/// Score an answer that never came: the hand is folded, or checked when
/// folding is not an option.
pub fn score_timeout(node: &DecisionNode, hand: &str, rule: ScoringRule) -> TrainerResult<ScoreResult> {
    let idx = node
        .action_index(ActionKind::Fold)
        .or_else(|| node.action_index(ActionKind::Check))
        .ok_or_else(|| TrainerError::UnknownAction("Fold".to_string()))?;
    score_index(node, hand, idx, rule)
}
