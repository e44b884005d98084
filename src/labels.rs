//! Human-readable action labels. Display only: generation and scoring never
//! depend on the all-in heuristic here.

use crate::solution::{Action, ActionKind, DecisionNode, Seat, SolutionMeta};

/// A raise committing at least this share of the stack is shown as all-in.
const ALL_IN_STACK_SHARE: f64 = 0.95;

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// "2", "2.5", "13.2": one decimal, trailing zero dropped.
pub fn format_bb(bb: f64) -> String {
    let r = round1(bb);
    if (r - r.trunc()).abs() < 1e-9 {
        format!("{}", r as i64)
    } else {
        format!("{:.1}", r)
    }
}

pub fn amount_bb(meta: &SolutionMeta, action: &Action) -> f64 {
    round1(meta.to_bb(action.amount))
}

/// True when a raise puts (nearly) the whole stack in, or at least covers
/// every other seat still holding chips.
pub fn is_all_in(meta: &SolutionMeta, seat: Seat, action: &Action) -> bool {
    if action.kind != ActionKind::Raise {
        return false;
    }
    let Some(&stack) = meta.settings.stacks.get(seat) else {
        return false;
    };
    if stack <= 0.0 {
        return false;
    }
    if action.amount >= stack * ALL_IN_STACK_SHARE {
        return true;
    }
    let biggest_other = meta
        .settings
        .stacks
        .iter()
        .enumerate()
        .filter(|&(s, _)| s != seat)
        .map(|(_, &st)| st)
        .fold(0.0, f64::max);
    biggest_other > 0.0 && action.amount >= biggest_other
}

pub fn action_label(meta: &SolutionMeta, node: &DecisionNode, idx: usize) -> String {
    let Some(action) = node.actions.get(idx) else {
        return "?".to_string();
    };
    match action.kind {
        ActionKind::Fold | ActionKind::Check | ActionKind::Call => action.kind.as_str().to_string(),
        ActionKind::Raise if is_all_in(meta, node.player, action) => {
            format!("All-in {}", format_bb(meta.to_bb(action.amount)))
        }
        ActionKind::Raise => format!("Raise {}", format_bb(meta.to_bb(action.amount))),
    }
}

/// Labels for every action of a node, in action order.
pub fn action_labels(meta: &SolutionMeta, node: &DecisionNode) -> Vec<String> {
    (0..node.actions.len())
        .map(|i| action_label(meta, node, i))
        .collect()
}
