//! Villain policy simulation: play the table forward from a node until the
//! hero is to act.
//!
//! Unconstrained play deals every villain a random combo and lets it take its
//! most frequent action. Constrained play forces chosen seats to open or shove
//! and folds everyone else.

use async_trait::async_trait;
use log::{debug, trace};
use rand::Rng;

use crate::cards::Combo;
use crate::catalog::random_combo;
use crate::error::{TrainerError, TrainerResult};
use crate::labels::{action_label, amount_bb};
use crate::solution::{ActionKind, DecisionNode, NodeId, Seat, SolutionMeta, ROOT_NODE};
use crate::spot::VillainAction;
use crate::store::TreeStore;
use crate::strategy::{argmax, validate};

pub const MAX_STEPS: usize = 50;

/// Rejection-sampling attempts when drawing a display combo for an action.
const DISPLAY_DRAWS: usize = 500;

/// Source of villain hole cards.
pub trait ComboSampler: Send {
    /// A uniformly random combo from the full catalog.
    fn next_combo(&mut self) -> Combo;

    /// A uniform number in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// A combo whose hand plays action `idx` at `node`, drawn in proportion to
    /// that frequency.
    fn combo_for_action(&mut self, node: &DecisionNode, idx: usize) -> Option<Combo> {
        for _ in 0..DISPLAY_DRAWS {
            let combo = self.next_combo();
            let freq = node
                .hand(&combo.hand_name())
                .and_then(|h| h.played.get(idx).copied())
                .unwrap_or(0.0);
            if freq > 0.0 && self.next_unit() < freq {
                return Some(combo);
            }
        }
        None
    }
}

/// Samples from the whole deck with any `rand` generator.
pub struct UniformSampler<'a, R: Rng + Send> {
    rng: &'a mut R,
}

impl<'a, R: Rng + Send> UniformSampler<'a, R> {
    pub fn new(rng: &'a mut R) -> Self {
        UniformSampler { rng }
    }
}

impl<R: Rng + Send> ComboSampler for UniformSampler<'_, R> {
    fn next_combo(&mut self) -> Combo {
        random_combo(&mut *self.rng)
    }

    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// The action a forced seat must take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForcedAction {
    /// A raise sized within `tolerance_bb` of `size_bb`.
    Open { size_bb: f64, tolerance_bb: f64 },
    /// A raise (or, facing a shove, a call) committing at least this share
    /// of the seat's stack.
    Shove { min_stack_fraction: f64 },
}

impl ForcedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForcedAction::Open { .. } => "open",
            ForcedAction::Shove { .. } => "shove",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForcedSeat {
    pub seat: Seat,
    pub action: ForcedAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
    Unconstrained,
    /// Forced seats take their action, everyone else folds.
    Constrained { forced: Vec<ForcedSeat> },
}

impl Policy {
    pub fn folds_to_hero() -> Policy {
        Policy::Constrained { forced: Vec::new() }
    }
}

/// Index of the action satisfying `forced` at `node`, provided some hand in
/// the range takes it.
pub fn find_forced_action(
    meta: &SolutionMeta,
    node: &DecisionNode,
    forced: &ForcedAction,
) -> Option<usize> {
    match *forced {
        ForcedAction::Open {
            size_bb,
            tolerance_bb,
        } => node.actions.iter().enumerate().position(|(i, a)| {
            a.kind == ActionKind::Raise
                && (meta.to_bb(a.amount) - size_bb).abs() <= tolerance_bb + 1e-9
                && node.action_in_range(i)
        }),
        ForcedAction::Shove { min_stack_fraction } => {
            let stack = meta.settings.stacks.get(node.player).copied().unwrap_or(0.0);
            if stack <= 0.0 {
                return None;
            }
            let mut candidates: Vec<usize> = node
                .actions
                .iter()
                .enumerate()
                .filter(|(_, a)| matches!(a.kind, ActionKind::Raise | ActionKind::Call))
                .filter(|(_, a)| a.amount >= stack * min_stack_fraction)
                .map(|(i, _)| i)
                .collect();
            // raises before calls, largest first
            candidates.sort_by(|&a, &b| {
                let (x, y) = (&node.actions[a], &node.actions[b]);
                let rank = |k: ActionKind| if k == ActionKind::Raise { 0 } else { 1 };
                rank(x.kind)
                    .cmp(&rank(y.kind))
                    .then(y.amount.total_cmp(&x.amount))
            });
            candidates.into_iter().find(|&i| node.action_in_range(i))
        }
    }
}

/// Result of a successful walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    pub final_node: NodeId,
    pub villain_actions: Vec<VillainAction>,
}

/// Walks a solution's tree from a node to the hero's decision.
///
/// Any failure abandons the walk; the caller decides whether to retry.
#[async_trait]
pub trait TreeWalker: Send + Sync {
    async fn advance_to_hero(
        &self,
        store: &TreeStore,
        solution: &str,
        start: NodeId,
        hero: Seat,
        policy: &Policy,
        sampler: &mut dyn ComboSampler,
    ) -> TrainerResult<Traversal>;
}

pub struct VillainSimulator {
    pub max_steps: usize,
}

impl Default for VillainSimulator {
    fn default() -> Self {
        VillainSimulator {
            max_steps: MAX_STEPS,
        }
    }
}

impl VillainSimulator {
    pub fn new(max_steps: usize) -> Self {
        VillainSimulator { max_steps }
    }

    /// A malformed hand (frequencies not matching the actions) is an error,
    /// not a choice.
    fn choose_unconstrained(
        node: &DecisionNode,
        node_id: NodeId,
        sampler: &mut dyn ComboSampler,
    ) -> TrainerResult<Option<(usize, Option<Combo>)>> {
        let combo = sampler.next_combo();
        let hand = combo.hand_name();
        let idx = match node.hand(&hand) {
            Some(data) if data.total_frequency() > 0.0 => {
                validate(node, &hand, node_id)?;
                argmax(&data.played)
            }
            _ => node.action_index(ActionKind::Fold),
        };
        Ok(idx.map(|idx| (idx, Some(combo))))
    }

    fn choose_constrained(
        meta: &SolutionMeta,
        node: &DecisionNode,
        forced: &[ForcedSeat],
        acted: &mut [bool],
        sampler: &mut dyn ComboSampler,
    ) -> Option<(usize, Option<Combo>)> {
        let pending = forced
            .iter()
            .enumerate()
            .find(|(i, f)| f.seat == node.player && !acted[*i]);
        let idx = match pending {
            Some((i, f)) => {
                let idx = find_forced_action(meta, node, &f.action)?;
                acted[i] = true;
                idx
            }
            None => node.action_index(ActionKind::Fold)?,
        };
        Some((idx, sampler.combo_for_action(node, idx)))
    }
}

#[async_trait]
impl TreeWalker for VillainSimulator {
    async fn advance_to_hero(
        &self,
        store: &TreeStore,
        solution: &str,
        start: NodeId,
        hero: Seat,
        policy: &Policy,
        sampler: &mut dyn ComboSampler,
    ) -> TrainerResult<Traversal> {
        let meta = store.meta(solution)?;
        let failed = || TrainerError::WalkFailed {
            solution: solution.to_string(),
            hero,
        };
        let forced: &[ForcedSeat] = match policy {
            Policy::Unconstrained => &[],
            Policy::Constrained { forced } => forced,
        };
        let mut acted = vec![false; forced.len()];
        let mut villain_actions = Vec::new();
        let mut current = start;
        // node and action index that led to `current`
        let mut parent: Option<(NodeId, usize)> = None;

        for _ in 0..self.max_steps {
            let node = match (store.ensure_node(solution, current).await, parent) {
                (Ok(node), _) => node,
                (Err(TrainerError::NodeUnavailable { .. }), Some((from, action))) => {
                    return Err(TrainerError::DanglingChild {
                        node: from,
                        action,
                        child: current,
                    });
                }
                (Err(e), _) => return Err(e),
            };
            if node.player == hero {
                return Ok(Traversal {
                    final_node: current,
                    villain_actions,
                });
            }

            let choice = match policy {
                Policy::Unconstrained => Self::choose_unconstrained(&node, current, sampler)?,
                Policy::Constrained { .. } => {
                    Self::choose_constrained(&meta, &node, forced, &mut acted, sampler)
                }
            };
            let Some((idx, combo, action)) =
                choice.and_then(|(idx, combo)| Some((idx, combo, node.actions.get(idx)?)))
            else {
                debug!("seat {} at node {} has no usable action", node.player, current);
                return Err(failed());
            };

            let label = action_label(&meta, &node, idx);
            trace!("node {} seat {} -> {}", current, node.player, label);
            villain_actions.push(VillainAction {
                seat: node.player,
                label,
                amount_bb: matches!(action.kind, ActionKind::Call | ActionKind::Raise)
                    .then(|| amount_bb(&meta, action)),
                combo,
            });

            match action.node {
                Some(next) if next != ROOT_NODE => {
                    parent = Some((current, idx));
                    current = next;
                }
                _ => {
                    debug!("hand ended at node {} before seat {} acted", current, hero);
                    return Err(failed());
                }
            }
        }
        debug!("no hero decision within {} steps", self.max_steps);
        Err(failed())
    }
}
