#![allow(dead_code)]

use std::sync::Arc;

use gto_trainer::loader::MemoryLoader;
use gto_trainer::solution::{
    Action, ActionKind, Blinds, DecisionNode, HandData, NodeId, Settings, SolutionMeta,
};
use gto_trainer::store::TreeStore;

pub const SOLUTION: &str = "ft3-20bb";

/// Three seats of 20bb (100 chips per bb): seat 0 opens, seat 1 is the SB,
/// seat 2 the BB.
pub fn meta() -> SolutionMeta {
    SolutionMeta {
        id: SOLUTION.to_string(),
        name: "Final table 20bb".to_string(),
        phase: "Final Table".to_string(),
        path: Some("ft3/20bb".to_string()),
        equity_model: "chipEV".to_string(),
        settings: Settings {
            stacks: vec![2000.0, 2000.0, 2000.0],
            blinds: Blinds {
                big: 100.0,
                small: 50.0,
                ante: 0.0,
            },
            bounties: Vec::new(),
            payouts: Vec::new(),
        },
    }
}

/// AA takes the second action, 72o the first, KQs mixes.
pub fn with_range(node: DecisionNode) -> DecisionNode {
    node.with_hand("AA", HandData::new(vec![0.0, 1.0], vec![0.0, 3.0]))
        .with_hand("72o", HandData::new(vec![1.0, 0.0], vec![0.0, -0.5]))
        .with_hand("KQs", HandData::new(vec![0.3, 0.7], vec![0.0, 0.3]))
}

fn two_way(player: usize, first: Action, second: Action) -> DecisionNode {
    with_range(DecisionNode::new(player, vec![first, second]))
}

/// ```text
/// 0 seat0: Fold -> 1, Raise 2bb -> 2
/// 1 seat1: Fold (end), All-in 20bb -> 3
/// 2 seat1: Fold -> 4, Call 2bb (end)
/// 3 seat2: Fold (end), Call 20bb (end)
/// 4 seat2: Fold (end), Call 2bb (end)
/// ```
pub fn tree() -> Vec<(NodeId, DecisionNode)> {
    vec![
        (
            0,
            two_way(
                0,
                Action::new(ActionKind::Fold, 0.0, Some(1)),
                Action::new(ActionKind::Raise, 200.0, Some(2)),
            ),
        ),
        (
            1,
            two_way(
                1,
                Action::new(ActionKind::Fold, 0.0, None),
                Action::new(ActionKind::Raise, 2000.0, Some(3)),
            ),
        ),
        (
            2,
            two_way(
                1,
                Action::new(ActionKind::Fold, 0.0, Some(4)),
                Action::new(ActionKind::Call, 200.0, None),
            ),
        ),
        (
            3,
            two_way(
                2,
                Action::new(ActionKind::Fold, 0.0, None),
                Action::new(ActionKind::Call, 2000.0, None),
            ),
        ),
        (
            4,
            two_way(
                2,
                Action::new(ActionKind::Fold, 0.0, None),
                Action::new(ActionKind::Call, 200.0, None),
            ),
        ),
    ]
}

pub fn loader() -> MemoryLoader {
    MemoryLoader::new().with_tree(SOLUTION, tree())
}

pub fn store_with(loader: Arc<MemoryLoader>) -> Arc<TreeStore> {
    Arc::new(TreeStore::with_solutions(loader, vec![meta()]))
}

pub fn store() -> Arc<TreeStore> {
    store_with(Arc::new(loader()))
}

pub fn node(id: NodeId) -> DecisionNode {
    tree()
        .into_iter()
        .find(|(n, _)| *n == id)
        .map(|(_, node)| node)
        .unwrap()
}
