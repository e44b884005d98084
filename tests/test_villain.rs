mod common;

use std::sync::Arc;

use gto_trainer::cards::Combo;
use gto_trainer::error::TrainerError;
use gto_trainer::loader::MemoryLoader;
use gto_trainer::solution::{Action, ActionKind, DecisionNode, HandData};
use gto_trainer::store::TreeStore;
use gto_trainer::villain::*;

/// Deals a fixed sequence of combos, round robin.
struct Scripted {
    combos: Vec<Combo>,
    next: usize,
}

impl Scripted {
    fn new(combos: &[&str]) -> Self {
        Scripted {
            combos: combos.iter().map(|c| c.parse().unwrap()).collect(),
            next: 0,
        }
    }
}

impl ComboSampler for Scripted {
    fn next_combo(&mut self) -> Combo {
        let combo = self.combos[self.next % self.combos.len()];
        self.next += 1;
        combo
    }

    fn next_unit(&mut self) -> f64 {
        0.0
    }
}

fn open(seat: usize) -> ForcedSeat {
    ForcedSeat {
        seat,
        action: ForcedAction::Open {
            size_bb: 2.0,
            tolerance_bb: 0.1,
        },
    }
}

fn shove(seat: usize) -> ForcedSeat {
    ForcedSeat {
        seat,
        action: ForcedAction::Shove {
            min_stack_fraction: 0.5,
        },
    }
}

// ---------------------------------------------------------------------------
// Unconstrained
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_villains_play_their_top_action() {
    let store = common::store();
    let sim = VillainSimulator::default();
    let mut sampler = Scripted::new(&["7c2d", "AsAh"]);

    let t = sim
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &Policy::Unconstrained, &mut sampler)
        .await
        .unwrap();
    assert_eq!(t.final_node, 3);
    let labels: Vec<&str> = t.villain_actions.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(labels, vec!["Fold", "All-in 20"]);
    assert_eq!(t.villain_actions[0].amount_bb, None);
    assert_eq!(t.villain_actions[1].amount_bb, Some(20.0));
    assert_eq!(t.villain_actions[1].combo.unwrap().hand_name(), "AA");
}

#[tokio::test]
async fn test_scripted_sampler_is_deterministic() {
    let store = common::store();
    let sim = VillainSimulator::default();
    let script = ["KsQs", "7c2d", "AsAh"];

    let first = sim
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &Policy::Unconstrained, &mut Scripted::new(&script))
        .await;
    let second = sim
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &Policy::Unconstrained, &mut Scripted::new(&script))
        .await;
    assert_eq!(first.unwrap(), second.unwrap());
}

#[tokio::test]
async fn test_hand_without_strategy_folds() {
    let store = common::store();
    let sim = VillainSimulator::default();
    // QQ is not in the range, so seat 0 folds; AA at seat 1 shoves
    let mut sampler = Scripted::new(&["QsQh", "AsAh"]);
    let t = sim
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &Policy::Unconstrained, &mut sampler)
        .await
        .unwrap();
    assert_eq!(t.villain_actions[0].label, "Fold");
    assert_eq!(t.final_node, 3);
}

#[tokio::test]
async fn test_hero_first_to_act_has_no_history() {
    let store = common::store();
    let t = VillainSimulator::default()
        .advance_to_hero(&store, common::SOLUTION, 0, 0, &Policy::Unconstrained, &mut Scripted::new(&["AsAh"]))
        .await
        .unwrap();
    assert_eq!(t.final_node, 0);
    assert!(t.villain_actions.is_empty());
}

// ---------------------------------------------------------------------------
// Constrained
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_folds_to_hero() {
    let store = common::store();
    let sim = VillainSimulator::default();
    let t = sim
        .advance_to_hero(&store, common::SOLUTION, 0, 1, &Policy::folds_to_hero(), &mut Scripted::new(&["AsAh"]))
        .await
        .unwrap();
    assert_eq!(t.final_node, 1);
    assert_eq!(t.villain_actions.len(), 1);
    assert_eq!(t.villain_actions[0].label, "Fold");
}

#[tokio::test]
async fn test_hand_ending_before_hero_fails() {
    let store = common::store();
    // seat 0 and seat 1 fold, which ends the hand before the BB acts
    let t = VillainSimulator::default()
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &Policy::folds_to_hero(), &mut Scripted::new(&["AsAh"]))
        .await;
    assert!(t.is_err());
}

#[tokio::test]
async fn test_forced_open_then_folds() {
    let store = common::store();
    let policy = Policy::Constrained { forced: vec![open(0)] };
    let t = VillainSimulator::default()
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &policy, &mut Scripted::new(&["AsAh"]))
        .await
        .unwrap();
    assert_eq!(t.final_node, 4);
    let labels: Vec<&str> = t.villain_actions.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(labels, vec!["Raise 2", "Fold"]);
    // display combos come from hands that take the action
    assert_eq!(t.villain_actions[0].combo.unwrap().hand_name(), "AA");
}

#[tokio::test]
async fn test_forced_shove() {
    let store = common::store();
    let policy = Policy::Constrained { forced: vec![shove(1)] };
    let t = VillainSimulator::default()
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &policy, &mut Scripted::new(&["AsAh"]))
        .await
        .unwrap();
    assert_eq!(t.final_node, 3);
    assert_eq!(t.villain_actions[1].label, "All-in 20");
}

#[tokio::test]
async fn test_forced_seat_without_the_action_fails() {
    let store = common::store();
    // node 0 offers a 2bb raise only, no shove
    let policy = Policy::Constrained { forced: vec![shove(0)] };
    let t = VillainSimulator::default()
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &policy, &mut Scripted::new(&["AsAh"]))
        .await;
    assert!(t.is_err());
}

#[test]
fn test_find_forced_action() {
    let meta = common::meta();
    let root = common::node(0);
    assert_eq!(find_forced_action(&meta, &root, &open(0).action), Some(1));
    assert_eq!(find_forced_action(&meta, &root, &shove(0).action), None);

    let sb = common::node(1);
    assert_eq!(find_forced_action(&meta, &sb, &shove(1).action), Some(1));
    assert_eq!(find_forced_action(&meta, &sb, &open(1).action), None);

    // an action no hand ever takes does not count
    let mut unplayed = common::node(0);
    for data in unplayed.hands.values_mut() {
        data.played = vec![1.0, 0.0];
    }
    assert_eq!(find_forced_action(&meta, &unplayed, &open(0).action), None);
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

fn looping_store() -> TreeStore {
    let fold_to = |player, next| {
        common::with_range(DecisionNode::new(
            player,
            vec![
                Action::new(ActionKind::Fold, 0.0, Some(next)),
                Action::new(ActionKind::Call, 100.0, None),
            ],
        ))
    };
    let loader = MemoryLoader::new().with_tree(
        common::SOLUTION,
        vec![(0, fold_to(0, 5)), (5, fold_to(1, 6)), (6, fold_to(0, 5)), (7, fold_to(1, 0))],
    );
    TreeStore::with_solutions(Arc::new(loader), vec![common::meta()])
}

#[tokio::test]
async fn test_walk_is_bounded() {
    let store = looping_store();
    let t = VillainSimulator::new(10)
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &Policy::folds_to_hero(), &mut Scripted::new(&["AsAh"]))
        .await;
    assert!(t.is_err());
}

#[tokio::test]
async fn test_edge_back_to_root_fails() {
    let store = looping_store();
    let t = VillainSimulator::default()
        .advance_to_hero(&store, common::SOLUTION, 7, 2, &Policy::folds_to_hero(), &mut Scripted::new(&["AsAh"]))
        .await;
    assert!(t.is_err());
}

#[tokio::test]
async fn test_missing_child_is_dangling() {
    let loader = MemoryLoader::new().with_tree(common::SOLUTION, vec![(0, common::node(0))]);
    let store = TreeStore::with_solutions(Arc::new(loader), vec![common::meta()]);
    let err = VillainSimulator::default()
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &Policy::folds_to_hero(), &mut Scripted::new(&["AsAh"]))
        .await
        .unwrap_err();
    assert!(matches!(err, TrainerError::DanglingChild { node: 0, action: 0, child: 1 }));
    assert!(err.is_structural());
}

#[tokio::test]
async fn test_missing_start_is_unavailable() {
    let store = TreeStore::with_solutions(Arc::new(MemoryLoader::new()), vec![common::meta()]);
    let err = VillainSimulator::default()
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &Policy::Unconstrained, &mut Scripted::new(&["AsAh"]))
        .await
        .unwrap_err();
    assert!(matches!(err, TrainerError::NodeUnavailable { node: 0, .. }));
}

#[tokio::test]
async fn test_frequencies_longer_than_actions_are_structural() {
    let root = DecisionNode::new(
        0,
        vec![
            Action::new(ActionKind::Fold, 0.0, Some(1)),
            Action::new(ActionKind::Raise, 200.0, Some(2)),
        ],
    )
    .with_hand("AA", HandData::new(vec![0.0, 0.0, 1.0], vec![0.0, 0.0, 1.0]));
    let loader = MemoryLoader::new().with_tree(common::SOLUTION, vec![(0, root)]);
    let store = TreeStore::with_solutions(Arc::new(loader), vec![common::meta()]);

    let err = VillainSimulator::default()
        .advance_to_hero(&store, common::SOLUTION, 0, 2, &Policy::Unconstrained, &mut Scripted::new(&["AsAh"]))
        .await
        .unwrap_err();
    assert!(matches!(err, TrainerError::LengthMismatch { played: 3, actions: 2, .. }));
    assert!(err.is_structural());
}
