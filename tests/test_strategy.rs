mod common;

use approx::assert_relative_eq;
use gto_trainer::error::TrainerError;
use gto_trainer::solution::{Action, ActionKind, DecisionNode, HandData};
use gto_trainer::strategy::*;

fn three_way() -> DecisionNode {
    DecisionNode::new(
        0,
        vec![
            Action::new(ActionKind::Fold, 0.0, None),
            Action::new(ActionKind::Call, 100.0, None),
            Action::new(ActionKind::Raise, 300.0, Some(7)),
        ],
    )
    // argmax is Fold with EV 0; Raise's EV alone would be in band
    .with_hand("A5s", HandData::new(vec![0.6, 0.1, 0.3], vec![0.0, -0.02, 0.4]))
    // argmax is Raise with EV 0.5
    .with_hand("KJo", HandData::new(vec![0.1, 0.2, 0.7], vec![0.0, 0.1, 0.5]))
}

#[test]
fn test_pure_threshold() {
    let node = DecisionNode::new(0, vec![
        Action::new(ActionKind::Fold, 0.0, None),
        Action::new(ActionKind::Raise, 200.0, None),
    ])
    .with_hand("AA", HandData::new(vec![0.10, 0.90], vec![0.0, 1.0]))
    .with_hand("KK", HandData::new(vec![0.11, 0.89], vec![0.0, 1.0]));
    assert!(is_pure_strategy(&node, "AA"));
    assert!(!is_pure_strategy(&node, "KK"));
    assert!(!is_pure_strategy(&node, "QQ"));
}

#[test]
fn test_two_action_range_checks_every_ev() {
    let node = common::node(4);
    let bounds = EvBounds::default();
    // AA: 0.0 and 3.0, neither in a band
    assert!(!is_in_range(&node, "AA", &bounds));
    assert!(is_in_range(&node, "72o", &bounds));
    assert!(is_in_range(&node, "KQs", &bounds));
}

#[test]
fn test_multi_action_range_checks_top_action_only() {
    let node = three_way();
    let bounds = EvBounds::default();
    assert!(!is_in_range(&node, "A5s", &bounds));
    assert!(is_in_range(&node, "KJo", &bounds));
}

#[test]
fn test_band_edges_are_inclusive() {
    let bounds = EvBounds::default();
    assert!(bounds.contains(0.07));
    assert!(bounds.contains(1.0));
    assert!(bounds.contains(-0.07));
    assert!(bounds.contains(-1.0));
    assert!(!bounds.contains(0.0));
    assert!(!bounds.contains(1.01));
    assert!(!bounds.contains(-0.06));
}

#[test]
fn test_frequency_helpers() {
    let node = three_way();
    assert_eq!(dominant_action_index(&node, "KJo"), Some(2));
    assert_relative_eq!(max_frequency(&node, "A5s"), 0.6);
    assert_relative_eq!(total_frequency(&node, "KJo"), 1.0);
    assert_eq!(frequencies(&node, "missing"), Vec::<f64>::new());
    assert_relative_eq!(max_ev(&node, "KJo").unwrap(), 0.5);
    assert_relative_eq!(top_ev_gap(&node, "KJo").unwrap(), 0.4, epsilon = 1e-9);
}

#[test]
fn test_marginal_hands() {
    let node = DecisionNode::new(0, vec![
        Action::new(ActionKind::Fold, 0.0, None),
        Action::new(ActionKind::Call, 100.0, None),
    ])
    .with_hand("JTs", HandData::new(vec![0.5, 0.5], vec![0.0, 0.04]))
    .with_hand("J9s", HandData::new(vec![0.5, 0.5], vec![0.0, 0.05]));
    assert!(is_marginal(&node, "JTs", 0.05));
    assert!(!is_marginal(&node, "J9s", 0.05));
}

#[test]
fn test_playable_range_skips_zero_frequency() {
    let node = common::node(0).with_hand("32o", HandData::new(vec![0.0, 0.0], vec![0.0, 0.0]));
    let mut range = playable_range(&node);
    range.sort();
    assert_eq!(range, vec!["72o", "AA", "KQs"]);
}

#[test]
fn test_validate_lengths() {
    let node = common::node(0).with_hand("QQ", HandData::new(vec![0.0, 0.5, 0.5], vec![0.0, 1.0]));
    assert!(validate(&node, "AA", 0).is_ok());
    let err = validate(&node, "QQ", 0).unwrap_err();
    assert!(err.is_structural());
    assert!(matches!(err, TrainerError::LengthMismatch { played: 3, evs: 2, actions: 2, .. }));
    assert!(matches!(validate(&node, "JJ", 0), Err(TrainerError::HandNotFound { .. })));
}

#[test]
fn test_summarize() {
    let s = summarize(&common::node(0), "KQs").unwrap();
    assert_eq!(s.dominant, Some(1));
    assert!(!s.pure);
    assert!(summarize(&common::node(0), "32o").is_none());
}

#[test]
fn test_fixture_frequencies_are_normalized() {
    for (id, node) in common::tree() {
        for hand in node.hands.keys() {
            validate(&node, hand, id).unwrap();
            let freqs = frequencies(&node, hand);
            let total: f64 = freqs.iter().sum();
            assert!((0.0..=1.0 + 1e-9).contains(&total), "{} at node {} sums to {}", hand, id, total);
            if total > 0.0 {
                assert_eq!(dominant_action_index(&node, hand), argmax(&freqs));
            }
        }
    }
}
