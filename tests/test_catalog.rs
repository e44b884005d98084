use std::collections::HashSet;

use gto_trainer::cards::Combo;
use gto_trainer::catalog::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_hand_and_combo_totals() {
    assert_eq!(HAND_NAMES.len(), NUM_HANDS);
    assert_eq!(ALL_COMBOS.len(), NUM_COMBOS);
    let unique: HashSet<Combo> = ALL_COMBOS.iter().copied().collect();
    assert_eq!(unique.len(), NUM_COMBOS);
}

#[test]
fn test_combos_per_shape() {
    for (name, expected) in [("AA", 6), ("22", 6), ("AKs", 4), ("54s", 4), ("AKo", 12), ("72o", 12)] {
        let combos = combos_for_hand(name).unwrap();
        assert_eq!(combos.len(), expected, "{}", name);
        assert_eq!(combo_count(name), expected);

        let unique: HashSet<&Combo> = combos.iter().collect();
        assert_eq!(unique.len(), expected, "{} has duplicate combos", name);
        for combo in combos {
            assert_ne!(combo.high, combo.low);
            assert_eq!(combo.hand_name(), name);
        }
    }
}

#[test]
fn test_every_hand_name_round_trips() {
    for name in HAND_NAMES.iter() {
        assert!(is_hand_name(name));
        for combo in combos_for_hand(name).unwrap() {
            assert_eq!(&combo.hand_name(), name);
        }
    }
    assert!(!is_hand_name("KAs"));
    assert!(combos_for_hand("XYz").is_err());
}

#[test]
fn test_grid_layout() {
    assert_eq!(grid_hand(0), "AA");
    assert_eq!(grid_hand(1), "AKs");
    assert_eq!(grid_hand(13), "AKo");
    assert_eq!(grid_hand(168), "22");
}

#[test]
fn test_random_combo_of_matches_hand() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        assert_eq!(random_combo_of("T9s", &mut rng).unwrap().hand_name(), "T9s");
        let combo = random_combo(&mut rng);
        assert!(is_hand_name(&combo.hand_name()));
    }
}
