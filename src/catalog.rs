//! Static catalog of the 169 canonical starting hands and their 1326 combos.

use std::collections::HashMap;

use itertools::Itertools;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::{parse_hand_name, Card, Combo, HandShape, ALL_SUITS};
use crate::error::{TrainerError, TrainerResult};

pub const NUM_HANDS: usize = 169;
pub const NUM_COMBOS: usize = 1326;

/// Ranks from ace down, the order of the 13x13 hand matrix.
pub const GRID_RANKS: [char; 13] = ['A', 'K', 'Q', 'J', 'T', '9', '8', '7', '6', '5', '4', '3', '2'];

/// Hand names in matrix order: pairs on the diagonal, suited above, offsuit below.
pub static HAND_NAMES: Lazy<Vec<String>> = Lazy::new(|| {
    (0..NUM_HANDS).map(grid_hand).collect()
});

static COMBOS_BY_HAND: Lazy<HashMap<String, Vec<Combo>>> = Lazy::new(|| {
    HAND_NAMES
        .iter()
        .map(|name| {
            let combos = build_combos(name).unwrap_or_default();
            (name.clone(), combos)
        })
        .collect()
});

/// Every combo of the deck, grouped by hand in matrix order.
pub static ALL_COMBOS: Lazy<Vec<Combo>> = Lazy::new(|| {
    HAND_NAMES
        .iter()
        .flat_map(|name| COMBOS_BY_HAND[name].iter().copied())
        .collect()
});

/// Hand name at a cell of the 13x13 matrix (row-major).
pub fn grid_hand(cell: usize) -> String {
    let row = cell / 13;
    let col = cell % 13;
    if row == col {
        format!("{}{}", GRID_RANKS[row], GRID_RANKS[col])
    } else if row < col {
        format!("{}{}s", GRID_RANKS[row], GRID_RANKS[col])
    } else {
        format!("{}{}o", GRID_RANKS[col], GRID_RANKS[row])
    }
}

fn build_combos(name: &str) -> TrainerResult<Vec<Combo>> {
    let (r1, r2, shape) = parse_hand_name(name)?;
    match shape {
        HandShape::Pair => ALL_SUITS
            .iter()
            .tuple_combinations()
            .map(|(&s1, &s2)| Combo::new(Card::new(r1, s1), Card::new(r1, s2)))
            .collect(),
        HandShape::Suited => ALL_SUITS
            .iter()
            .map(|&s| Combo::new(Card::new(r1, s), Card::new(r2, s)))
            .collect(),
        HandShape::Offsuit => ALL_SUITS
            .iter()
            .cartesian_product(ALL_SUITS.iter())
            .filter(|(s1, s2)| s1 != s2)
            .map(|(&s1, &s2)| Combo::new(Card::new(r1, s1), Card::new(r2, s2)))
            .collect(),
    }
}

/// All combos realizing a canonical hand name.
pub fn combos_for_hand(name: &str) -> TrainerResult<&'static [Combo]> {
    COMBOS_BY_HAND
        .get(name)
        .map(|v| v.as_slice())
        .ok_or_else(|| TrainerError::InvalidHandNotation(name.to_string()))
}

pub fn combo_count(name: &str) -> usize {
    parse_hand_name(name)
        .map(|(_, _, shape)| shape.combo_count())
        .unwrap_or(0)
}

pub fn is_hand_name(name: &str) -> bool {
    COMBOS_BY_HAND.contains_key(name)
}

/// Uniformly random combo from the full deck.
pub fn random_combo<R: Rng + ?Sized>(rng: &mut R) -> Combo {
    ALL_COMBOS[rng.gen_range(0..NUM_COMBOS)]
}

/// Uniformly random combo of a given hand.
pub fn random_combo_of<R: Rng + ?Sized>(name: &str, rng: &mut R) -> TrainerResult<Combo> {
    combos_for_hand(name)?
        .choose(rng)
        .copied()
        .ok_or_else(|| TrainerError::InvalidHandNotation(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_corners() {
        assert_eq!(grid_hand(0), "AA");
        assert_eq!(grid_hand(1), "AKs");
        assert_eq!(grid_hand(13), "AKo");
        assert_eq!(grid_hand(168), "22");
    }

    #[test]
    fn catalog_sizes() {
        assert_eq!(HAND_NAMES.len(), NUM_HANDS);
        assert_eq!(ALL_COMBOS.len(), NUM_COMBOS);
    }
}
