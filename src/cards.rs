use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TrainerError, TrainerResult};

pub const RANKS_STR: &str = "23456789TJQKA";
pub const SUITS_STR: &str = "shdc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub fn from_char(c: char) -> TrainerResult<Rank> {
        match c.to_ascii_uppercase() {
            '2' => Ok(Rank::Two),
            '3' => Ok(Rank::Three),
            '4' => Ok(Rank::Four),
            '5' => Ok(Rank::Five),
            '6' => Ok(Rank::Six),
            '7' => Ok(Rank::Seven),
            '8' => Ok(Rank::Eight),
            '9' => Ok(Rank::Nine),
            'T' => Ok(Rank::Ten),
            'J' => Ok(Rank::Jack),
            'Q' => Ok(Rank::Queen),
            'K' => Ok(Rank::King),
            'A' => Ok(Rank::Ace),
            _ => Err(TrainerError::InvalidRank(c)),
        }
    }

    pub fn to_char(self) -> char {
        RANKS_STR.as_bytes()[self as usize - 2] as char
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Ranks from deuce to ace.
pub const ALL_RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub fn from_char(c: char) -> TrainerResult<Suit> {
        match c.to_ascii_lowercase() {
            's' => Ok(Suit::Spades),
            'h' => Ok(Suit::Hearts),
            'd' => Ok(Suit::Diamonds),
            'c' => Ok(Suit::Clubs),
            _ => Err(TrainerError::InvalidSuit(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "\u{2660}",
            Suit::Hearts => "\u{2665}",
            Suit::Diamonds => "\u{2666}",
            Suit::Clubs => "\u{2663}",
        }
    }
}

pub const ALL_SUITS: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    pub fn pretty(&self) -> String {
        format!("{}{}", self.rank.to_char(), self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

pub fn parse_card(notation: &str) -> TrainerResult<Card> {
    let notation = notation.trim();
    let chars: Vec<char> = notation.chars().collect();
    if chars.len() != 2 {
        return Err(TrainerError::InvalidCardNotation(notation.to_string()));
    }
    let rank = Rank::from_char(chars[0])?;
    let suit = Suit::from_char(chars[1])?;
    Ok(Card::new(rank, suit))
}

/// A specific two-card holding, stored high card first.
///
/// Pairs keep the suit order of [`ALL_SUITS`] so that "AhAs" and "AsAh"
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Combo {
    pub high: Card,
    pub low: Card,
}

impl Combo {
    pub fn new(a: Card, b: Card) -> TrainerResult<Combo> {
        if a == b {
            return Err(TrainerError::InvalidHandSize);
        }
        let a_first = match a.rank.cmp(&b.rank) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => a.suit < b.suit,
        };
        Ok(if a_first {
            Combo { high: a, low: b }
        } else {
            Combo { high: b, low: a }
        })
    }

    pub fn cards(&self) -> [Card; 2] {
        [self.high, self.low]
    }

    /// Canonical hand name: "AA", "AKs", "AKo".
    pub fn hand_name(&self) -> String {
        let (h, l) = (self.high.rank.to_char(), self.low.rank.to_char());
        if self.high.rank == self.low.rank {
            format!("{}{}", h, l)
        } else if self.high.suit == self.low.suit {
            format!("{}{}s", h, l)
        } else {
            format!("{}{}o", h, l)
        }
    }

    pub fn pretty(&self) -> String {
        format!("{}{}", self.high.pretty(), self.low.pretty())
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.high, self.low)
    }
}

impl FromStr for Combo {
    type Err = TrainerError;

    fn from_str(s: &str) -> TrainerResult<Combo> {
        let text = s.trim().replace(' ', "");
        if text.len() != 4 || !text.is_ascii() {
            return Err(TrainerError::InvalidHandNotation(s.to_string()));
        }
        Combo::new(parse_card(&text[..2])?, parse_card(&text[2..])?)
    }
}

impl TryFrom<String> for Combo {
    type Error = TrainerError;

    fn try_from(s: String) -> TrainerResult<Combo> {
        s.parse()
    }
}

impl From<Combo> for String {
    fn from(c: Combo) -> String {
        c.to_string()
    }
}

/// Kind of canonical starting hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandShape {
    Pair,
    Suited,
    Offsuit,
}

impl HandShape {
    pub fn combo_count(self) -> usize {
        match self {
            HandShape::Pair => 6,
            HandShape::Suited => 4,
            HandShape::Offsuit => 12,
        }
    }
}

/// Parse a canonical hand name ("77", "AKs", "T9o") into its ranks and shape.
/// The first rank is always the higher one.
pub fn parse_hand_name(notation: &str) -> TrainerResult<(Rank, Rank, HandShape)> {
    let bad = || TrainerError::InvalidHandNotation(notation.to_string());
    let chars: Vec<char> = notation.trim().chars().collect();
    match chars.len() {
        2 => {
            let r1 = Rank::from_char(chars[0])?;
            let r2 = Rank::from_char(chars[1])?;
            if r1 != r2 {
                return Err(bad());
            }
            Ok((r1, r2, HandShape::Pair))
        }
        3 => {
            let r1 = Rank::from_char(chars[0])?;
            let r2 = Rank::from_char(chars[1])?;
            if r1 <= r2 {
                return Err(bad());
            }
            match chars[2] {
                's' => Ok((r1, r2, HandShape::Suited)),
                'o' => Ok((r1, r2, HandShape::Offsuit)),
                _ => Err(bad()),
            }
        }
        _ => Err(bad()),
    }
}
