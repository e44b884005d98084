//! Solved-spot data model: solution metadata, decision nodes and per-hand
//! strategy, in the JSON layout produced by the solver export.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{TrainerError, TrainerResult};

pub type NodeId = u32;
pub type Seat = usize;

/// Id of the first decision of every tree.
pub const ROOT_NODE: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl TryFrom<u8> for Street {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Street::Preflop),
            1 => Ok(Street::Flop),
            2 => Ok(Street::Turn),
            3 => Ok(Street::River),
            _ => Err(format!("invalid street {}", v)),
        }
    }
}

impl From<Street> for u8 {
    fn from(s: Street) -> u8 {
        s as u8
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "F", alias = "fold")]
    Fold,
    #[serde(rename = "C", alias = "call")]
    Call,
    #[serde(rename = "X", alias = "check")]
    Check,
    #[serde(rename = "R", alias = "raise")]
    Raise,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Fold => "Fold",
            ActionKind::Call => "Call",
            ActionKind::Check => "Check",
            ActionKind::Raise => "Raise",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Chips committed by the action (total bet size for raises).
    #[serde(default)]
    pub amount: f64,
    /// Child decision; `None` when the action ends the hand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
}

impl Action {
    pub fn new(kind: ActionKind, amount: f64, node: Option<NodeId>) -> Self {
        Action { kind, amount, node }
    }

    pub fn is_terminal(&self) -> bool {
        self.node.is_none()
    }
}

/// One action already taken on the way to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceEntry {
    pub player: Seat,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default)]
    pub amount: f64,
}

fn unit_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandData {
    /// Frequency per action.
    pub played: Vec<f64>,
    /// EV in big blinds per action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evs: Option<Vec<f64>>,
    #[serde(default = "unit_weight")]
    pub weight: f64,
}

impl HandData {
    pub fn new(played: Vec<f64>, evs: Vec<f64>) -> Self {
        HandData {
            played,
            evs: Some(evs),
            weight: 1.0,
        }
    }

    pub fn total_frequency(&self) -> f64 {
        self.played.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionNode {
    pub player: Seat,
    #[serde(default = "preflop")]
    pub street: Street,
    #[serde(default)]
    pub sequence: Vec<SequenceEntry>,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub hands: BTreeMap<String, HandData>,
}

fn preflop() -> Street {
    Street::Preflop
}

impl DecisionNode {
    pub fn new(player: Seat, actions: Vec<Action>) -> Self {
        DecisionNode {
            player,
            street: Street::Preflop,
            sequence: Vec::new(),
            actions,
            hands: BTreeMap::new(),
        }
    }

    pub fn with_hand(mut self, name: &str, data: HandData) -> Self {
        self.hands.insert(name.to_string(), data);
        self
    }

    pub fn hand(&self, name: &str) -> Option<&HandData> {
        self.hands.get(name)
    }

    /// Index of the first action of the given kind.
    pub fn action_index(&self, kind: ActionKind) -> Option<usize> {
        self.actions.iter().position(|a| a.kind == kind)
    }

    /// True when some hand in the range plays action `idx` with nonzero frequency.
    pub fn action_in_range(&self, idx: usize) -> bool {
        self.hands
            .values()
            .any(|h| h.played.get(idx).copied().unwrap_or(0.0) > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blinds {
    pub big: f64,
    pub small: f64,
    #[serde(default)]
    pub ante: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Starting stack per seat, in chips.
    pub stacks: Vec<f64>,
    pub blinds: Blinds,
    #[serde(default)]
    pub bounties: Vec<f64>,
    #[serde(default)]
    pub payouts: Vec<f64>,
}

/// Metadata of a solved spot, available before any node is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionMeta {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub equity_model: String,
    pub settings: Settings,
}

impl SolutionMeta {
    pub fn seat_count(&self) -> usize {
        self.settings.stacks.len()
    }

    pub fn big_blind(&self) -> f64 {
        self.settings.blinds.big
    }

    pub fn big_blind_seat(&self) -> Seat {
        self.seat_count().saturating_sub(1)
    }

    /// Convert chips to big blinds.
    pub fn to_bb(&self, chips: f64) -> f64 {
        let bb = self.big_blind();
        if bb > 0.0 {
            chips / bb
        } else {
            chips
        }
    }

    pub fn stack_bb(&self, seat: Seat) -> f64 {
        self.settings
            .stacks
            .get(seat)
            .map(|&s| self.to_bb(s))
            .unwrap_or(0.0)
    }

    pub fn average_stack_bb(&self) -> f64 {
        let n = self.seat_count();
        if n == 0 {
            return 0.0;
        }
        (0..n).map(|s| self.stack_bb(s)).sum::<f64>() / n as f64
    }

    pub fn is_loadable(&self) -> bool {
        self.path.as_deref().map_or(false, |p| !p.trim().is_empty())
    }

    pub fn loadable_path(&self) -> TrainerResult<&str> {
        match self.path.as_deref() {
            Some(p) if !p.trim().is_empty() => Ok(p),
            _ => Err(TrainerError::NotLoadable(self.id.clone())),
        }
    }
}

/// A solution with the nodes loaded so far. Nodes are only ever added.
#[derive(Debug, Clone)]
pub struct Solution {
    pub meta: Arc<SolutionMeta>,
    nodes: HashMap<NodeId, Arc<DecisionNode>>,
}

impl Solution {
    pub fn new(meta: SolutionMeta) -> Self {
        Solution {
            meta: Arc::new(meta),
            nodes: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn has(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<Arc<DecisionNode>> {
        self.nodes.get(&id).cloned()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Add nodes to the map. A re-delivered id replaces the previous copy,
    /// which is identical for solver output. Returns how many ids were new.
    pub fn merge<I>(&mut self, nodes: I) -> usize
    where
        I: IntoIterator<Item = (NodeId, DecisionNode)>,
    {
        let mut added = 0;
        for (id, node) in nodes {
            if self.nodes.insert(id, Arc::new(node)).is_none() {
                added += 1;
            }
        }
        added
    }
}
