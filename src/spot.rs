use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::Combo;
use crate::error::TrainerError;
use crate::solution::{NodeId, Seat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpotType {
    /// Hero can be any seat; villains play their sampled hands.
    #[serde(rename = "Any")]
    Any,
    /// Raise first in: everyone before the hero folds.
    #[serde(rename = "RFI")]
    Rfi,
    /// One earlier seat opens to 2bb.
    #[serde(rename = "vs Open")]
    VsOpen,
    /// One earlier seat moves all-in.
    #[serde(rename = "vs Shove")]
    VsShove,
    /// Two earlier seats are all-in.
    #[serde(rename = "vs Multiway Shove")]
    VsMultiwayShove,
}

impl SpotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpotType::Any => "Any",
            SpotType::Rfi => "RFI",
            SpotType::VsOpen => "vs Open",
            SpotType::VsShove => "vs Shove",
            SpotType::VsMultiwayShove => "vs Multiway Shove",
        }
    }
}

impl fmt::Display for SpotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SpotType {
    type Err = TrainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "any" => Ok(SpotType::Any),
            "rfi" => Ok(SpotType::Rfi),
            "vsopen" => Ok(SpotType::VsOpen),
            "vsshove" => Ok(SpotType::VsShove),
            "vsmultiwayshove" | "vsmultiway" => Ok(SpotType::VsMultiwayShove),
            _ => Err(TrainerError::UnknownSpotType(s.to_string())),
        }
    }
}

/// One simulated opponent decision on the way to the hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillainAction {
    pub seat: Seat,
    pub label: String,
    /// Size in big blinds for calls and raises.
    pub amount_bb: Option<f64>,
    /// Sampled for display; never used in scoring.
    pub combo: Option<Combo>,
}

/// One training round: where the hero sits, what they hold, and how the
/// table got there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotSimulation {
    pub solution_id: String,
    pub solution_path: String,
    pub node_id: NodeId,
    pub hero_seat: Seat,
    pub combo: Combo,
    pub hand: String,
    pub spot_type: SpotType,
    pub raiser: Option<Seat>,
    pub shovers: Vec<Seat>,
    pub villain_actions: Vec<VillainAction>,
}
