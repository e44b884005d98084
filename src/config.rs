//! Trainer configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "max_retries": 8, "spot_types": ["RFI", "vs Open"], "time_limit_secs": 15 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TrainerResult;
use crate::scorer::ScoringRule;
use crate::spot::SpotType;
use crate::strategy::EvBounds;
use crate::villain::{ForcedAction, MAX_STEPS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// EV bands a training hand must hit.
    pub ev_bounds: EvBounds,

    /// Hands whose two best EVs are closer than this (in bb) are coin flips.
    pub min_ev_gap: f64,

    /// Generation attempts before giving up on a round.
    pub max_retries: usize,

    /// Tree steps a single walk may take before it is abandoned.
    pub max_steps: usize,

    /// Open size for "vs Open" spots, and how far a raise may be off it.
    pub open_size_bb: f64,
    pub open_tolerance_bb: f64,

    /// Share of the stack a raise must commit to count as a shove.
    pub shove_stack_fraction: f64,

    /// "vs Open" needs an average stack of at least this many bb.
    pub vs_open_min_avg_stack_bb: f64,

    /// When no hand passes the EV bands, this share of the playable range
    /// with the lowest max EV is used instead, clamped to the bounds below.
    pub hardest_fraction: f64,
    pub hardest_min: usize,
    pub hardest_max: usize,

    /// Spot types a session draws from.
    pub spot_types: Vec<SpotType>,

    /// Seconds to answer before the spot counts as folded.
    pub time_limit_secs: Option<u64>,

    /// How long loaded node files stay cached.
    pub cache_ttl_secs: u64,

    pub scoring: ScoringRule,

    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            ev_bounds: EvBounds::default(),
            min_ev_gap: 0.05,
            max_retries: 5,
            max_steps: MAX_STEPS,
            open_size_bb: 2.0,
            open_tolerance_bb: 0.1,
            shove_stack_fraction: 0.5,
            vs_open_min_avg_stack_bb: 13.2,
            hardest_fraction: 0.3,
            hardest_min: 5,
            hardest_max: 50,
            spot_types: vec![SpotType::Any, SpotType::Rfi, SpotType::VsOpen],
            time_limit_secs: None,
            cache_ttl_secs: 600,
            scoring: ScoringRule::Binary,
            seed: None,
        }
    }
}

impl TrainerConfig {
    pub fn load(path: &Path) -> TrainerResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> TrainerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn open_action(&self) -> ForcedAction {
        ForcedAction::Open {
            size_bb: self.open_size_bb,
            tolerance_bb: self.open_tolerance_bb,
        }
    }

    pub fn shove_action(&self) -> ForcedAction {
        ForcedAction::Shove {
            min_stack_fraction: self.shove_stack_fraction,
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Size of the "hardest available" fallback for a playable range.
    pub fn hardest_count(&self, playable: usize) -> usize {
        let wanted = (playable as f64 * self.hardest_fraction).ceil() as usize;
        wanted
            .clamp(self.hardest_min, self.hardest_max.max(self.hardest_min))
            .min(playable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TrainerConfig::from_json(r#"{"max_retries": 9, "spot_types": ["RFI"]}"#).unwrap();
        assert_eq!(config.max_retries, 9);
        assert_eq!(config.spot_types, vec![SpotType::Rfi]);
        assert_eq!(config.min_ev_gap, 0.05);
        assert_eq!(config.max_steps, 50);
    }

    #[test]
    fn hardest_count_is_clamped() {
        let config = TrainerConfig::default();
        assert_eq!(config.hardest_count(10), 5);
        assert_eq!(config.hardest_count(3), 3);
        assert_eq!(config.hardest_count(100), 30);
        assert_eq!(config.hardest_count(169), 50);
    }
}
