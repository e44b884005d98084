//! A training session: deals spots, takes answers, keeps score.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::cards::Combo;
use crate::config::TrainerConfig;
use crate::error::{TrainerError, TrainerResult};
use crate::generator::{SpotGenerator, SpotRequest};
use crate::labels::action_labels;
use crate::scorer::{score, score_timeout, ScoreResult};
use crate::solution::{DecisionNode, NodeId};
use crate::spot::SpotSimulation;
use crate::store::TreeStore;

/// What the player did with the current spot.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// An action label such as "Fold", "Call" or "Raise 2".
    Action(String),
    /// The clock ran out; counts as a fold.
    Expired,
}

/// One answered spot, as handed to a [`ResultSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub solution_path: String,
    pub node_id: NodeId,
    pub hand: String,
    pub combo: Combo,
    pub answer: Option<String>,
    pub is_correct: bool,
    pub points: f64,
    pub ev: Option<f64>,
}

pub trait ResultSink: Send {
    fn record(&mut self, record: &ResultRecord);
}

/// In-memory answer history with running statistics.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<ResultRecord>,
    streak: usize,
    best_streak: usize,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn answered(&self) -> usize {
        self.records.len()
    }

    pub fn correct(&self) -> usize {
        self.records.iter().filter(|r| r.is_correct).count()
    }

    pub fn accuracy(&self) -> f64 {
        if self.records.is_empty() {
            0.0
        } else {
            self.correct() as f64 / self.records.len() as f64
        }
    }

    pub fn points(&self) -> f64 {
        self.records.iter().map(|r| r.points).sum()
    }

    pub fn streak(&self) -> usize {
        self.streak
    }

    pub fn best_streak(&self) -> usize {
        self.best_streak
    }
}

impl ResultSink for History {
    fn record(&mut self, record: &ResultRecord) {
        if record.is_correct {
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
        self.records.push(record.clone());
    }
}

pub struct TrainingSession {
    store: Arc<TreeStore>,
    generator: SpotGenerator,
    request: SpotRequest,
    rng: StdRng,
    current: Option<SpotSimulation>,
    history: History,
    sinks: Vec<Box<dyn ResultSink>>,
}

impl TrainingSession {
    pub fn new(store: Arc<TreeStore>, config: TrainerConfig, request: SpotRequest) -> Self {
        let generator = SpotGenerator::new(config);
        TrainingSession::with_generator(store, generator, request)
    }

    pub fn with_generator(store: Arc<TreeStore>, generator: SpotGenerator, request: SpotRequest) -> Self {
        let rng = match generator.config().seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        TrainingSession {
            store,
            generator,
            request,
            rng,
            current: None,
            history: History::new(),
            sinks: Vec::new(),
        }
    }

    /// Forward every answered spot to an external sink as well.
    pub fn add_sink(&mut self, sink: Box<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn config(&self) -> &TrainerConfig {
        self.generator.config()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn current(&self) -> Option<&SpotSimulation> {
        self.current.as_ref()
    }

    /// Deal the next spot, replacing any unanswered one.
    pub async fn next_spot(&mut self) -> TrainerResult<Option<&SpotSimulation>> {
        let spot = self
            .generator
            .generate(&self.store, &self.request, &mut self.rng)
            .await?;
        if let Some(spot) = spot {
            self.current = Some(spot);
        }
        Ok(self.current.as_ref())
    }

    /// Labels of the actions the hero can choose from.
    pub fn options(&self) -> TrainerResult<Vec<String>> {
        let spot = self.current.as_ref().ok_or(TrainerError::NoActiveSpot)?;
        let meta = self.store.meta(&spot.solution_id)?;
        let node = self.spot_node(spot)?;
        Ok(action_labels(&meta, &node))
    }

    fn spot_node(&self, spot: &SpotSimulation) -> TrainerResult<Arc<DecisionNode>> {
        self.store
            .node(&spot.solution_id, spot.node_id)
            .ok_or_else(|| TrainerError::NodeUnavailable {
                solution: spot.solution_id.clone(),
                node: spot.node_id,
            })
    }

    /// Score an answer to the current spot and record it.
    pub fn answer(&mut self, answer: Answer) -> TrainerResult<ScoreResult> {
        let spot = self.current.as_ref().ok_or(TrainerError::NoActiveSpot)?;
        let meta = self.store.meta(&spot.solution_id)?;
        let node = self.spot_node(spot)?;
        let rule = self.generator.config().scoring;

        let (result, label) = match &answer {
            Answer::Action(label) => (score(&meta, &node, &spot.hand, label, rule)?, Some(label.clone())),
            Answer::Expired => (score_timeout(&node, &spot.hand, rule)?, None),
        };
        debug!(
            "{} at node {}: {:?} -> correct={} points={}",
            spot.hand, spot.node_id, answer, result.is_correct, result.points
        );

        let record = ResultRecord {
            solution_path: spot.solution_path.clone(),
            node_id: spot.node_id,
            hand: spot.hand.clone(),
            combo: spot.combo,
            answer: label,
            is_correct: result.is_correct,
            points: result.points,
            ev: result.chosen_ev,
        };
        self.history.record(&record);
        for sink in &mut self.sinks {
            sink.record(&record);
        }
        self.current = None;
        Ok(result)
    }

    /// Like [`answer`](Self::answer), but an answer arriving after the time
    /// limit counts as expired.
    pub fn answer_timed(&mut self, label: &str, elapsed: Duration) -> TrainerResult<ScoreResult> {
        let expired = self
            .generator
            .config()
            .time_limit()
            .map_or(false, |limit| elapsed > limit);
        if expired {
            self.answer(Answer::Expired)
        } else {
            self.answer(Answer::Action(label.to_string()))
        }
    }
}
