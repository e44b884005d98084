//! Spot generation.
//!
//! One round of generation picks a solution, a spot type and a hero seat,
//! plays the villains forward to the hero's decision, then deals the hero an
//! instructive hand. Any failed step abandons the attempt and a fresh one
//! starts from the top, up to `max_retries` attempts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, trace, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use crate::cards::Combo;
use crate::catalog::combos_for_hand;
use crate::config::TrainerConfig;
use crate::error::{TrainerError, TrainerResult};
use crate::solution::{ActionKind, DecisionNode, NodeId, Seat, SolutionMeta, ROOT_NODE};
use crate::spot::{SpotSimulation, SpotType};
use crate::store::TreeStore;
use crate::strategy::{is_in_range, is_marginal, max_ev, playable_range, validate};
use crate::villain::{
    find_forced_action, ForcedAction, ForcedSeat, Policy, TreeWalker, UniformSampler,
    VillainSimulator,
};

/// Filters for the next spot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpotRequest {
    /// Tournament phase label, compared case-insensitively.
    pub phase: Option<String>,
    /// Spot types to draw from; empty means the configured set.
    pub spot_types: Vec<SpotType>,
    /// Exact seat count.
    pub players: Option<usize>,
}

/// Hero seat and the table behaviour that leads to it.
#[derive(Debug, Clone, PartialEq)]
struct SeatPlan {
    hero: Seat,
    policy: Policy,
    raiser: Option<Seat>,
    shovers: Vec<Seat>,
}

struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SpotGenerator {
    config: TrainerConfig,
    walker: Arc<dyn TreeWalker>,
    in_flight: AtomicBool,
}

impl SpotGenerator {
    pub fn new(config: TrainerConfig) -> Self {
        let walker = Arc::new(VillainSimulator::new(config.max_steps));
        SpotGenerator::with_walker(config, walker)
    }

    pub fn with_walker(config: TrainerConfig, walker: Arc<dyn TreeWalker>) -> Self {
        SpotGenerator {
            config,
            walker,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Produce the next training spot.
    ///
    /// Returns `Ok(None)` without doing anything when another generation is
    /// already running on this generator.
    pub async fn generate<R: Rng + Send>(
        &self,
        store: &TreeStore,
        request: &SpotRequest,
        rng: &mut R,
    ) -> TrainerResult<Option<SpotSimulation>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("generation already in flight, request ignored");
            return Ok(None);
        }
        let _guard = FlightGuard(&self.in_flight);

        let attempts = self.config.max_retries;
        for attempt in 1..=attempts {
            match self.attempt(store, request, rng).await {
                Ok(spot) => {
                    info!(
                        "spot ready after {} attempt(s): {} seat {} holding {} ({})",
                        attempt, spot.solution_id, spot.hero_seat, spot.combo, spot.spot_type
                    );
                    return Ok(Some(spot));
                }
                Err(e) if e.is_structural() => {
                    debug!("attempt {}/{}: broken tree data: {}", attempt, attempts, e)
                }
                Err(e) => debug!("attempt {}/{} failed: {}", attempt, attempts, e),
            }
        }
        warn!("giving up after {} attempt(s)", attempts);
        Err(TrainerError::GenerationExhausted { attempts })
    }

    fn spot_types(&self, request: &SpotRequest) -> Vec<SpotType> {
        if !request.spot_types.is_empty() {
            request.spot_types.clone()
        } else if !self.config.spot_types.is_empty() {
            self.config.spot_types.clone()
        } else {
            vec![SpotType::Any]
        }
    }

    /// Solutions matching the request's phase and seat count.
    pub fn candidate_pool(&self, store: &TreeStore, request: &SpotRequest) -> Vec<Arc<SolutionMeta>> {
        store
            .metas()
            .into_iter()
            .filter(|m| {
                request
                    .phase
                    .as_deref()
                    .map_or(true, |p| m.phase.eq_ignore_ascii_case(p))
            })
            .filter(|m| request.players.map_or(true, |n| m.seat_count() == n))
            .collect()
    }

    async fn attempt<R: Rng + Send>(
        &self,
        store: &TreeStore,
        request: &SpotRequest,
        rng: &mut R,
    ) -> TrainerResult<SpotSimulation> {
        let mut pool = self.candidate_pool(store, request);
        if pool.is_empty() {
            return Err(TrainerError::EmptyPool);
        }

        let spot_type = *self
            .spot_types(request)
            .choose(rng)
            .unwrap_or(&SpotType::Any);
        if spot_type == SpotType::VsOpen {
            let min_avg = self.config.vs_open_min_avg_stack_bb;
            pool.retain(|m| m.average_stack_bb() >= min_avg);
            if pool.is_empty() {
                return Err(TrainerError::EmptyPool);
            }
        }

        let meta = pool.choose(rng).cloned().ok_or(TrainerError::EmptyPool)?;
        let path = meta.loadable_path()?.to_string();
        store.ensure_node(&meta.id, ROOT_NODE).await?;

        let plan = self.plan_seats(store, &meta, spot_type, rng).await?;
        let traversal = {
            let mut sampler = UniformSampler::new(&mut *rng);
            self.walker
                .advance_to_hero(store, &meta.id, ROOT_NODE, plan.hero, &plan.policy, &mut sampler)
                .await
        }?;

        let node_id = traversal.final_node;
        let node = store
            .node(&meta.id, node_id)
            .ok_or_else(|| TrainerError::NodeUnavailable {
                solution: meta.id.clone(),
                node: node_id,
            })?;
        if spot_type == SpotType::Rfi && node.action_index(ActionKind::Raise).is_none() {
            return Err(TrainerError::NoQualifyingSeat("raise first in".to_string()));
        }

        let (hand, combo) = self.select_hand(&node, node_id, rng)?;
        Ok(SpotSimulation {
            solution_id: meta.id.clone(),
            solution_path: path,
            node_id,
            hero_seat: plan.hero,
            combo,
            hand,
            spot_type,
            raiser: plan.raiser,
            shovers: plan.shovers,
            villain_actions: traversal.villain_actions,
        })
    }

    async fn plan_seats<R: Rng + Send>(
        &self,
        store: &TreeStore,
        meta: &SolutionMeta,
        spot_type: SpotType,
        rng: &mut R,
    ) -> TrainerResult<SeatPlan> {
        let seats = meta.seat_count();
        let bb = meta.big_blind_seat();
        if seats == 0 {
            return Err(TrainerError::NoQualifyingSeat("hero".to_string()));
        }

        match spot_type {
            SpotType::Any => Ok(SeatPlan {
                hero: rng.gen_range(0..seats),
                policy: Policy::Unconstrained,
                raiser: None,
                shovers: Vec::new(),
            }),
            SpotType::Rfi => {
                let hero = (0..seats)
                    .filter(|&s| s != bb)
                    .collect::<Vec<_>>()
                    .choose(rng)
                    .copied()
                    .ok_or_else(|| TrainerError::NoQualifyingSeat("raise first in".to_string()))?;
                Ok(SeatPlan {
                    hero,
                    policy: Policy::folds_to_hero(),
                    raiser: None,
                    shovers: Vec::new(),
                })
            }
            SpotType::VsOpen | SpotType::VsShove => {
                let action = if spot_type == SpotType::VsOpen {
                    self.config.open_action()
                } else {
                    self.config.shove_action()
                };
                let candidates: Vec<Seat> = (0..bb).collect();
                let first = self
                    .discover(store, meta, &[], &candidates, action, rng)
                    .await?;
                let hero = pick_after(first.seat, seats, rng)?;
                let (raiser, shovers) = if spot_type == SpotType::VsOpen {
                    (Some(first.seat), Vec::new())
                } else {
                    (None, vec![first.seat])
                };
                Ok(SeatPlan {
                    hero,
                    policy: Policy::Constrained {
                        forced: vec![first],
                    },
                    raiser,
                    shovers,
                })
            }
            SpotType::VsMultiwayShove => {
                let action = self.config.shove_action();
                let candidates: Vec<Seat> = (0..seats.saturating_sub(2)).collect();
                let first = self
                    .discover(store, meta, &[], &candidates, action, rng)
                    .await?;
                let later: Vec<Seat> = (first.seat + 1..seats.saturating_sub(1)).collect();
                let second = self
                    .discover(store, meta, &[first], &later, action, rng)
                    .await?;
                let hero = pick_after(second.seat, seats, rng)?;
                Ok(SeatPlan {
                    hero,
                    policy: Policy::Constrained {
                        forced: vec![first, second],
                    },
                    raiser: None,
                    shovers: vec![first.seat, second.seat],
                })
            }
        }
    }

    /// Find a seat among `candidates` that can take `action` once play reaches
    /// it under the already forced seats, trying candidates in random order.
    async fn discover<R: Rng + Send>(
        &self,
        store: &TreeStore,
        meta: &SolutionMeta,
        forced: &[ForcedSeat],
        candidates: &[Seat],
        action: ForcedAction,
        rng: &mut R,
    ) -> TrainerResult<ForcedSeat> {
        let mut order = candidates.to_vec();
        order.shuffle(rng);
        let policy = Policy::Constrained {
            forced: forced.to_vec(),
        };
        for seat in order {
            let reached = {
                let mut sampler = UniformSampler::new(&mut *rng);
                self.walker
                    .advance_to_hero(store, &meta.id, ROOT_NODE, seat, &policy, &mut sampler)
                    .await
            };
            let traversal = match reached {
                Ok(traversal) => traversal,
                Err(e) => {
                    trace!("seat {} not reachable: {}", seat, e);
                    continue;
                }
            };
            let Some(node) = store.node(&meta.id, traversal.final_node) else {
                continue;
            };
            if find_forced_action(meta, &node, &action).is_some() {
                debug!("seat {} can {} at node {}", seat, action.as_str(), traversal.final_node);
                return Ok(ForcedSeat { seat, action });
            }
        }
        Err(TrainerError::NoQualifyingSeat(action.as_str().to_string()))
    }

    /// Pick the hero's hand and combo at the hero node.
    pub fn select_hand<R: Rng + ?Sized>(
        &self,
        node: &DecisionNode,
        node_id: NodeId,
        rng: &mut R,
    ) -> TrainerResult<(String, Combo)> {
        let playable = playable_range(node);
        if playable.is_empty() {
            return Err(TrainerError::EmptyRange { node: node_id });
        }
        for hand in &playable {
            validate(node, hand, node_id)?;
        }

        let bounds = self.config.ev_bounds;
        let in_range: Vec<String> = playable
            .par_iter()
            .filter(|h| is_in_range(node, h, &bounds))
            .cloned()
            .collect();
        let from_bands = !in_range.is_empty();
        let candidates = if from_bands {
            in_range
        } else {
            debug!("no hand in EV bands at node {}, using hardest hands", node_id);
            self.hardest_hands(node, &playable)
        };

        let decisive: Vec<String> = candidates
            .iter()
            .filter(|h| !is_marginal(node, h, self.config.min_ev_gap))
            .cloned()
            .collect();
        let survivors = if decisive.is_empty() { candidates } else { decisive };

        let pairs: Vec<(String, Combo)> = survivors
            .iter()
            .filter(|h| !from_bands || is_in_range(node, h, &bounds))
            .filter(|h| node.hand(h).map_or(false, |d| d.weight > 0.0))
            .flat_map(|h| {
                combos_for_hand(h)
                    .unwrap_or(&[])
                    .iter()
                    .map(move |c| (h.clone(), *c))
            })
            .collect();
        pairs
            .choose(rng)
            .cloned()
            .ok_or(TrainerError::EmptyRange { node: node_id })
    }

    /// The playable hands with the lowest best-action EV.
    fn hardest_hands(&self, node: &DecisionNode, playable: &[String]) -> Vec<String> {
        let mut ranked: Vec<(f64, &String)> = playable
            .iter()
            .map(|h| (max_ev(node, h).unwrap_or(f64::INFINITY), h))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        ranked
            .into_iter()
            .take(self.config.hardest_count(playable.len()))
            .map(|(_, h)| h.clone())
            .collect()
    }
}

fn pick_after<R: Rng + ?Sized>(seat: Seat, seats: usize, rng: &mut R) -> TrainerResult<Seat> {
    if seat + 1 >= seats {
        return Err(TrainerError::NoQualifyingSeat("hero".to_string()));
    }
    Ok(rng.gen_range(seat + 1..seats))
}
