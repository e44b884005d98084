//! Decision tree store: the session's solutions and their lazily loaded nodes.
//!
//! Node maps are only mutated through [`TreeStore::merge`]; a fetch of one
//! node never evicts another. Lock guards are released before every await,
//! so overlapping loads on the same solution interleave safely.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use log::{debug, info};

use crate::error::{TrainerError, TrainerResult};
use crate::solution::{DecisionNode, NodeId, Solution, SolutionMeta};

/// Fetches decision nodes of a solution from wherever they are stored.
///
/// Must be safe to call with ids that were already delivered. An error or a
/// missing id in the result means the current attempt failed.
#[async_trait]
pub trait NodeLoader: Send + Sync {
    async fn load_nodes(
        &self,
        solution: &SolutionMeta,
        ids: &[NodeId],
    ) -> TrainerResult<Vec<(NodeId, DecisionNode)>>;
}

pub struct TreeStore {
    loader: Arc<dyn NodeLoader>,
    solutions: RwLock<BTreeMap<String, Solution>>,
}

impl TreeStore {
    pub fn new(loader: Arc<dyn NodeLoader>) -> Self {
        TreeStore {
            loader,
            solutions: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_solutions<I>(loader: Arc<dyn NodeLoader>, metas: I) -> Self
    where
        I: IntoIterator<Item = SolutionMeta>,
    {
        let store = TreeStore::new(loader);
        for meta in metas {
            store.insert_solution(meta);
        }
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Solution>> {
        self.solutions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Solution>> {
        self.solutions.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register solution metadata. Re-registering an id keeps its loaded nodes.
    pub fn insert_solution(&self, meta: SolutionMeta) {
        self.write()
            .entry(meta.id.clone())
            .or_insert_with(|| Solution::new(meta));
    }

    /// Metadata of every registered solution, ordered by id.
    pub fn metas(&self) -> Vec<Arc<SolutionMeta>> {
        self.read().values().map(|s| Arc::clone(&s.meta)).collect()
    }

    pub fn meta(&self, solution: &str) -> TrainerResult<Arc<SolutionMeta>> {
        self.read()
            .get(solution)
            .map(|s| Arc::clone(&s.meta))
            .ok_or_else(|| TrainerError::SolutionNotFound(solution.to_string()))
    }

    pub fn has(&self, solution: &str, node: NodeId) -> bool {
        self.read().get(solution).map_or(false, |s| s.has(node))
    }

    pub fn node(&self, solution: &str, node: NodeId) -> Option<Arc<DecisionNode>> {
        self.read().get(solution).and_then(|s| s.node(node))
    }

    pub fn node_count(&self, solution: &str) -> usize {
        self.read().get(solution).map_or(0, |s| s.node_count())
    }

    /// Snapshot of a solution's current state.
    pub fn solution(&self, solution: &str) -> Option<Solution> {
        self.read().get(solution).cloned()
    }

    /// Merge nodes into a solution's map. Returns how many ids were new.
    pub fn merge(
        &self,
        solution: &str,
        nodes: Vec<(NodeId, DecisionNode)>,
    ) -> TrainerResult<usize> {
        let mut guard = self.write();
        let entry = guard
            .get_mut(solution)
            .ok_or_else(|| TrainerError::SolutionNotFound(solution.to_string()))?;
        Ok(entry.merge(nodes))
    }

    /// Make sure every id in `ids` is loaded, fetching only the missing ones.
    pub async fn ensure_nodes(&self, solution: &str, ids: &[NodeId]) -> TrainerResult<()> {
        let meta = self.meta(solution)?;
        let mut missing: Vec<NodeId> = ids
            .iter()
            .copied()
            .filter(|&id| !self.has(solution, id))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        if missing.is_empty() {
            return Ok(());
        }
        meta.loadable_path()?;

        debug!("loading {} node(s) of {}: {:?}", missing.len(), solution, missing);
        let loaded = self.loader.load_nodes(&meta, &missing).await?;
        let added = self.merge(solution, loaded)?;
        info!("merged {} new node(s) into {}", added, solution);

        match missing.into_iter().find(|&id| !self.has(solution, id)) {
            Some(node) => Err(TrainerError::NodeUnavailable {
                solution: solution.to_string(),
                node,
            }),
            None => Ok(()),
        }
    }

    /// Load a single node if needed and return it.
    pub async fn ensure_node(
        &self,
        solution: &str,
        node: NodeId,
    ) -> TrainerResult<Arc<DecisionNode>> {
        self.ensure_nodes(solution, &[node]).await?;
        self.node(solution, node)
            .ok_or_else(|| TrainerError::NodeUnavailable {
                solution: solution.to_string(),
                node,
            })
    }
}
