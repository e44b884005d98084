//! Node loaders: a directory of solver exports on disk, and an in-memory
//! tree for tests and demos.
//!
//! Layout read by [`FileLoader`]:
//!
//! ```text
//! <root>/solutions.json            solution metadata, nodes empty
//! <root>/<path>/nodes/<id>.json    one decision node per file
//! ```

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, trace};

use crate::cache::TtlCache;
use crate::error::TrainerResult;
use crate::solution::{DecisionNode, NodeId, SolutionMeta};
use crate::store::NodeLoader;

pub const CATALOG_FILE: &str = "solutions.json";

/// Read the solution catalog of a solutions directory.
pub async fn load_catalog(root: &Path) -> TrainerResult<Vec<SolutionMeta>> {
    let json = tokio::fs::read_to_string(root.join(CATALOG_FILE)).await?;
    let metas: Vec<SolutionMeta> = serde_json::from_str(&json)?;
    debug!("catalog {} lists {} solution(s)", root.display(), metas.len());
    Ok(metas)
}

pub struct FileLoader {
    root: PathBuf,
    cache: Mutex<TtlCache<(String, NodeId), DecisionNode>>,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        FileLoader {
            root: root.into(),
            cache: Mutex::new(TtlCache::new(ttl)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn node_path(&self, solution_path: &str, id: NodeId) -> PathBuf {
        self.root
            .join(solution_path)
            .join("nodes")
            .join(format!("{}.json", id))
    }

    /// Forget a cached node so the next load reads the file again.
    pub fn invalidate(&self, solution_path: &str, id: NodeId) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .invalidate(&(solution_path.to_string(), id))
    }

    /// Nodes currently held by the cache, expired or not.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn cached(&self, solution_path: &str, id: NodeId) -> Option<DecisionNode> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(solution_path.to_string(), id))
    }

    async fn read_node(&self, solution_path: &str, id: NodeId) -> TrainerResult<Option<DecisionNode>> {
        if let Some(node) = self.cached(solution_path, id) {
            trace!("cache hit {}#{}", solution_path, id);
            return Ok(Some(node));
        }
        let path = self.node_path(solution_path, id);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no node file {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let node: DecisionNode = serde_json::from_str(&json)?;
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let purged = cache.purge_expired(Instant::now());
        if purged > 0 {
            trace!("dropped {} expired node(s)", purged);
        }
        cache.set((solution_path.to_string(), id), node.clone());
        Ok(Some(node))
    }
}

#[async_trait]
impl NodeLoader for FileLoader {
    async fn load_nodes(
        &self,
        solution: &SolutionMeta,
        ids: &[NodeId],
    ) -> TrainerResult<Vec<(NodeId, DecisionNode)>> {
        let path = solution.loadable_path()?;
        let reads = ids.iter().map(|&id| async move {
            self.read_node(path, id).await.map(|n| n.map(|n| (id, n)))
        });
        let mut nodes = Vec::with_capacity(ids.len());
        for result in join_all(reads).await {
            if let Some(pair) = result? {
                nodes.push(pair);
            }
        }
        Ok(nodes)
    }
}

/// Loader over trees held in memory, keyed by solution id.
#[derive(Default)]
pub struct MemoryLoader {
    trees: HashMap<String, HashMap<NodeId, DecisionNode>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<NodeId>>,
    suspend: bool,
}

impl MemoryLoader {
    pub fn new() -> Self {
        MemoryLoader::default()
    }

    pub fn with_tree<I>(mut self, solution: &str, nodes: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, DecisionNode)>,
    {
        self.trees
            .entry(solution.to_string())
            .or_default()
            .extend(nodes);
        self
    }

    /// Yield to the runtime once per load, like a network round trip.
    pub fn suspending(mut self) -> Self {
        self.suspend = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every id requested so far, in request order.
    pub fn requested(&self) -> Vec<NodeId> {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl NodeLoader for MemoryLoader {
    async fn load_nodes(
        &self,
        solution: &SolutionMeta,
        ids: &[NodeId],
    ) -> TrainerResult<Vec<(NodeId, DecisionNode)>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(ids);
        if self.suspend {
            tokio::task::yield_now().await;
        }
        let Some(tree) = self.trees.get(&solution.id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| tree.get(id).map(|n| (*id, n.clone())))
            .collect())
    }
}
