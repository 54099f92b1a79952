//! In-Memory Remote Chain Adapter
//!
//! Implements `RemoteChainSource` over an in-memory block map. Stands in for
//! the NIS HTTP wrappers in tests and local simulation; supports failure
//! injection and artificial latency.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::domain::{Block, ChainScore, RemoteUnavailable};
use crate::ports::RemoteChainSource;

#[derive(Debug, Default)]
struct RemoteState {
    blocks: BTreeMap<u64, Block>,
    score: ChainScore,
    failing: bool,
    latency: Option<Duration>,
}

/// Remote chain held in memory.
#[derive(Debug)]
pub struct InMemoryRemoteChain {
    node_id: String,
    state: RwLock<RemoteState>,
    requests: AtomicU64,
}

impl InMemoryRemoteChain {
    /// Create an empty remote.
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            state: RwLock::new(RemoteState::default()),
            requests: AtomicU64::new(0),
        }
    }

    /// Create a remote serving `blocks` with the given chain score.
    pub fn with_chain(node_id: impl Into<String>, blocks: Vec<Block>, score: ChainScore) -> Self {
        let remote = Self::new(node_id);
        remote.set_chain(blocks, score);
        remote
    }

    /// Replace the served chain.
    pub fn set_chain(&self, blocks: Vec<Block>, score: ChainScore) {
        let mut state = self.state.write();
        state.blocks = blocks.into_iter().map(|b| (b.height(), b)).collect();
        state.score = score;
    }

    /// Append (or overwrite) a block.
    pub fn insert_block(&self, block: Block) {
        self.state.write().blocks.insert(block.height(), block);
    }

    /// Change the reported chain score.
    pub fn set_score(&self, score: ChainScore) {
        self.state.write().score = score;
    }

    /// Make every query fail (or stop failing).
    pub fn set_failing(&self, failing: bool) {
        self.state.write().failing = failing;
    }

    /// Delay every query by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.write().latency = latency;
    }

    /// Number of queries served or attempted.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    async fn simulate(&self, operation: &'static str) -> Result<(), RemoteUnavailable> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let (failing, latency) = {
            let state = self.state.read();
            (state.failing, state.latency)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if failing {
            return Err(RemoteUnavailable::new(operation, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteChainSource for InMemoryRemoteChain {
    async fn get_height(&self) -> Result<u64, RemoteUnavailable> {
        self.simulate("get_height").await?;
        self.state
            .read()
            .blocks
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| RemoteUnavailable::new("get_height", "remote chain is empty"))
    }

    async fn get_score(&self) -> Result<ChainScore, RemoteUnavailable> {
        self.simulate("get_score").await?;
        Ok(self.state.read().score)
    }

    async fn get_last_block(&self) -> Result<Block, RemoteUnavailable> {
        self.simulate("get_last_block").await?;
        self.state
            .read()
            .blocks
            .values()
            .next_back()
            .cloned()
            .ok_or_else(|| RemoteUnavailable::new("get_last_block", "remote chain is empty"))
    }

    async fn get_block_by_height(&self, height: u64) -> Result<Block, RemoteUnavailable> {
        debug!(node = %self.node_id, height, "[nem-sync] Serving block");
        self.simulate("get_block_by_height").await?;
        self.state.read().blocks.get(&height).cloned().ok_or_else(|| {
            RemoteUnavailable::new("get_block_by_height", format!("no block at height {height}"))
        })
    }

    fn node_id(&self) -> &str {
        &self.node_id
    }
}
