//! # Synchronizer Events
//!
//! State-machine phases, cycle outcomes and the reorg notification.

use crate::domain::{Block, ChainScore, SyncFailure};

/// Phase of the sync state machine.
///
/// ```text
/// Idle ─tick─▶ Polling ─nothing new─▶ Idle
///                 │
///                 ▼
///          FetchingBlocks ─▶ Reconciling ─▶ Idle
///                 │               │
///                 └──────▶ Error ◀┘ ─next tick─▶ Idle ─▶ Polling
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncPhase {
    /// Waiting for the next tick.
    Idle,
    /// Querying remote height and score.
    Polling,
    /// Locating the fork point and downloading candidate blocks.
    FetchingBlocks,
    /// Validating the candidate and applying fork choice.
    Reconciling,
    /// Last cycle failed; retried on the next tick.
    Error(SyncFailure),
}

impl SyncPhase {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Polling => "polling",
            SyncPhase::FetchingBlocks => "fetching_blocks",
            SyncPhase::Reconciling => "reconciling",
            SyncPhase::Error(_) => "error",
        }
    }
}

/// Published exactly once per adopted chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReorgEvent {
    /// Last block shared by the old and the new chain.
    pub common_ancestor_height: u64,
    /// Newly canonical blocks, ascending height.
    pub adopted: Vec<Block>,
    /// Blocks that left the canonical chain, ascending height.
    pub rolled_back: Vec<Block>,
    /// Score of the new chain.
    pub score: ChainScore,
}

impl ReorgEvent {
    /// Height of the new tip.
    pub fn new_height(&self) -> u64 {
        self.adopted
            .last()
            .map(Block::height)
            .unwrap_or(self.common_ancestor_height)
    }
}

/// Result of one sync cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Remote has nothing we do not already hold.
    UpToDate,
    /// Candidate chain became canonical.
    Adopted {
        /// New tip height.
        height: u64,
        /// New chain score.
        score: ChainScore,
        /// Blocks appended above the common ancestor.
        adopted: usize,
        /// Blocks dropped above the common ancestor.
        rolled_back: usize,
    },
    /// Candidate was valid but did not outscore the local chain.
    Rejected {
        /// Score claimed by the remote.
        remote_score: ChainScore,
        /// Local score that was kept.
        local_score: ChainScore,
    },
    /// Cycle failed; local state untouched.
    Failed(SyncFailure),
}
