//! # Chain State
//!
//! The locally canonical chain: tip, score and a bounded window of recent
//! blocks used to find the fork point of a competing chain.

use std::collections::VecDeque;

use super::entities::Block;
use super::errors::Hash;
use super::value_objects::{BlockType, ChainScore, ChainSnapshot};

/// Local canonical chain.
///
/// Owned by the synchronizer; only [`ChainState::adopt`] mutates it.
#[derive(Clone, Debug)]
pub struct ChainState {
    /// Recent blocks in ascending height order; the back is the tip.
    recent: VecDeque<Block>,
    /// Score of the chain ending at the tip.
    score: ChainScore,
    /// Blocks kept below the tip.
    max_rollback: usize,
}

/// Outcome of an adoption: blocks that left the canonical chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rollback {
    /// Dropped blocks in ascending height order.
    pub dropped: Vec<Block>,
}

impl ChainState {
    /// Bootstrap from the trusted nemesis block.
    ///
    /// Returns `None` if the block is not a nemesis block.
    pub fn from_nemesis(nemesis: Block, max_rollback: usize) -> Option<Self> {
        if nemesis.block_type() != BlockType::Nemesis {
            return None;
        }
        Some(Self::from_checkpoint(nemesis, ChainScore::zero(), max_rollback))
    }

    /// Bootstrap from a trusted checkpoint block and its chain score.
    pub fn from_checkpoint(block: Block, score: ChainScore, max_rollback: usize) -> Self {
        let mut recent = VecDeque::with_capacity(max_rollback.saturating_add(1).min(1024));
        recent.push_back(block);
        Self {
            recent,
            score,
            max_rollback,
        }
    }

    /// Canonical head.
    pub fn tip(&self) -> &Block {
        // Never empty: adopt always keeps the ancestor.
        &self.recent[self.recent.len() - 1]
    }

    /// Tip height.
    pub fn height(&self) -> u64 {
        self.tip().height()
    }

    /// Chain score.
    pub fn score(&self) -> ChainScore {
        self.score
    }

    /// Lowest height still held in the rollback window.
    pub fn oldest_height(&self) -> u64 {
        self.recent[0].height()
    }

    /// Block at `height`, if it lies in the rollback window.
    pub fn block_at(&self, height: u64) -> Option<&Block> {
        let offset = height.checked_sub(self.oldest_height())?;
        self.recent.get(usize::try_from(offset).ok()?)
    }

    /// Hash of the tip block.
    pub fn tip_hash(&self) -> Hash {
        self.tip().hash()
    }

    /// Read-only view for external collaborators.
    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            height: self.height(),
            score: self.score,
            tip_hash: self.tip_hash(),
        }
    }

    /// Replace everything above `ancestor_height` with `blocks`.
    ///
    /// Callers validate `blocks` against the ancestor first. The whole
    /// replacement happens without suspension points, so readers never
    /// observe a half-applied reorg.
    ///
    /// # Panics
    /// Debug builds assert that the ancestor is inside the window and that
    /// `blocks` is non-empty.
    pub fn adopt(&mut self, ancestor_height: u64, blocks: Vec<Block>, score: ChainScore) -> Rollback {
        debug_assert!(!blocks.is_empty());
        debug_assert!(self.block_at(ancestor_height).is_some());

        let keep = ancestor_height.saturating_sub(self.oldest_height()) as usize + 1;
        let dropped: Vec<Block> = self.recent.drain(keep.min(self.recent.len())..).collect();

        self.recent.extend(blocks);
        while self.recent.len() > self.max_rollback.saturating_add(1) {
            self.recent.pop_front();
        }
        self.score = score;

        Rollback { dropped }
    }
}
