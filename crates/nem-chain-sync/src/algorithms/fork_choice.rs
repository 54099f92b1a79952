//! # Fork Choice
//!
//! "The higher the score, the better the chain."
//!
//! Ties keep the chain we already hold so two equally scored nodes do not
//! make us oscillate between them.

use crate::domain::ChainScore;

/// Decision of the comparator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForkChoice {
    /// Candidate outscores the local chain.
    Adopt,
    /// Keep the local chain.
    Keep,
}

/// `true` iff the candidate strictly outscores the current chain.
pub fn is_better(candidate: ChainScore, current: ChainScore) -> bool {
    candidate > current
}

/// [`is_better`] as an explicit decision.
pub fn choose(candidate: ChainScore, current: ChainScore) -> ForkChoice {
    if is_better(candidate, current) {
        ForkChoice::Adopt
    } else {
        ForkChoice::Keep
    }
}
