//! # Domain Invariants
//!
//! Protocol constants and the link rules a block must satisfy against its
//! predecessor.

use super::entities::Block;
use super::errors::ValidationError;

/// Maximum transactions a single block may carry.
pub const MAX_TRANSACTIONS_PER_BLOCK: usize = 120;

/// Height of the nemesis block.
pub const NEMESIS_HEIGHT: u64 = 1;

/// Default depth of the rollback window (blocks below the tip).
pub const DEFAULT_MAX_ROLLBACK: usize = 360;

/// Invariant: candidate directly follows predecessor.
pub fn invariant_height_continuous(
    candidate: &Block,
    predecessor: &Block,
) -> Result<(), ValidationError> {
    let expected = predecessor.height() + 1;
    if candidate.height() != expected {
        return Err(ValidationError::HeightMismatch {
            expected,
            actual: candidate.height(),
        });
    }
    Ok(())
}

/// Invariant: candidate references predecessor's hash.
pub fn invariant_hash_linked(candidate: &Block, predecessor: &Block) -> Result<(), ValidationError> {
    if *candidate.prev_block_hash() != predecessor.hash() {
        return Err(ValidationError::HashMismatch {
            height: candidate.height(),
        });
    }
    Ok(())
}

/// Invariant: time never runs backwards along the chain.
pub fn invariant_timestamp_monotonic(
    candidate: &Block,
    predecessor: &Block,
) -> Result<(), ValidationError> {
    if candidate.timestamp() < predecessor.timestamp() {
        return Err(ValidationError::TimestampRegression {
            height: candidate.height(),
            timestamp: candidate.timestamp(),
            predecessor_timestamp: predecessor.timestamp(),
        });
    }
    Ok(())
}

/// Invariant: at most [`MAX_TRANSACTIONS_PER_BLOCK`] transactions.
pub fn invariant_transaction_limit(candidate: &Block) -> Result<(), ValidationError> {
    let count = candidate.transactions().len();
    if count > MAX_TRANSACTIONS_PER_BLOCK {
        return Err(ValidationError::TransactionLimitExceeded {
            height: candidate.height(),
            count,
            limit: MAX_TRANSACTIONS_PER_BLOCK,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BlockDraft, BlockType, BlockVersion, Network, PublicKey, Signature, Transaction, ZERO_HASH,
    };

    fn block(height: u64, prev: [u8; 32], timestamp: u64, txs: usize) -> Block {
        BlockDraft {
            block_type: BlockType::Regular,
            version: BlockVersion::v1(Network::MainNet),
            timestamp,
            signer: PublicKey([1u8; 32]),
            prev_block_hash: prev,
            height,
            transactions: (0..txs).map(|i| Transaction::new(vec![i as u8])).collect(),
        }
        .seal(Signature([0u8; 64]))
        .unwrap()
    }

    #[test]
    fn test_height_continuous() {
        let prev = block(10, ZERO_HASH, 100, 0);
        assert!(invariant_height_continuous(&block(11, ZERO_HASH, 100, 0), &prev).is_ok());
        assert_eq!(
            invariant_height_continuous(&block(13, ZERO_HASH, 100, 0), &prev),
            Err(ValidationError::HeightMismatch {
                expected: 11,
                actual: 13
            })
        );
    }

    #[test]
    fn test_hash_linked() {
        let prev = block(10, ZERO_HASH, 100, 0);
        assert!(invariant_hash_linked(&block(11, prev.hash(), 100, 0), &prev).is_ok());
        assert_eq!(
            invariant_hash_linked(&block(11, [5u8; 32], 100, 0), &prev),
            Err(ValidationError::HashMismatch { height: 11 })
        );
    }

    #[test]
    fn test_timestamp_equal_is_allowed() {
        let prev = block(10, ZERO_HASH, 100, 0);
        assert!(invariant_timestamp_monotonic(&block(11, ZERO_HASH, 100, 0), &prev).is_ok());
        assert!(invariant_timestamp_monotonic(&block(11, ZERO_HASH, 99, 0), &prev).is_err());
    }

    #[test]
    fn test_transaction_limit_boundary() {
        assert!(invariant_transaction_limit(&block(2, ZERO_HASH, 0, 120)).is_ok());
        assert_eq!(
            invariant_transaction_limit(&block(2, ZERO_HASH, 0, 121)),
            Err(ValidationError::TransactionLimitExceeded {
                height: 2,
                count: 121,
                limit: 120
            })
        );
    }
}
