//! # Chain Validator
//!
//! Structural and cryptographic checks of a candidate block against its
//! known predecessor.
//!
//! ## Checks (in order)
//!
//! 1. Height increment
//! 2. Previous-hash linkage
//! 3. Timestamp monotonicity
//! 4. Harvester signature over the canonical bytes
//! 5. Transaction count limit
//!
//! Validation is pure: no I/O, no mutable state.

use crate::domain::{
    invariant_hash_linked, invariant_height_continuous, invariant_timestamp_monotonic,
    invariant_transaction_limit, Block, ValidationError,
};
use crate::ports::SignatureVerifier;

/// Validate `candidate` as the direct successor of `predecessor`.
pub fn validate_link(
    candidate: &Block,
    predecessor: &Block,
    verifier: &dyn SignatureVerifier,
) -> Result<(), ValidationError> {
    invariant_height_continuous(candidate, predecessor)?;
    invariant_hash_linked(candidate, predecessor)?;
    invariant_timestamp_monotonic(candidate, predecessor)?;

    if !verifier.verify(
        candidate.signer(),
        &candidate.canonical_bytes(),
        candidate.signature(),
    ) {
        return Err(ValidationError::SignatureInvalid {
            height: candidate.height(),
        });
    }

    invariant_transaction_limit(candidate)
}

/// Validate `blocks` as a continuation of `anchor`, pair by pair.
///
/// Returns the first failure; its height identifies the offending block.
pub fn validate_chain(
    anchor: &Block,
    blocks: &[Block],
    verifier: &dyn SignatureVerifier,
) -> Result<(), ValidationError> {
    let mut predecessor = anchor;
    for candidate in blocks {
        validate_link(candidate, predecessor, verifier)?;
        predecessor = candidate;
    }
    Ok(())
}

/// Validator bound to a signature verifier.
pub struct ChainValidator<V: SignatureVerifier> {
    verifier: V,
}

impl<V: SignatureVerifier> ChainValidator<V> {
    /// Create a validator.
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    /// See [`validate_link`].
    pub fn validate_link(&self, candidate: &Block, predecessor: &Block) -> Result<(), ValidationError> {
        validate_link(candidate, predecessor, &self.verifier)
    }

    /// See [`validate_chain`].
    pub fn validate_chain(&self, anchor: &Block, blocks: &[Block]) -> Result<(), ValidationError> {
        validate_chain(anchor, blocks, &self.verifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Ed25519Signer, Ed25519Verifier};
    use crate::domain::{
        BlockDraft, BlockType, BlockVersion, Hash, Network, PublicKey, Signature, Transaction,
        ZERO_HASH,
    };
    use proptest::prelude::*;

    struct RejectAll;

    impl SignatureVerifier for RejectAll {
        fn verify(&self, _: &PublicKey, _: &[u8], _: &Signature) -> bool {
            false
        }
    }

    fn draft(signer: &Ed25519Signer, height: u64, prev: Hash, timestamp: u64) -> BlockDraft {
        BlockDraft {
            block_type: if height == 1 {
                BlockType::Nemesis
            } else {
                BlockType::Regular
            },
            version: BlockVersion::v1(Network::TestNet),
            timestamp,
            signer: signer.public_key(),
            prev_block_hash: prev,
            height,
            transactions: vec![Transaction::new(height.to_be_bytes().to_vec())],
        }
    }

    fn build_chain(len: usize, spacing: u64) -> Vec<Block> {
        let signer = Ed25519Signer::from_seed([42u8; 32]);
        let mut blocks: Vec<Block> = Vec::with_capacity(len);
        for i in 0..len as u64 {
            let prev = blocks.last().map(Block::hash).unwrap_or(ZERO_HASH);
            let block = signer.seal(draft(&signer, i + 1, prev, i * spacing)).unwrap();
            blocks.push(block);
        }
        blocks
    }

    #[test]
    fn test_validate_link_valid() {
        let blocks = build_chain(2, 60);
        let validator = ChainValidator::new(Ed25519Verifier);
        assert!(validator.validate_link(&blocks[1], &blocks[0]).is_ok());
    }

    #[test]
    fn test_validate_link_height_checked_first() {
        let blocks = build_chain(3, 60);
        // Height gap and hash mismatch at once: height wins.
        let result = validate_link(&blocks[2], &blocks[0], &Ed25519Verifier);
        assert_eq!(
            result,
            Err(ValidationError::HeightMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_validate_link_hash_mismatch() {
        let signer = Ed25519Signer::from_seed([1u8; 32]);
        let blocks = build_chain(1, 60);
        let forged = signer.seal(draft(&signer, 2, [9u8; 32], 60)).unwrap();
        assert_eq!(
            validate_link(&forged, &blocks[0], &Ed25519Verifier),
            Err(ValidationError::HashMismatch { height: 2 })
        );
    }

    #[test]
    fn test_validate_link_timestamp_regression() {
        let signer = Ed25519Signer::from_seed([1u8; 32]);
        let anchor = signer.seal(draft(&signer, 1, ZERO_HASH, 500)).unwrap();
        let early = signer.seal(draft(&signer, 2, anchor.hash(), 499)).unwrap();
        assert!(matches!(
            validate_link(&early, &anchor, &Ed25519Verifier),
            Err(ValidationError::TimestampRegression { height: 2, .. })
        ));
    }

    #[test]
    fn test_validate_link_bad_signature() {
        let blocks = build_chain(2, 60);
        assert_eq!(
            validate_link(&blocks[1], &blocks[0], &RejectAll),
            Err(ValidationError::SignatureInvalid { height: 2 })
        );
    }

    #[test]
    fn test_validate_link_signature_from_other_key() {
        let blocks = build_chain(1, 60);
        let harvester = Ed25519Signer::from_seed([1u8; 32]);
        let impostor = Ed25519Signer::from_seed([2u8; 32]);
        let d = draft(&harvester, 2, blocks[0].hash(), 60);
        let forged = d.clone().seal(impostor.sign(&d)).unwrap();
        assert_eq!(
            validate_link(&forged, &blocks[0], &Ed25519Verifier),
            Err(ValidationError::SignatureInvalid { height: 2 })
        );
    }

    #[test]
    fn test_validate_link_too_many_transactions() {
        let signer = Ed25519Signer::from_seed([1u8; 32]);
        let anchor = signer.seal(draft(&signer, 1, ZERO_HASH, 0)).unwrap();
        let mut d = draft(&signer, 2, anchor.hash(), 60);
        d.transactions = (0..121u32)
            .map(|i| Transaction::new(i.to_be_bytes().to_vec()))
            .collect();
        let heavy = signer.seal(d).unwrap();
        assert!(matches!(
            validate_link(&heavy, &anchor, &Ed25519Verifier),
            Err(ValidationError::TransactionLimitExceeded { count: 121, .. })
        ));
    }

    #[test]
    fn test_validate_chain_reports_first_failure() {
        let mut blocks = build_chain(5, 60);
        let signer = Ed25519Signer::from_seed([3u8; 32]);
        blocks[3] = signer.seal(draft(&signer, 4, [0xAB; 32], 180)).unwrap();
        let validator = ChainValidator::new(Ed25519Verifier);
        assert_eq!(
            validator.validate_chain(&blocks[0], &blocks[1..]),
            Err(ValidationError::HashMismatch { height: 4 })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_valid_sequences_link(len in 2usize..12, spacing in 0u64..120) {
            let blocks = build_chain(len, spacing);
            for pair in blocks.windows(2) {
                prop_assert!(validate_link(&pair[1], &pair[0], &Ed25519Verifier).is_ok());
            }
        }
    }
}
