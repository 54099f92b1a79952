//! # Outbound Ports
//!
//! Traits for what the synchronizer depends on: a remote node and a
//! signature verification capability.

use async_trait::async_trait;

use crate::domain::{Block, ChainScore, PublicKey, RemoteUnavailable, Signature};

/// Remote NIS node, as exposed by the `ChainHttp` / `BlockHttp` wrappers.
///
/// Each call is one request/response round trip. Implementations map every
/// transport or decoding failure to [`RemoteUnavailable`].
#[async_trait]
pub trait RemoteChainSource: Send + Sync {
    /// Current chain height (`/chain/height`).
    async fn get_height(&self) -> Result<u64, RemoteUnavailable>;

    /// Current chain score (`/chain/score`).
    async fn get_score(&self) -> Result<ChainScore, RemoteUnavailable>;

    /// Head block (`/chain/last-block`).
    async fn get_last_block(&self) -> Result<Block, RemoteUnavailable>;

    /// Block at a given height (`/block/at/public`).
    async fn get_block_by_height(&self, height: u64) -> Result<Block, RemoteUnavailable>;

    /// Identifier used in logs.
    fn node_id(&self) -> &str;
}

/// Opaque signature verification capability.
pub trait SignatureVerifier: Send + Sync {
    /// `true` if `signature` over `message` was produced by `signer`.
    fn verify(&self, signer: &PublicKey, message: &[u8], signature: &Signature) -> bool;
}
