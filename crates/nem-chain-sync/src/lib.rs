//! # NEM Chain Sync
//!
//! Block-chain synchronization and fork choice for a NEM light client.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Follow the best chain of a remote NIS node without trusting it:
//! - Every fetched block is linked and signature-checked against its predecessor
//! - Competing chains are ranked by chain score ("higher is better", ties keep ours)
//! - Forks are resolved from the common ancestor inside a bounded rollback window
//! - Adoption is all-or-nothing and announced once per reorg
//!
//! ## Sync Cycle
//!
//! | Phase | Work |
//! |-------|------|
//! | Polling | Query remote height and score |
//! | FetchingBlocks | Find common ancestor, download candidate blocks |
//! | Reconciling | Validate links, apply fork choice, adopt or discard |
//! | Error | Report on error channel, retry next tick |
//!
//! ## Module Structure
//!
//! ```text
//! nem-chain-sync/
//! ├── domain/          # Block, ChainState, value objects, errors, invariants
//! ├── algorithms/      # Chain validator, fork choice, retry backoff
//! ├── ports/           # API trait (inbound) + RemoteChainSource, SignatureVerifier (outbound)
//! ├── adapters/        # Ed25519 verifier/signer, in-memory remote chain
//! ├── application/     # Synchronizer state machine
//! ├── config.rs        # SyncConfig
//! └── telemetry.rs     # tracing-subscriber setup
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

// Re-exports
pub use adapters::{Ed25519Signer, Ed25519Verifier, InMemoryRemoteChain};
pub use algorithms::{
    choose, is_better, validate_chain, validate_link, ChainValidator, ForkChoice, RetryBackoff,
};
pub use application::{Bootstrap, ReorgEvent, SyncOutcome, SyncPhase, Synchronizer};
pub use config::SyncConfig;
pub use domain::{
    Block, BlockDraft, BlockError, BlockType, BlockVersion, ChainScore, ChainSnapshot, ChainState,
    ConfigurationError, Hash, Network, PublicKey, RawBlock, RemoteUnavailable, Rollback,
    Signature, SyncFailure, Transaction, ValidationError, MAX_TRANSACTIONS_PER_BLOCK,
    NEMESIS_HEIGHT, ZERO_HASH,
};
pub use ports::{ChainSyncApi, RemoteChainSource, SignatureVerifier};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
