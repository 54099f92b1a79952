//! # Algorithms Module
//!
//! Pure algorithms: block link validation, fork choice, retry backoff.

pub mod backoff;
pub mod chain_validator;
pub mod fork_choice;

pub use backoff::RetryBackoff;
pub use chain_validator::{validate_chain, validate_link, ChainValidator};
pub use fork_choice::{choose, is_better, ForkChoice};
