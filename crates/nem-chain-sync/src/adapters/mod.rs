//! Adapters for the outbound ports.

pub mod ed25519;
pub mod in_memory;

pub use ed25519::{Ed25519Signer, Ed25519Verifier};
pub use in_memory::InMemoryRemoteChain;
