//! # Application Module
//!
//! The synchronizer service orchestrating the domain and outbound ports.

pub mod events;
pub mod synchronizer;

pub use events::{ReorgEvent, SyncOutcome, SyncPhase};
pub use synchronizer::{Bootstrap, Synchronizer};
