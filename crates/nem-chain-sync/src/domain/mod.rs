//! # Domain Module
//!
//! Core domain types: block model, chain state, errors, invariants.

pub mod chain_state;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use chain_state::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
