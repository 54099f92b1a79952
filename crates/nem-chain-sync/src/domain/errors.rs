//! # Domain Errors
//!
//! Error taxonomy for chain sync.
//!
//! | Error | Meaning | Retried? |
//! |-------|---------|----------|
//! | [`BlockError`] | Malformed block tags or shape | No |
//! | [`ValidationError`] | Broken linkage or bad signature | No, candidate discarded |
//! | [`RemoteUnavailable`] | Transient I/O failure or timeout | Yes, with backoff |
//! | [`ConfigurationError`] | Network mismatch or bad config | Fatal |

use thiserror::Error;

use super::value_objects::Network;

/// Hash type alias (32-byte SHA3-256)
pub type Hash = [u8; 32];

/// Block construction errors (unknown tags, impossible shapes).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlockError {
    /// Block type code is neither nemesis (-1) nor regular (1).
    #[error("Unknown block type code: {0}")]
    UnknownBlockType(i32),

    /// Network byte of the version field is not recognized.
    #[error("Unknown network byte: {0:#04x}")]
    UnknownNetwork(u8),

    /// Structure version byte is zero.
    #[error("Unsupported block version: {0:#010x}")]
    UnsupportedVersion(u32),

    /// Heights start at 1.
    #[error("Block height must be positive")]
    ZeroHeight,

    /// Nemesis block placed anywhere but height 1.
    #[error("Nemesis block at height {height}")]
    MisplacedNemesis {
        /// Offending height
        height: u64,
    },
}

/// Linkage or integrity defect of a candidate block.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Candidate does not directly follow its predecessor.
    #[error("Height mismatch: expected {expected}, got {actual}")]
    HeightMismatch {
        /// predecessor.height + 1
        expected: u64,
        /// candidate.height
        actual: u64,
    },

    /// Candidate does not reference the predecessor's hash.
    #[error("Previous block hash mismatch at height {height}")]
    HashMismatch {
        /// Candidate height
        height: u64,
    },

    /// Candidate is older than its predecessor.
    #[error("Timestamp regression at height {height}: {timestamp} < {predecessor_timestamp}")]
    TimestampRegression {
        /// Candidate height
        height: u64,
        /// Candidate timestamp
        timestamp: u64,
        /// Predecessor timestamp
        predecessor_timestamp: u64,
    },

    /// Harvester signature does not verify.
    #[error("Invalid signature at height {height}")]
    SignatureInvalid {
        /// Candidate height
        height: u64,
    },

    /// More transactions than a block may carry.
    #[error("Too many transactions at height {height}: {count} > {limit}")]
    TransactionLimitExceeded {
        /// Candidate height
        height: u64,
        /// Transactions in the block
        count: usize,
        /// Maximum allowed
        limit: usize,
    },
}

impl ValidationError {
    /// Height of the offending block.
    pub fn height(&self) -> u64 {
        match self {
            ValidationError::HeightMismatch { actual, .. } => *actual,
            ValidationError::HashMismatch { height }
            | ValidationError::TimestampRegression { height, .. }
            | ValidationError::SignatureInvalid { height }
            | ValidationError::TransactionLimitExceeded { height, .. } => *height,
        }
    }
}

/// Remote node could not answer (I/O failure or timeout).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Remote unavailable during {operation}: {reason}")]
pub struct RemoteUnavailable {
    /// Query that failed (e.g. `get_height`).
    pub operation: &'static str,
    /// Human readable cause.
    pub reason: String,
}

impl RemoteUnavailable {
    /// Create a new remote failure.
    pub fn new(operation: &'static str, reason: impl Into<String>) -> Self {
        Self {
            operation,
            reason: reason.into(),
        }
    }

    /// Failure caused by an elapsed request timeout.
    pub fn timed_out(operation: &'static str, timeout_ms: u64) -> Self {
        Self::new(operation, format!("timed out after {timeout_ms}ms"))
    }
}

/// Fatal configuration problems. The synchronizer must not proceed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Remote node (or trusted bootstrap block) is on another network.
    #[error("Network mismatch: configured {expected}, found {actual}")]
    NetworkMismatch {
        /// Configured network
        expected: Network,
        /// Network reported by the remote
        actual: Network,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure of a single sync cycle.
///
/// Reported on the error channel; local chain state is never touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncFailure {
    /// A fetched block failed validation.
    #[error("Candidate rejected at height {height}: {source}")]
    Validation {
        /// Height of the offending block
        height: u64,
        /// Validation defect
        source: ValidationError,
    },

    /// Remote query failed or timed out.
    #[error(transparent)]
    Remote(#[from] RemoteUnavailable),

    /// Remote fork starts below the local rollback window.
    #[error("No common ancestor within {depth} blocks below height {local_height}")]
    ForkTooDeep {
        /// Local height when the search started
        local_height: u64,
        /// Number of blocks searched
        depth: u64,
    },
}

impl SyncFailure {
    /// Transient failures are retried with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncFailure::Remote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_mismatch_message() {
        let err = ValidationError::HeightMismatch {
            expected: 10,
            actual: 12,
        };
        assert!(err.to_string().contains("expected 10, got 12"));
    }

    #[test]
    fn test_validation_error_height() {
        let gap = ValidationError::HeightMismatch {
            expected: 10,
            actual: 12,
        };
        assert_eq!(gap.height(), 12);
        assert_eq!(ValidationError::SignatureInvalid { height: 3 }.height(), 3);
    }

    #[test]
    fn test_remote_timeout_message() {
        let err = RemoteUnavailable::timed_out("get_height", 500);
        assert_eq!(err.operation, "get_height");
        assert!(err.to_string().contains("500ms"));
    }

    #[test]
    fn test_network_mismatch_message() {
        let err = ConfigurationError::NetworkMismatch {
            expected: Network::MainNet,
            actual: Network::TestNet,
        };
        assert!(err.to_string().contains("mainnet"));
        assert!(err.to_string().contains("testnet"));
    }

    #[test]
    fn test_only_remote_failures_are_transient() {
        let remote: SyncFailure = RemoteUnavailable::new("get_score", "reset").into();
        assert!(remote.is_transient());

        let invalid = SyncFailure::Validation {
            height: 5,
            source: ValidationError::HashMismatch { height: 5 },
        };
        assert!(!invalid.is_transient());
        assert!(invalid.to_string().contains("height 5"));
    }
}
