//! # Inbound Ports
//!
//! API trait defining what the chain synchronizer offers to the rest of the
//! light client.

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use crate::application::{ReorgEvent, SyncOutcome, SyncPhase};
use crate::domain::{ChainSnapshot, ConfigurationError, SyncFailure};

/// Chain sync API - inbound port.
#[async_trait]
pub trait ChainSyncApi: Send {
    /// Run one poll/fetch/reconcile cycle.
    ///
    /// Only configuration errors escape; cycle failures are reported as
    /// [`SyncOutcome::Failed`] and on the error channel.
    async fn sync_once(&mut self) -> Result<SyncOutcome, ConfigurationError>;

    /// Current `{height, score, tip_hash}`.
    fn snapshot(&self) -> ChainSnapshot;

    /// Receiver that always holds the latest snapshot.
    fn watch_snapshot(&self) -> watch::Receiver<ChainSnapshot>;

    /// Notifications, one per adopted chain.
    fn subscribe_reorgs(&self) -> broadcast::Receiver<ReorgEvent>;

    /// Per-cycle failures, for operators.
    fn subscribe_errors(&self) -> broadcast::Receiver<SyncFailure>;

    /// Current state-machine phase.
    fn phase(&self) -> &SyncPhase;
}
