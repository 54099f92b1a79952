//! # Synchronizer
//!
//! Application service driving the sync state machine: poll the remote,
//! locate the fork point, fetch and validate the candidate chain, apply fork
//! choice and publish the result.
//!
//! ChainState is owned here and mutated only by the final, synchronous
//! adoption step of a cycle. Dropping a cycle future at any await point
//! therefore leaves the local chain untouched.

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::events::{ReorgEvent, SyncOutcome, SyncPhase};
use crate::algorithms::{choose, ChainValidator, ForkChoice, RetryBackoff};
use crate::config::SyncConfig;
use crate::domain::{
    Block, ChainScore, ChainSnapshot, ChainState, ConfigurationError, RemoteUnavailable,
    SyncFailure,
};
use crate::ports::{ChainSyncApi, RemoteChainSource, SignatureVerifier};

/// Trusted starting point of the local chain.
#[derive(Clone, Debug)]
pub enum Bootstrap {
    /// Start from the nemesis block (score zero).
    Nemesis(Block),
    /// Start from a trusted checkpoint block and its chain score.
    Checkpoint {
        /// Checkpoint block.
        block: Block,
        /// Score of the chain ending at `block`.
        score: ChainScore,
    },
}

/// Why a cycle stopped early.
enum CycleError {
    Fatal(ConfigurationError),
    Failed(SyncFailure),
}

impl From<ConfigurationError> for CycleError {
    fn from(err: ConfigurationError) -> Self {
        CycleError::Fatal(err)
    }
}

impl From<SyncFailure> for CycleError {
    fn from(failure: SyncFailure) -> Self {
        CycleError::Failed(failure)
    }
}

impl From<RemoteUnavailable> for CycleError {
    fn from(err: RemoteUnavailable) -> Self {
        CycleError::Failed(SyncFailure::Remote(err))
    }
}

/// Chain synchronizer - follows the best-scored chain of a remote node.
pub struct Synchronizer<R: RemoteChainSource, V: SignatureVerifier> {
    /// Configuration.
    config: SyncConfig,
    /// Remote node.
    remote: Arc<R>,
    /// Link validator.
    validator: ChainValidator<V>,
    /// Local canonical chain.
    state: ChainState,
    /// Current state-machine phase.
    phase: SyncPhase,
    /// Remote network checked against config?
    network_verified: bool,
    /// Last adoption stopped at `max_blocks_per_cycle` below the remote tip.
    catching_up: bool,
    /// Delay policy after remote failures.
    backoff: RetryBackoff,
    /// Latest snapshot for readers.
    snapshot_tx: watch::Sender<ChainSnapshot>,
    /// Reorg notifications.
    reorg_tx: broadcast::Sender<ReorgEvent>,
    /// Cycle failures for operators.
    error_tx: broadcast::Sender<SyncFailure>,
    /// Cycles run so far.
    cycles: u64,
}

impl<R: RemoteChainSource, V: SignatureVerifier> Synchronizer<R, V> {
    /// Create a synchronizer from a trusted bootstrap block.
    ///
    /// # Errors
    /// - `InvalidConfig` for out-of-range settings or a non-nemesis
    ///   `Bootstrap::Nemesis` block
    /// - `NetworkMismatch` if the bootstrap block is from another network
    pub fn new(
        config: SyncConfig,
        remote: Arc<R>,
        verifier: V,
        bootstrap: Bootstrap,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let state = match bootstrap {
            Bootstrap::Nemesis(block) => {
                ChainState::from_nemesis(block, config.max_rollback_blocks).ok_or_else(|| {
                    ConfigurationError::InvalidConfig(
                        "bootstrap block is not a nemesis block".to_string(),
                    )
                })?
            }
            Bootstrap::Checkpoint { block, score } => {
                ChainState::from_checkpoint(block, score, config.max_rollback_blocks)
            }
        };

        let local_network = state.tip().version().network();
        if local_network != config.network {
            return Err(ConfigurationError::NetworkMismatch {
                expected: config.network,
                actual: local_network,
            });
        }

        let (snapshot_tx, _) = watch::channel(state.snapshot());
        let (reorg_tx, _) = broadcast::channel(config.event_channel_capacity);
        let (error_tx, _) = broadcast::channel(config.event_channel_capacity);
        let backoff = RetryBackoff::new(config.retry_base_delay(), config.retry_max_delay());

        info!(
            height = state.height(),
            score = %state.score(),
            network = %config.network,
            node = remote.node_id(),
            "[nem-sync] Synchronizer initialized"
        );

        Ok(Self {
            config,
            remote,
            validator: ChainValidator::new(verifier),
            state,
            phase: SyncPhase::Idle,
            network_verified: false,
            catching_up: false,
            backoff,
            snapshot_tx,
            reorg_tx,
            error_tx,
            cycles: 0,
        })
    }

    /// Number of cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run cycles on every tick until `shutdown` changes (or its sender is
    /// dropped).
    ///
    /// Remote failures delay the next tick with exponential backoff. A cycle
    /// in flight when shutdown arrives is dropped without touching the local
    /// chain.
    ///
    /// # Errors
    /// Returns the first [`ConfigurationError`]; the synchronizer must not
    /// continue after one.
    pub async fn run(
        mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), ConfigurationError> {
        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            let outcome = tokio::select! {
                outcome = self.sync_cycle() => outcome?,
                _ = shutdown.changed() => {
                    debug!("[nem-sync] Cycle cancelled by shutdown");
                    break;
                }
            };

            match outcome {
                SyncOutcome::Failed(failure) if failure.is_transient() => {
                    let delay = self.backoff.next_delay();
                    debug!(
                        attempt = self.backoff.failures(),
                        delay_ms = delay.as_millis() as u64,
                        "[nem-sync] Backing off after remote failure"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = shutdown.changed() => break,
                    }
                }
                _ => self.backoff.reset(),
            }
        }

        info!(cycles = self.cycles, "[nem-sync] Synchronizer stopped");
        Ok(())
    }

    /// One full cycle, reporting failures on the error channel.
    async fn sync_cycle(&mut self) -> Result<SyncOutcome, ConfigurationError> {
        self.cycles += 1;
        // Also covers a previous cycle dropped mid-flight.
        if self.phase != SyncPhase::Idle {
            self.transition(SyncPhase::Idle);
        }

        match self.run_cycle().await {
            Ok(outcome) => Ok(outcome),
            Err(CycleError::Fatal(err)) => {
                error!(error = %err, "[nem-sync] Fatal configuration error");
                self.transition(SyncPhase::Idle);
                Err(err)
            }
            Err(CycleError::Failed(failure)) => {
                warn!(
                    cycle = self.cycles,
                    error = %failure,
                    "[nem-sync] Sync cycle failed"
                );
                self.transition(SyncPhase::Error(failure.clone()));
                // No subscribers is fine.
                let _ = self.error_tx.send(failure.clone());
                Ok(SyncOutcome::Failed(failure))
            }
        }
    }

    async fn run_cycle(&mut self) -> Result<SyncOutcome, CycleError> {
        if !self.network_verified {
            self.verify_network().await?;
        }

        self.transition(SyncPhase::Polling);
        let (remote_height, remote_score) = self.poll().await?;
        let local_height = self.state.height();
        let local_score = self.state.score();

        if remote_height <= local_height && remote_score <= local_score {
            debug!(
                remote_height,
                local_height, "[nem-sync] Remote has nothing new"
            );
            self.transition(SyncPhase::Idle);
            return Ok(SyncOutcome::UpToDate);
        }

        self.transition(SyncPhase::FetchingBlocks);
        let ancestor = self.locate_common_ancestor(remote_height).await?;
        let batch_end = ancestor.saturating_add(self.config.max_blocks_per_cycle as u64);
        let target = remote_height.min(batch_end);
        let candidate = self.fetch_range(ancestor + 1, target).await?;

        self.transition(SyncPhase::Reconciling);
        self.reconcile(ancestor, candidate, remote_score, target < remote_height)
    }

    /// Check the remote serves the configured network.
    async fn verify_network(&mut self) -> Result<(), CycleError> {
        let last = with_timeout(
            self.config.request_timeout(),
            "get_last_block",
            self.remote.get_last_block(),
        )
        .await?;

        let actual = last.version().network();
        if actual != self.config.network {
            return Err(ConfigurationError::NetworkMismatch {
                expected: self.config.network,
                actual,
            }
            .into());
        }

        debug!(network = %actual, "[nem-sync] Remote network verified");
        self.network_verified = true;
        Ok(())
    }

    /// Query remote height and score concurrently.
    async fn poll(&self) -> Result<(u64, ChainScore), RemoteUnavailable> {
        let timeout = self.config.request_timeout();
        futures::try_join!(
            with_timeout(timeout, "get_height", self.remote.get_height()),
            with_timeout(timeout, "get_score", self.remote.get_score()),
        )
    }

    /// Highest height at which the remote and local chains agree.
    ///
    /// Starts at `min(local, remote)` height, so a plain extension costs one
    /// probe; on divergence walks down the rollback window.
    async fn locate_common_ancestor(&self, remote_height: u64) -> Result<u64, CycleError> {
        let local_height = self.state.height();
        let floor = self.state.oldest_height();
        let mut height = local_height.min(remote_height);

        while height >= floor {
            let remote_block = self.fetch_block(height).await?;
            let Some(local_block) = self.state.block_at(height) else {
                break;
            };

            if remote_block.hash() == local_block.hash() {
                if height < local_height {
                    info!(
                        fork_height = height,
                        local_height, "[nem-sync] Remote chain forks below local tip"
                    );
                }
                return Ok(height);
            }

            debug!(height, "[nem-sync] Remote block differs from local block");
            if height == floor {
                break;
            }
            height -= 1;
        }

        Err(SyncFailure::ForkTooDeep {
            local_height,
            depth: local_height - floor + 1,
        }
        .into())
    }

    /// Download `from..=to` with bounded concurrency, in height order.
    async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<Block>, RemoteUnavailable> {
        if from > to {
            return Ok(Vec::new());
        }

        debug!(from, to, "[nem-sync] Fetching candidate blocks");
        stream::iter(from..=to)
            .map(|height| self.fetch_block(height))
            .buffered(self.config.fetch_concurrency)
            .try_collect()
            .await
    }

    async fn fetch_block(&self, height: u64) -> Result<Block, RemoteUnavailable> {
        with_timeout(
            self.config.request_timeout(),
            "get_block_by_height",
            self.remote.get_block_by_height(height),
        )
        .await
    }

    /// Validate the candidate, apply fork choice, adopt if it wins.
    ///
    /// A `partial` candidate stops below the remote tip. Once such a batch is
    /// adopted, the local score already equals the remote one, so further
    /// batches extending our tip at that score continue the catch-up.
    ///
    /// Contains no await point: adoption is all-or-nothing.
    fn reconcile(
        &mut self,
        ancestor: u64,
        candidate: Vec<Block>,
        remote_score: ChainScore,
        partial: bool,
    ) -> Result<SyncOutcome, CycleError> {
        let local_score = self.state.score();
        let anchor = self
            .state
            .block_at(ancestor)
            .ok_or(SyncFailure::ForkTooDeep {
                local_height: self.state.height(),
                depth: self.state.height().saturating_sub(ancestor),
            })?;

        self.validator
            .validate_chain(anchor, &candidate)
            .map_err(|source| SyncFailure::Validation {
                height: source.height(),
                source,
            })?;

        let continues_catch_up = self.catching_up
            && ancestor == self.state.height()
            && remote_score == local_score;
        let wins = choose(remote_score, local_score) == ForkChoice::Adopt || continues_catch_up;

        if candidate.is_empty() || !wins {
            self.catching_up = false;
            warn!(
                remote_score = %remote_score,
                local_score = %local_score,
                candidate_blocks = candidate.len(),
                "[nem-sync] Candidate chain does not outscore local chain"
            );
            self.transition(SyncPhase::Idle);
            return Ok(SyncOutcome::Rejected {
                remote_score,
                local_score,
            });
        }

        self.catching_up = partial;
        let adopted_count = candidate.len();
        let rollback = self.state.adopt(ancestor, candidate.clone(), remote_score);
        let event = ReorgEvent {
            common_ancestor_height: ancestor,
            adopted: candidate,
            rolled_back: rollback.dropped,
            score: remote_score,
        };

        info!(
            height = self.state.height(),
            score = %remote_score,
            adopted = adopted_count,
            rolled_back = event.rolled_back.len(),
            partial,
            tip = %hex::encode(self.state.tip_hash()),
            "[nem-sync] Adopted chain"
        );

        self.snapshot_tx.send_replace(self.state.snapshot());
        let rolled_back = event.rolled_back.len();
        // No subscribers is fine.
        let _ = self.reorg_tx.send(event);
        self.transition(SyncPhase::Idle);

        Ok(SyncOutcome::Adopted {
            height: self.state.height(),
            score: remote_score,
            adopted: adopted_count,
            rolled_back,
        })
    }

    fn transition(&mut self, next: SyncPhase) {
        if self.phase != next {
            debug!(
                from = self.phase.name(),
                to = next.name(),
                "[nem-sync] Phase transition"
            );
        }
        self.phase = next;
    }
}

#[async_trait]
impl<R, V> ChainSyncApi for Synchronizer<R, V>
where
    R: RemoteChainSource + 'static,
    V: SignatureVerifier + 'static,
{
    async fn sync_once(&mut self) -> Result<SyncOutcome, ConfigurationError> {
        self.sync_cycle().await
    }

    fn snapshot(&self) -> ChainSnapshot {
        self.state.snapshot()
    }

    fn watch_snapshot(&self) -> watch::Receiver<ChainSnapshot> {
        self.snapshot_tx.subscribe()
    }

    fn subscribe_reorgs(&self) -> broadcast::Receiver<ReorgEvent> {
        self.reorg_tx.subscribe()
    }

    fn subscribe_errors(&self) -> broadcast::Receiver<SyncFailure> {
        self.error_tx.subscribe()
    }

    fn phase(&self) -> &SyncPhase {
        &self.phase
    }
}

/// Bound a remote query by `timeout`; elapsed maps to `RemoteUnavailable`.
async fn with_timeout<T>(
    timeout: Duration,
    operation: &'static str,
    query: impl Future<Output = Result<T, RemoteUnavailable>>,
) -> Result<T, RemoteUnavailable> {
    match tokio::time::timeout(timeout, query).await {
        Ok(result) => result,
        Err(_) => Err(RemoteUnavailable::timed_out(
            operation,
            timeout.as_millis() as u64,
        )),
    }
}
