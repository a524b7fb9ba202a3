//! Periodic sync agent.
//!
//! # Responsibility
//! - Drive fetch → reconcile → report cycles on a cancellable timer.
//! - Guard against overlapping cycles with an explicit state flag.
//!
//! # Invariants
//! - State returns to `Idle` when a cycle ends, including on failure.
//! - The store lock is never held across an `.await`.
//! - A failed mirror POST does not revert the local merge.

use crate::config::SyncConfig;
use crate::model::quote::Quote;
use crate::service::quote_store::SharedQuoteStore;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::remote::HttpQuoteRemote;
use crate::sync::status::{NoticeBoard, SyncNotice};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Phase of the agent's current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching,
    Reconciling,
}

impl SyncState {
    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Fetching => 1,
            Self::Reconciling => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Fetching,
            2 => Self::Reconciling,
            _ => Self::Idle,
        }
    }
}

/// Details of a successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub merged: Quote,
    /// Whether the mirror POST succeeded.
    pub mirrored: bool,
}

#[derive(Debug)]
pub enum CycleOutcome {
    Synced(SyncReport),
    Failed(SyncError),
    /// Another cycle was still in flight.
    Skipped,
}

enum SyncCommand {
    SyncNow,
    Stop,
}

/// Fetch-reconcile-report loop over a shared store.
pub struct SyncAgent {
    store: SharedQuoteStore,
    remote: HttpQuoteRemote,
    period: Duration,
    notices: NoticeBoard,
    state: AtomicU8,
}

impl SyncAgent {
    pub fn new(store: SharedQuoteStore, remote: HttpQuoteRemote, period: Duration) -> Self {
        Self {
            store,
            remote,
            period,
            notices: NoticeBoard::new(DEFAULT_NOTICE_TTL),
            state: AtomicU8::new(SyncState::Idle.as_u8()),
        }
    }

    pub fn from_config(store: SharedQuoteStore, config: &SyncConfig) -> SyncResult<Self> {
        let remote = HttpQuoteRemote::from_config(config)?;
        Ok(Self::new(store, remote, config.interval()).with_notice_ttl(config.notice_ttl()))
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notices = NoticeBoard::new(ttl);
        self
    }

    pub fn state(&self) -> SyncState {
        SyncState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Runs one cycle unless another is already in flight.
    ///
    /// Never returns an error: failures are reported through the outcome,
    /// the notice board and the log.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self
            .state
            .compare_exchange(
                SyncState::Idle.as_u8(),
                SyncState::Fetching.as_u8(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            warn!(
                "event=sync_cycle module=sync status=skipped reason=in_flight state={:?}",
                self.state()
            );
            return CycleOutcome::Skipped;
        }
        let _idle_on_exit = ResetToIdle(&self.state);

        let cycle_id = Uuid::new_v4();
        let started_at = Instant::now();
        info!("event=sync_cycle module=sync status=start cycle_id={cycle_id}");

        match self.fetch_and_reconcile(cycle_id).await {
            Ok(report) => {
                info!(
                    "event=sync_cycle module=sync status=ok cycle_id={} duration_ms={} mirrored={}",
                    cycle_id,
                    started_at.elapsed().as_millis(),
                    report.mirrored
                );
                self.notices
                    .publish(SyncNotice::success("Quotes synced with server."));
                CycleOutcome::Synced(report)
            }
            Err(err) => {
                warn!(
                    "event=sync_cycle module=sync status=error cycle_id={} duration_ms={} error_code={} error={}",
                    cycle_id,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                self.notices
                    .publish(SyncNotice::failed(format!("Sync failed: {err}")));
                CycleOutcome::Failed(err)
            }
        }
    }

    async fn fetch_and_reconcile(&self, cycle_id: Uuid) -> SyncResult<SyncReport> {
        let remote_quote = self.remote.fetch_quote().await?;

        self.state
            .store(SyncState::Reconciling.as_u8(), Ordering::SeqCst);
        self.merge(remote_quote.clone())?;

        let mirrored = match self.remote.mirror_quote(&remote_quote).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=sync_mirror module=sync status=error cycle_id={} error_code={} error={}",
                    cycle_id,
                    err.code(),
                    err
                );
                false
            }
        };

        Ok(SyncReport {
            merged: remote_quote,
            mirrored,
        })
    }

    fn merge(&self, quote: Quote) -> SyncResult<()> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| SyncError::StoreUnavailable)?;
        store.merge_remote(quote)?;
        Ok(())
    }

    /// Starts the periodic loop on the current tokio runtime.
    ///
    /// The first cycle runs one full period after start. Each tick spawns its
    /// cycle, so a slow cycle makes later ticks skip instead of queueing.
    pub fn spawn(self: Arc<Self>) -> SyncHandle {
        let (command_tx, command_rx) = mpsc::channel(8);
        let task = tokio::spawn(self.run(command_rx));
        SyncHandle { command_tx, task }
    }

    async fn run(self: Arc<Self>, mut command_rx: mpsc::Receiver<SyncCommand>) {
        info!(
            "event=sync_agent module=sync status=start period_ms={}",
            self.period.as_millis()
        );

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let agent = Arc::clone(&self);
                    tokio::spawn(async move {
                        agent.run_cycle().await;
                    });
                }
                command = command_rx.recv() => match command {
                    Some(SyncCommand::SyncNow) => {
                        let agent = Arc::clone(&self);
                        tokio::spawn(async move {
                            agent.run_cycle().await;
                        });
                    }
                    Some(SyncCommand::Stop) | None => break,
                },
            }
        }

        info!("event=sync_agent module=sync status=stopped");
    }
}

struct ResetToIdle<'a>(&'a AtomicU8);

impl Drop for ResetToIdle<'_> {
    fn drop(&mut self) {
        self.0.store(SyncState::Idle.as_u8(), Ordering::SeqCst);
    }
}

/// Control handle for a spawned agent loop.
pub struct SyncHandle {
    command_tx: mpsc::Sender<SyncCommand>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Requests a cycle outside the regular schedule.
    pub async fn sync_now(&self) {
        if self.command_tx.send(SyncCommand::SyncNow).await.is_err() {
            debug!("event=sync_now module=sync status=skipped reason=agent_stopped");
        }
    }

    /// Stops the timer loop and waits for it to exit.
    ///
    /// A cycle already in flight is allowed to finish on its own.
    pub async fn stop(self) {
        if self.command_tx.send(SyncCommand::Stop).await.is_err() {
            debug!("event=sync_stop module=sync status=skipped reason=agent_stopped");
        }
        if let Err(err) = self.task.await {
            warn!("event=sync_stop module=sync status=error error={err}");
        }
    }
}
