//! Transient sync status notices.
//!
//! A notice stays current until `ttl` elapses or a newer notice replaces it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failed,
}

/// One user-facing sync status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncNotice {
    pub kind: NoticeKind,
    pub message: String,
}

impl SyncNotice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failed,
            message: message.into(),
        }
    }
}

/// Publishes notices and clears each one after a fixed interval.
#[derive(Clone)]
pub struct NoticeBoard {
    tx: Arc<watch::Sender<Option<SyncNotice>>>,
    generation: Arc<AtomicU64>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    /// Receiver observing the current notice (`None` when cleared).
    pub fn subscribe(&self) -> watch::Receiver<Option<SyncNotice>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<SyncNotice> {
        self.tx.borrow().clone()
    }

    /// Replaces the current notice and schedules its removal.
    ///
    /// Must be called from within a tokio runtime.
    pub fn publish(&self, notice: SyncNotice) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_replace(Some(notice));

        let tx = Arc::clone(&self.tx);
        let current = Arc::clone(&self.generation);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if current.load(Ordering::SeqCst) == generation {
                tx.send_replace(None);
            }
        });
    }
}
