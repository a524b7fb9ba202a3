//! Remote sync for the quote book.
//!
//! # Responsibility
//! - Fetch one remote record per cycle and prepend it to the store.
//! - Mirror the merged record back to the remote collection, best effort.
//! - Report each cycle as a transient status notice.
//!
//! # Invariants
//! - At most one cycle per agent is in flight; overlapping ticks are skipped.
//! - Sync failures never propagate to store callers.

pub mod agent;
pub mod error;
pub mod remote;
pub mod status;

pub use agent::{CycleOutcome, SyncAgent, SyncHandle, SyncReport, SyncState};
pub use error::{SyncError, SyncResult};
pub use remote::HttpQuoteRemote;
pub use status::{NoticeBoard, NoticeKind, SyncNotice};
