//! Core domain logic for Quotebook.
//! This crate is the single source of truth for quote book state and its
//! persistence, import/export and remote sync rules.

pub mod category;
pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use codec::{CodecError, EXPORT_FILE_NAME};
pub use config::{ConfigError, QuotebookConfig, SyncConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::filter::{CategoryFilter, ALL_CATEGORIES};
pub use model::quote::{seed_quotes, Quote, QuoteValidationError, SERVER_CATEGORY};
pub use repo::kv_repo::{KeyValueRepository, SqliteKvRepository, StorageError, StorageResult};
pub use repo::persistence::{LoadedQuotes, QuotePersistence, QuoteSource};
pub use service::quote_store::{
    PickOutcome, QuoteStore, QuoteStoreError, SharedQuoteStore, StoreResult,
};
pub use sync::{
    CycleOutcome, HttpQuoteRemote, NoticeBoard, NoticeKind, SyncAgent, SyncError, SyncHandle,
    SyncNotice, SyncReport, SyncState,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
