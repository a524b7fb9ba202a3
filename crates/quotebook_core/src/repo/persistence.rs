//! Persistence gateway for quote book state.
//!
//! # Responsibility
//! - Load and save the quote sequence and last selected category in durable
//!   storage.
//! - Load and save the last viewed quote in session storage.
//!
//! # Invariants
//! - `load_quotes` always yields a sequence; absence and corruption both fall
//!   back to the seed, but corruption is reported through `QuoteSource`.
//! - Corrupt payloads are not overwritten until the next explicit save.

use crate::model::filter::CategoryFilter;
use crate::model::quote::{seed_quotes, Quote};
use crate::repo::kv_repo::{KeyValueRepository, SqliteKvRepository, StorageError, StorageResult};
use log::{debug, warn};
use std::path::Path;

/// Durable key holding the JSON quote array.
pub const QUOTES_KEY: &str = "quotes";
/// Durable key holding the last selected category filter.
pub const LAST_CATEGORY_KEY: &str = "lastCategory";
/// Session key holding the last displayed quote.
pub const LAST_VIEWED_KEY: &str = "lastViewedQuote";

/// Where a loaded quote sequence came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteSource {
    Stored,
    Seeded,
    /// Stored data failed to parse; the seed was used instead.
    RecoveredFromCorrupt { reason: String },
}

/// Result of `load_quotes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedQuotes {
    pub quotes: Vec<Quote>,
    pub source: QuoteSource,
}

/// Gateway over durable and session key-value repositories.
pub struct QuotePersistence {
    durable: Box<dyn KeyValueRepository>,
    session: Box<dyn KeyValueRepository>,
}

impl QuotePersistence {
    pub fn new(
        durable: Box<dyn KeyValueRepository>,
        session: Box<dyn KeyValueRepository>,
    ) -> Self {
        Self { durable, session }
    }

    /// Opens a SQLite file for durable state and a fresh in-memory session.
    pub fn open_sqlite(db_path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::new(
            Box::new(SqliteKvRepository::open(db_path)?),
            Box::new(SqliteKvRepository::open_session()?),
        ))
    }

    /// Loads the persisted sequence, or the seed when none is usable.
    ///
    /// # Errors
    /// - Returns `StorageError` only when the storage read itself fails.
    pub fn load_quotes(&self) -> StorageResult<LoadedQuotes> {
        let Some(raw) = self.durable.get(QUOTES_KEY)? else {
            debug!("event=quotes_load module=persistence status=ok source=seed");
            return Ok(LoadedQuotes {
                quotes: seed_quotes(),
                source: QuoteSource::Seeded,
            });
        };

        match serde_json::from_str::<Vec<Quote>>(&raw) {
            Ok(quotes) => {
                debug!(
                    "event=quotes_load module=persistence status=ok source=stored count={}",
                    quotes.len()
                );
                Ok(LoadedQuotes {
                    quotes,
                    source: QuoteSource::Stored,
                })
            }
            Err(err) => {
                warn!(
                    "event=quotes_load module=persistence status=error error_code=corrupt_quotes bytes={} error={}",
                    raw.len(),
                    err
                );
                Ok(LoadedQuotes {
                    quotes: seed_quotes(),
                    source: QuoteSource::RecoveredFromCorrupt {
                        reason: err.to_string(),
                    },
                })
            }
        }
    }

    /// Writes the full sequence under `QUOTES_KEY`.
    pub fn save_quotes(&self, quotes: &[Quote]) -> StorageResult<()> {
        let json = serde_json::to_string(quotes).map_err(|source| {
            StorageError::Serialization {
                key: QUOTES_KEY,
                source,
            }
        })?;
        self.durable.set(QUOTES_KEY, &json)?;
        debug!(
            "event=quotes_save module=persistence status=ok count={}",
            quotes.len()
        );
        Ok(())
    }

    /// Returns the persisted filter, if one was ever saved.
    pub fn load_last_category(&self) -> StorageResult<Option<CategoryFilter>> {
        Ok(self
            .durable
            .get(LAST_CATEGORY_KEY)?
            .map(|raw| CategoryFilter::parse(&raw)))
    }

    pub fn save_last_category(&self, filter: &CategoryFilter) -> StorageResult<()> {
        self.durable.set(LAST_CATEGORY_KEY, filter.as_str())
    }

    /// Returns the last viewed quote for this session.
    ///
    /// An unparseable entry is treated as absent.
    pub fn load_last_viewed(&self) -> StorageResult<Option<Quote>> {
        let Some(raw) = self.session.get(LAST_VIEWED_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Quote>(&raw) {
            Ok(quote) => Ok(Some(quote)),
            Err(err) => {
                warn!(
                    "event=last_viewed_load module=persistence status=error error_code=corrupt_last_viewed error={}",
                    err
                );
                Ok(None)
            }
        }
    }

    pub fn save_last_viewed(&self, quote: &Quote) -> StorageResult<()> {
        let json =
            serde_json::to_string(quote).map_err(|source| StorageError::Serialization {
                key: LAST_VIEWED_KEY,
                source,
            })?;
        self.session.set(LAST_VIEWED_KEY, &json)
    }
}
