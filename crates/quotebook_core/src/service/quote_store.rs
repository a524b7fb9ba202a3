//! Quote store use-case service.
//!
//! # Responsibility
//! - Hold the ordered quote sequence, selected filter and last viewed quote.
//! - Write every mutation through to the persistence gateway.
//! - Expose the add/pick/import/export/merge operations front ends call.
//!
//! # Invariants
//! - A failed operation leaves memory and storage unchanged.
//! - In-memory state equals what `load_quotes` returns after any successful
//!   mutation.

use crate::category;
use crate::codec::{self, CodecError};
use crate::model::filter::CategoryFilter;
use crate::model::quote::{Quote, QuoteValidationError};
use crate::repo::kv_repo::StorageError;
use crate::repo::persistence::{QuotePersistence, QuoteSource};
use log::{debug, info, warn};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

/// Store handle shared between front end and sync agent.
pub type SharedQuoteStore = Arc<Mutex<QuoteStore>>;

pub type StoreResult<T> = Result<T, QuoteStoreError>;

/// Error for quote store use-cases.
#[derive(Debug)]
pub enum QuoteStoreError {
    /// Hand-entered quote failed validation.
    Validation(QuoteValidationError),
    /// Import payload was not an array of records.
    Format(CodecError),
    /// Persistence write or read failed.
    Storage(StorageError),
}

impl Display for QuoteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Format(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QuoteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Format(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<QuoteValidationError> for QuoteStoreError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CodecError> for QuoteStoreError {
    fn from(value: CodecError) -> Self {
        Self::Format(value)
    }
}

impl From<StorageError> for QuoteStoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Result of a random pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(Quote),
    /// The filter matched no quotes.
    NoQuotesInCategory,
}

/// Owned quote sequence with write-through persistence.
pub struct QuoteStore {
    quotes: Vec<Quote>,
    filter: CategoryFilter,
    last_viewed: Option<Quote>,
    load_source: QuoteSource,
    persistence: QuotePersistence,
}

impl QuoteStore {
    /// Restores store state from persistence.
    ///
    /// The saved filter is resolved against the loaded categories, so a
    /// category that no longer exists comes back as `All`.
    pub fn open(persistence: QuotePersistence) -> StoreResult<Self> {
        let loaded = persistence.load_quotes()?;
        let saved_filter = persistence.load_last_category()?.unwrap_or_default();
        let filter = category::resolve_filter(&saved_filter, &loaded.quotes);
        let last_viewed = persistence.load_last_viewed()?;

        info!(
            "event=store_open module=store status=ok count={} source={} filter_restored={}",
            loaded.quotes.len(),
            source_label(&loaded.source),
            filter == saved_filter
        );

        Ok(Self {
            quotes: loaded.quotes,
            filter,
            last_viewed,
            load_source: loaded.source,
            persistence,
        })
    }

    /// Wraps the current store into a shareable handle.
    pub fn into_shared(self) -> SharedQuoteStore {
        Arc::new(Mutex::new(self))
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// How the sequence was obtained when the store was opened.
    pub fn load_source(&self) -> &QuoteSource {
        &self.load_source
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn last_viewed(&self) -> Option<&Quote> {
        self.last_viewed.as_ref()
    }

    /// Distinct categories in first-occurrence order.
    pub fn categories(&self) -> Vec<String> {
        category::categories(&self.quotes)
    }

    /// Filter choices, `All` first.
    pub fn filter_options(&self) -> Vec<CategoryFilter> {
        category::filter_options(&self.quotes)
    }

    /// Selects and durably saves the category filter.
    pub fn set_filter(&mut self, filter: CategoryFilter) -> StoreResult<()> {
        self.persistence.save_last_category(&filter)?;
        debug!(
            "event=filter_set module=store status=ok filter={}",
            filter.as_str()
        );
        self.filter = filter;
        Ok(())
    }

    /// Appends a validated quote and persists.
    ///
    /// # Errors
    /// - `Validation` when text or category is blank after trimming.
    /// - `Storage` when the write-through fails; the append is undone.
    pub fn add(&mut self, text: &str, category: &str) -> StoreResult<&Quote> {
        let quote = Quote::new(text, category)?;
        self.quotes.push(quote);
        if let Err(err) = self.persistence.save_quotes(&self.quotes) {
            self.quotes.pop();
            return Err(err.into());
        }
        info!(
            "event=quote_add module=store status=ok count={}",
            self.quotes.len()
        );
        Ok(&self.quotes[self.quotes.len() - 1])
    }

    /// Picks a random quote matching `filter` using the thread RNG.
    pub fn pick_random(&mut self, filter: &CategoryFilter) -> StoreResult<PickOutcome> {
        self.pick_random_with(filter, &mut rand::thread_rng())
    }

    /// Picks a random quote matching `filter` with a caller-supplied RNG.
    ///
    /// Every call draws independently, so repeats are possible. The picked
    /// quote is saved as the session's last viewed quote.
    pub fn pick_random_with<R: Rng>(
        &mut self,
        filter: &CategoryFilter,
        rng: &mut R,
    ) -> StoreResult<PickOutcome> {
        let eligible: Vec<&Quote> = self.quotes.iter().filter(|q| filter.matches(q)).collect();
        if eligible.is_empty() {
            debug!(
                "event=quote_pick module=store status=empty filter={}",
                filter.as_str()
            );
            return Ok(PickOutcome::NoQuotesInCategory);
        }

        let picked = eligible[rng.gen_range(0..eligible.len())].clone();
        self.persistence.save_last_viewed(&picked)?;
        self.last_viewed = Some(picked.clone());
        Ok(PickOutcome::Picked(picked))
    }

    /// Appends records verbatim and persists.
    ///
    /// Returns the number of records appended.
    pub fn import_batch(&mut self, records: Vec<Quote>) -> StoreResult<usize> {
        let previous_len = self.quotes.len();
        let added = records.len();
        self.quotes.extend(records);
        if let Err(err) = self.persistence.save_quotes(&self.quotes) {
            self.quotes.truncate(previous_len);
            return Err(err.into());
        }
        info!(
            "event=quote_import module=store status=ok added={} count={}",
            added,
            self.quotes.len()
        );
        Ok(added)
    }

    /// Parses an uploaded JSON document and appends its records.
    ///
    /// # Errors
    /// - `Format` when the text is not a JSON array of objects; nothing is
    ///   appended.
    pub fn import_blob(&mut self, text: &str) -> StoreResult<usize> {
        let records = codec::parse_import(text).map_err(|err| {
            warn!(
                "event=quote_import module=store status=error error_code=invalid_format error={}",
                err
            );
            err
        })?;
        self.import_batch(records)
    }

    /// Renders the full sequence as pretty-printed JSON.
    pub fn export_blob(&self) -> StoreResult<String> {
        Ok(codec::export_blob(&self.quotes)?)
    }

    /// Prepends a remote quote unconditionally and persists.
    pub fn merge_remote(&mut self, quote: Quote) -> StoreResult<()> {
        self.quotes.insert(0, quote);
        if let Err(err) = self.persistence.save_quotes(&self.quotes) {
            self.quotes.remove(0);
            return Err(err.into());
        }
        info!(
            "event=quote_merge_remote module=store status=ok count={}",
            self.quotes.len()
        );
        Ok(())
    }
}

fn source_label(source: &QuoteSource) -> &'static str {
    match source {
        QuoteSource::Stored => "stored",
        QuoteSource::Seeded => "seed",
        QuoteSource::RecoveredFromCorrupt { .. } => "recovered",
    }
}

#[cfg(test)]
mod tests {
    use super::{PickOutcome, QuoteStore};
    use crate::model::filter::CategoryFilter;
    use crate::repo::kv_repo::SqliteKvRepository;
    use crate::repo::persistence::QuotePersistence;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn store() -> QuoteStore {
        QuoteStore::open(QuotePersistence::new(
            Box::new(SqliteKvRepository::open_session().unwrap()),
            Box::new(SqliteKvRepository::open_session().unwrap()),
        ))
        .unwrap()
    }

    #[test]
    fn pick_only_returns_quotes_from_filtered_category() {
        let mut store = store();
        store.add("only one", "Solo").unwrap();
        let filter = CategoryFilter::parse("Solo");
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            match store.pick_random_with(&filter, &mut rng).unwrap() {
                PickOutcome::Picked(quote) => assert_eq!(quote.category, "Solo"),
                PickOutcome::NoQuotesInCategory => panic!("category has a quote"),
            }
        }
    }

    #[test]
    fn pick_updates_last_viewed() {
        let mut store = store();
        assert!(store.last_viewed().is_none());
        let mut rng = StdRng::seed_from_u64(1);
        let PickOutcome::Picked(quote) = store
            .pick_random_with(&CategoryFilter::All, &mut rng)
            .unwrap()
        else {
            panic!("seeded store should not be empty");
        };
        assert_eq!(store.last_viewed(), Some(&quote));
    }
}
