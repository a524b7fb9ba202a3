//! Domain model for the quote book.
//!
//! # Responsibility
//! - Define the canonical quote record and category filter value.
//! - Own the seed data used when nothing has been persisted yet.
//!
//! # Invariants
//! - Quotes have no identity beyond their position in the sequence.
//! - Duplicate quotes are allowed and indistinguishable.

pub mod filter;
pub mod quote;
