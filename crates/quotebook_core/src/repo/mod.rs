//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value contract shared by durable and session storage.
//! - Map the quote book's records onto fixed storage keys.
//!
//! # Invariants
//! - Write failures are surfaced as `StorageError`, never dropped.
//! - Callers above this layer never see SQL or raw storage keys.

pub mod kv_repo;
pub mod persistence;
