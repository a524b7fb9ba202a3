//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory quote sequence and its write-through persistence.
//! - Keep front ends decoupled from storage and codec details.

pub mod quote_store;
