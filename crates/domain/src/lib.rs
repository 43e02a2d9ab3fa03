//! Shared domain types for VerseGate.
//!
//! Everything the other crates agree on lives here: the error taxonomy,
//! the configuration tree, and the core conversation types.

pub mod config;
pub mod error;
pub mod types;
