//! VerseGate — a devotional chat gateway over the Hidden Words.
//!
//! Serves a retrieval-augmented conversation loop: client messages come in
//! over WebSocket or HTTP, relevant passages are retrieved from the corpus
//! index, and an external model composes the reply.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod composer;
pub mod state;
