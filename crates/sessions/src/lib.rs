//! Session management for VerseGate.
//!
//! Gateway-owned session state keyed by a client-supplied session key:
//! in-memory ordered turn histories, append-only JSONL transcripts, and
//! per-session run locks so one turn is processed at a time.

pub mod lock;
pub mod store;
pub mod transcript;

pub use lock::{SessionBusy, SessionLockMap};
pub use store::{SessionEntry, SessionStore};
pub use transcript::{TranscriptLine, TranscriptWriter};
