//! Audio transcription client.
//!
//! Talks to any OpenAI-compatible `/audio/transcriptions` endpoint
//! (Whisper and friends) over multipart upload.

mod rest;

pub use rest::{TranscribeClient, Transcription};
