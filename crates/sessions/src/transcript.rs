//! Append-only JSONL transcripts.
//!
//! Each session gets a `<sessionId>.jsonl` file under the transcripts
//! directory.  Every user and assistant turn is appended as a single JSON
//! line; nothing is ever rewritten in place.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use vg_domain::error::{Error, Result};

/// A single transcript line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub timestamp: String,
    pub role: String,
    pub content: String,
}

/// Writes append-only JSONL transcript files.
pub struct TranscriptWriter {
    base_dir: PathBuf,
}

impl TranscriptWriter {
    /// Create the writer, ensuring `state_path/transcripts` exists.
    pub fn new(state_path: &Path) -> Result<Self> {
        let base_dir = state_path.join("transcripts");
        std::fs::create_dir_all(&base_dir).map_err(Error::Io)?;
        Ok(Self { base_dir })
    }

    /// Helper to create a transcript line with the current timestamp.
    pub fn line(role: &str, content: &str) -> TranscriptLine {
        TranscriptLine {
            timestamp: Utc::now().to_rfc3339(),
            role: role.to_owned(),
            content: content.to_owned(),
        }
    }

    /// Append one or more lines to a session's transcript.
    ///
    /// Uses `spawn_blocking` to avoid blocking the tokio runtime during
    /// file I/O.
    pub async fn append(&self, session_id: &str, lines: &[TranscriptLine]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }

        let buf = serialize_lines(lines)?;
        let path = self.path_for(session_id);

        tokio::task::spawn_blocking(move || {
            use std::io::Write;
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(Error::Io)?;
            file.write_all(buf.as_bytes()).map_err(Error::Io)?;
            Ok::<(), Error>(())
        })
        .await
        .map_err(|e| Error::Other(format!("spawn_blocking join: {e}")))??;

        Ok(())
    }

    /// Read back a session's transcript; missing files read as empty.
    pub async fn read(&self, session_id: &str) -> Result<Vec<TranscriptLine>> {
        let path = self.path_for(session_id);
        let sid = session_id.to_owned();

        tokio::task::spawn_blocking(move || read_jsonl_file(&path, &sid))
            .await
            .map_err(|e| Error::Other(format!("spawn_blocking join: {e}")))?
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(format!("{session_id}.jsonl"))
    }
}

/// Serialize transcript lines to a JSONL string.
fn serialize_lines(lines: &[TranscriptLine]) -> Result<String> {
    let mut buf = String::new();
    for line in lines {
        let json = serde_json::to_string(line)
            .map_err(|e| Error::Other(format!("serializing transcript line: {e}")))?;
        buf.push_str(&json);
        buf.push('\n');
    }
    Ok(buf)
}

/// Read and parse a JSONL transcript file.
fn read_jsonl_file(path: &Path, session_id: &str) -> Result<Vec<TranscriptLine>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(path).map_err(Error::Io)?;
    let mut lines = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TranscriptLine>(line) {
            Ok(tl) => lines.push(tl),
            Err(e) => {
                tracing::warn!(
                    session_id = session_id,
                    error = %e,
                    "skipping malformed transcript line"
                );
            }
        }
    }
    Ok(lines)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TranscriptWriter::new(dir.path()).unwrap();

        writer
            .append(
                "sess-1",
                &[
                    TranscriptWriter::line("user", "hello"),
                    TranscriptWriter::line("assistant", "hi there"),
                ],
            )
            .await
            .unwrap();
        writer
            .append("sess-1", &[TranscriptWriter::line("user", "a quote please")])
            .await
            .unwrap();

        let lines = writer.read("sess-1").await.unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].content, "hello");
        assert_eq!(lines[1].role, "assistant");
        assert_eq!(lines[2].content, "a quote please");
    }

    #[tokio::test]
    async fn missing_transcript_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TranscriptWriter::new(dir.path()).unwrap();
        let lines = writer.read("never-written").await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TranscriptWriter::new(dir.path()).unwrap();
        writer
            .append("sess-2", &[TranscriptWriter::line("user", "valid")])
            .await
            .unwrap();

        // Corrupt the file by hand.
        let path = dir.path().join("transcripts/sess-2.jsonl");
        let mut raw = std::fs::read_to_string(&path).unwrap();
        raw.push_str("{not json\n");
        std::fs::write(&path, raw).unwrap();

        let lines = writer.read("sess-2").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].content, "valid");
    }
}
