//! Gateway-owned session store.
//!
//! Each session key maps to a `SessionEntry` holding the ordered turn
//! history for one client conversation.  Turns are append-only: a session's
//! history is never mutated or reordered, only extended or reset wholesale.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use vg_domain::types::ChatTurn;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session entry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single session tracked by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub session_key: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered conversation history, oldest first.
    #[serde(default)]
    pub turns: Vec<ChatTurn>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// In-memory session store.
///
/// Sessions live until reset or evicted by the idle sweep; the durable
/// record is the JSONL transcript, not this map.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a session by its key.
    pub fn get(&self, session_key: &str) -> Option<SessionEntry> {
        self.sessions.read().get(session_key).cloned()
    }

    /// Resolve or create a session for the given key.  Returns `(entry, is_new)`.
    pub fn resolve_or_create(&self, session_key: &str) -> (SessionEntry, bool) {
        // Fast path: session already exists.
        {
            let sessions = self.sessions.read();
            if let Some(entry) = sessions.get(session_key) {
                return (entry.clone(), false);
            }
        }

        // Slow path: create new session.
        let now = Utc::now();
        let entry = SessionEntry {
            session_key: session_key.to_owned(),
            session_id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            turns: Vec::new(),
        };

        let mut sessions = self.sessions.write();
        // Lost the race: another handler created it between the read and
        // the write — keep theirs.
        if let Some(existing) = sessions.get(session_key) {
            return (existing.clone(), false);
        }
        sessions.insert(session_key.to_owned(), entry.clone());

        tracing::debug!(
            session_key = %session_key,
            session_id = %entry.session_id,
            "session created"
        );

        (entry, true)
    }

    /// Append a turn to a session's history.
    ///
    /// No-op for unknown keys; sessions are always resolved before turns
    /// are appended.
    pub fn append_turn(&self, session_key: &str, turn: ChatTurn) {
        let mut sessions = self.sessions.write();
        if let Some(entry) = sessions.get_mut(session_key) {
            entry.turns.push(turn);
            entry.updated_at = Utc::now();
        }
    }

    /// Return the trailing `limit` turns of a session's history, in order.
    pub fn history(&self, session_key: &str, limit: usize) -> Vec<ChatTurn> {
        let sessions = self.sessions.read();
        match sessions.get(session_key) {
            Some(entry) => {
                let skip = entry.turns.len().saturating_sub(limit);
                entry.turns[skip..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Reset a session: mint a new session ID for the same key and drop the
    /// turn history.
    pub fn reset(&self, session_key: &str) -> Option<SessionEntry> {
        let mut sessions = self.sessions.write();
        let entry = sessions.get_mut(session_key)?;

        let old_id = std::mem::replace(
            &mut entry.session_id,
            uuid::Uuid::new_v4().to_string(),
        );
        let now = Utc::now();
        entry.created_at = now;
        entry.updated_at = now;
        entry.turns.clear();

        tracing::info!(
            session_key = %session_key,
            old_session_id = %old_id,
            new_session_id = %entry.session_id,
            "session reset"
        );

        Some(entry.clone())
    }

    /// List all session entries.
    pub fn list(&self) -> Vec<SessionEntry> {
        self.sessions.read().values().cloned().collect()
    }

    /// Evict sessions untouched for longer than `max_idle`.  Returns the
    /// number of sessions dropped.  The JSONL transcript is the durable
    /// record, so eviction loses nothing that matters.
    pub fn prune_idle(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.updated_at >= cutoff);
        let evicted = before - sessions.len();

        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
        evicted
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
