//! Per-session ordered message log.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Message author role.
///
/// The whole set is valid for storage and filtering; only
/// [`Role::is_writable`] roles are accepted on the write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Roles clients may write. `System` is reserved for internal use.
    #[must_use]
    pub fn is_writable(self) -> bool {
        matches!(self, Self::User | Self::Assistant)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            other => Err(format!("unknown role: {other:?}")),
        }
    }
}

/// A single chat message.
///
/// Messages carry no id or timestamp; identity is positional within the
/// session's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Thread-safe map from session id to its ordered message log.
///
/// Append-only: messages are never edited or removed once pushed. The store
/// does not know about [`super::SessionStore`]; keeping the two consistent
/// is the caller's job.
#[derive(Debug, Clone)]
pub struct ChatStore {
    inner: Arc<ChatStoreInner>,
}

#[derive(Debug)]
struct ChatStoreInner {
    chats: RwLock<HashMap<u64, Vec<Message>>>,
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatStore {
    /// Create an empty chat store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ChatStoreInner {
                chats: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Seed an empty log for the session. No-op if one already exists.
    pub fn init(&self, session_id: u64) {
        let mut guard = self.inner.chats.write().unwrap();
        guard.entry(session_id).or_default();
    }

    /// Append a message at the end of the session's log, creating the log
    /// first if absent.
    pub fn append(&self, session_id: u64, message: Message) {
        let mut guard = self.inner.chats.write().unwrap();
        guard.entry(session_id).or_default().push(message);
    }

    /// Full message log for the session.
    ///
    /// `None` iff the session was never initialized in this store, which is
    /// distinct from an existing log with zero messages.
    #[must_use]
    pub fn get(&self, session_id: u64) -> Option<Vec<Message>> {
        self.inner.chats.read().unwrap().get(&session_id).cloned()
    }

    /// Like [`ChatStore::get`], retaining only messages with `role` when a
    /// filter is given. Relative order is preserved.
    #[must_use]
    pub fn get_filtered(&self, session_id: u64, role: Option<Role>) -> Option<Vec<Message>> {
        let messages = self.get(session_id)?;
        Some(match role {
            Some(role) => messages.into_iter().filter(|m| m.role == role).collect(),
            None => messages,
        })
    }

    /// Drop every log. Test isolation hook.
    pub fn clear(&self) {
        self.inner.chats.write().unwrap().clear();
    }
}
