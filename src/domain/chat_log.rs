use std::fmt::Display;

use chrono::{DateTime, Utc};

use super::user::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    Text(String),
    Joined,
    Left,
}

impl Display for EntryBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryBody::Text(text) => f.write_str(text),
            EntryBody::Joined => f.write_str("joined"),
            EntryBody::Left => f.write_str("left"),
        }
    }
}

/// One line of the transcript. `user` is a snapshot taken on arrival.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    user: User,
    body: EntryBody,
    received_at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(user: User, body: EntryBody) -> Self {
        TranscriptEntry {
            user,
            body,
            received_at: Utc::now(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn body(&self) -> &EntryBody {
        &self.body
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn is_mine(&self, identity: Option<&User>) -> bool {
        identity.map_or(false, |me| me.same_as(&self.user))
    }
}

/// Append-only, arrival-ordered log of chat and presence entries.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
