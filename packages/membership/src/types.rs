//! Membership data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier for a chat user, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The three kinds of membership a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Event,
    Queue,
    Trade,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Event => write!(f, "event"),
            Category::Queue => write!(f, "queue"),
            Category::Trade => write!(f, "trade"),
        }
    }
}

/// Ownership of an event the user created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMembership {
    pub event_id: String,
    pub expires_at: DateTime<Utc>,
}

/// A place in the waiting queue of someone else's event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMembership {
    pub event_id: String,
    pub expires_at: DateTime<Utc>,
}

/// An active offer in a trade. Trades do not expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeParticipation {
    pub trade_id: String,
}

/// Everything the tracker knows about one user.
///
/// Each list is kept in insertion order. Duplicate IDs are not rejected;
/// keeping IDs unique per list is the caller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub events: Vec<EventMembership>,
    pub queues: Vec<QueueMembership>,
    pub trades: Vec<TradeParticipation>,
}

impl UserRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memberships held in `category`.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Event => self.events.len(),
            Category::Queue => self.queues.len(),
            Category::Trade => self.trades.len(),
        }
    }

    /// True when the record holds no memberships at all.
    ///
    /// Empty records are kept in the store; registration is permanent.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.queues.is_empty() && self.trades.is_empty()
    }

    /// Drop every membership in `category` whose ID is `id`.
    ///
    /// Returns how many entries were removed; zero when nothing matched.
    pub(crate) fn remove(&mut self, category: Category, id: &str) -> usize {
        let before = self.count(category);
        match category {
            Category::Event => self.events.retain(|e| e.event_id != id),
            Category::Queue => self.queues.retain(|q| q.event_id != id),
            Category::Trade => self.trades.retain(|t| t.trade_id != id),
        }
        before - self.count(category)
    }

    /// Drop events and queue entries whose expiry is at or before `now`.
    ///
    /// Filters this record's own lists in place. Returns how many events and
    /// queue entries were removed.
    pub(crate) fn expire(&mut self, now: DateTime<Utc>) -> (usize, usize) {
        let events_before = self.events.len();
        let queues_before = self.queues.len();

        self.events.retain(|e| e.expires_at > now);
        self.queues.retain(|q| q.expires_at > now);

        (
            events_before - self.events.len(),
            queues_before - self.queues.len(),
        )
    }
}
