//! Per-user capacity limits.
//!
//! The predicates here are pure functions of a [`UserRecord`] snapshot. The
//! store evaluates them twice: under the read lock for the advisory `can_*`
//! checks, and again under the write lock inside every `add_*`, so a passed
//! check never turns into an over-limit insert.

use serde::{Deserialize, Serialize};

use crate::types::{Category, UserRecord};

/// Default number of events a user may own at once.
pub const DEFAULT_MAX_EVENT: usize = 1;

/// Default number of queues a user may sit in at once.
pub const DEFAULT_MAX_QUEUE: usize = 3;

/// Default number of trades a user may participate in at once.
pub const DEFAULT_MAX_TRADE: usize = 2;

/// Capacity configuration, fixed when the store is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_event: usize,
    pub max_queue: usize,
    pub max_trade: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_event: DEFAULT_MAX_EVENT,
            max_queue: DEFAULT_MAX_QUEUE,
            max_trade: DEFAULT_MAX_TRADE,
        }
    }
}

impl Limits {
    pub fn new(max_event: usize, max_queue: usize, max_trade: usize) -> Self {
        Self {
            max_event,
            max_queue,
            max_trade,
        }
    }

    /// The cap for `category`.
    pub fn max(&self, category: Category) -> usize {
        match category {
            Category::Event => self.max_event,
            Category::Queue => self.max_queue,
            Category::Trade => self.max_trade,
        }
    }

    /// Whether `record` has room for one more membership in `category`.
    ///
    /// A missing record always has room.
    pub fn admits(&self, category: Category, record: Option<&UserRecord>) -> bool {
        record.is_none_or(|r| r.count(category) < self.max(category))
    }
}
