//! In-memory membership store.
//!
//! One [`RwLock`] guards the whole `UserId -> UserRecord` table. Reads
//! (`exists`, `record`, the `can_*` predicates) share the lock; every mutator
//! holds the write lock for its entire read-modify-write, so operations on the
//! same user are linearizable and no caller ever sees a half-updated record.
//!
//! ```text
//! command layer ──► can_join_queue()   read lock   (advisory)
//!               └─► add_queue()        write lock  (check + insert, atomic)
//!
//! Sweeper ──────► sweep(now)           write lock  (per-record retain)
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{MembershipError, Result};
use crate::limits::Limits;
use crate::types::{
    Category, EventMembership, QueueMembership, TradeParticipation, UserId, UserRecord,
};

type Table = HashMap<UserId, UserRecord>;

/// Thread-safe table of every registered user's memberships.
///
/// Build one per process and share it behind an `Arc`.
#[derive(Debug)]
pub struct MembershipStore {
    users: RwLock<Table>,
    limits: Limits,
}

impl Default for MembershipStore {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl MembershipStore {
    /// Create an empty store enforcing `limits`.
    pub fn new(limits: Limits) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            limits,
        }
    }

    /// The capacity configuration this store enforces.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    // Writers never panic mid-update, so a poisoned guard still holds whole records.
    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.users.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>> {
        self.users.write().map_err(|_| MembershipError::Poisoned)
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = self.users.write();
                panic!("writer panicked while holding the table lock");
            })
            .join()
        });
    }

    /// Run `f` against `user`'s record under the write lock.
    fn with_record<T, F>(&self, user: &UserId, f: F) -> Result<T>
    where
        F: FnOnce(&mut UserRecord) -> Result<T>,
    {
        let mut users = self.write()?;
        let record = users
            .get_mut(user)
            .ok_or_else(|| MembershipError::NotRegistered { user: user.clone() })?;
        f(record)
    }

    /// Check the cap for `category` and insert, in one critical section.
    fn admit<F>(&self, user: &UserId, category: Category, insert: F) -> Result<()>
    where
        F: FnOnce(&mut UserRecord),
    {
        self.with_record(user, |record| {
            if !self.limits.admits(category, Some(record)) {
                return Err(MembershipError::LimitReached {
                    category,
                    limit: self.limits.max(category),
                });
            }
            insert(record);
            Ok(())
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Whether `user` has been registered.
    pub fn exists(&self, user: &UserId) -> bool {
        self.read().contains_key(user)
    }

    /// A copy of `user`'s record, if registered.
    pub fn record(&self, user: &UserId) -> Option<UserRecord> {
        self.read().get(user).cloned()
    }

    /// Number of registered users, including ones with empty records.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn admits(&self, category: Category, user: &UserId) -> bool {
        self.limits.admits(category, self.read().get(user))
    }

    /// Whether `user` may create another event right now.
    ///
    /// Advisory only: [`add_event`](Self::add_event) repeats the check atomically.
    pub fn can_create_event(&self, user: &UserId) -> bool {
        self.admits(Category::Event, user)
    }

    /// Whether `user` may join another queue right now.
    pub fn can_join_queue(&self, user: &UserId) -> bool {
        self.admits(Category::Queue, user)
    }

    /// Whether `user` may start another trade right now.
    pub fn can_create_trade(&self, user: &UserId) -> bool {
        self.admits(Category::Trade, user)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Create an empty record for `user`. Registering twice is a no-op.
    pub fn register(&self, user: UserId) -> Result<()> {
        let mut users = self.write()?;
        if !users.contains_key(&user) {
            debug!(user = %user, "user registered");
            users.insert(user, UserRecord::new());
        }
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Record that `user` owns `event_id` until `expires_at`.
    pub fn add_event(
        &self,
        user: &UserId,
        event_id: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let event_id = event_id.into();
        self.admit(user, Category::Event, |record| {
            record.events.push(EventMembership {
                event_id: event_id.clone(),
                expires_at,
            })
        })?;
        debug!(user = %user, event_id = %event_id, category = %Category::Event, "membership added");
        Ok(())
    }

    /// Drop every event `event_id` owned by `user`. Missing events are ignored.
    pub fn remove_event(&self, user: &UserId, event_id: &str) -> Result<()> {
        let removed = self.with_record(user, |record| Ok(record.remove(Category::Event, event_id)))?;
        debug!(user = %user, event_id = %event_id, category = %Category::Event, removed, "membership removed");
        Ok(())
    }

    // =========================================================================
    // Queues
    // =========================================================================

    /// Put `user` in the queue for `event_id` until `expires_at`.
    pub fn add_queue(
        &self,
        event_id: impl Into<String>,
        user: &UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let event_id = event_id.into();
        self.admit(user, Category::Queue, |record| {
            record.queues.push(QueueMembership {
                event_id: event_id.clone(),
                expires_at,
            })
        })?;
        debug!(user = %user, event_id = %event_id, category = %Category::Queue, "membership added");
        Ok(())
    }

    /// Take `user` out of the queue for `event_id`. Missing entries are ignored.
    pub fn remove_queue(&self, event_id: &str, user: &UserId) -> Result<()> {
        let removed = self.with_record(user, |record| Ok(record.remove(Category::Queue, event_id)))?;
        debug!(user = %user, event_id = %event_id, category = %Category::Queue, removed, "membership removed");
        Ok(())
    }

    /// Dissolve the queue for `event_id` across every user.
    ///
    /// Each record is filtered in place; other queue entries are untouched.
    pub fn remove_all_queue(&self, event_id: &str) -> Result<()> {
        let mut users = self.write()?;
        let mut removed = 0;
        for record in users.values_mut() {
            removed += record.remove(Category::Queue, event_id);
        }
        debug!(event_id = %event_id, removed, "queue dissolved");
        Ok(())
    }

    // =========================================================================
    // Trades
    // =========================================================================

    /// Record that `user` has an offer in `trade_id`.
    pub fn add_trade(&self, user: &UserId, trade_id: impl Into<String>) -> Result<()> {
        let trade_id = trade_id.into();
        self.admit(user, Category::Trade, |record| {
            record.trades.push(TradeParticipation {
                trade_id: trade_id.clone(),
            })
        })?;
        debug!(user = %user, trade_id = %trade_id, category = %Category::Trade, "membership added");
        Ok(())
    }

    /// Withdraw `user` from `trade_id`. Missing trades are ignored.
    pub fn remove_trade(&self, user: &UserId, trade_id: &str) -> Result<()> {
        let removed = self.with_record(user, |record| Ok(record.remove(Category::Trade, trade_id)))?;
        debug!(user = %user, trade_id = %trade_id, category = %Category::Trade, removed, "membership removed");
        Ok(())
    }

    // =========================================================================
    // Expiration
    // =========================================================================

    /// Evict every event and queue entry with `expires_at <= now`.
    ///
    /// `now` is applied uniformly to the whole pass. Trades never expire.
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<()> {
        let mut users = self.write()?;
        let mut removed_events = 0;
        let mut removed_queues = 0;

        for record in users.values_mut() {
            let (events, queues) = record.expire(now);
            removed_events += events;
            removed_queues += queues;
        }

        debug!(
            users = users.len(),
            removed_events,
            removed_queues,
            now = %now,
            "sweep complete"
        );
        Ok(())
    }
}
