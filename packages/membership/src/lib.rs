//! # Membership
//!
//! Per-user membership tracking for the bot backend: which events a user has
//! created, which event queues they are waiting in, and which trades they have
//! an offer in.
//!
//! ## Architecture
//!
//! ```text
//! Command handlers (many, in parallel)
//!     │
//!     ├─► can_create_event / can_join_queue / can_create_trade   (advisory)
//!     ├─► register ─► add_* / remove_* / remove_all_queue
//!     ▼
//! MembershipStore  RwLock<HashMap<UserId, UserRecord>>
//!     ▲
//!     │ sweep(now)
//! Sweeper (tokio interval)
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Registration is the only way in** - category mutators on an unknown
//!    user fail with [`MembershipError::NotRegistered`]
//! 2. **Limits are atomic** - every `add_*` checks its cap and inserts under one
//!    write lock, so racing callers can never exceed [`Limits`]
//! 3. **Per-user filtering** - sweeps and queue dissolution filter each record in
//!    place; one user's entries never end up in another user's record
//! 4. **Trades never expire** - only events and queue entries carry a TTL
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{Duration, Utc};
//! use membership::{Limits, MembershipStore, UserId};
//!
//! let store = Arc::new(MembershipStore::new(Limits::default()));
//! let user = UserId::from("123456789");
//!
//! store.register(user.clone())?;
//! if store.can_join_queue(&user) {
//!     store.add_queue("4821", &user, Utc::now() + Duration::hours(1))?;
//! }
//!
//! store.sweep(Utc::now())?;
//! assert_eq!(store.record(&user).unwrap().queues.len(), 1);
//! # Ok::<(), membership::MembershipError>(())
//! ```
//!
//! Running the sweep in the background:
//!
//! ```ignore
//! let config = TrackerConfig::from_env()?;
//! let store = Arc::new(MembershipStore::new(config.limits));
//! let shutdown = CancellationToken::new();
//! let handle = Sweeper::from_config(store.clone(), &config).spawn(shutdown.clone());
//!
//! // ... on shutdown
//! shutdown.cancel();
//! handle.await?;
//! ```

mod config;
mod error;
mod limits;
mod store;
mod sweeper;
mod types;


// Re-export store
pub use store::MembershipStore;

// Re-export limit policy
pub use limits::{Limits, DEFAULT_MAX_EVENT, DEFAULT_MAX_QUEUE, DEFAULT_MAX_TRADE};

// Re-export sweeper and configuration
pub use config::{TrackerConfig, DEFAULT_SWEEP_INTERVAL_SECS};
pub use sweeper::Sweeper;

// Re-export error types
pub use error::{MembershipError, Result};

// Re-export data model
pub use types::{
    Category, EventMembership, QueueMembership, TradeParticipation, UserId, UserRecord,
};

// Re-export commonly used external types
pub use tokio_util::sync::CancellationToken;
