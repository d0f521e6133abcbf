//! Typed errors for the membership store.
//!
//! Every error is returned synchronously to the caller. The store never logs,
//! retries, or swallows these; that is the command layer's job.

use thiserror::Error;

use crate::types::{Category, UserId};

/// Errors that can occur while mutating the membership store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    /// A category mutator was called for a user with no record.
    ///
    /// Call [`register`](crate::MembershipStore::register) first.
    #[error("user not registered: {user}")]
    NotRegistered { user: UserId },

    /// The user already holds the maximum number of memberships in this category.
    #[error("{category} limit reached ({limit})")]
    LimitReached { category: Category, limit: usize },

    /// A writer panicked while holding the table lock.
    #[error("membership table lock poisoned")]
    Poisoned,
}

impl MembershipError {
    /// Returns true if the caller can recover by registering the user.
    pub fn is_not_registered(&self) -> bool {
        matches!(self, MembershipError::NotRegistered { .. })
    }

    /// Returns true if the admission was refused because of a capacity limit.
    pub fn is_limit_reached(&self) -> bool {
        matches!(self, MembershipError::LimitReached { .. })
    }
}

/// Result type for membership store operations.
pub type Result<T> = std::result::Result<T, MembershipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_registered_display() {
        let err = MembershipError::NotRegistered {
            user: UserId::from("1234"),
        };
        assert!(err.to_string().contains("not registered"));
        assert!(err.to_string().contains("1234"));
        assert!(err.is_not_registered());
        assert!(!err.is_limit_reached());
    }

    #[test]
    fn test_limit_reached_display() {
        let err = MembershipError::LimitReached {
            category: Category::Queue,
            limit: 3,
        };
        assert_eq!(err.to_string(), "queue limit reached (3)");
        assert!(err.is_limit_reached());
    }

    #[test]
    fn test_error_is_pattern_matchable() {
        let err = MembershipError::LimitReached {
            category: Category::Trade,
            limit: 2,
        };

        match err {
            MembershipError::LimitReached { category, limit } => {
                assert_eq!(category, Category::Trade);
                assert_eq!(limit, 2);
            }
            _ => panic!("Expected LimitReached"),
        }
    }
}
