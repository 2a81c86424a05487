//! Session registry
//!
//! Issued tokens are tracked by their jti so logout can revoke a session
//! before its JWT expiry. Entries for expired tokens are purged lazily.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use ts_core::traits::Id;

/// A live session entry
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub user_id: Id,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-memory registry of live sessions keyed by token jti
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionEntry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly issued token
    pub fn insert(&self, jti: impl Into<String>, user_id: Id, lifetime_seconds: i64) {
        let now = Utc::now();
        self.sessions.insert(
            jti.into(),
            SessionEntry {
                user_id,
                issued_at: now,
                expires_at: now + Duration::seconds(lifetime_seconds),
            },
        );
    }

    /// Whether the session behind a token is still live
    pub fn is_live(&self, jti: &str) -> bool {
        // The read guard must drop before the expired entry is removed
        let expired = match self.sessions.get(jti) {
            Some(entry) => entry.is_expired(Utc::now()),
            None => return false,
        };
        if expired {
            self.sessions.remove(jti);
            return false;
        }
        true
    }

    /// Revoke a session (logout)
    pub fn revoke(&self, jti: &str) -> bool {
        self.sessions.remove(jti).is_some()
    }

    /// Drop every expired entry
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| !entry.is_expired(now));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_revoke() {
        let registry = SessionRegistry::new();
        registry.insert("jti-1", 42, 3600);

        assert!(registry.is_live("jti-1"));
        assert!(!registry.is_live("jti-2"));

        assert!(registry.revoke("jti-1"));
        assert!(!registry.is_live("jti-1"));
        assert!(!registry.revoke("jti-1"));
    }

    #[test]
    fn test_expired_sessions_purged() {
        let registry = SessionRegistry::new();
        registry.insert("old", 1, -10);
        registry.insert("fresh", 2, 3600);

        assert!(!registry.is_live("old"));
        assert_eq!(registry.purge_expired(), 0); // is_live already dropped it
        assert!(registry.is_live("fresh"));
        assert_eq!(registry.len(), 1);
    }
}
