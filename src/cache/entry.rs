//! Cache Entry Module
//!
//! Defines the structure for stored responses with absolute expiry.

use bytes::Bytes;
use chrono::Utc;

// == Cache Entry ==
/// A stored response together with its expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Expiration timestamp (Unix seconds)
    pub expires_at: i64,
    /// Encoded response (status line, headers, body)
    pub payload: Bytes,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl_seconds` from now.
    pub fn new(payload: Bytes, ttl_seconds: u64) -> Self {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        Self {
            expires_at: current_timestamp().saturating_add(ttl),
            payload,
        }
    }

    // == Is Fresh ==
    /// Checks if the entry is still fresh.
    ///
    /// Boundary condition: an entry whose expiry equals the current second is
    /// already stale.
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(current_timestamp())
    }

    /// Freshness against an explicit clock reading.
    pub fn is_fresh_at(&self, now: i64) -> bool {
        self.expires_at > now
    }

    // == Time To Live ==
    /// Returns remaining seconds before the entry goes stale, 0 once stale.
    pub fn ttl_remaining(&self) -> u64 {
        let remaining = self.expires_at - current_timestamp();
        u64::try_from(remaining).unwrap_or(0)
    }

    /// True if `other` is this very entry (same write, same payload buffer).
    pub(crate) fn same_as(&self, other: &CacheEntry) -> bool {
        self.expires_at == other.expires_at
            && self.payload.as_ptr() == other.payload.as_ptr()
            && self.payload.len() == other.payload.len()
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry_expiring_at(expires_at: i64) -> CacheEntry {
        CacheEntry {
            expires_at,
            payload: Bytes::new(),
        }
    }

    #[test]
    fn test_fresh_entry() {
        let entry = entry_expiring_at(current_timestamp() + 10);
        assert!(entry.is_fresh());
    }

    #[test]
    fn test_expired_entry() {
        let entry = entry_expiring_at(current_timestamp() - 10);
        assert!(!entry.is_fresh());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp();
        let entry = entry_expiring_at(now);

        assert!(!entry.is_fresh_at(now), "Entry should be stale at boundary");
        assert!(entry.is_fresh_at(now - 1));
    }

    #[test]
    fn test_new_applies_ttl() {
        let before = current_timestamp();
        let entry = CacheEntry::new(Bytes::from_static(b"x"), 60);

        assert!(entry.expires_at >= before + 60);
        assert!(entry.expires_at <= current_timestamp() + 60);
        assert!(entry.ttl_remaining() <= 60);
        assert!(entry.ttl_remaining() >= 59);
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = entry_expiring_at(current_timestamp() - 100);
        assert_eq!(entry.ttl_remaining(), 0);
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new(Bytes::new(), u64::MAX);
        assert_eq!(entry.expires_at, i64::MAX);
        assert!(entry.is_fresh());
    }

    #[test]
    fn test_same_as() {
        let entry = CacheEntry::new(Bytes::from(vec![1, 2, 3]), 60);
        let clone = entry.clone();
        let rewritten = CacheEntry {
            expires_at: entry.expires_at,
            payload: Bytes::from(vec![1, 2, 3]),
        };

        assert!(entry.same_as(&clone));
        assert!(!entry.same_as(&rewritten));
    }
}
