//! Cache configuration types.

use std::time::Duration;

/// How long and how many lookups the cache keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Edge-side lifetime of a stored lookup
    pub ttl: Duration,

    /// Upper bound on stored entries (in-process store only)
    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl CachePolicy {
    /// Longest lifetime a stored lookup may have
    pub const MAX_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Five minutes, ten thousand entries
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries: 10_000,
        }
    }

    /// Set the entry lifetime
    #[must_use]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the entry bound
    #[must_use]
    pub const fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}
