use chrono::{DateTime, Duration, Utc};

/// Lifetime of a post, in hours, unless overridden via configuration.
pub const DEFAULT_TTL_HOURS: i64 = 3;

/// Pure visibility rules for time-bounded content.
///
/// Expiry is never persisted: it is always derived from
/// `(created_at, now, ttl)`. Callers fix `now` once per query and reuse it for
/// both filtering and remaining-time computation, so a single response cannot
/// disagree with itself about a post's visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    ttl: Duration,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_TTL_HOURS))
    }
}

impl ExpiryPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A post exactly at the TTL boundary is already expired (strict `<`).
    pub fn is_visible(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - created_at < self.ttl
    }

    /// The instant separating visible from expired content for a given `now`.
    /// Posts with `created_at > cutoff` are visible; everything else is not.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.ttl
    }

    /// Seconds of lifetime left, clamped to zero. Callers must never see a
    /// negative value, whatever the store returned.
    pub fn remaining_seconds(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let left = self.ttl - (now - created_at);
        (left.num_milliseconds() as f64 / 1000.0).max(0.0)
    }
}
