//! Freshness rule for the cached feed.
//!
//! A snapshot is usable for seven calendar days after it was stored.
//! Calendar days, not a fixed 168-hour duration: day length is
//! calendar-sensitive, so the expiry is computed with date arithmetic.

use chrono::Days;
use feedstash_core::Timestamp;

/// The seven-calendar-day cache policy.
///
/// Stateless; a pure function of the stored timestamp and a reference
/// instant supplied by the caller. The policy never touches a store and
/// never decides what to do about staleness - that belongs to the
/// use-case layer.
pub struct FeedCachePolicy;

impl FeedCachePolicy {
    /// Maximum age of a usable snapshot, in calendar days.
    pub const MAX_CACHE_AGE_DAYS: u64 = 7;

    /// Returns true iff a snapshot stored at `timestamp` is still fresh
    /// when observed at `date`. The boundary is exclusive: a snapshot
    /// exactly `MAX_CACHE_AGE_DAYS` old is stale.
    pub fn validate(timestamp: Timestamp, date: Timestamp) -> bool {
        match timestamp.checked_add_days(Days::new(Self::MAX_CACHE_AGE_DAYS)) {
            Some(expiry) => date < expiry,
            None => false,
        }
    }
}
