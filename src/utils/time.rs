//! Time and ID helpers
//!
//! All persisted timestamps are Unix millis (i64).

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds in one day
pub const DAY_MS: i64 = 86_400_000;

/// Whole days elapsed since `since` (floor). Negative deltas clamp to 0.
pub fn days_since(since: i64, now: i64) -> i64 {
    if now <= since {
        return 0;
    }
    (now - since) / DAY_MS
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_since() {
        assert_eq!(days_since(0, 0), 0);
        assert_eq!(days_since(0, DAY_MS - 1), 0);
        assert_eq!(days_since(0, DAY_MS), 1);
        assert_eq!(days_since(0, 10 * DAY_MS + 5000), 10);
        // due date in the future
        assert_eq!(days_since(DAY_MS, 0), 0);
    }

    #[test]
    fn test_snowflake_monotonic_scale() {
        let a = snowflake_id();
        let b = snowflake_id();
        assert!(a > 0 && b > 0);
    }
}
