//! Linear backoff between retry attempts.

use std::time::Duration;

/// Delay to wait after failed attempt number `attempt` (1-based).
///
/// `attempt × base_ms`, so the waits grow 1×, 2×, 3× ... the base step.
pub fn calculate_backoff(attempt: u32, base_ms: u64) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(u64::from(attempt)))
}
