use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default interval between dropped-message warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// Helper that rate limits dropped-message warnings.
///
/// The caller increments the drop counter via [`record_drop`]. The next call to
/// [`warn_if_due`] emits a warning using the provided callback if the configured
/// interval has elapsed. [`flush`] emits a warning immediately if any messages
/// have been dropped since the last emission.
///
/// [`record_drop`]: RateLimitedWarner::record_drop
/// [`warn_if_due`]: RateLimitedWarner::warn_if_due
/// [`flush`]: RateLimitedWarner::flush
#[derive(Debug)]
pub struct RateLimitedWarner {
    interval_ms: u64,
    last_warn: AtomicU64,
    dropped: AtomicU64,
}

impl Default for RateLimitedWarner {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_INTERVAL)
    }
}

impl RateLimitedWarner {
    /// Create a new [`RateLimitedWarner`]. The first warning can be emitted
    /// immediately.
    pub fn new(interval: Duration) -> Self {
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        Self {
            interval_ms,
            last_warn: AtomicU64::new(now_millis().saturating_sub(interval_ms)),
            dropped: AtomicU64::new(0),
        }
    }

    /// Increment the dropped-message counter.
    pub fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of drops not yet reported.
    pub fn pending(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Emit a warning if the rate limit interval has elapsed.
    pub fn warn_if_due(&self, mut warn: impl FnMut(u64)) {
        let now = now_millis();
        let prev = self.last_warn.load(Ordering::Relaxed);
        if now.saturating_sub(prev) >= self.interval_ms {
            let count = self.dropped.swap(0, Ordering::Relaxed);
            if count > 0 {
                warn(count);
            }
            self.last_warn.store(now, Ordering::Relaxed);
        }
    }

    /// Immediately warn about any dropped messages.
    pub fn flush(&self, mut warn: impl FnMut(u64)) {
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            self.last_warn.store(now_millis(), Ordering::Relaxed);
        }
    }
}
