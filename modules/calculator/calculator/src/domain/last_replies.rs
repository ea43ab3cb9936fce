//! Process-wide holder of the most recent fan-out reply set.
//!
//! Written by every `AllCalcs` call and every `AllCalcsEach` input, from any number
//! of concurrent sessions. Nothing reads it to compute a reply; it exists for
//! diagnostics only. Sessions keep their own inputs and never share them
//! through this holder.

use parking_lot::Mutex;

use super::ReplySet;

#[derive(Debug, Default)]
pub struct LastReplies {
    inner: Mutex<Option<ReplySet>>,
}

impl LastReplies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored set.
    pub fn record(&self, replies: ReplySet) {
        *self.inner.lock() = Some(replies);
    }

    /// Copy of the last recorded set, `None` until the first fan-out event.
    #[must_use]
    pub fn snapshot(&self) -> Option<ReplySet> {
        *self.inner.lock()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_empty_at_start() {
        assert!(LastReplies::new().snapshot().is_none());
    }

    #[test]
    fn test_record_overwrites() {
        let last = LastReplies::new();
        last.record(ReplySet::from_pair(1.0, 1.0));
        last.record(ReplySet::from_pair(3.0, 4.0));
        assert_eq!(last.snapshot(), Some(ReplySet::from_pair(3.0, 4.0)));
    }

    #[test]
    fn test_concurrent_writers() {
        let last = Arc::new(LastReplies::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let last = Arc::clone(&last);
                std::thread::spawn(move || {
                    for j in 0..100 {
                        last.record(ReplySet::from_pair(f64::from(i), f64::from(j)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = last.snapshot().unwrap();
        // Whatever writer won, the set is internally consistent.
        assert_eq!(snapshot.sum - snapshot.difference, 2.0 * 99.0);
    }
}
