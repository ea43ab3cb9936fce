//! Domain service for calculator
//!
//! Contains the core arithmetic for every interaction shape. Per-call state
//! (aggregates, accumulated inputs) is owned by the caller; the service itself
//! only keeps the diagnostic [`LastReplies`] holder.

use calculator_sdk::Operation;
use tracing::{debug, info};

use super::{LastReplies, ReplySet, RunningAggregate};

/// Domain service shared by all gRPC sessions.
#[derive(Debug, Default)]
pub struct Service {
    last: LastReplies,
}

impl Service {
    /// Create a new service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `op` to one pair of operands.
    #[must_use]
    pub fn calculate(&self, op: Operation, a: f64, b: f64) -> f64 {
        info!("{op} received: ({a:.2}, {b:.2})");
        op.apply(a, b)
    }

    /// Start a client-streaming reduction for `op`.
    #[must_use]
    pub fn begin_reduction(&self, op: Operation) -> RunningAggregate {
        info!("{op}Stream received ...");
        RunningAggregate::new(op)
    }

    /// Compute all four results for `(a, b)` and record them.
    #[must_use]
    pub fn all_calcs(&self, a: f64, b: f64) -> ReplySet {
        info!("AllCalcs received: ({a:.2}, {b:.2})");
        let replies = ReplySet::from_pair(a, b);
        self.last.record(replies);
        replies
    }

    /// Recompute all four results over the values received so far in one
    /// bidirectional session and record them.
    ///
    /// Returns `None` for an empty prefix.
    #[must_use]
    pub fn all_calcs_prefix(&self, values: &[f64]) -> Option<ReplySet> {
        let replies = ReplySet::from_values(values)?;
        debug!(count = values.len(), ?replies, "AllCalcsEach recomputed");
        self.last.record(replies);
        Some(replies)
    }

    /// Last recorded fan-out result, for diagnostics.
    #[must_use]
    pub fn last_replies(&self) -> Option<ReplySet> {
        self.last.snapshot()
    }
}
