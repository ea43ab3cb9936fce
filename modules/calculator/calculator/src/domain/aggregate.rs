//! Per-stream accumulator for client-streaming reductions.

use calculator_sdk::Operation;

/// Scalar accumulator owned by a single client-streaming call.
///
/// Seeded by the first pushed value, then combined left to right.
#[derive(Debug, Clone, Copy)]
pub struct RunningAggregate {
    op: Operation,
    acc: Option<f64>,
    count: usize,
}

impl RunningAggregate {
    #[must_use]
    pub fn new(op: Operation) -> Self {
        Self {
            op,
            acc: None,
            count: 0,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.acc = Some(match self.acc {
            None => value,
            Some(acc) => self.op.apply(acc, value),
        });
        self.count += 1;
    }

    /// Number of values pushed so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Final result. A stream that closed without any value yields `0.0`
    /// for every operation.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.acc.unwrap_or(0.0)
    }
}
