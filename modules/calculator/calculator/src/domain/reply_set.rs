//! The four results of a fan-out call.

use calculator_sdk::Operation;

/// Sum, difference, product and quotient, always emitted in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplySet {
    pub sum: f64,
    pub difference: f64,
    pub product: f64,
    pub quotient: f64,
}

impl ReplySet {
    #[must_use]
    pub fn from_pair(a: f64, b: f64) -> Self {
        Self {
            sum: Operation::Sum.apply(a, b),
            difference: Operation::Subtraction.apply(a, b),
            product: Operation::Multiplication.apply(a, b),
            quotient: Operation::Division.apply(a, b),
        }
    }

    /// Fold every operation over all of `values`, recomputed from scratch.
    ///
    /// Returns `None` when `values` is empty.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            sum: Operation::Sum.reduce(values)?,
            difference: Operation::Subtraction.reduce(values)?,
            product: Operation::Multiplication.reduce(values)?,
            quotient: Operation::Division.reduce(values)?,
        })
    }

    #[must_use]
    pub fn get(&self, op: Operation) -> f64 {
        match op {
            Operation::Sum => self.sum,
            Operation::Subtraction => self.difference,
            Operation::Multiplication => self.product,
            Operation::Division => self.quotient,
        }
    }

    /// Results in reply order.
    #[must_use]
    pub fn results(&self) -> [f64; 4] {
        Operation::ALL.map(|op| self.get(op))
    }
}
