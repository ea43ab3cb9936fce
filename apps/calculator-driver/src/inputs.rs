//! Operands for a driver run.

use calculator_sdk::Operation;

/// `(a, b)` used when fewer than two numbers are given.
pub const DEFAULT_OPERANDS: (f64, f64) = (3.0, 4.0);

/// Operands for a driver run.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverInputs {
    /// Left operand of unary calls and `AllCalcs`.
    pub a: f64,
    /// Right operand of unary calls and `AllCalcs`.
    pub b: f64,
    /// Values streamed by the client-streaming and bidirectional calls.
    pub values: Vec<f64>,
    /// Operations exercised by the unary and client-streaming calls, in order.
    pub operations: Vec<Operation>,
}

impl DriverInputs {
    /// Build inputs from positional numbers.
    ///
    /// With two or more numbers, `a` and `b` are the first two; otherwise they
    /// come from `defaults`. With at least one number, all of them are
    /// streamed; otherwise `[a, b]` is.
    #[must_use]
    pub fn from_args(args: Vec<f64>, defaults: (f64, f64)) -> Self {
        let (a, b) = match args.as_slice() {
            [a, b, ..] => (*a, *b),
            _ => defaults,
        };
        let values = if args.is_empty() { vec![a, b] } else { args };
        Self {
            a,
            b,
            values,
            operations: Operation::ALL.to_vec(),
        }
    }

    /// Restrict the unary and client-streaming calls to `operations`.
    #[must_use]
    pub fn with_operations(mut self, operations: Vec<Operation>) -> Self {
        self.operations = operations;
        self
    }
}

impl Default for DriverInputs {
    fn default() -> Self {
        Self::from_args(Vec::new(), DEFAULT_OPERANDS)
    }
}
