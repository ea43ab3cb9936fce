//! Operation tags and their arithmetic.
//!
//! Arithmetic follows IEEE-754 without checks: dividing by zero yields an
//! infinity or NaN, never an error.

use std::fmt;
use std::str::FromStr;

/// One of the four binary operations the calculator performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Sum,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    /// All operations in reply order: sum, difference, product, quotient.
    pub const ALL: [Self; 4] = [
        Self::Sum,
        Self::Subtraction,
        Self::Multiplication,
        Self::Division,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sum => "Sum",
            Self::Subtraction => "Subtraction",
            Self::Multiplication => "Multiplication",
            Self::Division => "Division",
        }
    }

    /// Combine two operands.
    #[must_use]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Sum => a + b,
            Self::Subtraction => a - b,
            Self::Multiplication => a * b,
            Self::Division => a / b,
        }
    }

    /// Fold `values` left to right, seeded by the first element.
    ///
    /// Returns `None` for an empty slice; there is no identity element.
    #[must_use]
    pub fn reduce(self, values: &[f64]) -> Option<f64> {
        let (first, rest) = values.split_first()?;
        Some(rest.iter().fold(*first, |acc, &value| self.apply(acc, value)))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an unknown operation name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperation(s.to_owned()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        assert_eq!(Operation::Sum.apply(3.0, 4.0), 7.0);
        assert_eq!(Operation::Subtraction.apply(3.0, 4.0), -1.0);
        assert_eq!(Operation::Multiplication.apply(3.0, 4.0), 12.0);
        assert_eq!(Operation::Division.apply(3.0, 4.0), 0.75);
    }

    #[test]
    fn test_division_by_zero_follows_ieee() {
        assert_eq!(Operation::Division.apply(1.0, 0.0), f64::INFINITY);
        assert_eq!(Operation::Division.apply(-1.0, 0.0), f64::NEG_INFINITY);
        assert!(Operation::Division.apply(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_reduce_empty_is_none() {
        for op in Operation::ALL {
            assert_eq!(op.reduce(&[]), None);
        }
    }

    #[test]
    fn test_reduce_single_value_is_unchanged() {
        for op in Operation::ALL {
            assert_eq!(op.reduce(&[-2.5]), Some(-2.5));
        }
    }

    #[test]
    fn test_reduce_is_left_to_right() {
        let values = [2.0, 4.0, 8.0];
        assert_eq!(Operation::Sum.reduce(&values), Some(14.0));
        assert_eq!(Operation::Subtraction.reduce(&values), Some(-10.0));
        assert_eq!(Operation::Multiplication.reduce(&values), Some(64.0));
        assert_eq!(Operation::Division.reduce(&values), Some(0.0625));
    }

    #[test]
    fn test_reduce_division_by_zero_element() {
        assert_eq!(
            Operation::Division.reduce(&[1.0, 0.0, 5.0]),
            Some(f64::INFINITY)
        );
    }

    #[test]
    fn test_all_is_in_reply_order() {
        let names: Vec<&str> = Operation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(names, ["Sum", "Subtraction", "Multiplication", "Division"]);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("sum".parse::<Operation>(), Ok(Operation::Sum));
        assert_eq!("DIVISION".parse::<Operation>(), Ok(Operation::Division));
        assert_eq!(
            "modulo".parse::<Operation>(),
            Err(UnknownOperation("modulo".to_owned()))
        );
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(Operation::Multiplication.to_string(), "Multiplication");
    }
}
