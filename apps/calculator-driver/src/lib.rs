//! Calculator driver
//!
//! Runs the calculator service through all four call shapes in a fixed order:
//! unary calls, client-streaming reductions, the server-streaming fan-out and
//! the bidirectional per-input fan-out. The first failure aborts the run.

pub mod config;
pub mod driver;
pub mod inputs;

pub use config::DriverConfig;
pub use driver::{Driver, DriverError, DriverReport, format_results};
pub use inputs::{DEFAULT_OPERANDS, DriverInputs};
