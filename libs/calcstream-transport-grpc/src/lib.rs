#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
//! gRPC transport helpers shared by the calculator server, SDK and driver.
//!
//! - [`client`]: endpoint configuration and connection establishment
//! - [`deadline`]: scoped per-call deadlines for unary and streaming RPCs
//! - [`server`]: hosting a set of tonic routes on a TCP listener

pub mod client;
pub mod deadline;
pub mod server;

pub use deadline::CallDeadline;
pub use server::{ListenConfig, ReadySignal};
