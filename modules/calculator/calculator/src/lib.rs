//! Calculator Module
//!
//! gRPC service performing sum, subtraction, multiplication and division over
//! four interaction shapes: unary, client-streaming, server-streaming and
//! bidirectional streaming.
//!
//! ## Architecture
//!
//! - `domain/` - Arithmetic, per-call aggregation and the last-replies holder
//! - `api/grpc/server.rs` - gRPC server implementation
//! - `module.rs` - Wiring and hosting
//! - `config.rs` - Layered server configuration
//!
//! External consumers should use the `calculator-sdk` crate, which provides
//! the gRPC client and the `CalculatorClient` trait.

// === MODULE DEFINITION ===
mod module;
pub use module::CalculatorModule;

pub mod config;
pub use config::CalculatorServerConfig;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
