//! Calculator SDK
//!
//! This crate provides everything needed to consume the calculator service:
//! - Operation tags and their arithmetic (`Operation`)
//! - API trait (`CalculatorClient`) covering unary, client-streaming,
//!   server-streaming and bidirectional calls
//! - Error types (`CalculatorError`)
//! - gRPC client (`CalculatorGrpcClient`)
//! - Proto stubs for server implementation
//!
//! ## Usage
//!
//! ```ignore
//! use calculator_sdk::{CalculatorClient, CalculatorGrpcClient, Operation};
//! use calcstream_transport_grpc::client::GrpcClientConfig;
//!
//! let cfg = GrpcClientConfig::new("calculator");
//! let client = CalculatorGrpcClient::connect("http://localhost:50051", &cfg).await?;
//! let sum = client.calculate(Operation::Sum, 3.0, 4.0).await?;
//! let product = client.reduce(Operation::Multiplication, vec![1.0, 2.0, 3.0]).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === API TRAIT AND TYPES ===
mod api;
mod operation;
pub use api::{CalculatorClient, CalculatorError, ReplyStream};
pub use operation::{Operation, UnknownOperation};

// === GRPC CLIENT ===
mod client;
pub use client::CalculatorGrpcClient;

// === GRPC PROTO STUBS (for server implementation) ===
/// Generated protobuf types for `CalculatorService`
pub mod proto {
    tonic::include_proto!("calculator.v1");
}

// Re-export proto types needed by server
pub use proto::calculator_service_server::{CalculatorService, CalculatorServiceServer};
pub use proto::{BinaryRequest, Reply, StreamValue};

/// Fully qualified gRPC service name
pub const SERVICE_NAME: &str = "calculator.v1.CalculatorService";
