//! Calculator API trait and types
//!
//! Contract trait and error type for the calculator service.

use async_trait::async_trait;
use calcstream_transport_grpc::deadline::is_timeout_status;
use futures::stream::BoxStream;
use tokio::sync::mpsc;

use crate::operation::Operation;

/// Replies of a bidirectional call, in the order the server emitted them.
pub type ReplyStream = BoxStream<'static, Result<f64, CalculatorError>>;

/// Calculator API trait
///
/// One method per interaction shape. Every call runs under its own deadline;
/// a call that fails is never retried.
///
/// # Errors
/// Every method returns [`CalculatorError::DeadlineExceeded`] when its deadline
/// elapses and [`CalculatorError::Transport`] when the call fails on the wire.
#[async_trait]
pub trait CalculatorClient: Send + Sync {
    /// Unary call: `a <op> b`.
    ///
    /// # Errors
    /// Fails on deadline expiry or a transport error.
    async fn calculate(&self, op: Operation, a: f64, b: f64) -> Result<f64, CalculatorError>;

    /// Client-streaming call: stream `values`, receive their left fold.
    ///
    /// An empty `values` yields `0.0`.
    ///
    /// # Errors
    /// Fails if the deadline elapses before the server replies.
    async fn reduce(&self, op: Operation, values: Vec<f64>) -> Result<f64, CalculatorError>;

    /// Server-streaming call: sum, difference, product and quotient of `(a, b)`.
    ///
    /// # Errors
    /// Fails if the stream does not complete within the deadline.
    async fn all_calcs(&self, a: f64, b: f64) -> Result<Vec<f64>, CalculatorError>;

    /// Bidirectional call.
    ///
    /// Every value sent on the channel behind `values` produces four replies
    /// folded over all values sent so far. Dropping the sender closes the send
    /// direction; the returned stream ends once the server has answered all of them.
    ///
    /// # Errors
    /// Fails if the call cannot be opened within the deadline. Later failures,
    /// including expiry while replies are pending, arrive as stream items.
    async fn all_calcs_each(
        &self,
        values: mpsc::Receiver<f64>,
    ) -> Result<ReplyStream, CalculatorError>;
}

/// Error type for Calculator operations
#[derive(thiserror::Error, Debug, Clone)]
pub enum CalculatorError {
    #[error("failed to connect to calculator service: {0}")]
    Connect(String),

    #[error("deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("gRPC transport error ({code}): {message}")]
    Transport { code: tonic::Code, message: String },
}

impl CalculatorError {
    #[must_use]
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded(_))
    }
}

impl From<tonic::Status> for CalculatorError {
    fn from(status: tonic::Status) -> Self {
        if is_timeout_status(&status) {
            return Self::DeadlineExceeded(status.message().to_owned());
        }
        Self::Transport {
            code: status.code(),
            message: status.message().to_owned(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_status_is_distinguishable() {
        let err = CalculatorError::from(tonic::Status::deadline_exceeded("too slow"));
        assert!(err.is_deadline_exceeded());
        assert_eq!(err.to_string(), "deadline exceeded: too slow");
    }

    #[test]
    fn test_tonic_timeout_cancellation_is_a_deadline() {
        let err = CalculatorError::from(tonic::Status::cancelled("Timeout expired"));
        assert!(err.is_deadline_exceeded());
    }

    #[test]
    fn test_plain_cancellation_is_a_transport_error() {
        let err = CalculatorError::from(tonic::Status::cancelled("client went away"));
        assert!(!err.is_deadline_exceeded());
    }

    #[test]
    fn test_other_statuses_are_transport_errors() {
        let err = CalculatorError::from(tonic::Status::unavailable("connection reset"));
        assert!(!err.is_deadline_exceeded());
        match err {
            CalculatorError::Transport { code, message } => {
                assert_eq!(code, tonic::Code::Unavailable);
                assert_eq!(message, "connection reset");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }
}
