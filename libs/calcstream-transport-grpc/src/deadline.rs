//! Scoped per-call deadlines for gRPC calls.
//!
//! Every RPC issued by a client runs under a [`CallDeadline`] created when the call
//! starts. The same deadline covers the whole exchange:
//!
//! - [`CallDeadline::apply`] propagates the remaining budget to the server as `grpc-timeout`
//! - [`CallDeadline::run`] bounds a future (unary call, or opening/draining a stream)
//! - [`CallDeadline::bound`] bounds a response stream that is drained elsewhere
//!
//! Expiry always surfaces as [`tonic::Code::DeadlineExceeded`], never as a partial
//! result or a silently truncated stream.
//!
//! ## Example
//!
//! ```ignore
//! use calcstream_transport_grpc::CallDeadline;
//!
//! let deadline = CallDeadline::start("calculator.all_calcs", cfg.rpc_timeout);
//! let mut request = tonic::Request::new(req);
//! deadline.apply(&mut request);
//! let values = deadline
//!     .run(async move {
//!         let mut stream = client.all_calcs(request).await?.into_inner();
//!         let mut out = Vec::new();
//!         while let Some(reply) = stream.message().await? {
//!             out.push(reply.result);
//!         }
//!         Ok(out)
//!     })
//!     .await?;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::time::{Instant, Sleep};
use tonic::{Code, Request, Status};
use tracing::Instrument;

fn duration_to_u64_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// A fixed deadline for one RPC, started when the call begins.
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct CallDeadline {
    op: &'static str,
    timeout: Duration,
    expires_at: Instant,
}

impl CallDeadline {
    /// Start a deadline of `timeout` for the operation `op`.
    pub fn start(op: &'static str, timeout: Duration) -> Self {
        Self {
            op,
            timeout,
            expires_at: Instant::now() + timeout,
        }
    }

    /// Time left before the deadline, zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Propagate the remaining budget to the server via the `grpc-timeout` header.
    pub fn apply<T>(&self, request: &mut Request<T>) {
        request.set_timeout(self.remaining());
    }

    /// Rewrite timeout-flavoured statuses as `DeadlineExceeded`.
    ///
    /// A server enforcing `grpc-timeout` reports expiry as `Cancelled`; once this
    /// deadline has passed, such a status is the same event seen from the other side.
    fn normalize(&self, status: Status) -> Status {
        if is_timeout_status(&status)
            || (status.code() == Code::Cancelled && self.is_expired())
        {
            return self.exceeded();
        }
        status
    }

    fn exceeded(&self) -> Status {
        Status::deadline_exceeded(format!(
            "{} exceeded its {} ms deadline",
            self.op,
            duration_to_u64_ms(self.timeout)
        ))
    }

    /// Run `fut` to completion or until the deadline elapses.
    ///
    /// # Errors
    /// Returns the future's own `Status`, or `DeadlineExceeded` on expiry
    /// (including a transport timeout reported as `Cancelled`).
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Status>
    where
        F: Future<Output = Result<T, Status>>,
    {
        let span = tracing::debug_span!(
            "grpc_call",
            op = self.op,
            timeout_ms = duration_to_u64_ms(self.timeout)
        );

        let outcome = tokio::time::timeout_at(self.expires_at, fut)
            .instrument(span)
            .await;

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(status)) => {
                let status = self.normalize(status);
                tracing::warn!(
                    op = self.op,
                    code = %status.code(),
                    message = %status.message(),
                    "gRPC call failed"
                );
                Err(status)
            }
            Err(_elapsed) => {
                tracing::warn!(
                    op = self.op,
                    timeout_ms = duration_to_u64_ms(self.timeout),
                    "gRPC call deadline exceeded"
                );
                Err(self.exceeded())
            }
        }
    }

    /// Bound a response stream by this deadline.
    ///
    /// Items pass through unchanged. If the deadline elapses before the inner
    /// stream ends, a single `DeadlineExceeded` error is yielded and the stream ends.
    #[must_use]
    pub fn bound<S, T>(&self, inner: S) -> BoxStream<'static, Result<T, Status>>
    where
        S: Stream<Item = Result<T, Status>> + Send + 'static,
        T: Send + 'static,
    {
        let state = Bounded {
            deadline: *self,
            inner: inner.boxed(),
            sleep: Box::pin(tokio::time::sleep_until(self.expires_at)),
            finished: false,
        };

        stream::unfold(state, |mut state| async move {
            if state.finished {
                return None;
            }

            let step = tokio::select! {
                biased;
                item = state.inner.next() => Step::Item(item),
                () = &mut state.sleep => Step::Expired,
            };

            match step {
                Step::Item(Some(Err(status))) => {
                    let status = state.deadline.normalize(status);
                    state.finished = status.code() == Code::DeadlineExceeded;
                    Some((Err(status), state))
                }
                Step::Item(Some(item)) => Some((item, state)),
                Step::Item(None) => None,
                Step::Expired => {
                    tracing::warn!(
                        op = state.deadline.op,
                        timeout_ms = duration_to_u64_ms(state.deadline.timeout),
                        "gRPC stream deadline exceeded"
                    );
                    state.finished = true;
                    let status = state.deadline.exceeded();
                    Some((Err(status), state))
                }
            }
        })
        .boxed()
    }
}

struct Bounded<T> {
    deadline: CallDeadline,
    inner: BoxStream<'static, Result<T, Status>>,
    sleep: Pin<Box<Sleep>>,
    finished: bool,
}

enum Step<T> {
    Item(Option<T>),
    Expired,
}

/// Message tonic attaches to `Cancelled` when its own request timeout fires,
/// on either side of the connection.
const TONIC_TIMEOUT_MESSAGE: &str = "Timeout expired";

/// Whether `status` is a transport-level timeout rather than a real cancellation.
#[must_use]
pub fn is_timeout_status(status: &Status) -> bool {
    status.code() == Code::DeadlineExceeded
        || (status.code() == Code::Cancelled && status.message() == TONIC_TIMEOUT_MESSAGE)
}
