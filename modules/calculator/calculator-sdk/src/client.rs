//! gRPC client implementation of `CalculatorClient`

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Request;
use tonic::transport::Channel;

use calcstream_transport_grpc::CallDeadline;
use calcstream_transport_grpc::client::{GrpcClientConfig, connect_with_retry};

use crate::api::{CalculatorClient, CalculatorError, ReplyStream};
use crate::operation::Operation;
use crate::proto::calculator_service_client::CalculatorServiceClient;
use crate::proto::{BinaryRequest, StreamValue};

fn unary_op_name(op: Operation) -> &'static str {
    match op {
        Operation::Sum => "calculator.sum",
        Operation::Subtraction => "calculator.subtraction",
        Operation::Multiplication => "calculator.multiplication",
        Operation::Division => "calculator.division",
    }
}

fn stream_op_name(op: Operation) -> &'static str {
    match op {
        Operation::Sum => "calculator.sum_stream",
        Operation::Subtraction => "calculator.subtraction_stream",
        Operation::Multiplication => "calculator.multiplication_stream",
        Operation::Division => "calculator.division_stream",
    }
}

/// gRPC client implementation of `CalculatorClient`.
///
/// Cheap to clone; clones share the underlying HTTP/2 connection.
#[derive(Clone)]
pub struct CalculatorGrpcClient {
    inner: CalculatorServiceClient<Channel>,
    call_timeout: Duration,
}

impl CalculatorGrpcClient {
    /// Connect to the `CalculatorService`, retrying connection establishment.
    ///
    /// `cfg.rpc_timeout` becomes the deadline of every call made through this client.
    ///
    /// # Errors
    /// Returns [`CalculatorError::Connect`] once all connection attempts failed.
    pub async fn connect(
        uri: impl Into<String>,
        cfg: &GrpcClientConfig,
    ) -> Result<Self, CalculatorError> {
        let channel: Channel = connect_with_retry(uri, cfg)
            .await
            .map_err(|e| CalculatorError::Connect(format!("{e:#}")))?;
        Ok(Self::from_channel(channel, cfg.rpc_timeout))
    }

    /// Wrap an existing channel.
    #[must_use]
    pub fn from_channel(channel: Channel, call_timeout: Duration) -> Self {
        Self {
            inner: CalculatorServiceClient::new(channel),
            call_timeout,
        }
    }
}

#[async_trait]
impl CalculatorClient for CalculatorGrpcClient {
    async fn calculate(&self, op: Operation, a: f64, b: f64) -> Result<f64, CalculatorError> {
        let deadline = CallDeadline::start(unary_op_name(op), self.call_timeout);
        let mut client = self.inner.clone();

        let mut request = Request::new(BinaryRequest { a, b });
        deadline.apply(&mut request);

        let reply = deadline
            .run(async move {
                let response = match op {
                    Operation::Sum => client.sum(request).await?,
                    Operation::Subtraction => client.subtraction(request).await?,
                    Operation::Multiplication => client.multiplication(request).await?,
                    Operation::Division => client.division(request).await?,
                };
                Ok(response.into_inner())
            })
            .await?;

        tracing::debug!(%op, a, b, result = reply.result, "unary call completed");
        Ok(reply.result)
    }

    async fn reduce(&self, op: Operation, values: Vec<f64>) -> Result<f64, CalculatorError> {
        let deadline = CallDeadline::start(stream_op_name(op), self.call_timeout);
        let mut client = self.inner.clone();
        let count = values.len();

        let outbound = stream::iter(values.into_iter().map(|value| StreamValue { value }));
        let mut request = Request::new(outbound);
        deadline.apply(&mut request);

        let reply = deadline
            .run(async move {
                let response = match op {
                    Operation::Sum => client.sum_stream(request).await?,
                    Operation::Subtraction => client.subtraction_stream(request).await?,
                    Operation::Multiplication => client.multiplication_stream(request).await?,
                    Operation::Division => client.division_stream(request).await?,
                };
                Ok(response.into_inner())
            })
            .await?;

        tracing::debug!(%op, count, result = reply.result, "client-stream call completed");
        Ok(reply.result)
    }

    async fn all_calcs(&self, a: f64, b: f64) -> Result<Vec<f64>, CalculatorError> {
        let deadline = CallDeadline::start("calculator.all_calcs", self.call_timeout);
        let mut client = self.inner.clone();

        let mut request = Request::new(BinaryRequest { a, b });
        deadline.apply(&mut request);

        let results = deadline
            .run(async move {
                let mut replies = client.all_calcs(request).await?.into_inner();
                let mut results = Vec::with_capacity(Operation::ALL.len());
                while let Some(reply) = replies.message().await? {
                    results.push(reply.result);
                }
                Ok(results)
            })
            .await?;

        tracing::debug!(a, b, count = results.len(), "server-stream call completed");
        Ok(results)
    }

    async fn all_calcs_each(
        &self,
        values: mpsc::Receiver<f64>,
    ) -> Result<ReplyStream, CalculatorError> {
        let deadline = CallDeadline::start("calculator.all_calcs_each", self.call_timeout);
        let mut client = self.inner.clone();

        let outbound = ReceiverStream::new(values).map(|value| StreamValue { value });
        let mut request = Request::new(outbound);
        deadline.apply(&mut request);

        let response = deadline
            .run(async move { client.all_calcs_each(request).await })
            .await?;

        let replies = deadline
            .bound(response.into_inner())
            .map(|item| item.map(|reply| reply.result).map_err(CalculatorError::from))
            .boxed();

        Ok(replies)
    }
}
