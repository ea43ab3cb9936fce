//! gRPC Server implementation for calculator
//!
//! The server implementation handles gRPC requests and delegates
//! to the domain Service for the arithmetic. Streamed inputs are
//! aggregated per call; nothing is shared between sessions except the
//! diagnostic last-replies holder inside the Service.

use std::sync::Arc;

use futures::stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, info};

use calculator_sdk::{BinaryRequest, CalculatorService, Operation, Reply, StreamValue};

use crate::domain::Service;

/// Buffered replies per bidirectional session before the session task waits
/// for the client to read.
const REPLY_CHANNEL_CAPACITY: usize = 16;

/// gRPC service implementation that wraps the domain Service.
#[derive(Clone)]
pub struct CalculatorServiceImpl {
    service: Arc<Service>,
}

impl CalculatorServiceImpl {
    /// Create a new `CalculatorService` implementation with the given Service.
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }

    fn unary(&self, op: Operation, request: Request<BinaryRequest>) -> Response<Reply> {
        let BinaryRequest { a, b } = request.into_inner();
        let result = self.service.calculate(op, a, b);
        Response::new(Reply { result })
    }

    async fn reduce(
        &self,
        op: Operation,
        request: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Reply>, Status> {
        let mut inbound = request.into_inner();
        let mut aggregate = self.service.begin_reduction(op);

        while let Some(StreamValue { value }) = inbound.message().await? {
            aggregate.push(value);
        }

        debug!(%op, count = aggregate.count(), "client stream closed");
        Ok(Response::new(Reply {
            result: aggregate.finish(),
        }))
    }
}

/// Drive one bidirectional session: accumulate inbound values and emit four
/// replies after each of them.
async fn run_each_session(
    service: Arc<Service>,
    mut inbound: Streaming<StreamValue>,
    tx: mpsc::Sender<Result<Reply, Status>>,
) {
    let mut values = Vec::new();

    loop {
        match inbound.message().await {
            Ok(Some(StreamValue { value })) => {
                values.push(value);
                let Some(replies) = service.all_calcs_prefix(&values) else {
                    continue;
                };
                for result in replies.results() {
                    if tx.send(Ok(Reply { result })).await.is_err() {
                        debug!(received = values.len(), "AllCalcsEach client went away");
                        return;
                    }
                }
            }
            Ok(None) => break,
            Err(status) => {
                debug!(code = %status.code(), "AllCalcsEach inbound stream failed");
                if tx.send(Err(status)).await.is_err() {
                    debug!("AllCalcsEach client went away");
                }
                return;
            }
        }
    }

    debug!(received = values.len(), "AllCalcsEach session finished");
}

#[tonic::async_trait]
impl CalculatorService for CalculatorServiceImpl {
    async fn sum(&self, request: Request<BinaryRequest>) -> Result<Response<Reply>, Status> {
        Ok(self.unary(Operation::Sum, request))
    }

    async fn subtraction(
        &self,
        request: Request<BinaryRequest>,
    ) -> Result<Response<Reply>, Status> {
        Ok(self.unary(Operation::Subtraction, request))
    }

    async fn multiplication(
        &self,
        request: Request<BinaryRequest>,
    ) -> Result<Response<Reply>, Status> {
        Ok(self.unary(Operation::Multiplication, request))
    }

    async fn division(&self, request: Request<BinaryRequest>) -> Result<Response<Reply>, Status> {
        Ok(self.unary(Operation::Division, request))
    }

    async fn sum_stream(
        &self,
        request: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Reply>, Status> {
        self.reduce(Operation::Sum, request).await
    }

    async fn subtraction_stream(
        &self,
        request: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Reply>, Status> {
        self.reduce(Operation::Subtraction, request).await
    }

    async fn multiplication_stream(
        &self,
        request: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Reply>, Status> {
        self.reduce(Operation::Multiplication, request).await
    }

    async fn division_stream(
        &self,
        request: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Reply>, Status> {
        self.reduce(Operation::Division, request).await
    }

    type AllCalcsStream = stream::Iter<std::array::IntoIter<Result<Reply, Status>, 4>>;

    async fn all_calcs(
        &self,
        request: Request<BinaryRequest>,
    ) -> Result<Response<Self::AllCalcsStream>, Status> {
        let BinaryRequest { a, b } = request.into_inner();
        let replies = self.service.all_calcs(a, b);

        let items = replies.results().map(|result| Ok(Reply { result }));
        Ok(Response::new(stream::iter(items)))
    }

    type AllCalcsEachStream = ReceiverStream<Result<Reply, Status>>;

    async fn all_calcs_each(
        &self,
        request: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Self::AllCalcsEachStream>, Status> {
        info!("AllCalcsEach received ...");

        let inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);
        tokio::spawn(run_each_session(Arc::clone(&self.service), inbound, tx));

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}
