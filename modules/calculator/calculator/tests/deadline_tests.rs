#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Every call shape against a server that never answers must fail with a
//! deadline error, never with a generic transport error.

use std::time::Duration;

use calcstream_transport_grpc::client::GrpcClientConfig;
use calcstream_transport_grpc::server::serve;
use calcstream_transport_grpc::{ListenConfig, ReadySignal};
use calculator_sdk::{
    BinaryRequest, CalculatorClient, CalculatorGrpcClient, CalculatorService,
    CalculatorServiceServer, Operation, Reply, StreamValue,
};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tonic::service::RoutesBuilder;
use tonic::{Request, Response, Status, Streaming};

const ATTEMPTS: usize = 8;
const CALL_TIMEOUT: Duration = Duration::from_millis(150);

/// Accepts every call and never replies.
struct StalledCalculator;

async fn stall<T>() -> Result<Response<T>, Status> {
    std::future::pending().await
}

#[tonic::async_trait]
impl CalculatorService for StalledCalculator {
    async fn sum(&self, _: Request<BinaryRequest>) -> Result<Response<Reply>, Status> {
        stall().await
    }

    async fn subtraction(&self, _: Request<BinaryRequest>) -> Result<Response<Reply>, Status> {
        stall().await
    }

    async fn multiplication(
        &self,
        _: Request<BinaryRequest>,
    ) -> Result<Response<Reply>, Status> {
        stall().await
    }

    async fn division(&self, _: Request<BinaryRequest>) -> Result<Response<Reply>, Status> {
        stall().await
    }

    async fn sum_stream(
        &self,
        _: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Reply>, Status> {
        stall().await
    }

    async fn subtraction_stream(
        &self,
        _: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Reply>, Status> {
        stall().await
    }

    async fn multiplication_stream(
        &self,
        _: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Reply>, Status> {
        stall().await
    }

    async fn division_stream(
        &self,
        _: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Reply>, Status> {
        stall().await
    }

    type AllCalcsStream = ReceiverStream<Result<Reply, Status>>;

    async fn all_calcs(
        &self,
        _: Request<BinaryRequest>,
    ) -> Result<Response<Self::AllCalcsStream>, Status> {
        stall().await
    }

    type AllCalcsEachStream = ReceiverStream<Result<Reply, Status>>;

    async fn all_calcs_each(
        &self,
        _: Request<Streaming<StreamValue>>,
    ) -> Result<Response<Self::AllCalcsEachStream>, Status> {
        stall().await
    }
}

async fn start_stalled_server(
    cancel: CancellationToken,
) -> (String, JoinHandle<anyhow::Result<()>>) {
    let mut routes = RoutesBuilder::default();
    routes.add_service(CalculatorServiceServer::new(StalledCalculator));
    let listen = ListenConfig::parse("127.0.0.1:0").unwrap();
    let (ready, rx) = ReadySignal::channel();

    let handle = tokio::spawn(serve(routes.routes(), listen, cancel, ready));
    (rx.await.unwrap(), handle)
}

async fn connect(endpoint: String) -> CalculatorGrpcClient {
    let cfg = GrpcClientConfig::new("calculator_stalled").with_rpc_timeout(CALL_TIMEOUT);
    CalculatorGrpcClient::connect(endpoint, &cfg).await.unwrap()
}

#[tokio::test]
async fn unary_calls_report_deadline_exceeded() {
    let cancel = CancellationToken::new();
    let (endpoint, server) = start_stalled_server(cancel.clone()).await;
    let client = connect(endpoint).await;

    for attempt in 0..ATTEMPTS {
        let op = Operation::ALL[attempt % Operation::ALL.len()];
        let err = client.calculate(op, 3.0, 4.0).await.unwrap_err();
        assert!(err.is_deadline_exceeded(), "attempt {attempt} ({op}): {err}");
    }

    drop(client);
    cancel.cancel();
    server.abort();
}

#[tokio::test]
async fn client_stream_calls_report_deadline_exceeded() {
    let cancel = CancellationToken::new();
    let (endpoint, server) = start_stalled_server(cancel.clone()).await;
    let client = connect(endpoint).await;

    for attempt in 0..ATTEMPTS {
        let op = Operation::ALL[attempt % Operation::ALL.len()];
        let err = client.reduce(op, vec![1.0, 2.0, 3.0]).await.unwrap_err();
        assert!(err.is_deadline_exceeded(), "attempt {attempt} ({op}): {err}");
    }

    drop(client);
    cancel.cancel();
    server.abort();
}

#[tokio::test]
async fn server_stream_calls_report_deadline_exceeded() {
    let cancel = CancellationToken::new();
    let (endpoint, server) = start_stalled_server(cancel.clone()).await;
    let client = connect(endpoint).await;

    for attempt in 0..ATTEMPTS {
        let err = client.all_calcs(3.0, 4.0).await.unwrap_err();
        assert!(err.is_deadline_exceeded(), "attempt {attempt}: {err}");
    }

    drop(client);
    cancel.cancel();
    server.abort();
}

#[tokio::test]
async fn bidi_open_reports_deadline_exceeded() {
    let cancel = CancellationToken::new();
    let (endpoint, server) = start_stalled_server(cancel.clone()).await;
    let client = connect(endpoint).await;

    for attempt in 0..ATTEMPTS {
        let (_tx, rx) = tokio::sync::mpsc::channel(1);
        let err = client.all_calcs_each(rx).await.err().expect("call should fail");
        assert!(err.is_deadline_exceeded(), "attempt {attempt}: {err}");
    }

    drop(client);
    cancel.cancel();
    server.abort();
}
