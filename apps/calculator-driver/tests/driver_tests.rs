#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

//! Driver against an in-process calculator server.

use std::sync::Arc;
use std::time::Duration;

use calcstream_transport_grpc::client::GrpcClientConfig;
use calcstream_transport_grpc::{ListenConfig, ReadySignal};
use calculator::CalculatorModule;
use calculator_driver::{DEFAULT_OPERANDS, Driver, DriverInputs};
use calculator_sdk::{CalculatorGrpcClient, Operation};
use tokio_util::sync::CancellationToken;

async fn start_server(cancel: CancellationToken) -> (String, tokio::task::JoinHandle<anyhow::Result<()>>) {
    let (ready, rx) = ReadySignal::channel();
    let listen = ListenConfig::parse("127.0.0.1:0").unwrap();
    let handle = tokio::spawn(async move {
        CalculatorModule::new().serve(listen, cancel, ready).await
    });
    (rx.await.unwrap(), handle)
}

#[tokio::test]
async fn full_run_with_default_operands() {
    let cancel = CancellationToken::new();
    let (endpoint, server) = start_server(cancel.clone()).await;

    let cfg = GrpcClientConfig::new("calculator").with_rpc_timeout(Duration::from_secs(1));
    let client = CalculatorGrpcClient::connect(endpoint, &cfg).await.unwrap();
    let driver = Driver::new(Arc::new(client));

    let report = driver.run(&DriverInputs::default()).await.unwrap();

    assert_eq!(
        report.unary,
        vec![
            (Operation::Sum, 7.0),
            (Operation::Subtraction, -1.0),
            (Operation::Multiplication, 12.0),
            (Operation::Division, 0.75),
        ]
    );
    assert_eq!(report.reductions, report.unary);
    assert_eq!(report.all_calcs, vec![7.0, -1.0, 12.0, 0.75]);
    assert_eq!(
        report.all_calcs_each,
        vec![3.0, 3.0, 3.0, 3.0, 7.0, -1.0, 12.0, 0.75]
    );

    cancel.cancel();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn full_run_with_positional_numbers() {
    let cancel = CancellationToken::new();
    let (endpoint, server) = start_server(cancel.clone()).await;

    let cfg = GrpcClientConfig::new("calculator");
    let client = CalculatorGrpcClient::connect(endpoint, &cfg).await.unwrap();
    let driver = Driver::new(Arc::new(client));
    let inputs = DriverInputs::from_args(vec![1.0, 2.0, 3.0], DEFAULT_OPERANDS);

    let report = driver.run(&inputs).await.unwrap();

    assert_eq!(report.unary[0], (Operation::Sum, 3.0));
    assert_eq!(
        report.reductions,
        vec![
            (Operation::Sum, 6.0),
            (Operation::Subtraction, -4.0),
            (Operation::Multiplication, 6.0),
            (Operation::Division, 1.0 / 2.0 / 3.0),
        ]
    );
    assert_eq!(report.all_calcs_each.len(), 12);
    assert_eq!(&report.all_calcs_each[..4], &[1.0, 1.0, 1.0, 1.0]);

    cancel.cancel();
    server.await.unwrap().unwrap();
}
