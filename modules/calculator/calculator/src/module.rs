//! Calculator module definition
//!
//! Wires the domain Service into the gRPC layer and hosts it on the
//! transport stack.

use std::sync::Arc;

use calcstream_transport_grpc::server::serve;
use calcstream_transport_grpc::{ListenConfig, ReadySignal};
use tokio_util::sync::CancellationToken;
use tonic::service::{Routes, RoutesBuilder};

use calculator_sdk::{CalculatorServiceServer, SERVICE_NAME};

use crate::api::grpc::CalculatorServiceImpl;
use crate::domain::Service;

/// Calculator module.
///
/// Owns the domain Service shared by every session.
#[derive(Clone, Default)]
pub struct CalculatorModule {
    service: Arc<Service>,
}

impl CalculatorModule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Domain service behind the gRPC layer.
    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    /// gRPC routes exposing `calculator.v1.CalculatorService`.
    #[must_use]
    pub fn routes(&self) -> Routes {
        let svc = CalculatorServiceServer::new(CalculatorServiceImpl::new(self.service()));

        let mut routes = RoutesBuilder::default();
        routes.add_service(svc);
        tracing::debug!(service_name = SERVICE_NAME, "registered gRPC service");
        routes.routes()
    }

    /// Serve the calculator on `listen` until `cancel` fires.
    ///
    /// # Errors
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn serve(
        &self,
        listen: ListenConfig,
        cancel: CancellationToken,
        ready: ReadySignal,
    ) -> anyhow::Result<()> {
        tracing::info!(%listen, "starting calculator module");
        serve(self.routes(), listen, cancel, ready).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_service_is_shared() {
        let module = CalculatorModule::new();
        let clone = module.clone();
        assert!(Arc::ptr_eq(&module.service(), &clone.service()));
    }

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let module = CalculatorModule::new();
        let cancel = CancellationToken::new();
        let (ready, rx) = ReadySignal::channel();
        let listen = ListenConfig::parse("127.0.0.1:0").unwrap();

        let server = tokio::spawn({
            let module = module.clone();
            let cancel = cancel.clone();
            async move { module.serve(listen, cancel, ready).await }
        });

        let endpoint = rx.await.unwrap();
        assert!(endpoint.starts_with("http://127.0.0.1:"));

        cancel.cancel();
        server.await.unwrap().unwrap();
    }
}
