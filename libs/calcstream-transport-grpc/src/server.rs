//! Hosting tonic routes on a TCP listener.
//!
//! The server binds, reports the bound endpoint through a [`ReadySignal`], and
//! serves until its [`CancellationToken`] is cancelled.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::service::Routes;
use tonic::transport::Server;

pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 50051));

/// Listen address for the gRPC server.
///
/// `"127.0.0.1:50051"`, or `"127.0.0.1:0"` for an ephemeral port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenConfig {
    addr: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_LISTEN_ADDR,
        }
    }
}

impl ListenConfig {
    /// Parse a `host:port` listen address.
    ///
    /// # Errors
    /// Returns an error for socket paths, pipes, or malformed addresses.
    pub fn parse(listen_addr: &str) -> anyhow::Result<Self> {
        if listen_addr.starts_with("uds://")
            || listen_addr.starts_with("pipe://")
            || listen_addr.starts_with("npipe://")
        {
            anyhow::bail!("only TCP listen addresses are supported: '{listen_addr}'");
        }

        let addr = listen_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid listen_addr '{listen_addr}'"))?;
        Ok(Self { addr })
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl fmt::Display for ListenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.addr.fmt(f)
    }
}

/// One-shot notification carrying the bound endpoint (`http://addr:port`).
pub struct ReadySignal(oneshot::Sender<String>);

impl ReadySignal {
    /// Create a signal together with the receiver that observes it.
    #[must_use]
    pub fn channel() -> (Self, oneshot::Receiver<String>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    pub fn notify(self, endpoint: String) {
        if self.0.send(endpoint).is_err() {
            tracing::debug!("ready signal receiver dropped before the server was bound");
        }
    }
}

/// Serve `routes` on `listen` until `cancel` fires.
///
/// # Errors
/// Returns an error if binding fails or the server terminates abnormally.
pub async fn serve(
    routes: Routes,
    listen: ListenConfig,
    cancel: CancellationToken,
    ready: ReadySignal,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen.addr())
        .await
        .with_context(|| format!("failed to bind gRPC listener at {listen}"))?;
    let bound_addr = listener.local_addr()?;
    let endpoint = format!("http://{bound_addr}");
    tracing::info!(%bound_addr, transport = "tcp", "gRPC server listening");

    ready.notify(endpoint);

    let incoming = TcpListenerStream::new(listener);
    Server::builder()
        .add_routes(routes)
        .serve_with_incoming_shutdown(incoming, async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!(%bound_addr, "gRPC server stopped");
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tonic::service::RoutesBuilder;

    #[test]
    fn test_default_listen_addr() {
        let cfg = ListenConfig::default();
        assert_eq!(cfg.addr(), DEFAULT_LISTEN_ADDR);
        assert_eq!(cfg.to_string(), "0.0.0.0:50051");
    }

    #[test]
    fn test_parse_tcp_addr() {
        let cfg = ListenConfig::parse("127.0.0.1:10").unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:10".parse().unwrap());
    }

    #[test]
    fn test_parse_rejects_socket_paths() {
        assert!(ListenConfig::parse("uds:///tmp/calc.sock").is_err());
        assert!(ListenConfig::parse(r"pipe://\\.\pipe\calc").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = ListenConfig::parse("not-an-addr").unwrap_err();
        assert!(err.to_string().contains("not-an-addr"));
    }

    #[tokio::test]
    async fn test_serve_reports_endpoint_and_stops_on_cancel() {
        let routes = RoutesBuilder::default().routes();
        let listen = ListenConfig::parse("127.0.0.1:0").unwrap();
        let cancel = CancellationToken::new();
        let (ready, rx) = ReadySignal::channel();

        let server = tokio::spawn(serve(routes, listen, cancel.clone(), ready));

        let endpoint = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .expect("ready signal should fire")
            .expect("ready channel should complete");
        assert!(endpoint.starts_with("http://127.0.0.1:"));
        assert!(!endpoint.ends_with(":0"));

        cancel.cancel();

        server
            .await
            .expect("task should join successfully")
            .expect("server should exit cleanly");
    }
}
