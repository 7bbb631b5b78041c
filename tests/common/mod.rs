//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use echoserver::reflect::Pipeline;
use echoserver::{EchoConfig, HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A running echo server; shut down when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server with the standard pipeline on an ephemeral port.
pub async fn start_server() -> TestServer {
    start_server_with_pipeline(EchoConfig::default(), Pipeline::standard()).await
}

/// Start a server with a custom config and pipeline on an ephemeral port.
pub async fn start_server_with_pipeline(config: EchoConfig, pipeline: Pipeline) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::with_pipeline(config, pipeline);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Give the accept loop a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, shutdown }
}

/// A client that never routes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
