//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use cep_weather::config::ServiceConfig;
use cep_weather::lifecycle::{startup, Shutdown};
use cep_weather::observability::{self, Telemetry, TracePropagator};
use cep_weather::HttpServer;
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;

struct TestTelemetry {
    telemetry: Telemetry,
    spans: InMemorySpanExporter,
}

static TELEMETRY: OnceLock<TestTelemetry> = OnceLock::new();

/// A server spawned on an ephemeral port. Stops when dropped.
pub struct RunningServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Serve `server` on 127.0.0.1 with a free port.
pub async fn spawn(server: HttpServer) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    RunningServer { addr, shutdown }
}

/// Configuration pointing at test doubles, with span export off.
pub fn test_config(directory_url: &str, weather_url: &str, resolver_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.resolver.directory_url = directory_url.to_string();
    config.resolver.weather_url = weather_url.to_string();
    config.resolver.weather_api_key = "test-key".to_string();
    config.gateway.resolver_url = resolver_url.to_string();
    config.timeouts.upstream_secs = 2;
    config.timeouts.connect_secs = 1;
    config.observability.tracing.enabled = false;
    config
}

/// Install logging and the span bridge once per test binary. Finished spans
/// are kept in memory. The log level is quiet on purpose: spans must not
/// depend on it.
fn test_telemetry() -> &'static TestTelemetry {
    TELEMETRY.get_or_init(|| {
        let mut config = ServiceConfig::default();
        config.observability.log_level = "warn".to_string();
        let spans = InMemorySpanExporter::default();
        let telemetry =
            observability::init_with_exporter("test", &config.observability, spans.clone()).unwrap();
        TestTelemetry { telemetry, spans }
    })
}

pub fn init_telemetry() -> TracePropagator {
    test_telemetry().telemetry.propagator()
}

/// Every span finished so far in this test binary.
pub fn finished_spans() -> Vec<SpanData> {
    test_telemetry().spans.get_finished_spans().unwrap()
}

pub async fn spawn_resolver(config: &ServiceConfig) -> RunningServer {
    spawn(startup::build_resolver(config, init_telemetry()).unwrap()).await
}

pub async fn spawn_gateway(config: &ServiceConfig) -> RunningServer {
    spawn(startup::build_gateway(config, init_telemetry())).await
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start a programmable backend. `f` receives the request head and returns
/// the status and JSON body to answer with.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let (status, body) = f(head).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            422 => "422 Unprocessable Entity",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read until the end of the request head.
async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
