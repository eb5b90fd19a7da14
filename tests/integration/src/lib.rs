//! Shared harness for the integration tests.
//!
//! [`TestGateway`] runs the real server on an ephemeral port with every
//! vendor pointed at one wiremock instance, and hands out SDK clients
//! that talk to it over TCP.

use secrecy::SecretString;
use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;
use studio_config::{StudioConfig, VendorConfig};
use studio_sdk::Client;
use studio_server::{AppState, Server};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::MockServer;

static TRACING: Once = Once::new();

/// Install a test subscriber once; `RUST_LOG` controls the output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Configuration with every vendor keyed and pointed at `vendors`.
pub fn vendor_config(vendors: &MockServer) -> StudioConfig {
    let uri = vendors.uri();
    let mut config = StudioConfig::default();

    config.providers.fal.api_key = Some(SecretString::new("fal-key".into()));
    config.providers.fal.sync_base_url = uri.clone();
    config.providers.fal.queue_base_url = uri.clone();
    config.providers.gemini.api_key = Some(SecretString::new("gemini-key".into()));
    config.providers.gemini.base_url = uri.clone();
    config.providers.luma = VendorConfig::default()
        .with_api_key("luma-key")
        .with_base_url(uri.clone());
    config.providers.openai = VendorConfig::default()
        .with_api_key("sk-key")
        .with_base_url(uri.clone());
    config.providers.elevenlabs = VendorConfig::default()
        .with_api_key("xi-key")
        .with_base_url(uri);

    config.generation.image_retry.base_delay = Duration::from_millis(10);
    config.generation.polling.interval = Duration::from_millis(10);
    config.server.shutdown_timeout = Duration::from_secs(1);
    config
}

/// A running gateway
pub struct TestGateway {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestGateway {
    /// Start the server on 127.0.0.1 with an ephemeral port.
    pub async fn start(config: StudioConfig) -> Self {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Server::new(AppState::from_config(config).unwrap());
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = stopped.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    /// Start against simulated vendors.
    pub async fn with_vendors(vendors: &MockServer) -> Self {
        Self::start(vendor_config(vendors)).await
    }

    /// Base URL of the gateway.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// SDK client with a short rate-limit backoff.
    pub fn client(&self) -> Client {
        Client::builder()
            .base_url(self.url())
            .retry_initial_delay(Duration::from_millis(10))
            .build()
            .unwrap()
    }

    /// Stop the server and wait for it to drain.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap();
        }
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}
