//! HTTP server lifecycle.

use std::future::{Future, IntoFuture};
use std::time::Duration;
use studio_config::StudioConfig;
use studio_core::{GatewayError, GatewayResult};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{routes::create_router, shutdown::shutdown_signal, state::AppState};

/// The gateway server
#[derive(Debug)]
pub struct Server {
    state: AppState,
    shutdown_timeout: Duration,
}

impl Server {
    /// Server over prepared state
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            shutdown_timeout: state.config.server.shutdown_timeout,
            state,
        }
    }

    /// Build state from configuration
    pub fn from_config(config: StudioConfig) -> GatewayResult<Self> {
        Ok(Self::new(AppState::from_config(config)?))
    }

    /// Bind the configured address and serve until a shutdown signal
    pub async fn run(self) -> GatewayResult<()> {
        let addr = self
            .state
            .config
            .server
            .socket_addr()
            .map_err(|e| GatewayError::configuration(format!("Invalid listen address: {e}")))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::internal(format!("Failed to bind {addr}: {e}")))?;

        self.serve(listener, async {
            shutdown_signal().await;
        })
        .await
    }

    /// Serve on `listener` until `shutdown` resolves, then give in-flight
    /// requests up to the configured shutdown timeout
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|e| GatewayError::internal(format!("Failed to read local address: {e}")))?;
        let vendors = self.state.providers.configured_vendors();
        let app = create_router(self.state);

        let (draining_tx, mut draining_rx) = watch::channel(false);
        let graceful = async move {
            shutdown.await;
            let _ = draining_tx.send(true);
        };

        info!(address = %local_addr, vendors = ?vendors, "Studio gateway listening");

        let mut server = tokio::spawn(
            axum::serve(listener, app)
                .with_graceful_shutdown(graceful)
                .into_future(),
        );

        tokio::select! {
            joined = &mut server => return Self::finish(joined),
            _ = draining_rx.changed() => {}
        }

        info!(timeout = ?self.shutdown_timeout, "Draining in-flight requests");
        match tokio::time::timeout(self.shutdown_timeout, &mut server).await {
            Ok(joined) => Self::finish(joined),
            Err(_) => {
                warn!("Shutdown timeout elapsed, aborting remaining connections");
                server.abort();
                Ok(())
            }
        }
    }

    fn finish(
        joined: Result<std::io::Result<()>, tokio::task::JoinError>,
    ) -> GatewayResult<()> {
        match joined {
            Ok(Ok(())) => {
                info!("Server stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(GatewayError::internal(format!("Server error: {e}"))),
            Err(e) => Err(GatewayError::internal(format!("Server task failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = Server::new(AppState::builder().build().unwrap());
        let handle = tokio::spawn(server.serve(listener, async {
            let _ = stop_rx.await;
        }));

        let body: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "healthy");

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
