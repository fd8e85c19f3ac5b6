//! Server startup and shutdown logic

use anyhow::Result;
use axum::Router;
use docfreq_config::DocfreqConfig;
use docfreq_dispatch::{Dispatcher, DispatcherConfig};
use docfreq_execution::{Subscriber, SubscriberConfig, WorkerProcessor};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::app::{create_app, AppState};
use crate::backend::Backends;

/// Server application struct
pub struct Server {
    config: DocfreqConfig,
    backends: Backends,
    dispatcher: Arc<Dispatcher>,
    shutdown: CancellationToken,
}

impl Server {
    /// Create a new server instance
    pub async fn new(config: DocfreqConfig) -> Result<Self> {
        // Initialize logging first
        docfreq_logging::init_logging(&config.logging)?;

        let backends = Backends::connect(&config).await?;
        Ok(Self::with_backends(config, backends))
    }

    /// Create a server over already connected backends
    pub fn with_backends(config: DocfreqConfig, backends: Backends) -> Self {
        let dispatcher = Dispatcher::new(
            backends.queue.clone(),
            backends.store.clone(),
            DispatcherConfig {
                channel: config.queue.channel.clone(),
                probe_timeout: config.dispatch.probe_timeout,
                poll_interval: config.dispatch.poll_interval,
                request_timeout: config.dispatch.request_timeout,
            },
        );

        Self {
            config,
            backends,
            dispatcher: Arc::new(dispatcher),
            shutdown: CancellationToken::new(),
        }
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Router {
        create_app(AppState::new(
            self.dispatcher.clone(),
            self.shutdown.clone(),
        ))
    }

    /// Token cancelled when the server shuts down
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    fn subscriber(&self) -> Subscriber {
        let processor =
            WorkerProcessor::with_report_ttl(self.backends.store.clone(), self.config.cache.report_ttl);
        Subscriber::new(
            self.backends.queue.clone(),
            Arc::new(processor),
            SubscriberConfig {
                channel: self.config.queue.channel.clone(),
                max_in_flight: self.config.worker.max_in_flight,
                error_backoff: self.config.worker.error_backoff,
            },
        )
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM
    pub async fn start(self) -> Result<()> {
        let addr = self.config.server.socket_address();
        tracing::info!("Starting docfreq server on {}", addr);

        self.log_config_summary();

        let listener = TcpListener::bind(&addr).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `signal` completes
    ///
    /// The worker subscription and the cache sweeper run alongside the HTTP
    /// server. On shutdown, waiting requests are cancelled and in-flight jobs
    /// are awaited.
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.build_app();
        let shutdown = self.shutdown.clone();

        let sweeper = self.backends.memory_store.clone().map(|store| {
            store.start_cleanup_task(self.config.cache.cleanup_interval)
        });

        let worker = if self.config.worker.enabled {
            let subscriber = self.subscriber();
            let cancel = shutdown.clone();
            Some(tokio::spawn(async move { subscriber.run(cancel).await }))
        } else {
            tracing::info!("Worker disabled, not subscribing to {}", self.config.queue.channel);
            None
        };

        tracing::info!("Server listening on {}", listener.local_addr()?);

        let graceful = shutdown.clone();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = signal => {}
                    _ = graceful.cancelled() => {}
                }
                graceful.cancel();
            })
            .await;

        shutdown.cancel();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::error!("Worker task failed: {}", e);
            }
        }
        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }

        served?;
        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Log configuration summary
    fn log_config_summary(&self) {
        tracing::info!("=== docfreq Server Configuration ===");
        tracing::info!("Bind Address: {}", self.config.server.socket_address());
        tracing::info!("Backend: {}", self.config.backend.kind);
        tracing::info!("Channel: {}", self.config.queue.channel);
        tracing::info!("Report TTL: {:?}", self.config.cache.report_ttl);
        tracing::info!("Request Timeout: {:?}", self.config.dispatch.request_timeout);
        tracing::info!(
            "Worker: {}",
            if self.config.worker.enabled { "Enabled" } else { "Disabled" }
        );
        match self.config.worker.max_in_flight {
            Some(limit) => tracing::info!("Max In-Flight Jobs: {}", limit),
            None => tracing::info!("Max In-Flight Jobs: unbounded"),
        }
        tracing::info!("=====================================");
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
