//! Serve command implementation

use crate::agent::factory::create_agents;
use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::{LogFormat, ReceiverConfig};
use crate::evidence::{EvidenceCollector, EvidenceSource, PrometheusClient};
use crate::fanout::FanOut;
use crate::metrics::{MetricsSink, PrometheusSink};
use crate::queue::JobQueue;
use crate::store::RecordStore;
use crate::worker::{Analyzer, WorkerPool};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with environment and CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<ReceiverConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        ReceiverConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        ReceiverConfig::default()
    };

    config = config.with_env_overrides()?;

    // Apply CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if let Some(workers) = args.workers {
        config.pipeline.worker_count = workers;
    }
    if args.no_evidence {
        config.evidence.prometheus_url.clear();
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// A fully wired receiver: router plus running workers.
pub struct Service {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub workers: WorkerPool,
    pub cancel: CancellationToken,
}

/// Construct every component and start the worker pool.
///
/// Fails before anything is spawned when a backend adapter cannot be
/// constructed. Must be called inside a Tokio runtime.
pub fn build_service(
    config: ReceiverConfig,
    sink: Arc<dyn MetricsSink>,
    metrics_handle: Option<PrometheusHandle>,
) -> Result<Service, Box<dyn std::error::Error>> {
    let http_client = Arc::new(reqwest::Client::builder().build()?);
    let agents = create_agents(&config.backends, http_client)?;

    let source: Option<Arc<dyn EvidenceSource>> = if config.evidence.is_enabled() {
        Some(Arc::new(PrometheusClient::new(
            &config.evidence.prometheus_url,
            config.evidence.timeout,
        )?))
    } else {
        None
    };
    let evidence = EvidenceCollector::new(
        source,
        config.effective_queries(),
        config.evidence.lookback,
        Arc::clone(&sink),
    );

    let fanout = FanOut::new(agents, config.pipeline.backend_timeout, Arc::clone(&sink));
    let provider_names = fanout.provider_names();

    let queue = Arc::new(JobQueue::new(
        config.pipeline.queue_capacity,
        Arc::clone(&sink),
    ));
    let store = Arc::new(RecordStore::new(config.pipeline.max_stored_analyses));
    let analyzer = Arc::new(Analyzer::new(
        evidence,
        fanout,
        Arc::clone(&store),
        Arc::clone(&sink),
    ));

    let cancel = CancellationToken::new();
    let workers = WorkerPool::start(
        config.pipeline.worker_count,
        Arc::clone(&queue),
        analyzer,
        cancel.clone(),
    );

    let mut state = AppState::new(Arc::new(config), queue, store, provider_names);
    if let Some(handle) = metrics_handle {
        state = state.with_metrics_handle(handle);
    }
    let state = Arc::new(state);
    let router = create_router(Arc::clone(&state));

    Ok(Service {
        router,
        state,
        workers,
        cancel,
    })
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for CTRL+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and merge configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;
    tracing::debug!(?config, "Loaded configuration");

    // 3. Metrics recorder
    let metrics_handle = match crate::metrics::setup_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Metrics recorder not installed");
            None
        }
    };

    // 4. Adapters, queue, store, workers; fails fast on adapter errors
    let Service {
        router,
        state,
        workers,
        cancel,
    } = build_service(config.clone(), Arc::new(PrometheusSink), metrics_handle)?;

    tracing::info!(
        port = config.server.port,
        prometheus_url = %config.evidence.prometheus_url,
        backends = ?state.provider_names,
        workers = workers.size(),
        "Starting alert receiver"
    );

    // 5. Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Alert receiver listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    // 6. Let in-flight jobs finish
    cancel.cancel();
    tracing::info!("Waiting for workers to finish current jobs");
    workers.join().await;

    tracing::info!("Alert receiver stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, BackendFamily};
    use crate::metrics::NoopSink;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn args(config: PathBuf) -> ServeArgs {
        ServeArgs {
            config,
            port: None,
            host: None,
            log_level: None,
            workers: None,
            no_evidence: false,
        }
    }

    #[test]
    fn test_serve_config_loading() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 8080").unwrap();

        let config = load_config_with_overrides(&args(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_serve_cli_overrides_config() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 8080\n[pipeline]\nworker_count = 1").unwrap();

        let mut args = args(temp.path().to_path_buf());
        args.port = Some(9000);
        args.workers = Some(6);
        args.no_evidence = true;

        let config = load_config_with_overrides(&args).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.pipeline.worker_count, 6);
        assert!(!config.evidence.is_enabled());
    }

    #[test]
    fn test_serve_invalid_file_is_error() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server\nport =").unwrap();
        assert!(load_config_with_overrides(&args(temp.path().to_path_buf())).is_err());
    }

    #[tokio::test]
    async fn test_build_service_with_no_backends() {
        let mut config = ReceiverConfig::default();
        config.evidence.prometheus_url.clear();
        config.pipeline.worker_count = 3;

        let service = build_service(config, Arc::new(NoopSink), None).unwrap();
        assert_eq!(service.workers.size(), 3);
        assert!(service.state.provider_names.is_empty());

        service.cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), service.workers.join())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_build_service_fails_fast_on_bad_backend() {
        let mut config = ReceiverConfig::default();
        config.backends.push(BackendConfig {
            name: "broken".to_string(),
            family: BackendFamily::OpenAI,
            model: "gpt-4o-mini".to_string(),
            api_key_env: "TEST_ALERT_SERVE_UNSET_KEY".to_string(),
            ..Default::default()
        });

        assert!(build_service(config, Arc::new(NoopSink), None).is_err());
    }

    #[tokio::test]
    async fn test_build_service_sorts_provider_names() {
        let mut config = ReceiverConfig::default();
        config.evidence.prometheus_url.clear();
        for name in ["zeta", "alpha"] {
            config.backends.push(BackendConfig {
                name: name.to_string(),
                family: BackendFamily::Ollama,
                model: "llama3".to_string(),
                ..Default::default()
            });
        }

        let service = build_service(config, Arc::new(NoopSink), None).unwrap();
        assert_eq!(service.state.provider_names, vec!["alpha", "zeta"]);
        service.cancel.cancel();
        service.workers.join().await;
    }

    #[tokio::test]
    async fn test_shutdown_signal_returns_on_cancel() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(shutdown_signal(cancel.clone()));

        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(result.is_ok());
    }
}
