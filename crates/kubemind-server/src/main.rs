//! kubemind-server - HTTP service binary.

use std::net::SocketAddr;

use anyhow::Context;
use kubemind_core::{CollectionInitializer, KubeMindConfig};
use kubemind_server::{
    assemble, create_providers, create_server, create_server_with_auth, init_tracing,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
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
}

fn load_config() -> anyhow::Result<KubeMindConfig> {
    let mut config = match std::env::var("KUBEMIND_CONFIG") {
        Ok(path) => KubeMindConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        Err(_) => {
            let path = KubeMindConfig::default_path();
            if path.exists() {
                KubeMindConfig::from_file(&path)
                    .with_context(|| format!("failed to load config from {}", path.display()))?
            } else {
                KubeMindConfig::default()
            }
        }
    };
    config.apply_env();
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    let config = load_config()?;

    let host = std::env::var("KUBEMIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("KUBEMIND_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .context("KUBEMIND_PORT must be a valid port number")?;
    let require_auth = std::env::var("KUBEMIND_REQUIRE_AUTH").is_ok();

    let settings = config.settings();
    let providers = create_providers(&config, &settings).await?;

    // Failure here is logged; requests touching the collection fail individually.
    CollectionInitializer::new(
        providers.vector_store.clone(),
        config.vector_store.collection_name.clone(),
        settings.embedding_dims,
    )
    .initialize()
    .await;

    let shutdown = CancellationToken::new();
    let (state, mut runtime) = assemble(&settings, providers, shutdown.clone());
    runtime.start()?;
    info!(
        buffer_capacity = settings.buffer_capacity,
        dedup_window_secs = settings.dedup_window.as_secs(),
        "Memory consolidator started"
    );

    let app = if require_auth {
        let api_key = std::env::var("KUBEMIND_API_KEY")
            .context("KUBEMIND_REQUIRE_AUTH is set but KUBEMIND_API_KEY is not")?;
        info!("Authentication enabled");
        create_server_with_auth(state, api_key)
    } else {
        info!("Authentication disabled");
        create_server(state)
    };

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!(%addr, "Starting kubemind-server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Cancelling first releases handlers blocked on a full buffer, so the
    // HTTP drain can finish.
    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            signal_token.cancel();
        })
        .await?;

    runtime.shutdown().await;
    info!("Server stopped cleanly");
    Ok(())
}
