//! GoSOTRAL realtime server.

use std::sync::Arc;

use gosotral_realtime::adapters::http::{build_router, serve, OperatorGate};
use gosotral_realtime::adapters::realtime::{BroadcastHub, RealtimeState};
use gosotral_realtime::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let hub = Arc::new(BroadcastHub::new());
    let state = RealtimeState::new(hub.clone(), &config.realtime);

    let gate = OperatorGate::new(config.realtime.operator_token.clone());
    if !gate.is_enabled() {
        tracing::warn!("No operator token configured; POST /api/realtime/broadcast is disabled");
    }

    let router = build_router(state, gate, &config.server.cors_origins_list());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        "GoSOTRAL realtime server listening"
    );

    serve(
        listener,
        router,
        hub,
        shutdown_signal(),
        config.server.shutdown_timeout(),
    )
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
