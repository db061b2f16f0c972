// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transfer_gateway::{
    api::router,
    blockchain::{load_signer, ChainClient, EvmChainClient},
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    init_tracing(LogFormat::from_env());

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Transfer gateway failed");
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    tracing::info!(
        rpc_url = %config.rpc_url,
        bind_address = %config.bind_addr,
        rpc_timeout_secs = config.rpc_timeout.as_secs(),
        tls = config.tls.is_some(),
        "Configuration loaded"
    );

    let signer = load_signer(&config.private_key)?;
    let client = EvmChainClient::new(&config.rpc_url, signer)?;
    tracing::info!(sender = %client.sender_address(), "Signing key loaded");

    match tokio::time::timeout(config.rpc_timeout, client.chain_id()).await {
        Ok(Ok(chain_id)) => tracing::info!(chain_id, "Connected to RPC endpoint"),
        Ok(Err(e)) => tracing::warn!(error = %e, "RPC endpoint not reachable at startup"),
        Err(_) => tracing::warn!("RPC endpoint did not answer at startup"),
    }

    let state = AppState::new(Arc::new(client), config.rpc_timeout);
    let app = router(state);

    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    match &config.tls {
        Some(paths) => {
            // The ring crypto provider must be installed before any TLS operation.
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "Failed to install rustls crypto provider")?;

            let tls_config = RustlsConfig::from_pem_file(&paths.cert, &paths.key).await?;

            tracing::info!(address = %config.bind_addr, "Listening on https (docs at /docs)");
            axum_server::bind_rustls(config.bind_addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(address = %config.bind_addr, "Listening on http (docs at /docs)");
            serve_plain(config.bind_addr, app, handle).await?;
        }
    }

    tracing::info!("Transfer gateway stopped");
    Ok(())
}

async fn serve_plain(
    addr: SocketAddr,
    app: Router,
    handle: Handle<SocketAddr>,
) -> std::io::Result<()> {
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
}

async fn shutdown_on_signal(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
