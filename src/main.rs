// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use relational_content_server::{
    api::router,
    auth::{GateConfig, TokenService},
    config::{Config, LogFormat},
    mailer::{Mailer, NoopMailer, SmtpMailer},
    state::AppState,
};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let tokens = TokenService::new(
        &config.secret_key,
        config.access_token_ttl_secs,
        config.refresh_token_ttl_secs,
    );

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => match SmtpMailer::new(smtp) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                tracing::warn!(error = %e, "SMTP misconfigured, outbound mail disabled");
                Arc::new(NoopMailer)
            }
        },
        None => Arc::new(NoopMailer),
    };

    let state = AppState::new(tokens, GateConfig::default(), mailer);
    let app = router(state);

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid bind address {}:{}: {e}", config.host, config.port);
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "Content server listening (docs at /docs)");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
