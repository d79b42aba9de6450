use std::{sync::Arc, time::Duration};

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use anyhow::Context;
use once_cell::sync::Lazy;
use portfolio_relay::{
    background_task::start_eviction_task,
    constants::START_TIME,
    graceful_shutdown::shutdown_signal,
    mail::SmtpMailer,
    middlewares::cors::{relay_cors, security_headers},
    routes::configure_routes,
    settings::AppConfig,
    telemetry::init_tracing,
    AppState,
};
use tracing_actix_web::TracingLogger;

const EVICTION_INTERVAL: Duration = Duration::from_secs(30);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config);
    Lazy::force(&START_TIME);
    tracing::info!("Loaded configuration: {:?}", config);

    let mailer = Arc::new(
        SmtpMailer::new(&config.smtp()).context("Failed to build SMTP transport")?
    );

    // Bad credentials should show up in the logs at boot, not on the first visitor
    let verifier = mailer.clone();
    tokio::spawn(async move {
        match verifier.verify().await {
            Ok(true) => tracing::info!("[SMTP] OK"),
            Ok(false) => tracing::warn!("[SMTP] Server did not accept the test connection"),
            Err(e) => tracing::error!("[SMTP] Verification failed: {}", e),
        }
    });

    let app_state = web::Data::new(AppState::new(&config, mailer));
    let cors_origins = config.cors_origins();

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    tokio::spawn(start_eviction_task(app_state.limiter.clone(), EVICTION_INTERVAL));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(security_headers())
            .wrap(relay_cors(&cors_origins))
            .wrap(TracingLogger::default())
            .wrap(NormalizePath::trim())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run();

    tokio::select! {
        res = server => res.context("HTTP server failed")?,
        _ = shutdown_signal() => {},
    }

    Ok(())
}
