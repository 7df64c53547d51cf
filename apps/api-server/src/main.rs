//! # Tollgate API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod cookies;
mod handlers;
mod middleware;
mod state;
mod telemetry;

#[cfg(test)]
mod testing;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    tracing::info!(
        "Starting Tollgate API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application state");
        std::io::Error::other(e)
    })?;

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
