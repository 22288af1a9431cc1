//! Application entry point for the `skycast` dashboard service.
//!
//! This binary orchestrates the full startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the session dashboard and its outbound API client
//! - Starting the load-time fetches (feature importance, city comparison)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `PREDICTION_API_URL` (optional) – prediction service base URL
//! - `ARCHIVE_API_URL` (optional) – weather archive base URL
//! - `BIND_PORT` (optional) – listening port (default: 8080)
//! - `SKYCAST_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `SKYCAST_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use skycast::{config, routes, ApiClient, Dashboard};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let dashboard = Arc::new(Dashboard::new(ApiClient::from_config(&cfg)));

    // Load-time panels fill in the background; failures only leave them empty.
    let _mount = dashboard.spawn_mount_tasks();

    let app: Router = routes::router(dashboard);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.bind_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// - Color output controlled by TTY detection and `FORCE_COLOR`:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span events controlled by `SKYCAST_SPAN_EVENTS`:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Level from `RUST_LOG`, falling back to `SKYCAST_LOG_LEVEL`
///
/// Call once, before any tracing macro runs.
fn init_tracing() {
    // ---
    let span_events = match env::var("SKYCAST_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("SKYCAST_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=info,reqwest=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
