//! Bazar Pepe Storefront - server-rendered shop front.
//!
//! Serves the public catalog, cart and checkout, the visitor's account pages,
//! and the admin back office. All data comes from the Bazar Pepe REST API;
//! the visitor's token, role and cart live in their session.
//!
//! The binary reads `StorefrontConfig` from the environment, reports to Sentry
//! when `SENTRY_DSN` is set, logs through `tracing` (`RUST_LOG` overrides the
//! default filter) and serves until Ctrl+C or SIGTERM.

#![cfg_attr(not(test), forbid(unsafe_code))]

use bazar_pepe_storefront::{app, config::StorefrontConfig, state::AppState};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Start Sentry with the configured DSN, environment and sample rates.
///
/// Returns `None` when no DSN is configured. The guard flushes pending
/// events on drop, so `main` holds it until shutdown.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Warnings and errors (failed API calls, checkout failures) become Sentry
/// events; info and debug lines ride along as breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // API base URL, bind address and Sentry settings
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Sentry first so the tracing layer below has a client to report to
    let _sentry_guard = init_sentry(&config);

    // Handler and API client logs at info, per-request spans from TraceLayer at debug
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazar_pepe_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let addr = config.socket_addr();
    tracing::info!(api = %config.api_base_url, "Using Bazar Pepe API");

    let state = AppState::new(config).expect("Failed to initialize application state");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!("storefront listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
