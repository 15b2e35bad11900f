//! Guarda Memória server entry point.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, http::StatusCode, middleware};
use guarda_api::{AppState, TokenVerifier, middleware::auth_middleware, router as api_router};
use guarda_common::{
    Config,
    config::{LogFormat, LoggingConfig},
};
use guarda_core::{ScoreJobQueue, ScoreService, Services};
use guarda_db::repositories::{CityRepository, PostingRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Windows only Ctrl+C is observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "guarda_memoria=debug,guarda_core=debug,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing(&config.logging);

    info!("Starting Guarda Memória server...");

    let db = Arc::new(guarda_db::init(&config).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    guarda_db::migrate(&db).await?;
    info!("Migrations completed");

    let (score_queue, score_worker) = ScoreJobQueue::start(
        ScoreService::new(PostingRepository::new(Arc::clone(&db))),
        &config.scoring,
    );
    let services = Services::new(&db, &config.postings, Arc::new(score_queue));

    let filled = services.city.backfill_slugs().await?;
    if filled > 0 {
        info!(count = filled, "Backfilled city slugs");
    }
    let cities = CityRepository::new(Arc::clone(&db)).count().await?;
    info!(cities, "City catalogue loaded");

    let state = AppState {
        services,
        verifier: TokenVerifier::new(&config.auth),
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last queue handles; let the worker drain.
    if let Err(e) = score_worker.await {
        error!(error = %e, "Score worker ended abnormally");
    }

    info!("Server shutdown complete");
    Ok(())
}
