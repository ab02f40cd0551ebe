use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use milltrack_api::{
    api_v1_routes, config, db, events, health_check, openapi, AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!(environment = %cfg.environment, "Starting milltrack-api");

    // Database pool, registered as the process-wide singleton
    let pool = db::establish_connection_from_app_config(&cfg).await?;
    let db_arc = db::init_global_pool(Arc::new(pool));

    if cfg.auto_migrate {
        info!("Running database migrations");
        db::run_migrations(&db_arc).await?;
    }

    // Event channel and background consumer
    let (event_sender, event_receiver) = events::create_event_channel(cfg.event_channel_capacity);
    tokio::spawn(events::process_events(event_receiver));

    let app_state = Arc::new(AppState::new(db_arc, cfg.clone(), Arc::new(event_sender)));

    // CORS from config: explicit origins, else permissive in
    // development or by override, else refuse to start
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    let cors_layer = if let Some(origins) = configured_origins {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        info!("Using permissive CORS (no explicit origins configured)");
        CorsLayer::permissive()
    } else {
        error!("Missing CORS configuration; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
        return Err(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
                .into(),
        );
    };

    let app = Router::new()
        .route("/", get(|| async { "milltrack-api up" }))
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    info!("milltrack-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => error!("Failed to install SIGTERM handler: {}", err),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
