mod config;
mod db;
mod errors;
mod matching;
mod models;
mod notify;
mod pipeline;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::matching::cache::RedisCacheStore;
use crate::notify::push::HttpPushSender;
use crate::notify::run_daily_sweep;
use crate::pipeline::store::PgMatchResultStore;
use crate::pipeline::subscription::PgSubscriptionLookup;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config::default_log_directive(&config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize the Redis-backed match cache
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = Arc::new(RedisCacheStore::new(redis));
    info!("Redis match cache initialized");

    // Initialize push delivery
    let push = Arc::new(HttpPushSender::new(config.push_endpoint.clone()));
    info!("Push sender initialized ({})", config.push_endpoint);

    // Billing subscription read, used only for auto-apply ranking
    let subscriptions = Arc::new(PgSubscriptionLookup::new(db.clone()));

    // Match result persistence for the scoring pipeline
    let matches = Arc::new(PgMatchResultStore::new(db.clone()));

    // Build app state
    let state = AppState {
        db: db.clone(),
        cache,
        push: push.clone(),
        matches,
        subscriptions,
        config: config.clone(),
    };

    // Scheduled notification sweep; the HTTP route covers manual reruns
    let sweep_interval = Duration::from_secs(config.sweep_interval_hours * 3600);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.tick().await; // first tick fires immediately; wait a full period
        loop {
            ticker.tick().await;
            match run_daily_sweep(&db, push.as_ref()).await {
                Ok(summary) => info!(
                    "Scheduled sweep done: {} users notified",
                    summary.users_notified
                ),
                Err(e) => error!("Scheduled sweep failed: {e}"),
            }
        }
    });
    info!(
        "Notification sweep scheduled every {}h",
        config.sweep_interval_hours
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
