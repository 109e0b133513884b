use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::matching::cache::CacheStore;
use crate::notify::push::PushSender;
use crate::pipeline::store::MatchResultStore;
use crate::pipeline::subscription::SubscriptionLookup;

/// Shared application state injected into all route handlers via Axum
/// extractors. The external collaborators sit behind trait objects so tests
/// and alternate deployments can swap them without touching handler code.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Per-user match score cache. Default: Redis, one key per user.
    pub cache: Arc<dyn CacheStore>,
    /// Push delivery. Default: HTTP sender against the configured endpoint.
    pub push: Arc<dyn PushSender>,
    /// Match result persistence for the scoring pipeline.
    pub matches: Arc<dyn MatchResultStore>,
    /// Billing's subscription read, consumed only for auto-apply ranking.
    pub subscriptions: Arc<dyn SubscriptionLookup>,
    pub config: Config,
}
