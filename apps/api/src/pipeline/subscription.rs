use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::matching::PremiumSubscription;

/// Billing's subscription read. A lookup failure is treated by callers as
/// "not premium" — the user's ordinary match is still persisted.
#[async_trait]
pub trait SubscriptionLookup: Send + Sync {
    async fn get_subscription(&self, user_id: Uuid) -> Result<Option<PremiumSubscription>>;
}

pub struct PgSubscriptionLookup {
    pool: PgPool,
}

impl PgSubscriptionLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionLookup for PgSubscriptionLookup {
    async fn get_subscription(&self, user_id: Uuid) -> Result<Option<PremiumSubscription>> {
        Ok(sqlx::query_as::<_, PremiumSubscription>(
            "SELECT * FROM premium_subscriptions WHERE user_id = $1 AND is_active = true",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
