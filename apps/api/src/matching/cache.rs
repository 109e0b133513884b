//! Per-user persisted score cache: `job_id -> CacheEntry`, read and written
//! wholesale. Purely a performance layer — corruption or unavailability is a
//! cache miss, never an error surfaced to the caller, and last-writer-wins is
//! acceptable on concurrent saves.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::warn;
use uuid::Uuid;

use crate::models::matching::CacheEntry;

/// Storage seam for the client-side match cache. Held in `AppState` as
/// `Arc<dyn CacheStore>`; tests substitute an in-memory implementation.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Loads a user's full cache map. Absent or corrupt payloads yield an
    /// empty map.
    async fn load(&self, user_id: Uuid) -> HashMap<Uuid, CacheEntry>;

    /// Overwrites the user's full cache map. No merge at this layer; merging
    /// is the orchestrator's job.
    async fn save(&self, user_id: Uuid, entries: &HashMap<Uuid, CacheEntry>);
}

pub struct RedisCacheStore {
    client: redis::Client,
}

impl RedisCacheStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn key(user_id: Uuid) -> String {
        format!("match_cache:{user_id}")
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn load(&self, user_id: Uuid) -> HashMap<Uuid, CacheEntry> {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("match cache unavailable for user {user_id}: {e}");
                return HashMap::new();
            }
        };
        let payload: Option<String> = match conn.get(Self::key(user_id)).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("match cache read failed for user {user_id}: {e}");
                None
            }
        };
        decode_cache(payload.as_deref())
    }

    async fn save(&self, user_id: Uuid, entries: &HashMap<Uuid, CacheEntry>) {
        let payload = match serde_json::to_string(entries) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("match cache encode failed for user {user_id}: {e}");
                return;
            }
        };
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("match cache unavailable for user {user_id}: {e}");
                return;
            }
        };
        if let Err(e) = conn.set::<_, _, ()>(Self::key(user_id), payload).await {
            warn!("match cache write failed for user {user_id}: {e}");
        }
    }
}

/// Parses a cached payload, mapping absent or corrupt JSON to an empty map.
fn decode_cache(payload: Option<&str>) -> HashMap<Uuid, CacheEntry> {
    match payload {
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!("discarding corrupt match cache payload: {e}");
            HashMap::new()
        }),
        None => HashMap::new(),
    }
}
