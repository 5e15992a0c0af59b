use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::header::CACHE_CONTROL,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::common::Envelope;
use crate::domains::places::{self, PlaceError, StatusFilter};
use crate::kernel::ServerDeps;
use crate::server::app::AppState;
use crate::server::routes::places::parse_status_param;
use crate::server::ApiError;

struct CachedStats {
    envelope: Envelope,
    expires_at: Instant,
}

type StatsSlot = Arc<Mutex<Option<CachedStats>>>;

/// In-process cache of rendered stats envelopes, one entry per status filter.
///
/// Each filter has its own lock, held while recomputing, so concurrent misses
/// for one filter aggregate once and never block the other filters.
pub struct StatsCache {
    ttl: Duration,
    slots: Mutex<HashMap<StatusFilter, StatsSlot>>,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    async fn slot(&self, status: StatusFilter) -> StatsSlot {
        self.slots.lock().await.entry(status).or_default().clone()
    }

    /// Cached envelope and its remaining lifetime, computing it on a miss
    pub async fn get_or_compute(
        &self,
        status: StatusFilter,
        deps: &ServerDeps,
    ) -> Result<(Envelope, Duration), PlaceError> {
        let slot = self.slot(status).await;
        let mut entry = slot.lock().await;
        let now = Instant::now();

        if let Some(cached) = entry.as_ref() {
            if cached.expires_at > now {
                debug!(?status, "Serving cached stats");
                return Ok((cached.envelope.clone(), cached.expires_at - now));
            }
        }

        let envelope = places::get_stats(status, deps).await?;
        if !self.ttl.is_zero() {
            *entry = Some(CachedStats {
                envelope: envelope.clone(),
                expires_at: now + self.ttl,
            });
        }

        Ok((envelope, self.ttl))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsParams {
    pub status: Option<String>,
}

/// GET /stats
pub async fn stats_handler(
    Extension(state): Extension<AppState>,
    params: Result<Query<StatsParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let status = StatusFilter::from(parse_status_param(params.status.as_deref())?);

    let (envelope, remaining) = state.stats_cache.get_or_compute(status, &state.deps).await?;
    let cache_control = format!("private, max-age={}", remaining.as_secs());

    Ok(([(CACHE_CONTROL, cache_control)], Json(envelope)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::places::PlaceStatus;
    use crate::kernel::TestDependencies;

    #[tokio::test]
    async fn test_busy_filter_does_not_block_others() {
        let test = TestDependencies::new();
        let deps = test.server_deps();
        let cache = StatsCache::new(Duration::from_secs(60));

        let busy = cache.slot(StatusFilter::Only(PlaceStatus::Active)).await;
        let _computing = busy.lock().await;

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            cache.get_or_compute(StatusFilter::NotDeleted, &deps),
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_entries_expire_per_filter() {
        let test = TestDependencies::new();
        let deps = test.server_deps();
        let cache = StatsCache::new(Duration::from_secs(60));

        let (_, fresh) = cache.get_or_compute(StatusFilter::NotDeleted, &deps).await.unwrap();
        assert_eq!(fresh, Duration::from_secs(60));

        let (_, remaining) = cache.get_or_compute(StatusFilter::NotDeleted, &deps).await.unwrap();
        assert!(remaining <= fresh);
        assert!(cache.slot(StatusFilter::NotDeleted).await.lock().await.is_some());
        assert!(cache
            .slot(StatusFilter::Only(PlaceStatus::Active))
            .await
            .lock()
            .await
            .is_none());
    }
}
