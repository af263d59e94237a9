use model::entities::hostel_media;
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Public hostel galleries, keyed by hostel id.
///
/// Every media write bumps `generation` before invalidating. A load that sees
/// the generation move while it was reading drops the entry it just stored,
/// so a gallery read concurrently with a write is never served from cache.
#[derive(Clone, Debug)]
pub struct GalleryCache {
    entries: Cache<Uuid, Vec<hostel_media::Model>>,
    generation: Arc<AtomicU64>,
}

impl GalleryCache {
    pub fn new(max_capacity: u64, time_to_live: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(time_to_live)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Cached gallery of `hostel_id`, or the result of `load` on a miss.
    pub async fn get_or_load<F, Fut, E>(&self, hostel_id: Uuid, load: F) -> Result<Vec<hostel_media::Model>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<hostel_media::Model>, E>>,
    {
        if let Some(items) = self.entries.get(&hostel_id).await {
            debug!(%hostel_id, "Gallery cache hit");
            return Ok(items);
        }

        let seen = self.generation.load(Ordering::SeqCst);
        let items = load().await?;
        self.entries.insert(hostel_id, items.clone()).await;

        if self.generation.load(Ordering::SeqCst) != seen {
            debug!(%hostel_id, "Gallery changed while loading, not caching");
            self.entries.invalidate(&hostel_id).await;
        }
        Ok(items)
    }

    /// Call after the write has committed.
    pub async fn invalidate(&self, hostel_id: Uuid) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.invalidate(&hostel_id).await;
    }

    #[cfg(test)]
    async fn cached(&self, hostel_id: Uuid) -> Option<Vec<hostel_media::Model>> {
        self.entries.get(&hostel_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use model::entities::hostel_media::MediaType;

    fn item(hostel_id: Uuid, url: &str) -> hostel_media::Model {
        hostel_media::Model {
            id: Uuid::new_v4(),
            hostel_id,
            url: url.to_string(),
            media_type: MediaType::Image,
            is_thumbnail: true,
            position: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_hit_skips_loader() {
        let cache = GalleryCache::new(10, Duration::from_secs(60));
        let hostel_id = Uuid::new_v4();
        let loads = AtomicU64::new(0);

        for _ in 0..2 {
            let items: Result<_, ()> = cache
                .get_or_load(hostel_id, || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![item(hostel_id, "a.jpg")])
                })
                .await;
            assert_eq!(items.unwrap()[0].url, "a.jpg");
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        cache.invalidate(hostel_id).await;
        assert!(cache.cached(hostel_id).await.is_none());
    }

    #[tokio::test]
    async fn test_write_during_load_is_not_cached() {
        let cache = GalleryCache::new(10, Duration::from_secs(60));
        let hostel_id = Uuid::new_v4();

        // The write lands after the read loaded the old gallery
        let writer = cache.clone();
        let stale: Result<_, ()> = cache
            .get_or_load(hostel_id, || async move {
                let old = vec![item(hostel_id, "old.jpg")];
                writer.invalidate(hostel_id).await;
                Ok(old)
            })
            .await;
        assert_eq!(stale.unwrap()[0].url, "old.jpg");
        assert!(cache.cached(hostel_id).await.is_none());

        let fresh: Result<_, ()> = cache
            .get_or_load(hostel_id, || async { Ok(vec![item(hostel_id, "new.jpg")]) })
            .await;
        assert_eq!(fresh.unwrap()[0].url, "new.jpg");
        assert_eq!(cache.cached(hostel_id).await.unwrap()[0].url, "new.jpg");
    }

    #[tokio::test]
    async fn test_loader_error_is_returned_and_not_cached() {
        let cache = GalleryCache::new(10, Duration::from_secs(60));
        let hostel_id = Uuid::new_v4();

        let failed = cache
            .get_or_load(hostel_id, || async { Err::<Vec<hostel_media::Model>, _>("store down") })
            .await;
        assert_eq!(failed.unwrap_err(), "store down");
        assert!(cache.cached(hostel_id).await.is_none());
    }
}
