use std::time::Duration;

use moka::future::Cache;

use crate::model::worker::Worker;
use crate::store::{RecordStore, StoreError};

/// Worker lookups by id, kept for `ttl` after the last load.
/// Only hits are cached; an unknown id always goes to the store.
#[derive(Clone)]
pub struct WorkerCache {
    workers: Cache<u64, Worker>,
}

impl WorkerCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            workers: Cache::builder()
                .max_capacity(10_000) // tune based on headcount
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get<S: RecordStore>(&self, store: &S, id: u64) -> Result<Option<Worker>, StoreError> {
        if let Some(worker) = self.workers.get(&id).await {
            return Ok(Some(worker));
        }

        let worker = store.worker(id).await?;
        if let Some(w) = &worker {
            self.workers.insert(id, w.clone()).await;
        }
        Ok(worker)
    }

    pub async fn invalidate(&self, id: u64) {
        self.workers.invalidate(&id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::test_support::new_worker;

    #[actix_web::test]
    async fn serves_hits_until_invalidated() {
        let store = InMemoryStore::new();
        let cache = WorkerCache::new(Duration::from_secs(60));
        let ada = store.insert_worker(&new_worker("Ada", 500)).await.unwrap();

        assert_eq!(cache.get(&store, ada.id).await.unwrap(), Some(ada.clone()));

        store.delete_worker(ada.id).await.unwrap();
        assert_eq!(cache.get(&store, ada.id).await.unwrap(), Some(ada.clone()));

        cache.invalidate(ada.id).await;
        assert_eq!(cache.get(&store, ada.id).await.unwrap(), None);
    }

    #[actix_web::test]
    async fn unknown_ids_are_not_cached() {
        let store = InMemoryStore::new();
        let cache = WorkerCache::new(Duration::from_secs(60));

        assert_eq!(cache.get(&store, 1).await.unwrap(), None);
        let ada = store.insert_worker(&new_worker("Ada", 500)).await.unwrap();
        assert_eq!(cache.get(&store, 1).await.unwrap(), Some(ada));
    }
}
