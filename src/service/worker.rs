use rust_decimal::Decimal;
use tracing::info;

use crate::error::ServiceError;
use crate::model::worker::{NewWorker, Worker};
use crate::store::RecordStore;
use crate::utils::worker_cache::WorkerCache;

fn validate(worker: &NewWorker) -> Result<(), ServiceError> {
    if worker.name.trim().is_empty() {
        return Err(ServiceError::Validation("name must not be empty".into()));
    }
    if worker.phone_number.trim().is_empty() {
        return Err(ServiceError::Validation(
            "phone_number must not be empty".into(),
        ));
    }
    if worker.daily_rate < Decimal::ZERO {
        return Err(ServiceError::Validation(
            "daily_rate must not be negative".into(),
        ));
    }
    if worker.date_of_employment < worker.date_of_birth {
        return Err(ServiceError::Validation(
            "date_of_employment cannot be before date_of_birth".into(),
        ));
    }
    Ok(())
}

pub async fn register_worker<S: RecordStore>(
    store: &S,
    mut worker: NewWorker,
) -> Result<Worker, ServiceError> {
    worker.name = worker.name.trim().to_string();
    validate(&worker)?;

    let worker = store.insert_worker(&worker).await?;
    info!(worker_id = worker.id, "Worker registered");
    Ok(worker)
}

pub async fn list_workers<S: RecordStore>(store: &S) -> Result<Vec<Worker>, ServiceError> {
    Ok(store.workers().await?)
}

pub async fn get_worker<S: RecordStore>(
    store: &S,
    cache: &WorkerCache,
    id: u64,
) -> Result<Worker, ServiceError> {
    cache
        .get(store, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Worker {id}")))
}

/// Deletes the worker together with their live records. History is kept.
pub async fn delete_worker<S: RecordStore>(
    store: &S,
    cache: &WorkerCache,
    id: u64,
) -> Result<(), ServiceError> {
    let deleted = store.delete_worker(id).await?;
    cache.invalidate(id).await;
    if !deleted {
        return Err(ServiceError::NotFound(format!("Worker {id}")));
    }
    info!(worker_id = id, "Worker deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::test_support::new_worker;
    use std::time::Duration;

    #[actix_web::test]
    async fn rejects_negative_rates_and_blank_names() {
        let store = InMemoryStore::new();

        let err = register_worker(&store, new_worker("Ada", -1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = register_worker(&store, new_worker("   ", 500))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[actix_web::test]
    async fn delete_reports_missing_worker() {
        let store = InMemoryStore::new();
        let cache = WorkerCache::new(Duration::from_secs(60));
        let ada = register_worker(&store, new_worker(" Ada ", 500)).await.unwrap();
        assert_eq!(ada.name, "Ada");

        assert_eq!(get_worker(&store, &cache, ada.id).await.unwrap(), ada);
        delete_worker(&store, &cache, ada.id).await.unwrap();

        assert!(matches!(
            get_worker(&store, &cache, ada.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            delete_worker(&store, &cache, ada.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
