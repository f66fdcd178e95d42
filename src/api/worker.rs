use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::model::worker::NewWorker;
use crate::service::worker as workers;
use crate::store::RecordStore;
use crate::utils::worker_cache::WorkerCache;

/// Register Worker
#[utoipa::path(
    post,
    path = "/api/workers",
    request_body = NewWorker,
    responses(
        (status = 201, description = "Worker registered", body = crate::model::worker::Worker),
        (status = 400, description = "Invalid worker details", body = Object, example = json!({
            "message": "name must not be empty"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Worker"
)]
pub async fn create_worker<S: RecordStore>(
    store: web::Data<S>,
    payload: web::Json<NewWorker>,
) -> actix_web::Result<impl Responder> {
    let worker = workers::register_worker(store.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(worker))
}

/// List workers ordered by name
#[utoipa::path(
    get,
    path = "/api/workers",
    responses(
        (status = 200, description = "All workers", body = [crate::model::worker::Worker])
    ),
    tag = "Worker"
)]
pub async fn list_workers<S: RecordStore>(
    store: web::Data<S>,
) -> actix_web::Result<impl Responder> {
    let list = workers::list_workers(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[utoipa::path(
    get,
    path = "/api/workers/{worker_id}",
    params(
        ("worker_id", Path, description = "Worker ID")
    ),
    responses(
        (status = 200, description = "Worker found", body = crate::model::worker::Worker),
        (status = 404, description = "Worker not found", body = Object, example = json!({
            "message": "Worker 7 not found"
        }))
    ),
    tag = "Worker"
)]
pub async fn get_worker<S: RecordStore>(
    store: web::Data<S>,
    cache: web::Data<WorkerCache>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let worker = workers::get_worker(store.get_ref(), cache.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(worker))
}

/// Delete Worker
///
/// Live attendance and salary records of the worker are removed with it;
/// history is kept.
#[utoipa::path(
    delete,
    path = "/api/workers/{worker_id}",
    params(
        ("worker_id", Path, description = "Worker ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Worker not found")
    ),
    tag = "Worker"
)]
pub async fn delete_worker<S: RecordStore>(
    store: web::Data<S>,
    cache: web::Data<WorkerCache>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    workers::delete_worker(store.get_ref(), cache.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
