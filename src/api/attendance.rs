use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::api::ArchiveRequest;
use crate::model::attendance::NewAttendance;
use crate::model::filter::AttendanceQuery;
use crate::model::period::Period;
use crate::service::archive;
use crate::service::attendance;
use crate::store::RecordStore;
use crate::utils::worker_cache::WorkerCache;

/// Record attendance for a worker
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = NewAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "Invalid status or date"),
        (status = 404, description = "Worker not found", body = Object, example = json!({
            "message": "Worker 7 not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn record_attendance<S: RecordStore>(
    store: web::Data<S>,
    cache: web::Data<WorkerCache>,
    payload: web::Json<NewAttendance>,
) -> actix_web::Result<impl Responder> {
    let record =
        attendance::record_attendance(store.get_ref(), cache.get_ref(), payload.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(record))
}

/// List live attendance records
///
/// Every supplied filter must match. Blank filters are ignored; a filter
/// value that cannot match anything (e.g. `month=Foo`) gives an empty list.
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records in insertion order", body = [crate::model::attendance::AttendanceRecord])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance<S: RecordStore>(
    store: web::Data<S>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let records = attendance::filter_attendance(store.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Total days present for a worker across live records
#[utoipa::path(
    get,
    path = "/api/attendance/total/{worker_id}",
    params(
        ("worker_id", Path, description = "Worker ID")
    ),
    responses(
        (status = 200, description = "Days present", body = Object, example = json!({
            "worker_id": 1,
            "total_days_present": 20
        }))
    ),
    tag = "Attendance"
)]
pub async fn total_days_present<S: RecordStore>(
    store: web::Data<S>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let worker_id = path.into_inner();
    let days = attendance::total_days_present(store.get_ref(), worker_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "worker_id": worker_id,
        "total_days_present": days
    })))
}

#[utoipa::path(
    get,
    path = "/api/attendance/history",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Archived attendance records", body = [crate::model::attendance::ArchivedAttendance])
    ),
    tag = "Attendance"
)]
pub async fn attendance_history<S: RecordStore>(
    store: web::Data<S>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let records = attendance::attendance_history(store.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Move a period's attendance into history
#[utoipa::path(
    post,
    path = "/api/attendance/archive",
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "Period archived", body = crate::service::archive::ArchiveReport),
        (status = 400, description = "Malformed period", body = Object, example = json!({
            "message": "invalid month: \"Foo\""
        })),
        (status = 500, description = "Archive failed; nothing was moved")
    ),
    tag = "Attendance"
)]
pub async fn archive_attendance<S: RecordStore>(
    store: web::Data<S>,
    payload: web::Json<ArchiveRequest>,
) -> actix_web::Result<impl Responder> {
    let period = Period::parse(&payload.month, payload.year)?;
    let report = archive::archive_attendance(store.get_ref(), period).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use crate::model::attendance::AttendanceStatus;
    use crate::routes;
    use crate::store::{InMemoryStore, RecordStore};
    use crate::test_support::{date, new_worker};
    use crate::utils::worker_cache::WorkerCache;
    use std::time::Duration;

    async fn seeded() -> web::Data<InMemoryStore> {
        let store = InMemoryStore::new();
        let a = store.insert_worker(&new_worker("A", 500)).await.unwrap();
        for (d, status) in [
            (date(2026, 1, 5), AttendanceStatus::Present),
            (date(2026, 1, 6), AttendanceStatus::Absent),
            (date(2026, 2, 2), AttendanceStatus::Present),
        ] {
            store.insert_attendance(a.id, d, status).await.unwrap();
        }
        web::Data::new(store)
    }

    macro_rules! app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data($store.clone())
                    .app_data(web::Data::new(WorkerCache::new(Duration::from_secs(60))))
                    .service(web::scope("/api").configure(routes::api::<InMemoryStore>)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn lists_with_filters() {
        let store = seeded().await;
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/api/attendance?month=Jan&name=A")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(body[0]["month"], "January");
        assert_eq!(body[0]["status"], "Present");
    }

    #[actix_web::test]
    async fn malformed_filter_gives_empty_list() {
        let store = seeded().await;
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/api/attendance?month=Foo")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn total_for_unknown_worker_is_zero() {
        let store = seeded().await;
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/api/attendance/total/1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_days_present"], 2);

        let req = test::TestRequest::get()
            .uri("/api/attendance/total/999")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_days_present"], 0);
    }

    #[actix_web::test]
    async fn records_new_attendance() {
        let store = seeded().await;
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .set_json(json!({"worker_id": 1, "status": "Late", "attendance_date": "2026-02-03"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .set_json(json!({"worker_id": 1, "status": "present"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .set_json(json!({"worker_id": 42, "status": "Present"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn archive_moves_period_into_history() {
        let store = seeded().await;
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/api/attendance/archive")
            .set_json(json!({"month": "Jan", "year": 2026}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["archived"], 2);
        assert_eq!(body["month"], "January");

        let req = test::TestRequest::get()
            .uri("/api/attendance/history?month=1&year=2026")
            .to_request();
        let history: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(history.as_array().unwrap().len(), 2);
        assert_eq!(history[0]["archive_batch"], body["batch"]);

        let live = store
            .attendance(&Default::default())
            .await
            .unwrap();
        assert_eq!(live.len(), 1);
    }

    #[actix_web::test]
    async fn archive_rejects_malformed_period() {
        let store = seeded().await;
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/api/attendance/archive")
            .set_json(json!({"month": "Foo", "year": 2026}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        assert_eq!(store.attendance(&Default::default()).await.unwrap().len(), 3);
    }
}
