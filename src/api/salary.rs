use actix_web::{HttpResponse, Responder, web};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::ArchiveRequest;
use crate::model::filter::SalaryQuery;
use crate::model::period::Period;
use crate::service::archive;
use crate::service::salary::{self, RecordSalary};
use crate::store::RecordStore;
use crate::utils::worker_cache::WorkerCache;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ComputeQuery {
    #[schema(example = 1)]
    pub worker_id: u64,
    #[schema(example = "500", value_type = String)]
    /// Per-day wage; must not be negative
    pub daily_rate: Decimal,
}

/// Compute a salary without storing it
#[utoipa::path(
    get,
    path = "/api/salary/compute",
    params(ComputeQuery),
    responses(
        (status = 200, description = "Days present times daily rate", body = crate::service::salary::SalaryQuote),
        (status = 400, description = "Negative daily rate", body = Object, example = json!({
            "message": "daily_rate must not be negative"
        }))
    ),
    tag = "Salary"
)]
pub async fn compute_salary<S: RecordStore>(
    store: web::Data<S>,
    query: web::Query<ComputeQuery>,
) -> actix_web::Result<impl Responder> {
    let quote = salary::compute_salary(store.get_ref(), query.worker_id, query.daily_rate).await?;
    Ok(HttpResponse::Ok().json(quote))
}

/// Compute and store a worker's salary for a period
#[utoipa::path(
    post,
    path = "/api/salary",
    request_body = RecordSalary,
    responses(
        (status = 201, description = "Salary recorded", body = crate::model::salary::SalaryRecord),
        (status = 400, description = "Malformed period or negative rate"),
        (status = 404, description = "Worker not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Salary"
)]
pub async fn record_salary<S: RecordStore>(
    store: web::Data<S>,
    cache: web::Data<WorkerCache>,
    payload: web::Json<RecordSalary>,
) -> actix_web::Result<impl Responder> {
    let record =
        salary::record_salary(store.get_ref(), cache.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(record))
}

/// List live salary records
#[utoipa::path(
    get,
    path = "/api/salary",
    params(SalaryQuery),
    responses(
        (status = 200, description = "Salary records in insertion order", body = [crate::model::salary::SalaryRecord])
    ),
    tag = "Salary"
)]
pub async fn list_salaries<S: RecordStore>(
    store: web::Data<S>,
    query: web::Query<SalaryQuery>,
) -> actix_web::Result<impl Responder> {
    let records = salary::filter_salary(store.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Days present and projected pay for every worker
#[utoipa::path(
    get,
    path = "/api/salary/overview",
    responses(
        (status = 200, description = "One row per worker, ordered by name", body = [crate::service::salary::SalaryOverviewRow])
    ),
    tag = "Salary"
)]
pub async fn salary_overview<S: RecordStore>(
    store: web::Data<S>,
) -> actix_web::Result<impl Responder> {
    let rows = salary::salary_overview(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/salary/history",
    params(SalaryQuery),
    responses(
        (status = 200, description = "Archived salary records", body = [crate::model::salary::ArchivedSalary])
    ),
    tag = "Salary"
)]
pub async fn salary_history<S: RecordStore>(
    store: web::Data<S>,
    query: web::Query<SalaryQuery>,
) -> actix_web::Result<impl Responder> {
    let records = salary::salary_history(store.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Move a period's salary records into history
#[utoipa::path(
    post,
    path = "/api/salary/archive",
    request_body = ArchiveRequest,
    responses(
        (status = 200, description = "Period archived", body = crate::service::archive::ArchiveReport),
        (status = 400, description = "Malformed period"),
        (status = 500, description = "Archive failed; nothing was moved")
    ),
    tag = "Salary"
)]
pub async fn archive_salary<S: RecordStore>(
    store: web::Data<S>,
    payload: web::Json<ArchiveRequest>,
) -> actix_web::Result<impl Responder> {
    let period = Period::parse(&payload.month, payload.year)?;
    let report = archive::archive_salary(store.get_ref(), period).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};
    use serde_json::{Value, json};
    use std::time::Duration;

    use crate::model::attendance::AttendanceStatus;
    use crate::routes;
    use crate::store::{InMemoryStore, RecordStore};
    use crate::test_support::{date, new_worker};
    use crate::utils::worker_cache::WorkerCache;

    async fn seeded() -> web::Data<InMemoryStore> {
        let store = InMemoryStore::new();
        let a = store.insert_worker(&new_worker("A", 500)).await.unwrap();
        for day in 1..=20 {
            store
                .insert_attendance(a.id, date(2026, 1, day), AttendanceStatus::Present)
                .await
                .unwrap();
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
    async fn computes_without_storing() {
        let store = seeded().await;
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/api/salary/compute?worker_id=1&daily_rate=500")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_days_present"], 20);
        assert_eq!(body["amount"], "10000");

        let req = test::TestRequest::get()
            .uri("/api/salary/compute?worker_id=1&daily_rate=-1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        assert!(store.salaries(&Default::default()).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn record_list_and_archive_salary() {
        let store = seeded().await;
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/api/salary")
            .set_json(json!({"worker_id": 1, "month": "January", "year": 2026}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let req = test::TestRequest::get()
            .uri("/api/salary?month=Jan")
            .to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["worker_name"], "A");

        let req = test::TestRequest::post()
            .uri("/api/salary/archive")
            .set_json(json!({"month": "Jan", "year": 2026}))
            .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["archived"], 1);

        let req = test::TestRequest::get().uri("/api/salary").to_request();
        let live: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(live, json!([]));

        let req = test::TestRequest::get()
            .uri("/api/salary/history?year=2026")
            .to_request();
        let history: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(history[0]["amount"], listed[0]["amount"]);
    }

    #[actix_web::test]
    async fn archive_rejects_out_of_range_year() {
        let store = seeded().await;
        let app = app!(store);

        let req = test::TestRequest::post()
            .uri("/api/salary/archive")
            .set_json(json!({"month": "Jan", "year": 12}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn overview_has_one_row_per_worker() {
        let store = seeded().await;
        store.insert_worker(&new_worker("B", 100)).await.unwrap();
        let app = app!(store);

        let req = test::TestRequest::get()
            .uri("/api/salary/overview")
            .to_request();
        let rows: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[0]["projected_amount"], "10000");
        assert_eq!(rows[1]["total_days_present"], 0);
    }
}
