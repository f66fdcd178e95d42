use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::model::filter::{AttendanceFilter, SalaryQuery};
use crate::model::period::Period;
use crate::model::salary::{ArchivedSalary, NewSalary, SalaryRecord};
use crate::service::attendance::{count_present, total_days_present};
use crate::store::RecordStore;
use crate::utils::worker_cache::WorkerCache;

/// `days * daily_rate`. Negative rates are rejected.
pub fn salary_for(days_present: u32, daily_rate: Decimal) -> Result<Decimal, ServiceError> {
    if daily_rate < Decimal::ZERO {
        return Err(ServiceError::Validation(
            "daily_rate must not be negative".into(),
        ));
    }
    Ok(Decimal::from(days_present) * daily_rate)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SalaryQuote {
    #[schema(example = 1)]
    pub worker_id: u64,
    #[schema(example = 20)]
    pub total_days_present: u32,
    #[schema(value_type = String, example = "500")]
    pub daily_rate: Decimal,
    #[schema(value_type = String, example = "10000")]
    pub amount: Decimal,
}

pub async fn compute_salary<S: RecordStore>(
    store: &S,
    worker_id: u64,
    daily_rate: Decimal,
) -> Result<SalaryQuote, ServiceError> {
    // validate before touching the store
    salary_for(0, daily_rate)?;
    let days = total_days_present(store, worker_id).await?;
    Ok(SalaryQuote {
        worker_id,
        total_days_present: days,
        daily_rate,
        amount: salary_for(days, daily_rate)?,
    })
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordSalary {
    #[schema(example = 1)]
    pub worker_id: u64,
    #[schema(example = "January")]
    pub month: String,
    #[schema(example = 2026)]
    pub year: i32,
    /// Falls back to the worker's stored daily rate
    #[schema(value_type = Option<String>, example = "500")]
    pub daily_rate: Option<Decimal>,
}

/// Computes the worker's salary and stores it in the live salary table,
/// stamped with the requested period.
///
/// Days present are counted over every live attendance record of the worker,
/// not only those inside the period: live attendance is expected to hold the
/// current period alone until it is archived, so the count matches
/// [`compute_salary`].
pub async fn record_salary<S: RecordStore>(
    store: &S,
    cache: &WorkerCache,
    req: RecordSalary,
) -> Result<SalaryRecord, ServiceError> {
    let period = Period::parse(&req.month, req.year)?;
    let worker = cache
        .get(store, req.worker_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Worker {}", req.worker_id)))?;

    let daily_rate = req.daily_rate.unwrap_or(worker.daily_rate);
    let quote = compute_salary(store, worker.id, daily_rate).await?;

    let record = store
        .insert_salary(&NewSalary {
            worker_id: worker.id,
            period,
            total_days_present: quote.total_days_present,
            daily_rate,
            amount: quote.amount,
            paid_at: chrono::Utc::now().naive_utc(),
        })
        .await?;

    info!(
        worker_id = record.worker_id,
        salary_id = record.id,
        amount = %record.amount,
        "Salary recorded"
    );
    Ok(record)
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SalaryOverviewRow {
    pub id: u64,
    pub name: String,
    #[schema(value_type = String)]
    pub daily_rate: Decimal,
    pub total_days_present: u32,
    #[schema(value_type = String)]
    pub projected_amount: Decimal,
}

/// Days present and projected pay for every worker, ordered by name.
pub async fn salary_overview<S: RecordStore>(
    store: &S,
) -> Result<Vec<SalaryOverviewRow>, ServiceError> {
    let workers = store.workers().await?;
    let attendance = store.attendance(&AttendanceFilter::default()).await?;

    workers
        .into_iter()
        .map(|w| -> Result<SalaryOverviewRow, ServiceError> {
            let days = count_present(attendance.iter().filter(|r| r.worker_id == w.id));
            Ok(SalaryOverviewRow {
                projected_amount: salary_for(days, w.daily_rate)?,
                id: w.id,
                name: w.name,
                daily_rate: w.daily_rate,
                total_days_present: days,
            })
        })
        .collect()
}

pub async fn filter_salary<S: RecordStore>(
    store: &S,
    query: SalaryQuery,
) -> Result<Vec<SalaryRecord>, ServiceError> {
    match query.into_filter() {
        Some(filter) => Ok(store.salaries(&filter).await?),
        None => Ok(Vec::new()),
    }
}

pub async fn salary_history<S: RecordStore>(
    store: &S,
    query: SalaryQuery,
) -> Result<Vec<ArchivedSalary>, ServiceError> {
    match query.into_filter() {
        Some(filter) => Ok(store.salary_history(&filter).await?),
        None => Ok(Vec::new()),
    }
}
