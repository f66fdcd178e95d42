use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::period::{Month, Period};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 3,
    "worker_id": 1,
    "worker_name": "Ada Obi",
    "month": "January",
    "year": 2026,
    "total_days_present": 20,
    "daily_rate": "500.00",
    "amount": "10000.00",
    "paid_at": "2026-01-31T17:00:00"
}))]
pub struct SalaryRecord {
    pub id: u64,
    pub worker_id: u64,
    pub worker_name: String,
    #[schema(value_type = String, example = "January")]
    pub month: Month,
    pub year: i32,
    pub total_days_present: u32,
    #[schema(value_type = String)]
    pub daily_rate: Decimal,
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[schema(value_type = String, format = "date-time")]
    pub paid_at: NaiveDateTime,
}

/// A computed salary ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewSalary {
    pub worker_id: u64,
    pub period: Period,
    pub total_days_present: u32,
    pub daily_rate: Decimal,
    pub amount: Decimal,
    pub paid_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ArchivedSalary {
    #[serde(flatten)]
    pub record: SalaryRecord,
    pub archive_batch: String,
    #[schema(value_type = String, format = "date-time")]
    pub archived_at: NaiveDateTime,
}
