use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::period::Month;

/// Daily attendance mark. Parsing is case-sensitive: only `Present` counts
/// towards paid days.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "worker_id": 1,
    "worker_name": "Ada Obi",
    "attendance_date": "2026-01-05",
    "month": "January",
    "year": 2026,
    "status": "Present"
}))]
pub struct AttendanceRecord {
    pub id: u64,
    pub worker_id: u64,
    pub worker_name: String,
    #[schema(value_type = String, format = "date")]
    pub attendance_date: NaiveDate,
    #[schema(value_type = String, example = "January")]
    pub month: Month,
    pub year: i32,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn new(
        id: u64,
        worker_id: u64,
        worker_name: String,
        attendance_date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            id,
            worker_id,
            worker_name,
            attendance_date,
            month: Month::of(attendance_date),
            year: attendance_date.year(),
            status,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAttendance {
    #[schema(example = 1)]
    pub worker_id: u64,
    #[schema(example = "Present")]
    pub status: AttendanceStatus,
    /// Defaults to today when omitted
    #[schema(example = "2026-01-05", value_type = Option<String>, format = "date")]
    pub attendance_date: Option<NaiveDate>,
}

/// An attendance record moved out of the live table.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ArchivedAttendance {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    #[schema(example = "0b6f0c1e-8d4f-4d41-9a57-3c1f0c9d2a11")]
    pub archive_batch: String,
    #[schema(value_type = String, format = "date-time")]
    pub archived_at: NaiveDateTime,
}
