use chrono::{Local, NaiveDate};
use tracing::info;

use crate::error::ServiceError;
use crate::model::attendance::{
    ArchivedAttendance, AttendanceRecord, AttendanceStatus, NewAttendance,
};
use crate::model::filter::{AttendanceFilter, AttendanceQuery};
use crate::store::RecordStore;
use crate::utils::worker_cache::WorkerCache;

/// Number of records marked exactly `Present`.
pub fn count_present<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> u32 {
    records
        .into_iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count() as u32
}

/// Days present across the worker's live records. Unknown workers have 0.
pub async fn total_days_present<S: RecordStore>(
    store: &S,
    worker_id: u64,
) -> Result<u32, ServiceError> {
    let records = store
        .attendance(&AttendanceFilter::for_worker(worker_id))
        .await?;
    Ok(count_present(&records))
}

/// Live records matching every supplied filter. A malformed filter value
/// yields an empty list.
pub async fn filter_attendance<S: RecordStore>(
    store: &S,
    query: AttendanceQuery,
) -> Result<Vec<AttendanceRecord>, ServiceError> {
    match query.into_filter() {
        Some(filter) => Ok(store.attendance(&filter).await?),
        None => Ok(Vec::new()),
    }
}

pub async fn attendance_history<S: RecordStore>(
    store: &S,
    query: AttendanceQuery,
) -> Result<Vec<ArchivedAttendance>, ServiceError> {
    match query.into_filter() {
        Some(filter) => Ok(store.attendance_history(&filter).await?),
        None => Ok(Vec::new()),
    }
}

pub async fn record_attendance<S: RecordStore>(
    store: &S,
    cache: &WorkerCache,
    mark: NewAttendance,
) -> Result<AttendanceRecord, ServiceError> {
    if cache.get(store, mark.worker_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("Worker {}", mark.worker_id)));
    }

    let date: NaiveDate = mark
        .attendance_date
        .unwrap_or_else(|| Local::now().date_naive());
    let record = store
        .insert_attendance(mark.worker_id, date, mark.status)
        .await?;

    info!(
        worker_id = record.worker_id,
        attendance_id = record.id,
        status = %record.status,
        "Attendance recorded"
    );
    Ok(record)
}
