//! Moves a period's live records into the history tables.
//!
//! Each archive runs in a single store transaction: lock the period's live
//! rows, append every one of them to history, delete them from the live
//! table, commit. Any failure rolls the whole batch back and is returned to
//! the caller. Nothing is retried here.

use serde::Serialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::error::ServiceError;
use crate::model::period::Period;
use crate::store::{ArchiveBatch, RecordStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ArchiveReport {
    /// Batch id stamped on the history rows written by this action
    #[schema(example = "0b6f0c1e-8d4f-4d41-9a57-3c1f0c9d2a11")]
    pub batch: String,
    #[schema(value_type = String, example = "January")]
    pub month: String,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 42)]
    pub archived: u64,
}

impl ArchiveReport {
    fn new(batch: &ArchiveBatch, period: Period, archived: u64) -> Self {
        Self {
            batch: batch.id.clone(),
            month: period.month.to_string(),
            year: period.year,
            archived,
        }
    }
}

async fn finish<S: RecordStore>(
    store: &S,
    tx: S::Tx,
    moved: Result<u64, StoreError>,
    table: &str,
    period: Period,
) -> Result<u64, ServiceError> {
    match moved {
        Ok(n) => {
            store.commit(tx).await?;
            Ok(n)
        }
        Err(e) => {
            warn!(error = %e, table, ?period, "Archive failed, rolling back");
            if let Err(rb) = store.rollback(tx).await {
                error!(error = %rb, table, ?period, "Rollback failed");
            }
            Err(e.into())
        }
    }
}

fn check_deleted(locked: usize, deleted: u64) -> Result<u64, StoreError> {
    if deleted != locked as u64 {
        return Err(StoreError::ArchiveMismatch { locked, deleted });
    }
    Ok(deleted)
}

async fn move_attendance<S: RecordStore>(
    store: &S,
    tx: &mut S::Tx,
    batch: &ArchiveBatch,
    period: Period,
) -> Result<u64, StoreError> {
    let records = store.lock_attendance(tx, period).await?;
    for record in &records {
        store.append_attendance_history(tx, batch, record).await?;
    }
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    let deleted = store.delete_attendance(tx, &ids).await?;
    check_deleted(records.len(), deleted)
}

async fn move_salaries<S: RecordStore>(
    store: &S,
    tx: &mut S::Tx,
    batch: &ArchiveBatch,
    period: Period,
) -> Result<u64, StoreError> {
    let records = store.lock_salaries(tx, period).await?;
    for record in &records {
        store.append_salary_history(tx, batch, record).await?;
    }
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    let deleted = store.delete_salaries(tx, &ids).await?;
    check_deleted(records.len(), deleted)
}

pub async fn archive_attendance<S: RecordStore>(
    store: &S,
    period: Period,
) -> Result<ArchiveReport, ServiceError> {
    let batch = ArchiveBatch::new();
    let mut tx = store.begin().await?;
    let moved = move_attendance(store, &mut tx, &batch, period).await;
    let archived = finish(store, tx, moved, "attendance", period).await?;

    info!(batch = %batch.id, ?period, archived, "Attendance archived");
    Ok(ArchiveReport::new(&batch, period, archived))
}

pub async fn archive_salary<S: RecordStore>(
    store: &S,
    period: Period,
) -> Result<ArchiveReport, ServiceError> {
    let batch = ArchiveBatch::new();
    let mut tx = store.begin().await?;
    let moved = move_salaries(store, &mut tx, &batch, period).await;
    let archived = finish(store, tx, moved, "salaries", period).await?;

    info!(batch = %batch.id, ?period, archived, "Salaries archived");
    Ok(ArchiveReport::new(&batch, period, archived))
}
