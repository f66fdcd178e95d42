//! Data access for workers, live records and their history tables.
//!
//! Reads take typed filters and return rows in insertion order. The archive
//! primitives only exist on a transaction handle obtained from
//! [`RecordStore::begin`]; dropping the handle without committing discards
//! every change made through it.

mod memory;
mod mysql;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Display;

use crate::model::attendance::{ArchivedAttendance, AttendanceRecord, AttendanceStatus};
use crate::model::filter::{AttendanceFilter, SalaryFilter};
use crate::model::period::Period;
use crate::model::salary::{ArchivedSalary, NewSalary, SalaryRecord};
use crate::model::worker::{NewWorker, Worker};

pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "worker {} does not exist", _0)]
    UnknownWorker(u64),

    #[display(fmt = "archive locked {} rows but deleted {}", locked, deleted)]
    ArchiveMismatch { locked: usize, deleted: u64 },

    #[display(fmt = "corrupt row: {}", _0)]
    Corrupt(String),

    #[display(fmt = "store unavailable: {}", _0)]
    Unavailable(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

/// Identifies one archive action; stamped on every history row it writes.
#[derive(Debug, Clone)]
pub struct ArchiveBatch {
    pub id: String,
    pub archived_at: NaiveDateTime,
}

impl ArchiveBatch {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            archived_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// In-progress transaction.
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError>;
    async fn rollback(&self, tx: Self::Tx) -> Result<(), StoreError>;

    // workers

    /// All workers ordered by name.
    async fn workers(&self) -> Result<Vec<Worker>, StoreError>;
    async fn worker(&self, id: u64) -> Result<Option<Worker>, StoreError>;
    async fn insert_worker(&self, worker: &NewWorker) -> Result<Worker, StoreError>;
    /// Removes the worker and their live records. `false` if no such worker.
    async fn delete_worker(&self, id: u64) -> Result<bool, StoreError>;

    // live tables

    async fn attendance(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
    async fn insert_attendance(
        &self,
        worker_id: u64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError>;
    async fn salaries(&self, filter: &SalaryFilter) -> Result<Vec<SalaryRecord>, StoreError>;
    async fn insert_salary(&self, record: &NewSalary) -> Result<SalaryRecord, StoreError>;

    // history tables

    async fn attendance_history(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<ArchivedAttendance>, StoreError>;
    async fn salary_history(&self, filter: &SalaryFilter)
    -> Result<Vec<ArchivedSalary>, StoreError>;

    // archive primitives

    /// Live attendance rows of `period`, locked until the transaction ends.
    async fn lock_attendance(
        &self,
        tx: &mut Self::Tx,
        period: Period,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
    async fn append_attendance_history(
        &self,
        tx: &mut Self::Tx,
        batch: &ArchiveBatch,
        record: &AttendanceRecord,
    ) -> Result<(), StoreError>;
    /// Returns the number of rows removed.
    async fn delete_attendance(&self, tx: &mut Self::Tx, ids: &[u64]) -> Result<u64, StoreError>;

    async fn lock_salaries(
        &self,
        tx: &mut Self::Tx,
        period: Period,
    ) -> Result<Vec<SalaryRecord>, StoreError>;
    async fn append_salary_history(
        &self,
        tx: &mut Self::Tx,
        batch: &ArchiveBatch,
        record: &SalaryRecord,
    ) -> Result<(), StoreError>;
    async fn delete_salaries(&self, tx: &mut Self::Tx, ids: &[u64]) -> Result<u64, StoreError>;
}
