use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::lock::{Mutex, OwnedMutexGuard};

use super::{ArchiveBatch, RecordStore, StoreError};
use crate::model::attendance::{ArchivedAttendance, AttendanceRecord, AttendanceStatus};
use crate::model::filter::{AttendanceFilter, SalaryFilter, filter_attendance, filter_salary};
use crate::model::period::Period;
use crate::model::salary::{ArchivedSalary, NewSalary, SalaryRecord};
use crate::model::worker::{NewWorker, Worker};

#[derive(Debug, Default, Clone)]
struct Tables {
    workers: Vec<Worker>,
    attendance: Vec<AttendanceRecord>,
    salaries: Vec<SalaryRecord>,
    attendance_history: Vec<ArchivedAttendance>,
    salary_history: Vec<ArchivedSalary>,
    last_worker_id: u64,
    last_attendance_id: u64,
    last_salary_id: u64,
}

impl Tables {
    fn worker_name(&self, id: u64) -> Result<String, StoreError> {
        self.workers
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.name.clone())
            .ok_or(StoreError::UnknownWorker(id))
    }
}

/// Failure switches used to exercise rollback paths.
#[derive(Debug, Default)]
struct Faults {
    history_append: AtomicBool,
    delete: AtomicBool,
}

/// Process-local store. Every operation takes one async mutex; a
/// transaction holds it until commit or rollback and works on a staged copy
/// of the tables, so transactions are fully serialized.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Faults>,
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn fail_history_appends(&self, on: bool) {
        self.faults.history_append.store(on, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn fail_deletes(&self, on: bool) {
        self.faults.delete.store(on, Ordering::SeqCst);
    }

    fn check(&self, fault: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if fault.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{what} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTx { guard, staged })
    }

    async fn commit(&self, tx: MemoryTx) -> Result<(), StoreError> {
        let MemoryTx { mut guard, staged } = tx;
        *guard = staged;
        Ok(())
    }

    async fn rollback(&self, tx: MemoryTx) -> Result<(), StoreError> {
        drop(tx);
        Ok(())
    }

    async fn workers(&self) -> Result<Vec<Worker>, StoreError> {
        let tables = self.tables.lock().await;
        let mut workers = tables.workers.clone();
        workers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(workers)
    }

    async fn worker(&self, id: u64) -> Result<Option<Worker>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.workers.iter().find(|w| w.id == id).cloned())
    }

    async fn insert_worker(&self, worker: &NewWorker) -> Result<Worker, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.last_worker_id += 1;
        let worker = worker.clone().into_worker(tables.last_worker_id);
        tables.workers.push(worker.clone());
        Ok(worker)
    }

    async fn delete_worker(&self, id: u64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.workers.len();
        tables.workers.retain(|w| w.id != id);
        if tables.workers.len() == before {
            return Ok(false);
        }
        tables.attendance.retain(|r| r.worker_id != id);
        tables.salaries.retain(|r| r.worker_id != id);
        Ok(true)
    }

    async fn attendance(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(filter_attendance(&tables.attendance, filter)
            .cloned()
            .collect())
    }

    async fn insert_attendance(
        &self,
        worker_id: u64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        let mut tables = self.tables.lock().await;
        let worker_name = tables.worker_name(worker_id)?;
        tables.last_attendance_id += 1;
        let record = AttendanceRecord::new(
            tables.last_attendance_id,
            worker_id,
            worker_name,
            date,
            status,
        );
        tables.attendance.push(record.clone());
        Ok(record)
    }

    async fn salaries(&self, filter: &SalaryFilter) -> Result<Vec<SalaryRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(filter_salary(&tables.salaries, filter).cloned().collect())
    }

    async fn insert_salary(&self, record: &NewSalary) -> Result<SalaryRecord, StoreError> {
        let mut tables = self.tables.lock().await;
        let worker_name = tables.worker_name(record.worker_id)?;
        tables.last_salary_id += 1;
        let record = SalaryRecord {
            id: tables.last_salary_id,
            worker_id: record.worker_id,
            worker_name,
            month: record.period.month,
            year: record.period.year,
            total_days_present: record.total_days_present,
            daily_rate: record.daily_rate,
            amount: record.amount,
            paid_at: record.paid_at,
        };
        tables.salaries.push(record.clone());
        Ok(record)
    }

    async fn attendance_history(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<ArchivedAttendance>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .attendance_history
            .iter()
            .filter(|h| filter.matches(&h.record))
            .cloned()
            .collect())
    }

    async fn salary_history(
        &self,
        filter: &SalaryFilter,
    ) -> Result<Vec<ArchivedSalary>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .salary_history
            .iter()
            .filter(|h| filter.matches(&h.record))
            .cloned()
            .collect())
    }

    async fn lock_attendance(
        &self,
        tx: &mut MemoryTx,
        period: Period,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let filter = AttendanceFilter::for_period(period);
        Ok(filter_attendance(&tx.staged.attendance, &filter)
            .cloned()
            .collect())
    }

    async fn append_attendance_history(
        &self,
        tx: &mut MemoryTx,
        batch: &ArchiveBatch,
        record: &AttendanceRecord,
    ) -> Result<(), StoreError> {
        self.check(&self.faults.history_append, "attendance history append")?;
        tx.staged.attendance_history.push(ArchivedAttendance {
            record: record.clone(),
            archive_batch: batch.id.clone(),
            archived_at: batch.archived_at,
        });
        Ok(())
    }

    async fn delete_attendance(&self, tx: &mut MemoryTx, ids: &[u64]) -> Result<u64, StoreError> {
        self.check(&self.faults.delete, "attendance delete")?;
        let before = tx.staged.attendance.len();
        tx.staged.attendance.retain(|r| !ids.contains(&r.id));
        Ok((before - tx.staged.attendance.len()) as u64)
    }

    async fn lock_salaries(
        &self,
        tx: &mut MemoryTx,
        period: Period,
    ) -> Result<Vec<SalaryRecord>, StoreError> {
        let filter = SalaryFilter::for_period(period);
        Ok(filter_salary(&tx.staged.salaries, &filter).cloned().collect())
    }

    async fn append_salary_history(
        &self,
        tx: &mut MemoryTx,
        batch: &ArchiveBatch,
        record: &SalaryRecord,
    ) -> Result<(), StoreError> {
        self.check(&self.faults.history_append, "salary history append")?;
        tx.staged.salary_history.push(ArchivedSalary {
            record: record.clone(),
            archive_batch: batch.id.clone(),
            archived_at: batch.archived_at,
        });
        Ok(())
    }

    async fn delete_salaries(&self, tx: &mut MemoryTx, ids: &[u64]) -> Result<u64, StoreError> {
        self.check(&self.faults.delete, "salary delete")?;
        let before = tx.staged.salaries.len();
        tx.staged.salaries.retain(|r| !ids.contains(&r.id));
        Ok((before - tx.staged.salaries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, new_worker};

    #[actix_web::test]
    async fn workers_are_listed_by_name() {
        let store = InMemoryStore::new();
        store.insert_worker(&new_worker("Zainab", 500)).await.unwrap();
        store.insert_worker(&new_worker("Ada", 400)).await.unwrap();

        let names: Vec<_> = store
            .workers()
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["Ada", "Zainab"]);
    }

    #[actix_web::test]
    async fn attendance_for_unknown_worker_is_rejected() {
        let store = InMemoryStore::new();
        let err = store
            .insert_attendance(42, date(2026, 1, 5), AttendanceStatus::Present)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownWorker(42)));
    }

    #[actix_web::test]
    async fn deleting_a_worker_removes_live_records_only() {
        let store = InMemoryStore::new();
        let ada = store.insert_worker(&new_worker("Ada", 500)).await.unwrap();
        store
            .insert_attendance(ada.id, date(2026, 1, 5), AttendanceStatus::Present)
            .await
            .unwrap();

        assert!(store.delete_worker(ada.id).await.unwrap());
        assert!(!store.delete_worker(ada.id).await.unwrap());
        assert!(
            store
                .attendance(&AttendanceFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[actix_web::test]
    async fn history_keeps_rows_sharing_a_live_id() {
        let store = InMemoryStore::new();
        let ada = store.insert_worker(&new_worker("Ada", 500)).await.unwrap();
        let rec = store
            .insert_attendance(ada.id, date(2026, 1, 5), AttendanceStatus::Present)
            .await
            .unwrap();

        // a live id handed out again after an earlier archive
        let (first, second) = (ArchiveBatch::new(), ArchiveBatch::new());
        let mut tx = store.begin().await.unwrap();
        store
            .append_attendance_history(&mut tx, &first, &rec)
            .await
            .unwrap();
        store
            .append_attendance_history(&mut tx, &second, &rec)
            .await
            .unwrap();
        store.commit(tx).await.unwrap();

        let history = store
            .attendance_history(&AttendanceFilter::default())
            .await
            .unwrap();
        let batches: Vec<_> = history.iter().map(|h| h.archive_batch.clone()).collect();
        assert_eq!(batches, vec![first.id, second.id]);
    }

    #[actix_web::test]
    async fn rolled_back_transaction_leaves_tables_untouched() {
        let store = InMemoryStore::new();
        let ada = store.insert_worker(&new_worker("Ada", 500)).await.unwrap();
        let rec = store
            .insert_attendance(ada.id, date(2026, 1, 5), AttendanceStatus::Present)
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        store.delete_attendance(&mut tx, &[rec.id]).await.unwrap();
        store.rollback(tx).await.unwrap();

        let live = store.attendance(&AttendanceFilter::default()).await.unwrap();
        assert_eq!(live, vec![rec]);
    }
}
