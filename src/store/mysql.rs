use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::QueryAs;
use sqlx::{FromRow, MySqlPool, Transaction};
use tracing::debug;

use super::{ArchiveBatch, RecordStore, StoreError};
use crate::model::attendance::{ArchivedAttendance, AttendanceRecord, AttendanceStatus};
use crate::model::filter::{AttendanceFilter, SalaryFilter};
use crate::model::period::{Month, Period};
use crate::model::salary::{ArchivedSalary, NewSalary, SalaryRecord};
use crate::model::worker::{NewWorker, Worker};

const WORKER_COLUMNS: &str = r#"
    id, name, phone_number, date_of_birth, gender, qualifications, position,
    date_of_employment, daily_rate, guarantor, bank_account_name
"#;

const LIVE_ATTENDANCE: &str = r#"
    SELECT a.id, a.worker_id, w.name AS worker_name, a.attendance_date, a.status
    FROM attendance a
    JOIN workers w ON w.id = a.worker_id
"#;

const ATTENDANCE_HISTORY: &str = r#"
    SELECT h.live_id AS id, h.worker_id, h.worker_name, h.attendance_date, h.status,
           h.archive_batch, h.archived_at
    FROM attendance_history h
"#;

const LIVE_SALARIES: &str = r#"
    SELECT s.id, s.worker_id, w.name AS worker_name, s.period_month, s.period_year,
           s.total_days_present, s.daily_rate, s.amount, s.paid_at
    FROM salaries s
    JOIN workers w ON w.id = s.worker_id
"#;

const SALARY_HISTORY: &str = r#"
    SELECT h.live_id AS id, h.worker_id, h.worker_name, h.period_month, h.period_year,
           h.total_days_present, h.daily_rate, h.amount, h.paid_at,
           h.archive_batch, h.archived_at
    FROM salary_history h
"#;

/// MySQL-backed store. Archive transactions lock the period's live rows
/// with `SELECT ... FOR UPDATE`, so concurrent archives of the same period
/// run one after the other.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

// Helper enum for typed SQLx binding
#[derive(Debug, Clone, Copy)]
enum FilterValue<'a> {
    U64(u64),
    U32(u32),
    I32(i32),
    Str(&'a str),
    Date(NaiveDate),
}

fn bind_all<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    args: &[FilterValue<'q>],
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for arg in args {
        query = match *arg {
            FilterValue::U64(v) => query.bind(v),
            FilterValue::U32(v) => query.bind(v),
            FilterValue::I32(v) => query.bind(v),
            FilterValue::Str(s) => query.bind(s),
            FilterValue::Date(d) => query.bind(d),
        };
    }
    query
}

/// Column names an attendance filter is applied to.
struct AttendanceColumns {
    name: &'static str,
    date: &'static str,
    worker_id: &'static str,
}

const LIVE_ATTENDANCE_COLUMNS: AttendanceColumns = AttendanceColumns {
    name: "w.name",
    date: "a.attendance_date",
    worker_id: "a.worker_id",
};

const HISTORY_ATTENDANCE_COLUMNS: AttendanceColumns = AttendanceColumns {
    name: "h.worker_name",
    date: "h.attendance_date",
    worker_id: "h.worker_id",
};

fn attendance_where<'a>(
    filter: &'a AttendanceFilter,
    cols: &AttendanceColumns,
) -> (String, Vec<FilterValue<'a>>) {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(name) = filter.name.as_deref() {
        // BINARY keeps the comparison exact under case-insensitive collations
        where_sql.push_str(&format!(" AND BINARY {} = ?", cols.name));
        args.push(FilterValue::Str(name));
    }
    if let Some(month) = filter.month {
        where_sql.push_str(&format!(" AND MONTH({}) = ?", cols.date));
        args.push(FilterValue::U32(month.number()));
    }
    if let Some(year) = filter.year {
        where_sql.push_str(&format!(" AND YEAR({}) = ?", cols.date));
        args.push(FilterValue::I32(year));
    }
    if let Some(worker_id) = filter.worker_id {
        where_sql.push_str(&format!(" AND {} = ?", cols.worker_id));
        args.push(FilterValue::U64(worker_id));
    }

    (where_sql, args)
}

fn salary_where<'a>(filter: &SalaryFilter, alias: &str) -> (String, Vec<FilterValue<'a>>) {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(month) = filter.month {
        where_sql.push_str(&format!(" AND {alias}.period_month = ?"));
        args.push(FilterValue::U32(month.number()));
    }
    if let Some(year) = filter.year {
        where_sql.push_str(&format!(" AND {alias}.period_year = ?"));
        args.push(FilterValue::I32(year));
    }
    if let Some(worker_id) = filter.worker_id {
        where_sql.push_str(&format!(" AND {alias}.worker_id = ?"));
        args.push(FilterValue::U64(worker_id));
    }

    (where_sql, args)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Maps a foreign key violation on insert to `UnknownWorker`.
fn insert_error(e: sqlx::Error, worker_id: u64) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23000") {
            return StoreError::UnknownWorker(worker_id);
        }
    }
    StoreError::Database(e)
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    worker_id: u64,
    worker_name: String,
    attendance_date: NaiveDate,
    status: String,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status: AttendanceStatus = row.status.parse().map_err(|_| {
            StoreError::Corrupt(format!(
                "attendance {} has unknown status {:?}",
                row.id, row.status
            ))
        })?;
        Ok(AttendanceRecord::new(
            row.id,
            row.worker_id,
            row.worker_name,
            row.attendance_date,
            status,
        ))
    }
}

#[derive(FromRow)]
struct AttendanceHistoryRow {
    #[sqlx(flatten)]
    live: AttendanceRow,
    archive_batch: String,
    archived_at: NaiveDateTime,
}

impl TryFrom<AttendanceHistoryRow> for ArchivedAttendance {
    type Error = StoreError;

    fn try_from(h: AttendanceHistoryRow) -> Result<Self, Self::Error> {
        Ok(ArchivedAttendance {
            record: h.live.try_into()?,
            archive_batch: h.archive_batch,
            archived_at: h.archived_at,
        })
    }
}

#[derive(FromRow)]
struct SalaryRow {
    id: u64,
    worker_id: u64,
    worker_name: String,
    period_month: u8,
    period_year: i32,
    total_days_present: u32,
    daily_rate: Decimal,
    amount: Decimal,
    paid_at: NaiveDateTime,
}

impl TryFrom<SalaryRow> for SalaryRecord {
    type Error = StoreError;

    fn try_from(row: SalaryRow) -> Result<Self, Self::Error> {
        let month = Month::from_number(row.period_month as u32).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "salary {} has month {}",
                row.id, row.period_month
            ))
        })?;
        Ok(SalaryRecord {
            id: row.id,
            worker_id: row.worker_id,
            worker_name: row.worker_name,
            month,
            year: row.period_year,
            total_days_present: row.total_days_present,
            daily_rate: row.daily_rate,
            amount: row.amount,
            paid_at: row.paid_at,
        })
    }
}

#[derive(FromRow)]
struct SalaryHistoryRow {
    #[sqlx(flatten)]
    live: SalaryRow,
    archive_batch: String,
    archived_at: NaiveDateTime,
}

impl TryFrom<SalaryHistoryRow> for ArchivedSalary {
    type Error = StoreError;

    fn try_from(h: SalaryHistoryRow) -> Result<Self, Self::Error> {
        Ok(ArchivedSalary {
            record: h.live.try_into()?,
            archive_batch: h.archive_batch,
            archived_at: h.archived_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn period_bounds(period: Period) -> Result<(NaiveDate, NaiveDate), StoreError> {
    period
        .bounds()
        .ok_or_else(|| StoreError::Corrupt(format!("period out of range: {period:?}")))
}

#[async_trait]
impl RecordStore for MySqlStore {
    type Tx = Transaction<'static, MySql>;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(self.pool.begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError> {
        Ok(tx.commit().await?)
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), StoreError> {
        Ok(tx.rollback().await?)
    }

    async fn workers(&self) -> Result<Vec<Worker>, StoreError> {
        let sql = format!("SELECT {WORKER_COLUMNS} FROM workers ORDER BY name, id");
        Ok(sqlx::query_as::<_, Worker>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn worker(&self, id: u64) -> Result<Option<Worker>, StoreError> {
        let sql = format!("SELECT {WORKER_COLUMNS} FROM workers WHERE id = ?");
        Ok(sqlx::query_as::<_, Worker>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_worker(&self, worker: &NewWorker) -> Result<Worker, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO workers
            (name, phone_number, date_of_birth, gender, qualifications, position,
             date_of_employment, daily_rate, guarantor, bank_account_name)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&worker.name)
        .bind(&worker.phone_number)
        .bind(worker.date_of_birth)
        .bind(&worker.gender)
        .bind(&worker.qualifications)
        .bind(&worker.position)
        .bind(worker.date_of_employment)
        .bind(worker.daily_rate)
        .bind(&worker.guarantor)
        .bind(&worker.bank_account_name)
        .execute(&self.pool)
        .await?;

        Ok(worker.clone().into_worker(result.last_insert_id()))
    }

    async fn delete_worker(&self, id: u64) -> Result<bool, StoreError> {
        // live attendance and salary rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM workers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn attendance(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let (where_sql, args) = attendance_where(filter, &LIVE_ATTENDANCE_COLUMNS);
        let sql = format!("{LIVE_ATTENDANCE}{where_sql} ORDER BY a.id ASC");
        debug!(sql = %sql, args = ?args, "Fetching attendance");

        let rows = bind_all(sqlx::query_as::<_, AttendanceRow>(&sql), &args)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn insert_attendance(
        &self,
        worker_id: u64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (worker_id, attendance_date, status)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(worker_id)
        .bind(date)
        .bind(status.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, worker_id))?;

        let sql = format!("{LIVE_ATTENDANCE} WHERE a.id = ?");
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(result.last_insert_id())
            .fetch_one(&self.pool)
            .await?
            .try_into()
    }

    async fn salaries(&self, filter: &SalaryFilter) -> Result<Vec<SalaryRecord>, StoreError> {
        let (where_sql, args) = salary_where(filter, "s");
        let sql = format!("{LIVE_SALARIES}{where_sql} ORDER BY s.id ASC");
        debug!(sql = %sql, args = ?args, "Fetching salaries");

        let rows = bind_all(sqlx::query_as::<_, SalaryRow>(&sql), &args)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn insert_salary(&self, record: &NewSalary) -> Result<SalaryRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO salaries
            (worker_id, period_month, period_year, total_days_present, daily_rate, amount, paid_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.worker_id)
        .bind(record.period.month.number() as u8)
        .bind(record.period.year)
        .bind(record.total_days_present)
        .bind(record.daily_rate)
        .bind(record.amount)
        .bind(record.paid_at)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, record.worker_id))?;

        let sql = format!("{LIVE_SALARIES} WHERE s.id = ?");
        sqlx::query_as::<_, SalaryRow>(&sql)
            .bind(result.last_insert_id())
            .fetch_one(&self.pool)
            .await?
            .try_into()
    }

    async fn attendance_history(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<ArchivedAttendance>, StoreError> {
        let (where_sql, args) = attendance_where(filter, &HISTORY_ATTENDANCE_COLUMNS);
        let sql = format!("{ATTENDANCE_HISTORY}{where_sql} ORDER BY h.history_id ASC");

        let rows = bind_all(sqlx::query_as::<_, AttendanceHistoryRow>(&sql), &args)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn salary_history(
        &self,
        filter: &SalaryFilter,
    ) -> Result<Vec<ArchivedSalary>, StoreError> {
        let (where_sql, args) = salary_where(filter, "h");
        let sql = format!("{SALARY_HISTORY}{where_sql} ORDER BY h.history_id ASC");

        let rows = bind_all(sqlx::query_as::<_, SalaryHistoryRow>(&sql), &args)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn lock_attendance(
        &self,
        tx: &mut Self::Tx,
        period: Period,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let (start, end) = period_bounds(period)?;
        let sql = format!(
            "{LIVE_ATTENDANCE} WHERE a.attendance_date >= ? AND a.attendance_date < ? \
             ORDER BY a.id ASC FOR UPDATE"
        );

        let args = [FilterValue::Date(start), FilterValue::Date(end)];
        let rows = bind_all(sqlx::query_as::<_, AttendanceRow>(&sql), &args)
            .fetch_all(&mut **tx)
            .await?;
        convert_all(rows)
    }

    async fn append_attendance_history(
        &self,
        tx: &mut Self::Tx,
        batch: &ArchiveBatch,
        record: &AttendanceRecord,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO attendance_history
            (live_id, worker_id, worker_name, attendance_date, status, archive_batch, archived_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id)
        .bind(record.worker_id)
        .bind(&record.worker_name)
        .bind(record.attendance_date)
        .bind(record.status.to_string())
        .bind(&batch.id)
        .bind(batch.archived_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn delete_attendance(&self, tx: &mut Self::Tx, ids: &[u64]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "DELETE FROM attendance WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        Ok(query.execute(&mut **tx).await?.rows_affected())
    }

    async fn lock_salaries(
        &self,
        tx: &mut Self::Tx,
        period: Period,
    ) -> Result<Vec<SalaryRecord>, StoreError> {
        let sql = format!(
            "{LIVE_SALARIES} WHERE s.period_month = ? AND s.period_year = ? \
             ORDER BY s.id ASC FOR UPDATE"
        );

        let rows = sqlx::query_as::<_, SalaryRow>(&sql)
            .bind(period.month.number() as u8)
            .bind(period.year)
            .fetch_all(&mut **tx)
            .await?;
        convert_all(rows)
    }

    async fn append_salary_history(
        &self,
        tx: &mut Self::Tx,
        batch: &ArchiveBatch,
        record: &SalaryRecord,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO salary_history
            (live_id, worker_id, worker_name, period_month, period_year, total_days_present,
             daily_rate, amount, paid_at, archive_batch, archived_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id)
        .bind(record.worker_id)
        .bind(&record.worker_name)
        .bind(record.month.number() as u8)
        .bind(record.year)
        .bind(record.total_days_present)
        .bind(record.daily_rate)
        .bind(record.amount)
        .bind(record.paid_at)
        .bind(&batch.id)
        .bind(batch.archived_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn delete_salaries(&self, tx: &mut Self::Tx, ids: &[u64]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "DELETE FROM salaries WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        Ok(query.execute(&mut **tx).await?.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::date;

    const INIT_SQL: &str = include_str!("../../migrations/20251001000000_init.sql");

    fn table_ddl(table: &str) -> &'static str {
        let start = INIT_SQL
            .find(&format!("CREATE TABLE IF NOT EXISTS {table} ("))
            .unwrap();
        let len = INIT_SQL[start..].find(");").unwrap();
        &INIT_SQL[start..start + len]
    }

    fn attendance_row(status: &str) -> AttendanceRow {
        AttendanceRow {
            id: 7,
            worker_id: 1,
            worker_name: "Ada".into(),
            attendance_date: date(2026, 1, 5),
            status: status.into(),
        }
    }

    #[test]
    fn history_row_converts_through_live_row() {
        let archived_at = date(2026, 2, 1).and_hms_opt(8, 0, 0).unwrap();
        let row = AttendanceHistoryRow {
            live: attendance_row("Present"),
            archive_batch: "batch-1".into(),
            archived_at,
        };

        let archived = ArchivedAttendance::try_from(row).unwrap();
        assert_eq!(archived.record.id, 7);
        assert_eq!(archived.record.month, Month::January);
        assert_eq!(archived.record.status, AttendanceStatus::Present);
        assert_eq!(archived.archive_batch, "batch-1");
        assert_eq!(archived.archived_at, archived_at);
    }

    #[test]
    fn unknown_status_is_reported_as_corrupt() {
        let err = AttendanceRecord::try_from(attendance_row("present")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn salary_history_row_rejects_bad_month() {
        let paid_at = date(2026, 2, 1).and_hms_opt(8, 0, 0).unwrap();
        let row = SalaryHistoryRow {
            live: SalaryRow {
                id: 3,
                worker_id: 1,
                worker_name: "Ada".into(),
                period_month: 13,
                period_year: 2026,
                total_days_present: 20,
                daily_rate: Decimal::from(500),
                amount: Decimal::from(10_000),
                paid_at,
            },
            archive_batch: "batch-1".into(),
            archived_at: paid_at,
        };
        assert!(matches!(
            ArchivedSalary::try_from(row),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn history_tables_do_not_key_on_live_id() {
        for table in ["attendance_history", "salary_history"] {
            let ddl = table_ddl(table);
            assert!(
                ddl.contains("history_id") && ddl.contains("AUTO_INCREMENT PRIMARY KEY"),
                "{table} needs its own key"
            );
            let live_id = ddl.lines().find(|l| l.contains("live_id ")).unwrap();
            assert!(!live_id.contains("PRIMARY KEY") && !live_id.contains("UNIQUE"));
        }
        assert!(ATTENDANCE_HISTORY.contains("h.live_id AS id"));
        assert!(SALARY_HISTORY.contains("h.live_id AS id"));
    }
}
