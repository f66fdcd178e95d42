use crate::api::ArchiveRequest;
use crate::api::salary::ComputeQuery;
use crate::model::attendance::{
    ArchivedAttendance, AttendanceRecord, AttendanceStatus, NewAttendance,
};
use crate::model::filter::{AttendanceQuery, SalaryQuery};
use crate::model::salary::{ArchivedSalary, SalaryRecord};
use crate::model::worker::{NewWorker, Worker};
use crate::service::archive::ArchiveReport;
use crate::service::salary::{RecordSalary, SalaryOverviewRow, SalaryQuote};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Worker Attendance & Salary API",
        version = "1.0.0",
        description = r#"
## Worker Attendance & Salary

Tracks daily attendance for a small workforce and turns it into salary records.

### 🔹 Key Features
- **Workers**
  - Register, list, view and remove workers
- **Attendance**
  - Record daily status, filter by name, month, year or worker, count days present
- **Salary**
  - Compute `days present × daily rate`, record it, list and filter records
- **Archiving**
  - Move a month's attendance or salary records into history in one transaction

### 📦 Filters
- `month` accepts a full name (`January`), an abbreviation (`Jan`) or a number (`1`)
- A filter value that cannot match (e.g. `month=Foo`) returns an empty list

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::worker::create_worker,
        crate::api::worker::list_workers,
        crate::api::worker::get_worker,
        crate::api::worker::delete_worker,

        crate::api::attendance::record_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::total_days_present,
        crate::api::attendance::attendance_history,
        crate::api::attendance::archive_attendance,

        crate::api::salary::record_salary,
        crate::api::salary::list_salaries,
        crate::api::salary::salary_overview,
        crate::api::salary::compute_salary,
        crate::api::salary::salary_history,
        crate::api::salary::archive_salary
    ),
    components(
        schemas(
            Worker,
            NewWorker,
            AttendanceStatus,
            AttendanceRecord,
            NewAttendance,
            ArchivedAttendance,
            AttendanceQuery,
            SalaryRecord,
            ArchivedSalary,
            SalaryQuery,
            RecordSalary,
            SalaryQuote,
            SalaryOverviewRow,
            ComputeQuery,
            ArchiveRequest,
            ArchiveReport
        )
    ),
    tags(
        (name = "Worker", description = "Worker management APIs"),
        (name = "Attendance", description = "Attendance tracking and archiving APIs"),
        (name = "Salary", description = "Salary computation and archiving APIs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/workers",
            "/api/workers/{worker_id}",
            "/api/attendance",
            "/api/attendance/total/{worker_id}",
            "/api/attendance/history",
            "/api/attendance/archive",
            "/api/salary",
            "/api/salary/overview",
            "/api/salary/compute",
            "/api/salary/history",
            "/api/salary/archive",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
