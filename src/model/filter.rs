use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::model::attendance::AttendanceRecord;
use crate::model::period::{Month, Period};
use crate::model::salary::SalaryRecord;

/// Typed attendance filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceFilter {
    pub name: Option<String>,
    pub month: Option<Month>,
    pub year: Option<i32>,
    pub worker_id: Option<u64>,
}

impl AttendanceFilter {
    pub fn for_worker(worker_id: u64) -> Self {
        Self {
            worker_id: Some(worker_id),
            ..Self::default()
        }
    }

    pub fn for_period(period: Period) -> Self {
        Self {
            month: Some(period.month),
            year: Some(period.year),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        if let Some(name) = &self.name {
            if record.worker_name != *name {
                return false;
            }
        }
        if let Some(month) = self.month {
            if record.month != month {
                return false;
            }
        }
        if let Some(year) = self.year {
            if record.year != year {
                return false;
            }
        }
        if let Some(worker_id) = self.worker_id {
            if record.worker_id != worker_id {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryFilter {
    pub month: Option<Month>,
    pub year: Option<i32>,
    pub worker_id: Option<u64>,
}

impl SalaryFilter {
    pub fn for_period(period: Period) -> Self {
        Self {
            month: Some(period.month),
            year: Some(period.year),
            worker_id: None,
        }
    }

    pub fn matches(&self, record: &SalaryRecord) -> bool {
        self.month.is_none_or(|m| record.month == m)
            && self.year.is_none_or(|y| record.year == y)
            && self.worker_id.is_none_or(|id| record.worker_id == id)
    }
}

/// Lazy attendance filter over a slice, in slice order. The iterator is
/// `Clone`, so it can be walked again from the start.
pub fn filter_attendance<'a>(
    records: &'a [AttendanceRecord],
    filter: &'a AttendanceFilter,
) -> impl Iterator<Item = &'a AttendanceRecord> + Clone + 'a {
    records.iter().filter(move |r| filter.matches(r))
}

pub fn filter_salary<'a>(
    records: &'a [SalaryRecord],
    filter: &'a SalaryFilter,
) -> impl Iterator<Item = &'a SalaryRecord> + Clone + 'a {
    records.iter().filter(move |r| filter.matches(r))
}

/// Raw query string for attendance listings. Every field is kept as text so
/// a malformed value narrows the result to nothing instead of failing the
/// request.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    #[schema(example = "Ada Obi")]
    /// Exact worker name
    pub name: Option<String>,
    #[schema(example = "Jan")]
    /// Month name, abbreviation or number
    pub month: Option<String>,
    #[schema(example = "2026")]
    pub year: Option<String>,
    #[schema(example = "1")]
    pub worker_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct SalaryQuery {
    #[schema(example = "Jan")]
    pub month: Option<String>,
    #[schema(example = "2026")]
    pub year: Option<String>,
    #[schema(example = "1")]
    pub worker_id: Option<String>,
}

/// Outcome of reading one optional query field.
enum Field<T> {
    Absent,
    Value(T),
    Malformed,
}

fn field<T>(raw: &Option<String>, parse: impl FnOnce(&str) -> Option<T>) -> Field<T> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Field::Absent,
        Some(s) => parse(s).map_or(Field::Malformed, Field::Value),
    }
}

macro_rules! take {
    ($field:expr) => {
        match $field {
            Field::Absent => None,
            Field::Value(v) => Some(v),
            Field::Malformed => return None,
        }
    };
}

impl AttendanceQuery {
    /// `None` when some supplied value can never match a record.
    pub fn into_filter(self) -> Option<AttendanceFilter> {
        Some(AttendanceFilter {
            name: take!(field(&self.name, |s| Some(s.to_string()))),
            month: take!(field(&self.month, Month::parse)),
            year: take!(field(&self.year, |s| s.parse().ok())),
            worker_id: take!(field(&self.worker_id, |s| s.parse().ok())),
        })
    }
}

impl SalaryQuery {
    pub fn into_filter(self) -> Option<SalaryFilter> {
        Some(SalaryFilter {
            month: take!(field(&self.month, Month::parse)),
            year: take!(field(&self.year, |s| s.parse().ok())),
            worker_id: take!(field(&self.worker_id, |s| s.parse().ok())),
        })
    }
}
