use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::ServiceError;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

/// Calendar month. Parses from the full English name, the three letter
/// abbreviation or the month number, and always displays as the full name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Month {
    #[strum(to_string = "January", serialize = "Jan")]
    January,
    #[strum(to_string = "February", serialize = "Feb")]
    February,
    #[strum(to_string = "March", serialize = "Mar")]
    March,
    #[strum(to_string = "April", serialize = "Apr")]
    April,
    #[strum(to_string = "May")]
    May,
    #[strum(to_string = "June", serialize = "Jun")]
    June,
    #[strum(to_string = "July", serialize = "Jul")]
    July,
    #[strum(to_string = "August", serialize = "Aug")]
    August,
    #[strum(to_string = "September", serialize = "Sep", serialize = "Sept")]
    September,
    #[strum(to_string = "October", serialize = "Oct")]
    October,
    #[strum(to_string = "November", serialize = "Nov")]
    November,
    #[strum(to_string = "December", serialize = "Dec")]
    December,
}

impl Month {
    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(n: u32) -> Option<Self> {
        if n == 0 {
            return None;
        }
        Month::iter().nth((n - 1) as usize)
    }

    pub fn of(date: NaiveDate) -> Self {
        // chrono months are always 1..=12
        Month::from_number(date.month()).unwrap_or(Month::January)
    }

    /// Accepts "January", "jan", "1" or "01". Anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<u32>() {
            return Month::from_number(n);
        }
        Month::from_str(raw).ok()
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Month::from_number(n)
                .ok_or_else(|| de::Error::custom(format!("invalid month number: {n}"))),
            Raw::Text(s) => {
                Month::parse(&s).ok_or_else(|| de::Error::custom(format!("invalid month: {s}")))
            }
        }
    }
}

/// A (month, year) pair naming one archivable period.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct Period {
    pub month: Month,
    pub year: i32,
}

impl Period {
    pub fn new(month: Month, year: i32) -> Result<Self, ServiceError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ServiceError::Validation(format!(
                "year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
            )));
        }
        Ok(Self { month, year })
    }

    /// Validates raw request input into a period.
    pub fn parse(month: &str, year: i32) -> Result<Self, ServiceError> {
        let month = Month::parse(month)
            .ok_or_else(|| ServiceError::Validation(format!("invalid month: {month:?}")))?;
        Period::new(month, year)
    }

    /// Half-open date range `[first day, first day of next month)`.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month.number(), 1)?;
        let end = match self.month {
            Month::December => NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?,
            m => NaiveDate::from_ymd_opt(self.year, m.number() + 1, 1)?,
        };
        Some((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_abbreviations_and_numbers() {
        assert_eq!(Month::parse("Jan"), Some(Month::January));
        assert_eq!(Month::parse("january"), Some(Month::January));
        assert_eq!(Month::parse("12"), Some(Month::December));
        assert_eq!(Month::parse("09"), Some(Month::September));
        assert_eq!(Month::parse("13"), None);
        assert_eq!(Month::parse("0"), None);
        assert_eq!(Month::parse("Foo"), None);
        assert_eq!(Month::parse(""), None);
    }

    #[test]
    fn displays_full_name() {
        assert_eq!(Month::February.to_string(), "February");
        assert_eq!(Month::May.number(), 5);
    }

    #[test]
    fn deserializes_from_text_or_number() {
        let m: Month = serde_json::from_str("\"Mar\"").unwrap();
        assert_eq!(m, Month::March);
        let m: Month = serde_json::from_str("4").unwrap();
        assert_eq!(m, Month::April);
        assert!(serde_json::from_str::<Month>("\"Smarch\"").is_err());
    }

    #[test]
    fn rejects_out_of_range_years() {
        assert!(Period::parse("Jan", 2026).is_ok());
        assert!(matches!(
            Period::parse("Jan", 10_000),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            Period::parse("Janvier", 2026),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn bounds_roll_over_december() {
        let period = Period::new(Month::December, 2025).unwrap();
        let (start, end) = period.bounds().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }
}
