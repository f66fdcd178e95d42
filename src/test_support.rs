use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::model::worker::NewWorker;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn new_worker(name: &str, daily_rate: i64) -> NewWorker {
    NewWorker {
        name: name.to_string(),
        phone_number: "+2348000000000".to_string(),
        date_of_birth: date(1990, 1, 1),
        gender: "female".to_string(),
        qualifications: "SSCE".to_string(),
        position: "Operator".to_string(),
        date_of_employment: date(2024, 1, 1),
        daily_rate: Decimal::from(daily_rate),
        guarantor: "Unknown".to_string(),
        bank_account_name: "Unknown".to_string(),
    }
}
