use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn unknown() -> String {
    "Unknown".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Ada Obi",
        "phone_number": "+2348012345678",
        "date_of_birth": "1990-04-12",
        "gender": "female",
        "qualifications": "OND",
        "position": "Machine operator",
        "date_of_employment": "2024-01-08",
        "daily_rate": "500.00",
        "guarantor": "Unknown",
        "bank_account_name": "Unknown"
    })
)]
pub struct Worker {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ada Obi")]
    pub name: String,

    #[schema(example = "+2348012345678")]
    pub phone_number: String,

    #[schema(example = "1990-04-12", value_type = String, format = "date")]
    pub date_of_birth: NaiveDate,

    #[schema(example = "female")]
    pub gender: String,

    #[schema(example = "OND")]
    pub qualifications: String,

    #[schema(example = "Machine operator")]
    pub position: String,

    #[schema(example = "2024-01-08", value_type = String, format = "date")]
    pub date_of_employment: NaiveDate,

    /// Per-day wage used when no explicit rate is supplied
    #[schema(example = "500.00", value_type = String)]
    pub daily_rate: Decimal,

    #[schema(example = "Unknown")]
    pub guarantor: String,

    #[schema(example = "Unknown")]
    pub bank_account_name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewWorker {
    #[schema(example = "Ada Obi")]
    pub name: String,
    #[schema(example = "+2348012345678")]
    pub phone_number: String,
    #[schema(example = "1990-04-12", value_type = String, format = "date")]
    pub date_of_birth: NaiveDate,
    #[schema(example = "female")]
    pub gender: String,
    #[schema(example = "OND")]
    pub qualifications: String,
    #[schema(example = "Machine operator")]
    pub position: String,
    #[schema(example = "2024-01-08", value_type = String, format = "date")]
    pub date_of_employment: NaiveDate,
    #[schema(example = "500.00", value_type = String)]
    pub daily_rate: Decimal,
    #[serde(default = "unknown")]
    #[schema(example = "Unknown")]
    pub guarantor: String,
    #[serde(default = "unknown")]
    #[schema(example = "Unknown")]
    pub bank_account_name: String,
}

impl NewWorker {
    pub fn into_worker(self, id: u64) -> Worker {
        Worker {
            id,
            name: self.name,
            phone_number: self.phone_number,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            qualifications: self.qualifications,
            position: self.position,
            date_of_employment: self.date_of_employment,
            daily_rate: self.daily_rate,
            guarantor: self.guarantor,
            bank_account_name: self.bank_account_name,
        }
    }
}
