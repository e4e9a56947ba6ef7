use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BusinessTripStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CarOwnership {
    Company,
    Personal,
}

/// A business-trip request with its expense fields.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct BusinessTrip {
    #[schema(example = 1)]
    pub id: u64,

    /// Sequence number of the trip within its issue month, re-ranked on insert
    #[schema(example = 3)]
    pub issue_id: u32,

    #[schema(example = "2026-02-01", value_type = String, format = "date")]
    pub issue_date: NaiveDate,

    #[schema(example = "pending")]
    pub status: String,

    #[schema(example = "Warehouse revamp")]
    pub project_name: String,

    #[schema(example = "John Doe")]
    pub user_full_name: String,

    #[schema(example = "On-site inspection", nullable = true)]
    pub task: Option<String>,

    #[schema(example = "2026-02-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-02-12", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = 3)]
    pub total_days: u8,

    #[schema(example = "company")]
    pub car_ownership: String,

    /// Daily wage allowance
    #[schema(example = 40.0)]
    pub wage: f64,

    /// Daily accommodation allowance
    #[schema(example = 80.0)]
    pub accommodation_money: f64,

    #[schema(example = "Skoda", nullable = true)]
    pub car_brand: Option<String>,

    #[schema(example = "Octavia", nullable = true)]
    pub car_model: Option<String>,

    #[schema(example = "CB1234AB", nullable = true)]
    pub car_registration_number: Option<String>,

    #[schema(example = "Varna")]
    pub destination: String,

    #[schema(example = "2026-02-10", value_type = String, format = "date")]
    pub departure_date: NaiveDate,

    #[schema(example = "2026-02-12", value_type = String, format = "date")]
    pub date_of_arrival: NaiveDate,

    #[schema(example = 25.5)]
    pub additional_expenses: f64,

    #[schema(example = 6.5)]
    pub car_usage_per_hundred_km: f64,

    #[schema(example = 2.6)]
    pub price_per_liter: f64,

    #[schema(example = "Employer", nullable = true)]
    pub expenses_responsibility: Option<String>,

    #[schema(example = "2026-02-01T10:00:00", value_type = String, format = "date-time")]
    pub created: NaiveDateTime,

    pub user_id: String,
}
