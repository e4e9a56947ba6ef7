use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A day off in the shared calendar. Custom holidays are stored by admins;
/// official (statutory) ones are generated per year and carry `id = 0`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 0,
        "name": "Easter Monday",
        "date": "2026-04-13",
        "is_custom": false
    })
)]
pub struct HolidayDay {
    pub id: u64,

    #[schema(example = "Easter Monday")]
    pub name: String,

    #[schema(example = "2026-04-13", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub is_custom: bool,
}

impl HolidayDay {
    pub fn official(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: 0,
            name: name.into(),
            date,
            is_custom: false,
        }
    }
}
