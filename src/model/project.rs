use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Warehouse revamp",
        "description": "Fit-out of the new warehouse",
        "start_date": "2026-01-01",
        "end_date": "2026-06-30"
    })
)]
pub struct Project {
    pub id: u64,

    #[schema(example = "Warehouse revamp")]
    pub name: String,

    #[schema(nullable = true)]
    pub description: Option<String>,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-06-30", value_type = String, format = "date")]
    pub end_date: NaiveDate,
}
