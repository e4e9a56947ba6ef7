use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Absence-day balance is never topped up past this by the yearly rollover.
pub const MAX_ABSENCE_DAYS: i32 = 40;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "7e6b3a52-8a3f-4a8e-9a39-1f6f5f0a2b11",
        "name": "John Doe",
        "email": "john.doe@company.com",
        "role": 2,
        "contract_days": 20,
        "absence_days": 18
    })
)]
pub struct User {
    #[schema(example = "7e6b3a52-8a3f-4a8e-9a39-1f6f5f0a2b11")]
    pub id: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    /// Argon2 hash, never serialized into responses
    #[serde(skip_serializing)]
    pub password: String,

    /// 1 = admin, 2 = employee
    #[schema(example = 2)]
    pub role: u8,

    #[schema(example = 20)]
    pub contract_days: i32,

    #[schema(example = 18)]
    pub absence_days: i32,
}

/// New balance after the yearly rollover: contract days are added on top of
/// whatever was left, capped at [`MAX_ABSENCE_DAYS`].
pub fn rollover_balance(absence_days: i32, contract_days: i32) -> i32 {
    (absence_days + contract_days).min(MAX_ABSENCE_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollover_adds_contract_days() {
        assert_eq!(rollover_balance(5, 20), 25);
        assert_eq!(rollover_balance(0, 20), 20);
    }

    #[test]
    fn rollover_caps_at_forty() {
        assert_eq!(rollover_balance(35, 20), 40);
        assert_eq!(rollover_balance(40, 20), 40);
        assert_eq!(rollover_balance(40, 0), 40);
    }
}
