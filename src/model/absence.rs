use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AbsenceType {
    Sick,
    Personal,
    Other,
}

impl AbsenceType {
    /// Only personal leave draws from the user's absence-day balance.
    pub fn affects_balance(self) -> bool {
        self == AbsenceType::Personal
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AbsenceStatus {
    Pending,
    Approved,
    Rejected,
}

/// An absence request as read back from the database, joined with the owner's
/// name for admin listings.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_id": "7e6b3a52-8a3f-4a8e-9a39-1f6f5f0a2b11",
        "user_name": "John Doe",
        "absence_type": "personal",
        "days_count": 5,
        "days_taken": 3,
        "status": "pending",
        "start_date": "2026-01-10",
        "created": "2026-01-02T09:30:00"
    })
)]
pub struct Absence {
    #[schema(example = 1)]
    pub id: u64,

    pub user_id: String,

    #[schema(example = "John Doe")]
    pub user_name: String,

    #[schema(example = "personal")]
    pub absence_type: String,

    /// Calendar days covered by the request
    #[schema(example = 5)]
    pub days_count: u8,

    /// Working days actually deducted (weekends/holidays removed for personal leave)
    #[schema(example = 3)]
    pub days_taken: u8,

    #[schema(example = "pending")]
    pub status: String,

    #[schema(example = "2026-01-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-01-02T09:30:00", value_type = String, format = "date-time")]
    pub created: NaiveDateTime,
}

/// Last calendar day covered by a request of `days_count` days.
pub fn end_date(start: NaiveDate, days_count: u8) -> NaiveDate {
    start + chrono::Duration::days(days_count as i64 - 1)
}

/// Balance adjustment a status transition requires.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BalanceDelta {
    Deduct,
    Restore,
    Unchanged,
}

/// A pending request already carries its deduction from creation, so moving
/// it to approved changes nothing; only reviving a rejected one deducts
/// again, and only leaving the deducted states restores. Cancellation uses
/// the same rule with `Rejected` as the target.
pub fn balance_delta(
    current: AbsenceStatus,
    target: AbsenceStatus,
    kind: AbsenceType,
) -> BalanceDelta {
    if !kind.affects_balance() || current == target {
        return BalanceDelta::Unchanged;
    }
    match (current, target) {
        (AbsenceStatus::Rejected, AbsenceStatus::Approved) => BalanceDelta::Deduct,
        (_, AbsenceStatus::Rejected) => BalanceDelta::Restore,
        _ => BalanceDelta::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn end_date_is_start_plus_count_minus_one() {
        assert_eq!(end_date(ymd(2026, 1, 10), 5), ymd(2026, 1, 14));
    }

    #[test]
    fn single_day_absence_ends_on_start() {
        assert_eq!(end_date(ymd(2026, 3, 4), 1), ymd(2026, 3, 4));
    }

    #[test]
    fn approving_a_pending_request_leaves_the_balance_alone() {
        assert_eq!(
            balance_delta(
                AbsenceStatus::Pending,
                AbsenceStatus::Approved,
                AbsenceType::Personal
            ),
            BalanceDelta::Unchanged
        );
    }

    #[test]
    fn reapproving_a_rejected_personal_request_deducts_again() {
        assert_eq!(
            balance_delta(
                AbsenceStatus::Rejected,
                AbsenceStatus::Approved,
                AbsenceType::Personal
            ),
            BalanceDelta::Deduct
        );
    }

    #[test]
    fn rejecting_a_deducted_personal_request_restores() {
        for current in [AbsenceStatus::Pending, AbsenceStatus::Approved] {
            assert_eq!(
                balance_delta(current, AbsenceStatus::Rejected, AbsenceType::Personal),
                BalanceDelta::Restore
            );
        }
    }

    #[test]
    fn repeating_a_transition_changes_nothing() {
        for status in [
            AbsenceStatus::Pending,
            AbsenceStatus::Approved,
            AbsenceStatus::Rejected,
        ] {
            assert_eq!(
                balance_delta(status, status, AbsenceType::Personal),
                BalanceDelta::Unchanged
            );
        }
    }

    #[test]
    fn non_personal_requests_never_touch_the_balance() {
        for kind in [AbsenceType::Sick, AbsenceType::Other] {
            for current in [
                AbsenceStatus::Pending,
                AbsenceStatus::Approved,
                AbsenceStatus::Rejected,
            ] {
                for target in [AbsenceStatus::Approved, AbsenceStatus::Rejected] {
                    assert_eq!(
                        balance_delta(current, target, kind),
                        BalanceDelta::Unchanged
                    );
                }
            }
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        use std::str::FromStr;
        assert_eq!(AbsenceStatus::Pending.to_string(), "pending");
        assert_eq!(
            AbsenceStatus::from_str("rejected").unwrap(),
            AbsenceStatus::Rejected
        );
        assert_eq!(AbsenceType::from_str("personal").unwrap(), AbsenceType::Personal);
        assert!(AbsenceType::from_str("holiday").is_err());
    }
}
