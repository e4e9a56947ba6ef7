use std::str::FromStr;

use crate::auth::auth::AuthUser;
use crate::api::holiday::load_holiday_calendar;
use crate::calendar;
use crate::export;
use crate::model::absence::{
    self, Absence, AbsenceStatus, AbsenceType, BalanceDelta, balance_delta,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

const SELECT_ABSENCE: &str = r#"
    SELECT a.id, a.user_id, u.name AS user_name, a.absence_type,
           a.days_count, a.days_taken, a.status, a.start_date, a.created
    FROM absences a
    JOIN users u ON u.id = a.user_id
"#;

#[derive(Deserialize, ToSchema)]
pub struct CreateAbsence {
    #[schema(example = "personal")]
    pub absence_type: AbsenceType,
    #[schema(example = "2026-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    /// Calendar days covered by the request
    #[schema(example = 5)]
    pub days_count: u8,
}

#[derive(Deserialize, IntoParams)]
pub struct AbsenceExportQuery {
    /// Year to export; defaults to the current year
    pub year: Option<i32>,
    /// Restrict to one absence type (sick | personal | other)
    pub absence_type: Option<String>,
}

fn internal_error(e: sqlx::Error, context: &'static str) -> actix_web::Error {
    error!(error = %e, context, "Database error");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

fn parse_stored<T: FromStr>(raw: &str, context: &'static str) -> actix_web::Result<T> {
    raw.parse().map_err(|_| {
        error!(value = raw, context, "Unrecognized stored value");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

/// Submit an absence request. For personal leave the non-working days in the
/// range are subtracted from the requested duration and the result is deducted
/// from the user's balance, in the same transaction as the insert.
#[utoipa::path(
    post,
    path = "/api/absences",
    request_body = CreateAbsence,
    responses(
        (status = 200, description = "Absence request submitted"),
        (status = 400, description = "Invalid dates or insufficient balance"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Absences"
)]
pub async fn create_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAbsence>,
) -> actix_web::Result<impl Responder> {
    if payload.days_count == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Request must cover at least one day"
        })));
    }

    if payload.start_date < Utc::now().date_naive() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Start date cannot be in the past"
        })));
    }

    let holidays = load_holiday_calendar(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "load holidays"))?;

    let days_taken = if payload.absence_type.affects_balance() {
        calendar::leave_days_taken(payload.start_date, payload.days_count, &holidays)
    } else {
        payload.days_count
    };

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| internal_error(e, "begin create absence"))?;

    let balance: Option<i32> =
        sqlx::query_scalar("SELECT absence_days FROM users WHERE id = ? FOR UPDATE")
            .bind(&auth.user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| internal_error(e, "fetch balance"))?;

    let balance = match balance {
        Some(b) => b,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "User not found"
            })));
        }
    };

    if payload.absence_type.affects_balance() {
        if i32::from(days_taken) > balance {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": format!("Only {balance} absence days left")
            })));
        }

        sqlx::query("UPDATE users SET absence_days = absence_days - ? WHERE id = ?")
            .bind(i32::from(days_taken))
            .bind(&auth.user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal_error(e, "deduct balance"))?;
    }

    sqlx::query(
        r#"
        INSERT INTO absences (user_id, absence_type, days_count, days_taken, status, start_date, created)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&auth.user_id)
    .bind(payload.absence_type.to_string())
    .bind(payload.days_count)
    .bind(days_taken)
    .bind(AbsenceStatus::Pending.to_string())
    .bind(payload.start_date)
    .bind(Utc::now().naive_utc())
    .execute(&mut *tx)
    .await
    .map_err(|e| internal_error(e, "insert absence"))?;

    tx.commit()
        .await
        .map_err(|e| internal_error(e, "commit create absence"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Absence request submitted",
        "status": "pending",
        "days_taken": days_taken,
        "end_date": absence::end_date(payload.start_date, payload.days_count)
    })))
}

/// List the caller's own absence requests
#[utoipa::path(
    get,
    path = "/api/absences",
    responses(
        (status = 200, description = "Own absences", body = [Absence]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Absences"
)]
pub async fn my_absences(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let absences = sqlx::query_as::<_, Absence>(&format!(
        "{SELECT_ABSENCE} WHERE a.user_id = ? ORDER BY a.created DESC"
    ))
    .bind(&auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "list own absences"))?;

    Ok(HttpResponse::Ok().json(absences))
}

/// List everyone's absence requests (admin)
#[utoipa::path(
    get,
    path = "/api/absences/all",
    responses(
        (status = 200, description = "All absences", body = [Absence]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Absences"
)]
pub async fn all_absences(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let absences =
        sqlx::query_as::<_, Absence>(&format!("{SELECT_ABSENCE} ORDER BY a.created DESC"))
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| internal_error(e, "list all absences"))?;

    Ok(HttpResponse::Ok().json(absences))
}

/// Fetch one absence request (owner or admin)
#[utoipa::path(
    get,
    path = "/api/absences/{id}",
    params(("id" = u64, Path, description = "Absence ID")),
    responses(
        (status = 200, description = "Absence found", body = Absence),
        (status = 404, description = "Absence not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Absences"
)]
pub async fn get_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let absence_id = path.into_inner();

    let absence = sqlx::query_as::<_, Absence>(&format!("{SELECT_ABSENCE} WHERE a.id = ?"))
        .bind(absence_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "fetch absence"))?;

    match absence {
        Some(absence) => {
            auth.require_self_or_admin(&absence.user_id)?;
            Ok(HttpResponse::Ok().json(absence))
        }
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Absence not found"
        }))),
    }
}

/// Cancel (delete) an absence request. Cancelling a non-rejected personal
/// absence gives the deducted days back.
#[utoipa::path(
    delete,
    path = "/api/absences/{id}",
    params(("id" = u64, Path, description = "Absence ID")),
    responses(
        (status = 200, description = "Absence cancelled"),
        (status = 404, description = "Absence not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Absences"
)]
pub async fn cancel_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let absence_id = path.into_inner();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| internal_error(e, "begin cancel absence"))?;

    let row: Option<(String, String, u8, String)> = sqlx::query_as(
        "SELECT user_id, absence_type, days_taken, status FROM absences WHERE id = ? FOR UPDATE",
    )
    .bind(absence_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| internal_error(e, "fetch absence for cancel"))?;

    let (user_id, absence_type, days_taken, status) = match row {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Absence not found"
            })));
        }
    };

    auth.require_self_or_admin(&user_id)?;

    let current: AbsenceStatus = parse_stored(&status, "absence status")?;
    let kind: AbsenceType = parse_stored(&absence_type, "absence type")?;

    // Cancelling ends the request the same way a rejection would.
    if balance_delta(current, AbsenceStatus::Rejected, kind) == BalanceDelta::Restore {
        sqlx::query("UPDATE users SET absence_days = absence_days + ? WHERE id = ?")
            .bind(i32::from(days_taken))
            .bind(&user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal_error(e, "restore balance on cancel"))?;
    }

    sqlx::query("DELETE FROM absences WHERE id = ?")
        .bind(absence_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| internal_error(e, "delete absence"))?;

    tx.commit()
        .await
        .map_err(|e| internal_error(e, "commit cancel absence"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Absence cancelled"
    })))
}

/// Approve an absence request (admin). Re-approving a rejected personal
/// absence deducts its days again; approving twice is rejected.
#[utoipa::path(
    put,
    path = "/api/absences/{id}/approve",
    params(("id" = u64, Path, description = "Absence ID")),
    responses(
        (status = 200, description = "Absence approved"),
        (status = 400, description = "Already approved"),
        (status = 404, description = "Absence not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Absences"
)]
pub async fn approve_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let absence_id = path.into_inner();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| internal_error(e, "begin approve absence"))?;

    let row: Option<(String, String, u8, String)> = sqlx::query_as(
        "SELECT user_id, absence_type, days_taken, status FROM absences WHERE id = ? FOR UPDATE",
    )
    .bind(absence_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| internal_error(e, "fetch absence for approve"))?;

    let (user_id, absence_type, days_taken, status) = match row {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Absence not found"
            })));
        }
    };

    let current: AbsenceStatus = parse_stored(&status, "absence status")?;
    let kind: AbsenceType = parse_stored(&absence_type, "absence type")?;

    if current == AbsenceStatus::Approved {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Absence already approved"
        })));
    }

    if balance_delta(current, AbsenceStatus::Approved, kind) == BalanceDelta::Deduct {
        let balance: i32 =
            sqlx::query_scalar("SELECT absence_days FROM users WHERE id = ? FOR UPDATE")
                .bind(&user_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| internal_error(e, "fetch balance for approve"))?;

        if i32::from(days_taken) > balance {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": format!("Only {balance} absence days left")
            })));
        }

        sqlx::query("UPDATE users SET absence_days = absence_days - ? WHERE id = ?")
            .bind(i32::from(days_taken))
            .bind(&user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal_error(e, "deduct balance on approve"))?;
    }

    sqlx::query("UPDATE absences SET status = ? WHERE id = ?")
        .bind(AbsenceStatus::Approved.to_string())
        .bind(absence_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| internal_error(e, "set absence approved"))?;

    tx.commit()
        .await
        .map_err(|e| internal_error(e, "commit approve absence"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Absence approved"
    })))
}

/// Reject an absence request (admin). Rejecting a personal absence restores
/// the user's balance; rejecting twice is rejected.
#[utoipa::path(
    put,
    path = "/api/absences/{id}/reject",
    params(("id" = u64, Path, description = "Absence ID")),
    responses(
        (status = 200, description = "Absence rejected"),
        (status = 400, description = "Already rejected"),
        (status = 404, description = "Absence not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Absences"
)]
pub async fn reject_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let absence_id = path.into_inner();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| internal_error(e, "begin reject absence"))?;

    let row: Option<(String, String, u8, String)> = sqlx::query_as(
        "SELECT user_id, absence_type, days_taken, status FROM absences WHERE id = ? FOR UPDATE",
    )
    .bind(absence_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| internal_error(e, "fetch absence for reject"))?;

    let (user_id, absence_type, days_taken, status) = match row {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Absence not found"
            })));
        }
    };

    let current: AbsenceStatus = parse_stored(&status, "absence status")?;
    let kind: AbsenceType = parse_stored(&absence_type, "absence type")?;

    if current == AbsenceStatus::Rejected {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Absence already rejected"
        })));
    }

    if balance_delta(current, AbsenceStatus::Rejected, kind) == BalanceDelta::Restore {
        sqlx::query("UPDATE users SET absence_days = absence_days + ? WHERE id = ?")
            .bind(i32::from(days_taken))
            .bind(&user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal_error(e, "restore balance on reject"))?;
    }

    sqlx::query("UPDATE absences SET status = ? WHERE id = ?")
        .bind(AbsenceStatus::Rejected.to_string())
        .bind(absence_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| internal_error(e, "set absence rejected"))?;

    tx.commit()
        .await
        .map_err(|e| internal_error(e, "commit reject absence"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Absence rejected"
    })))
}

/// CSV export of approved absences: month rows, employee columns, summed
/// days taken (admin).
#[utoipa::path(
    get,
    path = "/api/absences/export",
    params(AbsenceExportQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 400, description = "Unknown absence type"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Absences"
)]
pub async fn export_absences(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AbsenceExportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let absence_type = match query.absence_type.as_deref() {
        Some(raw) => match AbsenceType::from_str(raw) {
            Ok(t) => Some(t.to_string()),
            Err(_) => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "Unknown absence type. Allowed: sick, personal, other"
                })));
            }
        },
        None => None,
    };

    let absences = sqlx::query_as::<_, Absence>(&format!(
        "{SELECT_ABSENCE} WHERE a.status = ? ORDER BY a.start_date"
    ))
    .bind(AbsenceStatus::Approved.to_string())
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "fetch absences for export"))?;

    let csv = export::absence_matrix_csv(&absences, year, absence_type.as_deref()).map_err(|e| {
        error!(error = %e, "Failed to build absence export");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"absences-{year}.csv\""),
        ))
        .body(csv))
}
