use crate::auth::auth::AuthUser;
use crate::calendar;
use crate::model::holiday_day::HolidayDay;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "Company anniversary")]
    pub name: String,
    #[schema(example = "2026-06-15", format = "date", value_type = String)]
    pub date: NaiveDate,
}

/// Custom holidays from the database unioned with the generated official sets
/// for the previous, current and next year. An official date that collides
/// with a stored custom holiday is dropped in favour of the stored one.
pub async fn load_holiday_calendar(pool: &MySqlPool) -> Result<Vec<HolidayDay>, sqlx::Error> {
    let mut holidays = sqlx::query_as::<_, HolidayDay>(
        "SELECT id, name, date, is_custom FROM holiday_days ORDER BY date DESC",
    )
    .fetch_all(pool)
    .await?;

    let year = Utc::now().year();
    for candidate_year in [year - 1, year, year + 1] {
        for official in calendar::official_holidays(candidate_year) {
            if holidays.iter().all(|h| h.date != official.date) {
                holidays.push(official);
            }
        }
    }

    Ok(holidays)
}

/// Shared calendar: custom + generated official holidays
#[utoipa::path(
    get,
    path = "/api/holidays",
    responses(
        (status = 200, description = "Holiday calendar", body = [HolidayDay]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn list_holidays(_auth: AuthUser, pool: web::Data<MySqlPool>) -> impl Responder {
    match load_holiday_calendar(pool.get_ref()).await {
        Ok(holidays) => HttpResponse::Ok().json(holidays),
        Err(e) => {
            error!(error = %e, "Failed to load holiday calendar");
            HttpResponse::InternalServerError().json(json!({
                "message": "Failed to load holiday calendar"
            }))
        }
    }
}

/// Add a custom holiday (admin)
#[utoipa::path(
    post,
    path = "/api/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 200, description = "Holiday created"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Holiday name must not be empty"
        })));
    }

    sqlx::query("INSERT INTO holiday_days (name, date, is_custom) VALUES (?, ?, TRUE)")
        .bind(payload.name.trim())
        .bind(payload.date)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create holiday");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Holiday created"
    })))
}

/// Delete a custom holiday (admin). Official holidays are computed and cannot
/// be deleted.
#[utoipa::path(
    delete,
    path = "/api/holidays/{id}",
    params(("id" = u64, Path, description = "Holiday ID")),
    responses(
        (status = 200, description = "Holiday deleted"),
        (status = 404, description = "No such custom holiday"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let holiday_id = path.into_inner();

    let result = sqlx::query("DELETE FROM holiday_days WHERE id = ? AND is_custom = TRUE")
        .bind(holiday_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, holiday_id, "Failed to delete holiday");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "No such custom holiday"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Holiday deleted"
    })))
}
