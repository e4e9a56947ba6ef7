use crate::auth::auth::AuthUser;
use crate::export::{self, TripExportFilter};
use crate::model::business_trip::{BusinessTrip, BusinessTripStatus, CarOwnership};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

const SELECT_TRIP: &str = r#"
    SELECT id, issue_id, issue_date, status, project_name, user_full_name, task,
           start_date, end_date, total_days, car_ownership, wage,
           accommodation_money, car_brand, car_model, car_registration_number,
           destination, departure_date, date_of_arrival, additional_expenses,
           car_usage_per_hundred_km, price_per_liter, expenses_responsibility,
           created, user_id
    FROM business_trips
"#;

#[derive(Deserialize, ToSchema)]
pub struct CreateTrip {
    #[schema(example = "Warehouse revamp")]
    pub project_name: String,
    #[schema(example = "On-site inspection", nullable = true)]
    pub task: Option<String>,
    #[schema(example = "2026-02-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-02-12", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "company")]
    pub car_ownership: CarOwnership,
    #[schema(example = 40.0)]
    pub wage: f64,
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
}

#[derive(Deserialize, IntoParams)]
pub struct TripExportQuery {
    /// Year to export; defaults to the current year
    pub year: Option<i32>,
    /// 1-based month; omit for a whole-year export with a monthly summary
    pub month: Option<u32>,
    /// Restrict to one project by exact name
    pub project: Option<String>,
}

fn internal_error(e: sqlx::Error, context: &'static str) -> actix_web::Error {
    error!(error = %e, context, "Database error");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/// Re-rank issue numbers so that trips sharing an issue month are numbered
/// 1..n in (issue_date, id) order. Runs inside the caller's transaction.
async fn resequence_issue_ids(
    tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
) -> Result<(), sqlx::Error> {
    let rows: Vec<(u64, u32, NaiveDate)> =
        sqlx::query_as("SELECT id, issue_id, issue_date FROM business_trips ORDER BY issue_date, id")
            .fetch_all(&mut **tx)
            .await?;

    let mut current_month: Option<(i32, u32)> = None;
    let mut rank = 0u32;
    for (id, issue_id, issue_date) in rows {
        let month = (issue_date.year(), issue_date.month());
        if current_month != Some(month) {
            current_month = Some(month);
            rank = 0;
        }
        rank += 1;

        if issue_id != rank {
            sqlx::query("UPDATE business_trips SET issue_id = ? WHERE id = ?")
                .bind(rank)
                .bind(id)
                .execute(&mut **tx)
                .await?;
        }
    }

    Ok(())
}

/// Submit a business-trip request. The issue date is today and the issue
/// number is assigned by re-ranking all trips of the issue month.
#[utoipa::path(
    post,
    path = "/api/trips",
    request_body = CreateTrip,
    responses(
        (status = 200, description = "Trip request submitted"),
        (status = 400, description = "Invalid project name or date range"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Trips"
)]
pub async fn create_trip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTrip>,
) -> actix_web::Result<impl Responder> {
    if payload.project_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Project name must not be empty"
        })));
    }

    if payload.end_date < payload.start_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "End date must not precede start date"
        })));
    }

    let total_days = (payload.end_date - payload.start_date).num_days() + 1;
    if total_days > u8::MAX as i64 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Trip is too long"
        })));
    }

    let user_full_name: Option<String> = sqlx::query_scalar("SELECT name FROM users WHERE id = ?")
        .bind(&auth.user_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "fetch trip requester"))?;

    let user_full_name = match user_full_name {
        Some(name) => name,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "User not found"
            })));
        }
    };

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| internal_error(e, "begin create trip"))?;

    sqlx::query(
        r#"
        INSERT INTO business_trips (
            issue_id, issue_date, status, project_name, user_full_name, task,
            start_date, end_date, total_days, car_ownership, wage,
            accommodation_money, car_brand, car_model, car_registration_number,
            destination, departure_date, date_of_arrival, additional_expenses,
            car_usage_per_hundred_km, price_per_liter, expenses_responsibility,
            created, user_id
        )
        VALUES (0, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Utc::now().date_naive())
    .bind(BusinessTripStatus::Pending.to_string())
    .bind(payload.project_name.trim())
    .bind(&user_full_name)
    .bind(&payload.task)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(total_days as u8)
    .bind(payload.car_ownership.to_string())
    .bind(payload.wage)
    .bind(payload.accommodation_money)
    .bind(&payload.car_brand)
    .bind(&payload.car_model)
    .bind(&payload.car_registration_number)
    .bind(&payload.destination)
    .bind(payload.departure_date)
    .bind(payload.date_of_arrival)
    .bind(payload.additional_expenses)
    .bind(payload.car_usage_per_hundred_km)
    .bind(payload.price_per_liter)
    .bind(&payload.expenses_responsibility)
    .bind(Utc::now().naive_utc())
    .bind(&auth.user_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| internal_error(e, "insert trip"))?;

    resequence_issue_ids(&mut tx)
        .await
        .map_err(|e| internal_error(e, "resequence issue ids"))?;

    tx.commit()
        .await
        .map_err(|e| internal_error(e, "commit create trip"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Trip request submitted",
        "status": "pending"
    })))
}

/// List the caller's own trip requests
#[utoipa::path(
    get,
    path = "/api/trips",
    responses(
        (status = 200, description = "Own trips", body = [BusinessTrip]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Trips"
)]
pub async fn my_trips(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let trips = sqlx::query_as::<_, BusinessTrip>(&format!(
        "{SELECT_TRIP} WHERE user_id = ? ORDER BY created DESC"
    ))
    .bind(&auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "list own trips"))?;

    Ok(HttpResponse::Ok().json(trips))
}

/// List everyone's trip requests (admin)
#[utoipa::path(
    get,
    path = "/api/trips/all",
    responses(
        (status = 200, description = "All trips", body = [BusinessTrip]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Trips"
)]
pub async fn all_trips(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let trips = sqlx::query_as::<_, BusinessTrip>(&format!("{SELECT_TRIP} ORDER BY created DESC"))
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "list all trips"))?;

    Ok(HttpResponse::Ok().json(trips))
}

/// Fetch one trip request (owner or admin)
#[utoipa::path(
    get,
    path = "/api/trips/{id}",
    params(("id" = u64, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip found", body = BusinessTrip),
        (status = 404, description = "Trip not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Trips"
)]
pub async fn get_trip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let trip_id = path.into_inner();

    let trip = sqlx::query_as::<_, BusinessTrip>(&format!("{SELECT_TRIP} WHERE id = ?"))
        .bind(trip_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "fetch trip"))?;

    match trip {
        Some(trip) => {
            auth.require_self_or_admin(&trip.user_id)?;
            Ok(HttpResponse::Ok().json(trip))
        }
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Trip not found"
        }))),
    }
}

/// Delete a trip request (owner or admin). Remaining trips of the issue
/// month are re-ranked.
#[utoipa::path(
    delete,
    path = "/api/trips/{id}",
    params(("id" = u64, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip deleted"),
        (status = 404, description = "Trip not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Trips"
)]
pub async fn delete_trip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let trip_id = path.into_inner();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| internal_error(e, "begin delete trip"))?;

    let owner: Option<String> =
        sqlx::query_scalar("SELECT user_id FROM business_trips WHERE id = ? FOR UPDATE")
            .bind(trip_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| internal_error(e, "fetch trip for delete"))?;

    let owner = match owner {
        Some(o) => o,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Trip not found"
            })));
        }
    };

    auth.require_self_or_admin(&owner)?;

    sqlx::query("DELETE FROM business_trips WHERE id = ?")
        .bind(trip_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| internal_error(e, "delete trip"))?;

    resequence_issue_ids(&mut tx)
        .await
        .map_err(|e| internal_error(e, "resequence after delete"))?;

    tx.commit()
        .await
        .map_err(|e| internal_error(e, "commit delete trip"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Trip deleted"
    })))
}

async fn transition_trip(
    pool: &MySqlPool,
    trip_id: u64,
    to: BusinessTripStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE business_trips SET status = ? WHERE id = ? AND status = ?")
        .bind(to.to_string())
        .bind(trip_id)
        .bind(BusinessTripStatus::Pending.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Approve a pending trip request (admin)
#[utoipa::path(
    put,
    path = "/api/trips/{id}/approve",
    params(("id" = u64, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip approved"),
        (status = 400, description = "Trip not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Trips"
)]
pub async fn approve_trip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let transitioned = transition_trip(pool.get_ref(), path.into_inner(), BusinessTripStatus::Approved)
        .await
        .map_err(|e| internal_error(e, "approve trip"))?;

    if !transitioned {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Trip not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Trip approved"
    })))
}

/// Reject a pending trip request (admin)
#[utoipa::path(
    put,
    path = "/api/trips/{id}/reject",
    params(("id" = u64, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Trip rejected"),
        (status = 400, description = "Trip not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Trips"
)]
pub async fn reject_trip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let transitioned = transition_trip(pool.get_ref(), path.into_inner(), BusinessTripStatus::Rejected)
        .await
        .map_err(|e| internal_error(e, "reject trip"))?;

    if !transitioned {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Trip not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Trip rejected"
    })))
}

/// CSV export of approved trips with computed totals (admin)
#[utoipa::path(
    get,
    path = "/api/trips/export",
    params(TripExportQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Trips"
)]
pub async fn export_trips(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TripExportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if let Some(month) = query.month {
        if !(1..=12).contains(&month) {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Month must be between 1 and 12"
            })));
        }
    }

    let filter = TripExportFilter {
        year: query.year.unwrap_or_else(|| Utc::now().year()),
        month: query.month,
        project: query.project.clone(),
    };

    let trips = sqlx::query_as::<_, BusinessTrip>(&format!(
        "{SELECT_TRIP} WHERE status = ? ORDER BY issue_date, issue_id"
    ))
    .bind(BusinessTripStatus::Approved.to_string())
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "fetch trips for export"))?;

    let csv = export::trips_csv(&trips, &filter).map_err(|e| {
        error!(error = %e, "Failed to build trip export");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"trips-{}.csv\"", filter.year),
        ))
        .body(csv))
}
