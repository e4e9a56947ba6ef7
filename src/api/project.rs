use crate::auth::auth::AuthUser;
use crate::model::project::Project;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ProjectPayload {
    #[schema(example = "Warehouse revamp")]
    pub name: String,
    #[schema(example = "Rework of the central warehouse", nullable = true)]
    pub description: Option<String>,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-06-30", value_type = String, format = "date")]
    pub end_date: NaiveDate,
}

fn internal_error(e: sqlx::Error, context: &'static str) -> actix_web::Error {
    error!(error = %e, context, "Database error");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

fn validate(payload: &ProjectPayload) -> Option<HttpResponse> {
    if payload.name.trim().is_empty() {
        return Some(HttpResponse::BadRequest().json(json!({
            "message": "Project name must not be empty"
        })));
    }
    if payload.end_date < payload.start_date {
        return Some(HttpResponse::BadRequest().json(json!({
            "message": "End date must not precede start date"
        })));
    }
    None
}

/// List projects, usable as trip targets by any signed-in user
#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "All projects", body = [Project]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn list_projects(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let projects = sqlx::query_as::<_, Project>(
        "SELECT id, name, description, start_date, end_date FROM projects ORDER BY start_date DESC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "list projects"))?;

    Ok(HttpResponse::Ok().json(projects))
}

/// Create a project (admin)
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = ProjectPayload,
    responses(
        (status = 201, description = "Project created"),
        (status = 400, description = "Invalid name or date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn create_project(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ProjectPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if let Some(resp) = validate(&payload) {
        return Ok(resp);
    }

    sqlx::query(
        "INSERT INTO projects (name, description, start_date, end_date) VALUES (?, ?, ?, ?)",
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "create project"))?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Project created"
    })))
}

/// Update a project (admin)
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(("id" = u64, Path, description = "Project ID")),
    request_body = ProjectPayload,
    responses(
        (status = 200, description = "Project updated"),
        (status = 400, description = "Invalid name or date range"),
        (status = 404, description = "Project not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn update_project(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ProjectPayload>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if let Some(resp) = validate(&payload) {
        return Ok(resp);
    }

    let result = sqlx::query(
        "UPDATE projects SET name = ?, description = ?, start_date = ?, end_date = ? WHERE id = ?",
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(path.into_inner())
    .execute(pool.get_ref())
    .await
    .map_err(|e| internal_error(e, "update project"))?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Project not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Project updated"
    })))
}

/// Delete a project (admin)
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(("id" = u64, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted"),
        (status = 404, description = "Project not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Projects"
)]
pub async fn delete_project(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "delete project"))?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Project not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Project deleted"
    })))
}
