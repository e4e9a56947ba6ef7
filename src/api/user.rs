use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::model::role::Role;
use crate::model::user::{User, rollover_balance};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

const SELECT_USER: &str =
    "SELECT id, name, email, password, role, contract_days, absence_days FROM users";

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "Anna Petrova")]
    pub name: String,
    #[schema(example = "anna@example.com")]
    pub email: String,
    #[schema(example = "s3cret")]
    pub password: String,
    /// 1 = admin, 2 = employee
    #[schema(example = 2)]
    pub role: u8,
    #[schema(example = 20)]
    pub contract_days: i32,
    #[schema(example = 20)]
    pub absence_days: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Replaces the stored hash when present
    pub password: Option<String>,
    pub role: Option<u8>,
    pub contract_days: Option<i32>,
    pub absence_days: Option<i32>,
}

fn internal_error(e: sqlx::Error, context: &'static str) -> actix_web::Error {
    error!(error = %e, context, "Database error");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/// List all users (admin)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let users = sqlx::query_as::<_, User>(&format!("{SELECT_USER} ORDER BY name"))
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "list users"))?;

    Ok(HttpResponse::Ok().json(users))
}

/// Fetch one user (self or admin)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    auth.require_self_or_admin(&user_id)?;

    let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?"))
        .bind(&user_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "fetch user"))?;

    match user {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "User not found"
        }))),
    }
}

/// Create a user with an explicit role and balances (admin)
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Missing fields or unknown role"),
        (status = 409, description = "Email already registered"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn create_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateUser>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let email = payload.email.trim().to_lowercase();
    if payload.name.trim().is_empty() || email.is_empty() || payload.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Name, email and password must not be empty"
        })));
    }

    if Role::from_id(payload.role).is_none() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Unknown role"
        })));
    }

    if payload.contract_days < 0 || payload.absence_days < 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Day balances must not be negative"
        })));
    }

    let hashed = hash_password(&payload.password);
    let id = Uuid::new_v4().to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password, role, contract_days, absence_days)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(payload.name.trim())
    .bind(&email)
    .bind(&hashed)
    .bind(payload.role)
    .bind(payload.contract_days)
    .bind(payload.absence_days)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "User created",
            "id": id
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code() == Some("23000".into()) {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Email already registered"
                    })));
                }
            }
            Err(internal_error(e, "create user"))
        }
    }
}

/// Update a user; only the provided fields change (admin)
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Unknown role"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<UpdateUser>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let user_id = path.into_inner();

    if let Some(role) = payload.role {
        if Role::from_id(role).is_none() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Unknown role"
            })));
        }
    }

    let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?"))
        .bind(&user_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "fetch user for update"))?;

    let mut user = match user {
        Some(u) => u,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "User not found"
            })));
        }
    };

    if let Some(name) = &payload.name {
        user.name = name.trim().to_string();
    }
    if let Some(email) = &payload.email {
        user.email = email.trim().to_lowercase();
    }
    if let Some(password) = &payload.password {
        user.password = hash_password(password);
    }
    if let Some(role) = payload.role {
        user.role = role;
    }
    if let Some(contract_days) = payload.contract_days {
        user.contract_days = contract_days;
    }
    if let Some(absence_days) = payload.absence_days {
        user.absence_days = absence_days;
    }

    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = ?, email = ?, password = ?, role = ?, contract_days = ?, absence_days = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(user.role)
    .bind(user.contract_days)
    .bind(user.absence_days)
    .bind(&user_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "User updated"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code() == Some("23000".into()) {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Email already registered"
                    })));
                }
            }
            Err(internal_error(e, "update user"))
        }
    }
}

/// Delete a user (admin)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let user_id = path.into_inner();

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&user_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "delete user"))?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "User not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "User deleted"
    })))
}

/// Year-end rollover: adds each user's contract days to their remaining
/// balance, capped at the carry-over maximum (admin).
#[utoipa::path(
    post,
    path = "/api/users/rollover",
    responses(
        (status = 200, description = "Balances rolled over"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn rollover_balances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| internal_error(e, "begin rollover"))?;

    let users: Vec<(String, i32, i32)> =
        sqlx::query_as("SELECT id, contract_days, absence_days FROM users FOR UPDATE")
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| internal_error(e, "fetch users for rollover"))?;

    let mut updated = 0u64;
    for (id, contract_days, absence_days) in users {
        let next = rollover_balance(absence_days, contract_days);
        if next != absence_days {
            sqlx::query("UPDATE users SET absence_days = ? WHERE id = ?")
                .bind(next)
                .bind(&id)
                .execute(&mut *tx)
                .await
                .map_err(|e| internal_error(e, "rollover balance"))?;
            updated += 1;
        }
    }

    tx.commit()
        .await
        .map_err(|e| internal_error(e, "commit rollover"))?;

    info!(users = updated, "Absence balances rolled over");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Balances rolled over",
        "users_updated": updated
    })))
}
