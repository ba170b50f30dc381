use axum::{Json, extract::State, http::StatusCode};
use sea_orm::*;
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use crate::infrastructure::auth::{ADMIN_ROLE, Claims, create_jwt, hash_password, verify_password};
use crate::models::user;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    id: i32,
    username: String,
    role: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".into())
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = super::error::ErrorBody)
    )
)]
pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    tracing::info!("Login attempt for user: {}", payload.username);

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&db)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", payload.username);
            invalid_credentials()
        })?;

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {
            let token = create_jwt(user.id, &user.username, &user.role).map_err(ApiError::Internal)?;
            tracing::info!("User {} logged in", user.username);
            Ok(Json(LoginResponse { token }))
        }
        _ => {
            tracing::warn!("Password verification failed for user: {}", user.username);
            Err(invalid_credentials())
        }
    }
}

/// Creates the first admin account; refused once any user exists
pub async fn register(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(StatusCode, Json<MeResponse>)> {
    let existing = user::Entity::find()
        .count(&db)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if existing > 0 {
        return Err(ApiError::Forbidden("Registration is closed".into()));
    }

    let model = create_user(&db, &payload.username, &payload.password, ADMIN_ROLE).await?;
    tracing::info!("Created admin user {}", model.username);

    Ok((
        StatusCode::CREATED,
        Json(MeResponse {
            id: model.id,
            username: model.username,
            role: model.role,
        }),
    ))
}

pub async fn me(claims: Claims) -> Json<MeResponse> {
    Json(MeResponse {
        id: claims.uid,
        username: claims.sub,
        role: claims.role,
    })
}

pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role: &str,
) -> ApiResult<user::Model> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("username and password are required".into()));
    }

    let password_hash = hash_password(password).map_err(ApiError::Internal)?;
    let now = chrono::Utc::now().to_rfc3339();
    let user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    user.insert(db)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
}
