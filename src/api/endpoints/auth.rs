//! Authentication endpoints.
//!
//! `POST /api/auth/login` — unprotected: exchange credentials for a token
//! `POST /api/auth/register` — admin: create a user
//! `GET /api/auth/verify` — protected: resolve the presented token (client
//! session restore after a page reload)

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{require_admin, ApiContext};
use crate::auth::{self, AuthContext};
use crate::models::enums::Role;
use crate::models::{User, UserSummary};
use crate::store;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// `POST /api/auth/login` — validate credentials, issue a 24h bearer token.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password required".into(),
        ));
    }

    let users = ctx.store.load_users()?;
    let user = users
        .iter()
        .find(|u| u.username == request.username)
        .ok_or(ApiError::InvalidCredentials)?;

    if !auth::verify_password(&request.password, &user.salt, &user.password_hash) {
        tracing::warn!(username = %request.username, "Failed login attempt");
        return Err(ApiError::InvalidCredentials);
    }

    let token = ctx.signer.issue(user);
    tracing::info!(username = %user.username, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserSummary::from(user),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Option<Role>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: UserSummary,
}

/// `POST /api/auth/register` — create a user (admin only).
pub async fn register(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<AuthContext>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    require_admin(&caller)?;

    if request.username.is_empty()
        || request.password.is_empty()
        || request.name.is_empty()
        || request.email.is_empty()
    {
        return Err(ApiError::BadRequest("All fields required".into()));
    }
    let role = request
        .role
        .ok_or_else(|| ApiError::BadRequest("All fields required".into()))?;

    let _guard = ctx.store.lock_users()?;
    let mut users = ctx.store.load_users()?;

    if users
        .iter()
        .any(|u| u.username == request.username || u.email == request.email)
    {
        return Err(ApiError::Conflict(
            "Username or email already exists".into(),
        ));
    }

    let hashed = auth::hash_password(&request.password);
    let user = User {
        id: store::next_id(users.iter().map(|u| u.id)),
        username: request.username,
        password_hash: hashed.hash,
        salt: hashed.salt,
        name: request.name,
        email: request.email,
        role,
        created_at: Utc::now(),
    };

    let summary = UserSummary::from(&user);
    users.push(user);
    ctx.store.save_users(&users)?;

    tracing::info!(username = %summary.username, role = %summary.role, "User registered");
    Ok((StatusCode::CREATED, Json(RegisterResponse { user: summary })))
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub user: UserSummary,
}

/// `GET /api/auth/verify` — resolve the bearer token to its user record.
pub async fn verify(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<AuthContext>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let users = ctx.store.load_users()?;
    let user = users
        .iter()
        .find(|u| u.id == caller.user_id)
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(VerifyResponse {
        user: UserSummary::from(user),
    }))
}
