use axum::{
    extract::{Extension, State},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{extract::Json, middleware::auth::CurrentUser, state::AppState},
    auth::{self, AuthService, SESSION_COOKIE},
    domain::{CreateUserRequest, User},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    id: Uuid,
    email: String,
    username: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>)> {
    request.validate()?;

    let user = state.service_context.user_repo
        .create(request)
        .await
        .map_err(|e| match e {
            AppError::Database(msg) if msg.contains("UNIQUE") => {
                if msg.contains("email") {
                    AppError::Conflict("Email already registered".to_string())
                } else {
                    AppError::Conflict("Username already taken".to_string())
                }
            }
            other => other,
        })?;

    tracing::info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let (user_id, password_hash) = auth::get_password_hash(&state.service_context.db_pool, &req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !AuthService::verify_password(&req.password, &password_hash).await? {
        return Err(AppError::Unauthorized);
    }

    let (_session, token) = state.service_context.auth_service
        .create_session(user_id)
        .await?;

    let cookie = state.service_context.auth_service
        .create_session_cookie(&token, state.settings.auth.secure_cookies);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
        })
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        let _ = state.service_context.auth_service
            .invalidate_session(session_cookie.value())
            .await;
    }

    let jar = jar.add(AuthService::create_logout_cookie());

    Ok((jar, StatusCode::NO_CONTENT))
}

/// The signed-in user's own account.
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<UserDto> {
    Json(current.user.into())
}
