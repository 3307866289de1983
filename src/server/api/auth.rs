use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use crate::auth::RequireUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{CredentialsRequest, SessionResponse, UserResponse};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{validate_password, validate_username};
use crate::types::User;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

fn open_session(state: &AppState, user: User) -> SessionResponse {
    let (token, session) = state.sessions.issue(user.id);
    SessionResponse {
        token,
        expires_at: session.expires_at,
        user: user.into(),
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    let username = req.username.trim();
    validate_username(username)?;
    validate_password(&req.password)?;

    let hash = state.passwords.hash(&req.password)?;
    let user = state
        .store
        .create_user(username, &hash)
        .map_err(|e| match e {
            Error::AlreadyExists => ApiError::conflict("Username already taken"),
            other => other.into(),
        })?;

    info!(user_id = user.id, "Registered user {}", user.username);

    let session = open_session(&state, user);
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(session))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    let user = match state.store.get_user_by_username(req.username.trim()) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(ApiError::unauthorized(INVALID_CREDENTIALS)),
        Err(e) => return Err(e.into()),
    };

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let session = open_session(&state, user);
    Ok::<_, ApiError>(Json(ApiResponse::success(session)))
}

pub async fn logout(auth: RequireUser, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.sessions.revoke(&auth.token);
    StatusCode::NO_CONTENT
}

pub async fn me(auth: RequireUser) -> impl IntoResponse {
    Json(ApiResponse::success(UserResponse::from(auth.user)))
}
