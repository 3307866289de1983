use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::Error;
use crate::server::AppState;
use crate::types::User;

/// Extractor that requires a live session.
pub struct RequireUser {
    pub token: String,
    pub user: User,
}

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired session"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                "WWW-Authenticate",
                HeaderValue::from_static("Bearer realm=\"shaderhub\""),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?.ok_or(AuthError::MissingAuth)?;
        let user = authenticate(state, &token)?;
        Ok(RequireUser { token, user })
    }
}

fn authenticate(state: &AppState, token: &str) -> Result<User, AuthError> {
    let session = state
        .sessions
        .resolve(token)
        .ok_or(AuthError::InvalidToken)?;

    match state.store.get_user(session.user_id) {
        Ok(user) => Ok(user),
        Err(Error::NotFound) => {
            state.sessions.revoke(token);
            Err(AuthError::InvalidToken)
        }
        Err(e) => {
            tracing::error!("Failed to load session user {}: {e}", session.user_id);
            Err(AuthError::InternalError)
        }
    }
}

/// Returns `None` when no Authorization header is present.
fn extract_bearer_token(parts: &Parts) -> Result<Option<String>, AuthError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = header.to_str().map_err(|_| AuthError::InvalidToken)?;

    header
        .strip_prefix("Bearer ")
        .map(|token| Some(token.trim().to_string()))
        .ok_or(AuthError::InvalidScheme)
}
