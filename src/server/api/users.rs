use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::UserResponse;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user_by_username(&username)
        .or_not_found("User not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(UserResponse::from(user))))
}

pub async fn list_user_shaders(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user_by_username(&username)
        .or_not_found("User not found")?;

    let shaders = state.store.list_user_shaders(user.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(shaders)))
}
