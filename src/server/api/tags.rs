use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse};

pub async fn list_tags(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tags = state.store.list_tags()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(tags)))
}
