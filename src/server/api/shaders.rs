use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{CreateShaderRequest, SearchShadersParams};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PageResponse, StoreResultExt,
};
use crate::server::validation::{validate_shader_name, validate_tags};
use crate::types::{NewShader, ShaderId, ShaderListing, ShaderUpdate};

pub async fn search_shaders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchShadersParams>,
) -> impl IntoResponse {
    let query = params.into_query();
    let page = state.store.search(&query)?;

    Ok::<_, ApiError>(Json(PageResponse::new(
        page.items,
        page.total,
        page.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        page.offset,
    )))
}

pub async fn list_my_shaders(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let shaders = state.store.list_user_shaders(auth.user.id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(shaders)))
}

pub async fn create_shader(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateShaderRequest>,
) -> impl IntoResponse {
    validate_shader_name(&req.name)?;
    validate_tags(&req.tags)?;

    let shader = state.store.create_shader(NewShader {
        owner_id: auth.user.id,
        name: req.name,
        scripts: req.scripts,
        tags: req.tags,
    })?;

    info!(shader_id = shader.id, user_id = auth.user.id, "Created shader");

    let listing = ShaderListing {
        shader,
        author: auth.user.username,
    };
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(listing))))
}

pub async fn get_shader(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ShaderId>,
) -> impl IntoResponse {
    let listing = state.store.get_shader(id).or_not_found("Shader not found")?;
    Ok::<_, ApiError>(Json(ApiResponse::success(listing)))
}

pub async fn update_shader(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ShaderId>,
    Json(req): Json<ShaderUpdate>,
) -> impl IntoResponse {
    if let Some(name) = &req.name {
        validate_shader_name(name)?;
    }
    if let Some(tags) = &req.tags {
        validate_tags(tags)?;
    }

    let shader = state
        .store
        .update_shader(id, auth.user.id, req)
        .or_not_found("Shader not found")?;

    let listing = ShaderListing {
        shader,
        author: auth.user.username,
    };
    Ok::<_, ApiError>(Json(ApiResponse::success(listing)))
}

pub async fn delete_shader(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ShaderId>,
) -> impl IntoResponse {
    state
        .store
        .delete_shader(id, auth.user.id)
        .or_not_found("Shader not found")?;

    info!(shader_id = id, user_id = auth.user.id, "Deleted shader");

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
