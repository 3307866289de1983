mod auth;
mod shaders;
mod tags;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/me/shaders", get(shaders::list_my_shaders))
        // Shaders
        .route(
            "/shaders",
            get(shaders::search_shaders).post(shaders::create_shader),
        )
        .route(
            "/shaders/{id}",
            get(shaders::get_shader)
                .patch(shaders::update_shader)
                .delete(shaders::delete_shader),
        )
        // Tags
        .route("/tags", get(tags::list_tags))
        // Users
        .route("/users/{username}", get(users::get_user))
        .route("/users/{username}/shaders", get(users::list_user_shaders))
}
