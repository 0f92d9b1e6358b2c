use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod session;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/generate", post(handlers::generate))
        .route("/api/media", get(handlers::list_media))
        .route("/api/media/:id", delete(handlers::delete_media))
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/:id", get(handlers::get_article))
        .route("/api/x_post", post(handlers::post_social))
        .route(
            "/api/personas",
            get(handlers::list_personas).post(handlers::create_persona),
        )
        .route("/api/upload", post(handlers::upload))
        .route("/success", get(handlers::payment_success))
        .route("/:category/*target", get(handlers::resolve_target))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use rmx_core::{Error, Result};
}
