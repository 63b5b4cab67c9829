pub mod middleware;
pub mod notes;
pub mod service;

use std::sync::Arc;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{delete, get},
};

use diary_db::Database;
use diary_types::api::HealthResponse;

use crate::middleware::require_auth;
use crate::service::DeletePolicy;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub delete_policy: DeletePolicy,
}

/// Build the HTTP surface: `/health` is public, everything under
/// `/api/notes` needs a bearer token.
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route("/api/notes/{id}", delete(notes::delete_note))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(protected_routes)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
