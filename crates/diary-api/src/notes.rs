use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use diary_types::api::CreateNoteRequest;

use crate::AppState;
use crate::service::{self, Principal};

pub async fn list_notes(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> Result<impl IntoResponse, StatusCode> {
    let principal = principal.map(|Extension(p)| p);

    // Run blocking DB queries off the async runtime
    let notes = tokio::task::spawn_blocking(move || {
        service::list_notes(&state.db, principal.as_ref())
    })
    .await
    .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })??;

    Ok(Json(notes))
}

pub async fn create_note(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    Json(req): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let principal = principal.map(|Extension(p)| p);

    let note = tokio::task::spawn_blocking(move || {
        service::create_note(&state.db, principal.as_ref(), &req.content)
    })
    .await
    .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })??;

    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(note_id): Path<i64>,
    principal: Option<Extension<Principal>>,
) -> Result<impl IntoResponse, StatusCode> {
    let principal = principal.map(|Extension(p)| p);
    let policy = state.delete_policy;

    tokio::task::spawn_blocking(move || {
        service::delete_note(&state.db, principal.as_ref(), note_id, policy)
    })
    .await
    .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })??;

    Ok(StatusCode::NO_CONTENT)
}
