use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// Bearer token claims. Tokens are minted by the account service that owns
/// registration; `sub` carries the username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Notes --

/// Body of `POST /api/notes`. Any `id`, `createdAt` or `userId` the client
/// sends is dropped here; the server assigns those.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
