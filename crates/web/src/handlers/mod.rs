//! Request handlers, one module per site section.

pub mod home;
pub mod lettings;
pub mod profiles;

use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use tracing::warn;

use db::DbPool;

use crate::render;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}

/// Fallback for routes that match nothing.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    warn!("No route for {}", uri);
    (StatusCode::NOT_FOUND, render::not_found())
}

#[cfg(test)]
mod tests;
