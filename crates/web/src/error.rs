//! HTTP-facing error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use db::DbError;

use crate::render;

#[derive(Debug, Error)]
pub enum WebError {
    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(DbError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbError> for WebError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => Self::NotFound,
            other => Self::Database(other),
        }
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self);
            (status, render::server_error()).into_response()
        } else {
            (status, render::not_found()).into_response()
        }
    }
}
