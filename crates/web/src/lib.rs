//! `web` crate — the server-rendered lettings site.
//!
//! Routes:
//!   GET /                       home page
//!   GET /lettings/              letting index
//!   GET /lettings/{letting_id}/ letting detail
//!   GET /profiles/              profile index
//!   GET /profiles/{username}/   profile detail
//!   GET /static/*               static assets

pub mod error;
pub mod handlers;
pub mod render;


use std::net::SocketAddr;
use std::path::Path;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use db::DbPool;

pub use error::WebError;
pub use handlers::AppState;

/// Build the application router.
pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(handlers::home::index))
        .route("/lettings/", get(handlers::lettings::index))
        .route("/lettings/:letting_id/", get(handlers::lettings::letting))
        .route("/profiles/", get(handlers::profiles::index))
        .route("/profiles/:username/", get(handlers::profiles::profile))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the site on `bind` until the process is stopped.
pub async fn serve(bind: &str, pool: DbPool, static_dir: impl AsRef<Path>) -> Result<(), WebError> {
    let app = router(AppState { pool }, static_dir);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
