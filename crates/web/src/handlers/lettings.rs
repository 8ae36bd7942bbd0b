use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    response::Html,
};
use tracing::{info, warn};

use super::AppState;
use crate::{render, WebError};
use db::repository::lettings as letting_repo;

pub async fn index(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
) -> Result<Html<String>, WebError> {
    info!("Client with IP {} accessed the lettings index page", client.ip());
    let lettings = letting_repo::list_lettings(&state.pool).await?;
    Ok(render::lettings_index(&lettings))
}

pub async fn letting(
    Path(letting_id): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
) -> Result<Html<String>, WebError> {
    let Some(id) = parse_letting_id(&letting_id) else {
        warn!(
            "Client with IP {} requested a malformed letting id: {}",
            client.ip(),
            letting_id
        );
        return Err(WebError::NotFound);
    };

    match letting_repo::get_letting(&state.pool, id).await {
        Ok(detail) => {
            info!("Client with IP {} accessed the letting {} page", client.ip(), id);
            Ok(render::letting(&detail))
        }
        Err(db::DbError::NotFound) => {
            warn!(
                "Client with IP {} tried to access a letting that does not exist: {}",
                client.ip(),
                id
            );
            Err(WebError::NotFound)
        }
        Err(e) => Err(e.into()),
    }
}

/// Letting ids are unsigned decimal integers; anything else matches no letting.
fn parse_letting_id(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
