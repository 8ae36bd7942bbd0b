use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    response::Html,
};
use tracing::{info, warn};

use super::AppState;
use crate::{render, WebError};
use db::repository::profiles as profile_repo;

pub async fn index(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
) -> Result<Html<String>, WebError> {
    info!("Client with IP {} accessed the profiles index page", client.ip());
    let profiles = profile_repo::list_profiles(&state.pool).await?;
    Ok(render::profiles_index(&profiles))
}

pub async fn profile(
    Path(username): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
) -> Result<Html<String>, WebError> {
    match profile_repo::get_profile_by_username(&state.pool, &username).await {
        Ok(detail) => {
            info!("Client with IP {} accessed the profile of {}", client.ip(), username);
            Ok(render::profile(&detail))
        }
        Err(db::DbError::NotFound) => {
            warn!(
                "Client with IP {} tried to access a profile that does not exist: {}",
                client.ip(),
                username
            );
            Err(WebError::NotFound)
        }
        Err(e) => Err(e.into()),
    }
}
