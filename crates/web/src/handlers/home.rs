use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::response::Html;
use tracing::info;

use crate::render;

pub async fn index(ConnectInfo(client): ConnectInfo<SocketAddr>) -> Html<String> {
    info!("Client with IP {} accessed the index page", client.ip());
    render::home()
}
