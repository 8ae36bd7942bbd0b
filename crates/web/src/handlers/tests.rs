//! Handler tests against an in-memory database.
//!
//! Handlers are called directly with hand-built extractors.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use db::models::NewAddress;
use db::pool::create_memory_pool;
use db::repository::{lettings as letting_repo, profiles as profile_repo, users};

use super::{home, lettings, profiles, AppState};
use crate::{render::escape, WebError};

fn client() -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 50000)))
}

async fn state() -> AppState {
    AppState {
        pool: create_memory_pool().await.expect("pool"),
    }
}

#[tokio::test]
async fn home_page_links_both_sections() {
    let page = home::index(client()).await;
    assert!(page.0.contains(r#"href="/lettings/""#));
    assert!(page.0.contains(r#"href="/profiles/""#));
}

#[tokio::test]
async fn lettings_index_lists_titles() {
    let state = state().await;
    let address = letting_repo::create_address(
        &state.pool,
        &NewAddress {
            number: 123,
            street: "Test Street".into(),
            city: "Test City".into(),
            state: "TS".into(),
            zip_code: 12345,
            country_iso_code: "TSC".into(),
        },
    )
    .await
    .expect("address");
    let letting = letting_repo::create_letting(&state.pool, "Test Letting", address.id)
        .await
        .expect("letting");

    let page = lettings::index(State(state.clone()), client()).await.expect("index");
    assert!(page.0.contains(&escape("Test Letting")));
    assert!(page.0.contains(&format!("/lettings/{}/", letting.id)));

    let page = lettings::letting(Path(letting.id.to_string()), State(state), client())
        .await
        .expect("detail");
    assert!(page.0.contains(&escape("123 Test Street")));
    assert!(page.0.contains("TSC"));
}

#[tokio::test]
async fn empty_lettings_index() {
    let page = lettings::index(State(state().await), client()).await.expect("index");
    assert!(page.0.contains("No lettings are available."));
}

#[tokio::test]
async fn unknown_letting_is_404() {
    let err = lettings::letting(Path("404".to_string()), State(state().await), client())
        .await
        .expect_err("missing letting");
    assert!(matches!(err, WebError::NotFound));
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_pages_show_the_user() {
    let state = state().await;
    let user = users::create_user(&state.pool, "testuser", "Test", "User", "test@example.com")
        .await
        .expect("user");
    profile_repo::create_profile(&state.pool, user.id, "Test City")
        .await
        .expect("profile");

    let page = profiles::index(State(state.clone()), client()).await.expect("index");
    assert!(page.0.contains("testuser"));

    let page = profiles::profile(Path("testuser".to_string()), State(state), client())
        .await
        .expect("detail");
    assert!(page.0.contains("testuser"));
    assert!(page.0.contains(&escape("Test City")));
}

#[tokio::test]
async fn empty_profiles_index() {
    let page = profiles::index(State(state().await), client()).await.expect("index");
    assert!(page.0.contains("No profiles are available."));
}

#[tokio::test]
async fn unknown_profile_is_404() {
    let err = profiles::profile(Path("invaliduser".to_string()), State(state().await), client())
        .await
        .expect_err("missing profile");
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unmatched_route_is_404() {
    let response = super::not_found("/nowhere".parse().expect("uri"))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
