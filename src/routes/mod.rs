pub mod account;
pub mod catalog;
pub mod favorites;

pub use account::*;
pub use catalog::*;
pub use favorites::*;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
};

use crate::{auth::session_from_headers, session::Session, state::AppState, views};

/// Session for the request, if the cookie names a live one
pub(crate) async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    session_from_headers(&state.sessions, headers)
        .await
        .map(|(_, session)| session)
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(views::not_found_page()))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
