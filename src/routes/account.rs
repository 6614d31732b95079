use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::current_session;
use crate::{
    auth::{self, AuthError, clear_session_cookie, session_cookie, session_from_headers},
    error::AppError,
    state::AppState,
    views,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub bio: String,
}

/// `?error=` / `?success=` codes carried across redirects
#[derive(Debug, Default, Deserialize)]
pub struct Notice {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Notice {
    fn error_message(&self) -> Option<&'static str> {
        self.error.as_deref().map(|code| {
            AuthError::message_for_code(code).unwrap_or("Something went wrong, please try again.")
        })
    }

    fn success_message(&self) -> Option<&'static str> {
        match self.success.as_deref() {
            Some("registered") => Some("Account created, you can now log in."),
            Some("updated") => Some("Profile updated."),
            _ => None,
        }
    }
}

pub async fn login_page(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(notice): Query<Notice>,
) -> Response {
    if current_session(&state, &headers).await.is_some() {
        return Redirect::to("/profile").into_response();
    }

    Html(views::login_page(notice.error_message(), notice.success_message())).into_response()
}

pub async fn login(State(state): State<AppState>, Form(req): Form<LoginRequest>) -> Response {
    match auth::authenticate(&state.accounts, &state.sessions, &req.username, &req.password).await {
        Ok(token) => (
            [(header::SET_COOKIE, session_cookie(&token))],
            Redirect::to("/profile"),
        )
            .into_response(),
        Err(e) => {
            if let AuthError::Server(detail) = &e {
                tracing::error!("Login failed: {}", detail);
            }
            Redirect::to(&format!("/login?error={}", e.code())).into_response()
        }
    }
}

pub async fn register_page(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(notice): Query<Notice>,
) -> Response {
    if current_session(&state, &headers).await.is_some() {
        return Redirect::to("/profile").into_response();
    }

    Html(views::register_page(notice.error_message())).into_response()
}

pub async fn register(State(state): State<AppState>, Form(req): Form<SignupRequest>) -> Redirect {
    let result = auth::register(
        &state.accounts,
        &req.username,
        &req.email,
        &req.password,
        state.config.bcrypt_cost,
    )
    .await;

    match result {
        Ok(_) => Redirect::to("/login?success=registered"),
        Err(e) => {
            if let AuthError::Server(detail) = &e {
                tracing::error!("Registration failed: {}", detail);
            }
            Redirect::to(&format!("/register?error={}", e.code()))
        }
    }
}

pub async fn logout(headers: HeaderMap, State(state): State<AppState>) -> impl IntoResponse {
    if let Some((token, session)) = session_from_headers(&state.sessions, &headers).await {
        state.sessions.delete(&token).await;
        tracing::info!("User logged out: {}", session.username);
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
}

pub async fn profile(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(notice): Query<Notice>,
) -> Result<Response, AppError> {
    let Some(session) = current_session(&state, &headers).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let account = match state.accounts.get_by_id(session.user_id).await {
        Ok(account) => account,
        Err(crate::db::StoreError::NotFound) => return Err(AppError::NotFound),
        Err(e) => return Err(e.into()),
    };
    let favorites = state.favorites.list(account.id).await?;

    Ok(Html(views::profile_page(
        &account,
        &favorites,
        notice.error_message(),
        notice.success_message(),
    ))
    .into_response())
}

pub async fn update_profile(
    headers: HeaderMap,
    State(state): State<AppState>,
    Form(update): Form<ProfileUpdate>,
) -> Redirect {
    let Some(session) = current_session(&state, &headers).await else {
        return Redirect::to("/login");
    };

    match auth::update_profile(&state.accounts, session.user_id, &update.bio).await {
        Ok(()) => Redirect::to("/profile?success=updated"),
        Err(e) => Redirect::to(&format!("/profile?error={}", e.code())),
    }
}
