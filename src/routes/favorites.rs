use axum::{
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use super::current_session;
use crate::{db::models::Favorite, error::AppError, state::AppState};

/// Add or remove an artist from the user's favorites, then go back where
/// the user came from.
pub async fn toggle_favorite(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let Some(session) = current_session(&state, &headers).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let artist_id: i64 = raw_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid artist id".to_string()))?;

    let artist = state
        .catalog
        .artist(artist_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let now_favorite = state
        .favorites
        .toggle(Favorite {
            user_id: session.user_id,
            artist_id,
            artist_name: artist.name.clone(),
            artist_image: artist.image.clone(),
            added_at: Utc::now(),
        })
        .await?;

    tracing::info!(
        "User {} {} favorite {} ({})",
        session.username,
        if now_favorite { "added" } else { "removed" },
        artist.name,
        artist_id
    );

    let back = return_path(&headers);
    Ok(Redirect::to(&back).into_response())
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Where to send the user after a toggle: the Referer when it points back
/// into this site, otherwise the home page.
fn return_path(headers: &HeaderMap) -> String {
    let Some(referer) = header_str(headers, header::REFERER) else {
        return "/".to_string();
    };
    safe_return_path(referer, header_str(headers, header::HOST)).unwrap_or_else(|| "/".to_string())
}

/// Accept a local path, or an absolute http(s) URL on the request's own host
/// reduced to its path and query.
fn safe_return_path(referer: &str, host: Option<&str>) -> Option<String> {
    if is_local_path(referer) {
        return Some(referer.to_string());
    }

    let url = reqwest::Url::parse(referer).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let origin = match url.port() {
        Some(port) => format!("{}:{}", url.host_str()?, port),
        None => url.host_str()?.to_string(),
    };
    if !origin.eq_ignore_ascii_case(host?) {
        return None;
    }

    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    is_local_path(&path).then_some(path)
}

fn is_local_path(value: &str) -> bool {
    value.starts_with('/') && !value.starts_with("//") && !value.starts_with("/\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_local_paths() {
        assert_eq!(safe_return_path("/artist/2", None).as_deref(), Some("/artist/2"));
        assert_eq!(safe_return_path("/?q=queen", None).as_deref(), Some("/?q=queen"));
    }

    #[test]
    fn reduces_same_host_urls_to_their_path() {
        assert_eq!(
            safe_return_path("http://localhost:8080/artist/2?x=1", Some("localhost:8080")).as_deref(),
            Some("/artist/2?x=1")
        );
        assert_eq!(safe_return_path("http://localhost:8080/artist/2", Some("localhost:9090")), None);
    }

    #[test]
    fn rejects_foreign_targets() {
        assert_eq!(safe_return_path("https://evil.test/phish", Some("localhost:8080")), None);
        assert_eq!(safe_return_path("https://evil.test/phish", None), None);
        assert_eq!(safe_return_path("//evil.test/phish", Some("localhost:8080")), None);
        assert_eq!(safe_return_path("/\\evil.test", None), None);
        assert_eq!(safe_return_path("javascript:alert(1)", Some("localhost:8080")), None);
        assert_eq!(safe_return_path("artist/2", None), None);
    }
}
