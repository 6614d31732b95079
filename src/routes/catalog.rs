use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use super::current_session;
use crate::{
    error::AppError,
    filter::{self, FilterCriteria, FilterOptions, Suggestion},
    state::AppState,
    views,
};

#[derive(Debug, Deserialize)]
pub struct TextQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn home(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let criteria = FilterCriteria::from_query_pairs(&params);
    tracing::debug!("Home filters: {:?}", criteria);

    let session = current_session(&state, &headers).await;
    let (artists, locations) = tokio::join!(
        state.catalog.artists(),
        state.catalog.locations_by_artist()
    );
    let artists = artists?;

    let displayed = filter::apply(&artists, &criteria, &locations);
    tracing::debug!("{} of {} artists after filtering", displayed.len(), artists.len());

    Ok(Html(views::home_page(
        &displayed,
        &criteria,
        &filter::unique_locations(&locations),
        session.as_ref().map(|s| s.username.as_str()),
    )))
}

pub async fn filters(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let criteria = FilterCriteria::from_query_pairs(&params);

    let session = current_session(&state, &headers).await;
    let (artists, locations) = tokio::join!(
        state.catalog.artists(),
        state.catalog.locations_by_artist()
    );
    let artists = artists?;

    let options = FilterOptions::from_artists(&artists, &locations);
    let displayed = filter::apply(&artists, &criteria, &locations);

    Ok(Html(views::filters_page(
        &displayed,
        &criteria,
        &options,
        session.as_ref().map(|s| s.username.as_str()),
    )))
}

pub async fn search(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Result<Response, AppError> {
    let q = query.q.unwrap_or_default();
    let q = q.trim();
    if q.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let session = current_session(&state, &headers).await;
    let artists = state.catalog.artists().await?;
    let results = filter::search(&artists, q);

    Ok(Html(views::search_page(
        q,
        &results,
        session.as_ref().map(|s| s.username.as_str()),
    ))
    .into_response())
}

pub async fn artist(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = match raw_id.parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => return Err(AppError::NotFound),
    };

    let session = current_session(&state, &headers).await;
    let (artist, tours) = tokio::join!(state.catalog.artist(id), state.catalog.tour_locations(id));
    let artist = artist?.ok_or(AppError::NotFound)?;

    let is_favorite = match &session {
        Some(session) => Some(state.favorites.is_favorite(session.user_id, id).await?),
        None => None,
    };

    Ok(Html(views::artist_page(
        &artist,
        &tours,
        is_favorite,
        session.as_ref().map(|s| s.username.as_str()),
    )))
}

pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<TextQuery>,
) -> Result<Json<Vec<Suggestion>>, (StatusCode, Json<ErrorResponse>)> {
    let q = query.q.unwrap_or_default();
    if q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }

    let artists = state.catalog.artists().await.map_err(|e| {
        tracing::error!("Suggestions catalog error: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Catalog unavailable".to_string(),
            }),
        )
    })?;

    Ok(Json(filter::suggestions(&artists, &q)))
}
