use axum::{
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::{catalog::CatalogError, db::StoreError, views};

/// Errors that end a page request.
#[derive(Debug, Error)]
pub enum AppError {
  #[error("Not found")]
  NotFound,

  #[error("Bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Upstream(#[from] CatalogError),

  #[error(transparent)]
  Storage(#[from] StoreError),
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    match self {
      AppError::NotFound => (StatusCode::NOT_FOUND, Html(views::not_found_page())).into_response(),
      AppError::BadRequest(message) => (
        StatusCode::BAD_REQUEST,
        Html(views::error_page("Bad request", &message)),
      )
        .into_response(),
      AppError::Upstream(e) => {
        tracing::error!("Catalog error: {}", e);
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Html(views::error_page(
            "Server error",
            "The artist catalog is unavailable right now.",
          )),
        )
          .into_response()
      }
      AppError::Storage(e) => {
        tracing::error!("Storage error: {}", e);
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Html(views::error_page("Server error", "Something went wrong on our side.")),
        )
          .into_response()
      }
    }
  }
}
