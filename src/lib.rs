pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use config::Config;
pub use state::AppState;

/// Build the application router around a ready state
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        // Catalog pages
        .route("/", get(routes::home))
        .route("/artist/{id}", get(routes::artist))
        .route("/search", get(routes::search))
        .route("/filters", get(routes::filters))
        .route("/api/suggestions", get(routes::suggestions))
        // Accounts
        .route("/login", get(routes::login_page).post(routes::login))
        .route("/register", get(routes::register_page).post(routes::register))
        .route("/logout", post(routes::logout))
        .route("/profile", get(routes::profile))
        .route("/profile/update", post(routes::update_profile))
        // Favorites
        .route("/favorite/toggle/{artist_id}", get(routes::toggle_favorite))
        // Health check
        .route("/health", get(routes::health_check))
        .nest_service("/static", static_files)
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
