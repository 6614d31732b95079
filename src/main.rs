use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tourbook::{AppState, Config, build_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourbook=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let config = Config::from_env()?;
    tracing::info!("Starting tourbook server");
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Catalog: {}", config.catalog_url);

    let bind_address = config.bind_address();
    let state = AppState::new(config).await?;
    let app = build_router(state);

    // Run server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Listening on: http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
