use std::sync::Arc;

use crate::{
  catalog::CatalogClient,
  config::Config,
  db::{AccountStore, FavoritesStore},
  session::SessionStore,
};

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
  pub config: Arc<Config>,
  pub catalog: CatalogClient,
  pub sessions: Arc<SessionStore>,
  pub accounts: Arc<AccountStore>,
  pub favorites: Arc<FavoritesStore>,
}

impl AppState {
  pub async fn new(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
    let catalog = CatalogClient::new(config.catalog_url.clone(), config.catalog_timeout)?;
    let accounts = AccountStore::open(config.users_file()).await?;
    let favorites = FavoritesStore::open(config.favorites_file()).await?;

    Ok(Self {
      config: Arc::new(config),
      catalog,
      sessions: Arc::new(SessionStore::new()),
      accounts: Arc::new(accounts),
      favorites: Arc::new(favorites),
    })
  }
}
