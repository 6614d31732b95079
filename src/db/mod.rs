//! Flat-file JSON stores for accounts and favorites.
//!
//! Each store owns one JSON document and rewrites it wholesale on every
//! mutation, under a per-store reader/writer lock. A crash mid-write can
//! truncate the file; there is no journal.

pub mod accounts;
pub mod favorites;
pub mod models;

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use accounts::AccountStore;
pub use favorites::FavoritesStore;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Username already taken")]
  UsernameTaken,

  #[error("Email already in use")]
  EmailTaken,

  #[error("Record not found")]
  NotFound,

  #[error("Storage I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Storage decode error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Create the parent directory and seed `path` with `empty` if it is missing.
async fn init_document<T: Serialize>(path: &Path, empty: &T) -> Result<(), StoreError> {
  if let Some(parent) = path.parent() {
    if !parent.as_os_str().is_empty() {
      tokio::fs::create_dir_all(parent).await?;
    }
  }

  if !tokio::fs::try_exists(path).await? {
    tracing::info!("Creating data file: {}", path.display());
    save_json(path, empty).await?;
  }

  Ok(())
}

async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
  let bytes = tokio::fs::read(path).await?;
  Ok(serde_json::from_slice(&bytes)?)
}

async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
  let mut bytes = serde_json::to_vec_pretty(data)?;
  bytes.push(b'\n');
  tokio::fs::write(path, bytes).await?;
  Ok(())
}
