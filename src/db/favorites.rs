use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use super::models::{Favorite, FavoritesDocument};
use super::{StoreError, init_document, load_json, save_json};

/// (user, artist) favorites persisted as `{"favorites": [...]}`.
#[derive(Debug)]
pub struct FavoritesStore {
  path: PathBuf,
  lock: RwLock<()>,
}

impl FavoritesStore {
  pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let path = path.as_ref().to_path_buf();
    init_document(&path, &FavoritesDocument::default()).await?;
    Ok(Self {
      path,
      lock: RwLock::new(()),
    })
  }

  /// Favorites of one user, in file order.
  pub async fn list(&self, user_id: i64) -> Result<Vec<Favorite>, StoreError> {
    let _guard = self.lock.read().await;
    let doc: FavoritesDocument = load_json(&self.path).await?;
    Ok(doc
      .favorites
      .into_iter()
      .filter(|f| f.user_id == user_id)
      .collect())
  }

  pub async fn is_favorite(&self, user_id: i64, artist_id: i64) -> Result<bool, StoreError> {
    Ok(self
      .list(user_id)
      .await?
      .iter()
      .any(|f| f.artist_id == artist_id))
  }

  /// Append a favorite unless the (user, artist) pair already exists.
  pub async fn add(&self, favorite: Favorite) -> Result<(), StoreError> {
    let _guard = self.lock.write().await;
    let mut doc: FavoritesDocument = load_json(&self.path).await?;

    if doc
      .favorites
      .iter()
      .any(|f| f.user_id == favorite.user_id && f.artist_id == favorite.artist_id)
    {
      return Ok(());
    }

    doc.favorites.push(favorite);
    save_json(&self.path, &doc).await
  }

  /// Remove every entry for the pair. Removing a missing pair is not an error.
  pub async fn remove(&self, user_id: i64, artist_id: i64) -> Result<(), StoreError> {
    let _guard = self.lock.write().await;
    let mut doc: FavoritesDocument = load_json(&self.path).await?;

    doc
      .favorites
      .retain(|f| !(f.user_id == user_id && f.artist_id == artist_id));
    save_json(&self.path, &doc).await
  }

  /// Flip the pair's membership and return whether it is now a favorite.
  ///
  /// Check and write are separate lock acquisitions, so two concurrent
  /// toggles of the same pair can race; the last write wins.
  pub async fn toggle(&self, favorite: Favorite) -> Result<bool, StoreError> {
    if self.is_favorite(favorite.user_id, favorite.artist_id).await? {
      self.remove(favorite.user_id, favorite.artist_id).await?;
      Ok(false)
    } else {
      self.add(favorite).await?;
      Ok(true)
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn favorite(user_id: i64, artist_id: i64) -> Favorite {
    Favorite {
      user_id,
      artist_id,
      artist_name: format!("Artist {}", artist_id),
      artist_image: format!("https://example.test/{}.jpeg", artist_id),
      added_at: Utc::now(),
    }
  }

  async fn store() -> (tempfile::TempDir, FavoritesStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FavoritesStore::open(dir.path().join("favorites.json")).await.unwrap();
    (dir, store)
  }

  #[tokio::test]
  async fn add_is_idempotent() {
    let (_dir, store) = store().await;
    store.add(favorite(1, 10)).await.unwrap();
    store.add(favorite(1, 10)).await.unwrap();

    assert_eq!(store.list(1).await.unwrap().len(), 1);
    assert!(store.is_favorite(1, 10).await.unwrap());
    assert!(!store.is_favorite(2, 10).await.unwrap());
  }

  #[tokio::test]
  async fn remove_missing_pair_succeeds() {
    let (_dir, store) = store().await;
    store.add(favorite(1, 10)).await.unwrap();
    store.remove(1, 11).await.unwrap();
    store.remove(3, 10).await.unwrap();

    assert!(store.is_favorite(1, 10).await.unwrap());
  }

  #[tokio::test]
  async fn toggling_twice_restores_membership() {
    let (_dir, store) = store().await;
    store.add(favorite(1, 5)).await.unwrap();
    let before = store.list(1).await.unwrap();

    assert!(store.toggle(favorite(1, 9)).await.unwrap());
    assert!(store.is_favorite(1, 9).await.unwrap());
    assert!(!store.toggle(favorite(1, 9)).await.unwrap());

    assert_eq!(store.list(1).await.unwrap(), before);
  }

  #[tokio::test]
  async fn list_is_per_user_in_file_order() {
    let (_dir, store) = store().await;
    store.add(favorite(1, 3)).await.unwrap();
    store.add(favorite(2, 3)).await.unwrap();
    store.add(favorite(1, 1)).await.unwrap();

    let ids: Vec<i64> = store.list(1).await.unwrap().iter().map(|f| f.artist_id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert_eq!(store.list(2).await.unwrap().len(), 1);
    assert!(store.list(9).await.unwrap().is_empty());
  }
}
