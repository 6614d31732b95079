use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::RwLock;

use super::models::{Account, AccountsDocument, DEFAULT_AVATAR, NewAccount};
use super::{StoreError, init_document, load_json, save_json};

/// User accounts persisted as `{"users": [...], "last_id": n}`.
#[derive(Debug)]
pub struct AccountStore {
  path: PathBuf,
  lock: RwLock<()>,
}

impl AccountStore {
  pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let path = path.as_ref().to_path_buf();
    init_document(&path, &AccountsDocument::default()).await?;
    Ok(Self {
      path,
      lock: RwLock::new(()),
    })
  }

  pub async fn all(&self) -> Result<Vec<Account>, StoreError> {
    let _guard = self.lock.read().await;
    let doc: AccountsDocument = load_json(&self.path).await?;
    Ok(doc.users)
  }

  /// Insert a new account. Usernames and emails must be unique
  /// (case-sensitive); the username is checked first.
  pub async fn create(&self, candidate: NewAccount) -> Result<Account, StoreError> {
    let _guard = self.lock.write().await;
    let mut doc: AccountsDocument = load_json(&self.path).await?;

    for existing in &doc.users {
      if existing.username == candidate.username {
        return Err(StoreError::UsernameTaken);
      }
      if existing.email == candidate.email {
        return Err(StoreError::EmailTaken);
      }
    }

    doc.last_id += 1;
    let account = Account {
      id: doc.last_id,
      username: candidate.username,
      email: candidate.email,
      password_hash: candidate.password_hash,
      avatar_url: DEFAULT_AVATAR.to_string(),
      bio: String::new(),
      created_at: Utc::now(),
    };
    doc.users.push(account.clone());

    save_json(&self.path, &doc).await?;
    Ok(account)
  }

  pub async fn get_by_id(&self, id: i64) -> Result<Account, StoreError> {
    self
      .all()
      .await?
      .into_iter()
      .find(|a| a.id == id)
      .ok_or(StoreError::NotFound)
  }

  pub async fn get_by_username(&self, username: &str) -> Result<Account, StoreError> {
    self
      .all()
      .await?
      .into_iter()
      .find(|a| a.username == username)
      .ok_or(StoreError::NotFound)
  }

  /// Overwrite the stored record with the same id.
  pub async fn update(&self, account: &Account) -> Result<(), StoreError> {
    let _guard = self.lock.write().await;
    let mut doc: AccountsDocument = load_json(&self.path).await?;

    let slot = doc
      .users
      .iter_mut()
      .find(|a| a.id == account.id)
      .ok_or(StoreError::NotFound)?;
    *slot = account.clone();

    save_json(&self.path, &doc).await
  }
}
