use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AVATAR: &str = "/static/img/default-avatar.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
  pub id: i64,
  pub username: String,
  pub email: String,
  /// bcrypt hash
  #[serde(rename = "password")]
  pub password_hash: String,
  #[serde(default)]
  pub avatar_url: String,
  #[serde(default)]
  pub bio: String,
  pub created_at: DateTime<Utc>,
}

/// Fields supplied at registration; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub username: String,
  pub email: String,
  pub password_hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountsDocument {
  pub users: Vec<Account>,
  pub last_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
  pub user_id: i64,
  pub artist_id: i64,
  pub artist_name: String,
  pub artist_image: String,
  pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoritesDocument {
  pub favorites: Vec<Favorite>,
}
