//! In-memory login sessions.
//!
//! Sessions live only as long as the process. Expired entries are removed
//! lazily: a lookup that finds an expired token deletes it, so `get` is not
//! a pure read.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// How long a session stays valid after login.
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub user_id: i64,
  pub username: String,
  pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SessionStore {
  sessions: RwLock<HashMap<String, Session>>,
  ttl: Duration,
}

impl Default for SessionStore {
  fn default() -> Self {
    Self::new()
  }
}

impl SessionStore {
  pub fn new() -> Self {
    Self {
      sessions: RwLock::new(HashMap::new()),
      ttl: Duration::seconds(SESSION_TTL_SECS),
    }
  }

  pub async fn create(&self, user_id: i64, username: &str) -> String {
    self.create_at(user_id, username, Utc::now()).await
  }

  /// Create a session as if the current time were `now`.
  pub async fn create_at(&self, user_id: i64, username: &str, now: DateTime<Utc>) -> String {
    let token = generate_session_token();
    let session = Session {
      user_id,
      username: username.to_string(),
      expires_at: now + self.ttl,
    };

    self.sessions.write().await.insert(token.clone(), session);
    token
  }

  pub async fn get(&self, token: &str) -> Option<Session> {
    self.get_at(token, Utc::now()).await
  }

  /// Look up a session as of `now`, deleting it if it has expired.
  pub async fn get_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
    {
      let sessions = self.sessions.read().await;
      match sessions.get(token) {
        None => return None,
        Some(session) if now < session.expires_at => return Some(session.clone()),
        Some(_) => {}
      }
    }

    // Expired: take the write lock and re-check, another request may have
    // already removed or replaced the entry.
    let mut sessions = self.sessions.write().await;
    if let Some(session) = sessions.get(token) {
      if now < session.expires_at {
        return Some(session.clone());
      }
      let user_id = session.user_id;
      sessions.remove(token);
      tracing::debug!("Session for user {} expired", user_id);
    }
    None
  }

  pub async fn delete(&self, token: &str) {
    self.sessions.write().await.remove(token);
  }

  pub async fn len(&self) -> usize {
    self.sessions.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.len().await == 0
  }
}

/// 16 random bytes, hex-encoded to 32 characters
pub fn generate_session_token() -> String {
  let bytes: [u8; 16] = rand::random();
  hex::encode(bytes)
}
