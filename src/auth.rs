use axum::http::{HeaderMap, header};
use thiserror::Error;

use crate::db::{
  AccountStore, StoreError,
  models::{Account, NewAccount},
};
use crate::session::{SESSION_TTL_SECS, Session, SessionStore};

pub const SESSION_COOKIE: &str = "session_id";

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_BIO_LEN: usize = 500;

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("All fields are required")]
  EmptyFields,

  #[error("Password must be at least 6 characters")]
  PasswordTooShort,

  #[error("Username must be at least 3 characters")]
  UsernameTooShort,

  #[error("Invalid email address")]
  InvalidEmail,

  #[error("Username or email already in use")]
  UserExists,

  #[error("Invalid username or password")]
  InvalidCredentials,

  #[error("User not found")]
  NotFound,

  #[error("Bio must be at most 500 characters")]
  BioTooLong,

  #[error("Server error: {0}")]
  Server(String),
}

impl AuthError {
  /// Short code carried in redirect query strings
  pub fn code(&self) -> &'static str {
    match self {
      AuthError::EmptyFields => "empty",
      AuthError::PasswordTooShort => "short",
      AuthError::UsernameTooShort => "username",
      AuthError::InvalidEmail => "email",
      AuthError::UserExists => "exists",
      AuthError::InvalidCredentials => "invalid",
      AuthError::NotFound => "notfound",
      AuthError::BioTooLong => "bio",
      AuthError::Server(_) => "server",
    }
  }

  /// Message for a redirect code, if it is one we issue
  pub fn message_for_code(code: &str) -> Option<&'static str> {
    let message = match code {
      "empty" => "All fields are required.",
      "short" => "Password must be at least 6 characters.",
      "username" => "Username must be at least 3 characters.",
      "email" => "Please enter a valid email address.",
      "exists" => "That username or email is already in use.",
      "invalid" => "Invalid username or password.",
      "notfound" => "Account not found.",
      "bio" => "Bio must be at most 500 characters.",
      "server" => "Something went wrong, please try again.",
      _ => return None,
    };
    Some(message)
  }
}

impl From<StoreError> for AuthError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::UsernameTaken | StoreError::EmailTaken => AuthError::UserExists,
      StoreError::NotFound => AuthError::NotFound,
      other => AuthError::Server(other.to_string()),
    }
  }
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
  bcrypt::hash(password, cost)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
  bcrypt::verify(password, hash)
}

/// Check username and password, then open a session and return its token.
///
/// An unknown username and a wrong password produce the same error.
pub async fn authenticate(
  accounts: &AccountStore,
  sessions: &SessionStore,
  username: &str,
  password: &str,
) -> Result<String, AuthError> {
  let username = username.trim();

  let account = match accounts.get_by_username(username).await {
    Ok(account) => account,
    Err(StoreError::NotFound) => {
      tracing::debug!("Login attempt for unknown user: {}", username);
      return Err(AuthError::InvalidCredentials);
    }
    Err(e) => return Err(e.into()),
  };

  match verify_password(password, &account.password_hash) {
    Ok(true) => {}
    Ok(false) => {
      tracing::debug!("Wrong password for user: {}", username);
      return Err(AuthError::InvalidCredentials);
    }
    Err(e) => {
      tracing::warn!("Password verification error for user {}: {}", username, e);
      return Err(AuthError::InvalidCredentials);
    }
  }

  let token = sessions.create(account.id, &account.username).await;
  tracing::info!("User logged in: {}", account.username);
  Ok(token)
}

/// Validate, hash and store a new account.
pub async fn register(
  accounts: &AccountStore,
  username: &str,
  email: &str,
  password: &str,
  bcrypt_cost: u32,
) -> Result<Account, AuthError> {
  let username = username.trim();
  let email = email.trim();
  validate_registration(username, email, password)?;

  let password_hash = hash_password(password, bcrypt_cost).map_err(|e| {
    tracing::error!("Password hashing error: {}", e);
    AuthError::Server(e.to_string())
  })?;

  let account = accounts
    .create(NewAccount {
      username: username.to_string(),
      email: email.to_string(),
      password_hash,
    })
    .await?;

  tracing::info!("New user registered: {} (id: {})", account.username, account.id);
  Ok(account)
}

/// Field checks in order: presence, password length, username length, email shape.
pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), AuthError> {
  if username.is_empty() || email.is_empty() || password.is_empty() {
    return Err(AuthError::EmptyFields);
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(AuthError::PasswordTooShort);
  }
  if username.chars().count() < MIN_USERNAME_LEN {
    return Err(AuthError::UsernameTooShort);
  }
  if !is_valid_email(email) {
    return Err(AuthError::InvalidEmail);
  }
  Ok(())
}

/// `local@domain.tld` shape: an `@` past the first character, then a `.`
/// that is neither right after the `@` nor the last character.
pub fn is_valid_email(email: &str) -> bool {
  let Some(at) = email.rfind('@') else {
    return false;
  };
  if at == 0 {
    return false;
  }

  let domain = &email[at + 1..];
  match domain.rfind('.') {
    Some(dot) => dot > 0 && dot < domain.len() - 1,
    None => false,
  }
}

pub async fn update_profile(accounts: &AccountStore, user_id: i64, bio: &str) -> Result<(), AuthError> {
  let mut account = accounts.get_by_id(user_id).await?;

  if bio.chars().count() > MAX_BIO_LEN {
    return Err(AuthError::BioTooLong);
  }

  account.bio = bio.to_string();
  accounts.update(&account).await.map_err(|e| {
    tracing::error!("Failed to update profile for {}: {}", account.username, e);
    AuthError::Server(e.to_string())
  })?;

  tracing::info!("Profile updated: {}", account.username);
  Ok(())
}

/// Extract the session token from a `Cookie` header value
pub fn extract_token_from_cookie(cookie_header: &str) -> Option<String> {
  session_tokens(cookie_header).next().map(str::to_string)
}

/// Every non-empty `session_id` value in one Cookie header, in order.
pub fn session_tokens(cookie_header: &str) -> impl Iterator<Item = &str> {
  cookie_header
    .split(';')
    .filter_map(|pair| pair.trim().split_once('='))
    .filter(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value.trim())
    .filter(|value| !value.is_empty())
}

/// Look up the session named by the request's cookies, if any.
///
/// A request may carry several `session_id` cookies; the first token that
/// names a live session wins.
pub async fn session_from_headers(sessions: &SessionStore, headers: &HeaderMap) -> Option<(String, Session)> {
  let tokens = headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|value| value.to_str().ok())
    .flat_map(session_tokens);

  for token in tokens {
    if let Some(session) = sessions.get(token).await {
      return Some((token.to_string(), session));
    }
  }
  None
}

pub fn session_cookie(token: &str) -> String {
  format!(
    "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
    SESSION_COOKIE, token, SESSION_TTL_SECS
  )
}

pub fn clear_session_cookie() -> String {
  format!("{}=; Path=/; Max-Age=-1; HttpOnly; SameSite=Lax", SESSION_COOKIE)
}
