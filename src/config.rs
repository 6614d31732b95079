use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,
  pub host: String,
  pub data_dir: PathBuf,
  pub static_dir: PathBuf,
  pub catalog_url: String,
  pub catalog_timeout: Duration,
  pub bcrypt_cost: u32,
}

impl Config {
  pub fn from_env() -> Result<Self, String> {
    let port = env::var("PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse()
      .map_err(|e| format!("Invalid PORT: {}", e))?;

    let host = env::var("HOST")
      .unwrap_or_else(|_| "127.0.0.1".to_string());

    let data_dir = env::var("DATA_DIR")
      .unwrap_or_else(|_| "data".to_string())
      .into();

    let static_dir = env::var("STATIC_DIR")
      .unwrap_or_else(|_| "static".to_string())
      .into();

    let catalog_url = env::var("CATALOG_URL")
      .unwrap_or_else(|_| "https://groupietrackers.herokuapp.com/api".to_string());

    let catalog_timeout = env::var("CATALOG_TIMEOUT_SECS")
      .unwrap_or_else(|_| "10".to_string())
      .parse()
      .map(Duration::from_secs)
      .map_err(|e| format!("Invalid CATALOG_TIMEOUT_SECS: {}", e))?;

    let bcrypt_cost = match env::var("BCRYPT_COST") {
      Ok(cost) => cost
        .parse()
        .map_err(|e| format!("Invalid BCRYPT_COST: {}", e))?,
      Err(_) => bcrypt::DEFAULT_COST,
    };

    Ok(Self {
      port,
      host,
      data_dir,
      static_dir,
      catalog_url: catalog_url.trim_end_matches('/').to_string(),
      catalog_timeout,
      bcrypt_cost,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }

  pub fn users_file(&self) -> PathBuf {
    self.data_dir.join("users.json")
  }

  pub fn favorites_file(&self) -> PathBuf {
    self.data_dir.join("favorites.json")
  }
}
