//! Client for the remote artist catalog API.
//!
//! The catalog is small and read-only, so every call fetches a whole
//! collection and nothing is cached between requests.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Catalog request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Catalog returned status {0} for {1}")]
  Status(u16, String),
}

/// An artist as published by the catalog. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Artist {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub members: Vec<String>,
  #[serde(rename = "creationDate")]
  pub creation_date: i32,
  #[serde(rename = "firstAlbum", default)]
  pub first_album: String,
}

impl Artist {
  /// Link to a Spotify search for this artist's name
  pub fn spotify_search_url(&self) -> Option<String> {
    let mut url = reqwest::Url::parse("https://open.spotify.com/search").ok()?;
    url.path_segments_mut().ok()?.push(&self.name);
    Some(url.to_string())
  }
}

/// A place an artist toured, with the concert dates played there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourLocation {
  pub name: String,
  pub dates: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LocationEntry {
  id: i64,
  #[serde(default)]
  locations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RelationEntry {
  id: i64,
  #[serde(rename = "datesLocations", default)]
  dates_locations: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Indexed<T> {
  index: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
  http: reqwest::Client,
  base_url: String,
}

impl CatalogClient {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
    let http = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      http,
      base_url: base_url.into(),
    })
  }

  async fn get_json<T: DeserializeOwned>(&self, collection: &str) -> Result<T, CatalogError> {
    let url = format!("{}/{}", self.base_url, collection);
    let response = self.http.get(&url).send().await?;

    if !response.status().is_success() {
      return Err(CatalogError::Status(response.status().as_u16(), url));
    }

    Ok(response.json::<T>().await?)
  }

  /// Fetch the full artist list
  pub async fn artists(&self) -> Result<Vec<Artist>, CatalogError> {
    let artists: Vec<Artist> = self.get_json("artists").await?;
    tracing::debug!("Fetched {} artists from catalog", artists.len());
    Ok(artists)
  }

  /// Look up one artist. The API has no per-id lookup we rely on, so this
  /// scans the full list.
  pub async fn artist(&self, id: i64) -> Result<Option<Artist>, CatalogError> {
    let artists = self.artists().await?;
    Ok(artists.into_iter().find(|a| a.id == id))
  }

  /// Location names per artist id. Empty on any failure.
  pub async fn location_names(&self) -> HashMap<i64, Vec<String>> {
    match self.get_json::<Indexed<LocationEntry>>("locations").await {
      Ok(body) => body
        .index
        .into_iter()
        .map(|entry| (entry.id, entry.locations))
        .collect(),
      Err(e) => {
        tracing::warn!("Failed to fetch catalog locations: {}", e);
        HashMap::new()
      }
    }
  }

  /// Concert dates per place per artist id. Empty on any failure.
  pub async fn relations(&self) -> HashMap<i64, BTreeMap<String, Vec<String>>> {
    match self.get_json::<Indexed<RelationEntry>>("relation").await {
      Ok(body) => body
        .index
        .into_iter()
        .map(|entry| (entry.id, entry.dates_locations))
        .collect(),
      Err(e) => {
        tracing::warn!("Failed to fetch catalog relations: {}", e);
        HashMap::new()
      }
    }
  }

  /// Place names each artist played, taken from the relations collection.
  pub async fn locations_by_artist(&self) -> HashMap<i64, Vec<String>> {
    self
      .relations()
      .await
      .into_iter()
      .map(|(id, places)| {
        let names = places
          .into_keys()
          .map(|place| place.trim().to_string())
          .filter(|place| !place.is_empty())
          .collect();
        (id, names)
      })
      .collect()
  }

  /// Tour stops for one artist, in the order the locations collection lists them.
  pub async fn tour_locations(&self, id: i64) -> Vec<TourLocation> {
    let (mut names, mut relations) = tokio::join!(self.location_names(), self.relations());

    let Some(names) = names.remove(&id) else {
      return Vec::new();
    };
    let dates = relations.remove(&id).unwrap_or_default();

    join_tour_locations(names, &dates)
  }
}

fn join_tour_locations(names: Vec<String>, dates: &BTreeMap<String, Vec<String>>) -> Vec<TourLocation> {
  names
    .into_iter()
    .map(|name| {
      let dates = dates.get(&name).cloned().unwrap_or_default();
      TourLocation { name, dates }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_catalog_artist_shape() {
    let raw = r#"{
      "id": 1,
      "image": "https://example.test/queen.jpeg",
      "name": "Queen",
      "members": ["Freddie Mercury", "Brian May"],
      "creationDate": 1970,
      "firstAlbum": "14-12-1973",
      "locations": "https://example.test/api/locations/1",
      "relations": "https://example.test/api/relation/1"
    }"#;

    let artist: Artist = serde_json::from_str(raw).unwrap();
    assert_eq!(artist.id, 1);
    assert_eq!(artist.creation_date, 1970);
    assert_eq!(artist.first_album, "14-12-1973");
    assert_eq!(artist.members.len(), 2);
  }

  #[test]
  fn joins_location_names_with_dates() {
    let mut dates = BTreeMap::new();
    dates.insert("london-uk".to_string(), vec!["01-01-2020".to_string()]);

    let joined = join_tour_locations(
      vec!["paris-france".to_string(), "london-uk".to_string()],
      &dates,
    );

    assert_eq!(joined[0].name, "paris-france");
    assert!(joined[0].dates.is_empty());
    assert_eq!(joined[1].dates, vec!["01-01-2020".to_string()]);
  }

  #[tokio::test]
  async fn location_lookups_degrade_to_empty() {
    // Nothing listens on a port we bound and released.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = CatalogClient::new(format!("http://{}/api", addr), Duration::from_secs(2)).unwrap();

    assert!(client.location_names().await.is_empty());
    assert!(client.relations().await.is_empty());
    assert!(client.locations_by_artist().await.is_empty());
    assert!(client.tour_locations(1).await.is_empty());
    assert!(matches!(client.artists().await, Err(CatalogError::Transport(_))));
  }

  #[test]
  fn spotify_url_encodes_name() {
    let artist = Artist {
      id: 7,
      name: "AC/DC Live".to_string(),
      image: String::new(),
      members: vec![],
      creation_date: 1973,
      first_album: String::new(),
    };

    let url = artist.spotify_search_url().unwrap();
    assert!(url.starts_with("https://open.spotify.com/search/"));
    assert!(url.contains("AC%2FDC%20Live"));
  }
}
