//! Artist filtering, text search and search-box suggestions.
//!
//! Everything here is a pure function of its inputs: the catalog is fetched
//! by the caller and passed in whole.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::catalog::Artist;

/// Maximum number of entries returned by [`suggestions`].
pub const SUGGESTION_LIMIT: usize = 8;

/// Filter criteria parsed from the home/filters page query string.
///
/// Year bounds use 0 for "unbounded". Empty sets and an empty query leave
/// their predicate unconstrained. All predicates are ANDed; values inside the
/// member-count and location sets are ORed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
  pub creation_year_min: i32,
  pub creation_year_max: i32,
  pub album_year_min: i32,
  pub album_year_max: i32,
  pub member_counts: BTreeSet<usize>,
  pub locations: Vec<String>,
  pub query: String,
}

impl FilterCriteria {
  /// Build criteria from raw `(key, value)` query pairs. Repeated
  /// `member_count` and `location` keys accumulate; malformed numbers fall
  /// back to unbounded.
  pub fn from_query_pairs(pairs: &[(String, String)]) -> Self {
    let mut criteria = Self::default();

    for (key, value) in pairs {
      let value = value.trim();
      match key.as_str() {
        "creation_year_min" => criteria.creation_year_min = parse_year(value),
        "creation_year_max" => criteria.creation_year_max = parse_year(value),
        "album_year_min" => criteria.album_year_min = parse_year(value),
        "album_year_max" => criteria.album_year_max = parse_year(value),
        "member_count" => {
          if let Ok(count) = value.parse::<usize>() {
            if count > 0 {
              criteria.member_counts.insert(count);
            }
          }
        }
        "location" => {
          if !value.is_empty() {
            criteria.locations.push(value.to_string());
          }
        }
        "q" => criteria.query = value.to_string(),
        _ => {}
      }
    }

    criteria
  }

  pub fn is_active(&self) -> bool {
    self.creation_year_min != 0
      || self.creation_year_max != 0
      || self.album_year_min != 0
      || self.album_year_max != 0
      || !self.member_counts.is_empty()
      || !self.locations.is_empty()
      || !self.query.is_empty()
  }

  /// Whether a single artist passes every active predicate.
  pub fn matches(&self, artist: &Artist, locations: &HashMap<i64, Vec<String>>) -> bool {
    within_range(artist.creation_date, self.creation_year_min, self.creation_year_max)
      && self.matches_album_year(artist)
      && self.matches_member_count(artist)
      && self.matches_location(artist, locations)
      && matches_query(artist, &self.query)
  }

  fn matches_album_year(&self, artist: &Artist) -> bool {
    match extract_album_year(&artist.first_album) {
      Some(year) => within_range(year, self.album_year_min, self.album_year_max),
      // Unknown dates never exclude an artist.
      None => true,
    }
  }

  fn matches_member_count(&self, artist: &Artist) -> bool {
    self.member_counts.is_empty() || self.member_counts.contains(&artist.members.len())
  }

  fn matches_location(&self, artist: &Artist, locations: &HashMap<i64, Vec<String>>) -> bool {
    if self.locations.is_empty() {
      return true;
    }

    let Some(played) = locations.get(&artist.id) else {
      return false;
    };

    self
      .locations
      .iter()
      .any(|wanted| played.iter().any(|place| same_location(wanted, place)))
  }
}

/// Location names compare equal ignoring case, including non-ASCII letters.
pub fn same_location(a: &str, b: &str) -> bool {
  a.to_lowercase() == b.to_lowercase()
}

fn parse_year(value: &str) -> i32 {
  value.parse().unwrap_or(0)
}

fn within_range(value: i32, min: i32, max: i32) -> bool {
  (min == 0 || value >= min) && (max == 0 || value <= max)
}

/// Year of a `DD-MM-YYYY` first-album date, or `None` when the string has
/// any other shape.
pub fn extract_album_year(first_album: &str) -> Option<i32> {
  let parts: Vec<&str> = first_album.split('-').collect();
  if parts.len() != 3 {
    return None;
  }
  parts[2].parse().ok()
}

/// Case-insensitive substring match on the artist name or any member.
/// An empty query matches everything.
pub fn matches_query(artist: &Artist, query: &str) -> bool {
  if query.is_empty() {
    return true;
  }

  let query = query.to_lowercase();
  artist.name.to_lowercase().contains(&query)
    || artist
      .members
      .iter()
      .any(|member| member.to_lowercase().contains(&query))
}

/// Keep the artists that satisfy `criteria`, preserving input order.
pub fn apply(
  artists: &[Artist],
  criteria: &FilterCriteria,
  locations: &HashMap<i64, Vec<String>>,
) -> Vec<Artist> {
  artists
    .iter()
    .filter(|artist| criteria.matches(artist, locations))
    .cloned()
    .collect()
}

/// Text-only search used by the `/search` page.
pub fn search(artists: &[Artist], query: &str) -> Vec<Artist> {
  artists
    .iter()
    .filter(|artist| matches_query(artist, query))
    .cloned()
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
  Artist,
  Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
  pub text: String,
  #[serde(rename = "type")]
  pub kind: SuggestionKind,
  pub artist_id: i64,
}

/// Up to [`SUGGESTION_LIMIT`] artist or member names containing `query`.
pub fn suggestions(artists: &[Artist], query: &str) -> Vec<Suggestion> {
  let query = query.trim().to_lowercase();
  let mut found = Vec::new();
  if query.is_empty() {
    return found;
  }

  for artist in artists {
    if artist.name.to_lowercase().contains(&query) {
      found.push(Suggestion {
        text: artist.name.clone(),
        kind: SuggestionKind::Artist,
        artist_id: artist.id,
      });
      if found.len() >= SUGGESTION_LIMIT {
        return found;
      }
    }

    for member in &artist.members {
      if member.to_lowercase().contains(&query) {
        found.push(Suggestion {
          text: member.clone(),
          kind: SuggestionKind::Member,
          artist_id: artist.id,
        });
        if found.len() >= SUGGESTION_LIMIT {
          return found;
        }
      }
    }
  }

  found
}

/// Every distinct place name, sorted.
pub fn unique_locations(locations: &HashMap<i64, Vec<String>>) -> Vec<String> {
  locations
    .values()
    .flatten()
    .cloned()
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// The choices offered by the filter form for a given catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
  pub min_creation_year: i32,
  pub max_creation_year: i32,
  pub min_album_year: i32,
  pub max_album_year: i32,
  pub member_counts: Vec<usize>,
  pub locations: Vec<String>,
}

impl FilterOptions {
  pub fn from_artists(artists: &[Artist], locations: &HashMap<i64, Vec<String>>) -> Self {
    let creation = artists.iter().map(|a| a.creation_date);
    let album: Vec<i32> = artists
      .iter()
      .filter_map(|a| extract_album_year(&a.first_album))
      .filter(|year| *year > 0)
      .collect();

    let member_counts: BTreeSet<usize> = artists.iter().map(|a| a.members.len()).collect();

    Self {
      min_creation_year: creation.clone().min().unwrap_or(0),
      max_creation_year: creation.max().unwrap_or(0),
      min_album_year: album.iter().copied().min().unwrap_or(0),
      max_album_year: album.iter().copied().max().unwrap_or(0),
      member_counts: member_counts.into_iter().collect(),
      locations: unique_locations(locations),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn artist(id: i64, name: &str, members: &[&str], created: i32, first_album: &str) -> Artist {
    Artist {
      id,
      name: name.to_string(),
      image: format!("https://example.test/{}.jpeg", id),
      members: members.iter().map(|m| m.to_string()).collect(),
      creation_date: created,
      first_album: first_album.to_string(),
    }
  }

  fn catalog() -> Vec<Artist> {
    vec![
      artist(1, "Queen", &["Freddie Mercury", "Brian May", "Roger Taylor", "John Deacon"], 1970, "14-12-1973"),
      artist(2, "Pink Floyd", &["Roger Waters", "David Gilmour", "Nick Mason"], 1965, "05-08-1967"),
      artist(3, "Eminem", &["Marshall Mathers"], 1996, "12-11-1996"),
      artist(4, "Mystery Act", &["Anon"], 2001, "sometime"),
    ]
  }

  fn locations() -> HashMap<i64, Vec<String>> {
    HashMap::from([
      (1, vec!["london-uk".to_string(), "paris-france".to_string()]),
      (2, vec!["berlin-germany".to_string()]),
      (3, vec!["detroit-usa".to_string(), "london-uk".to_string()]),
    ])
  }

  fn ids(artists: &[Artist]) -> Vec<i64> {
    artists.iter().map(|a| a.id).collect()
  }

  fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[test]
  fn default_criteria_is_identity() {
    let all = catalog();
    let criteria = FilterCriteria::default();
    assert!(!criteria.is_active());
    assert_eq!(apply(&all, &criteria, &locations()), all);
    assert_eq!(apply(&all, &criteria, &HashMap::new()), all);
  }

  #[test]
  fn creation_year_bounds_are_inclusive() {
    let criteria = FilterCriteria {
      creation_year_min: 1965,
      creation_year_max: 1970,
      ..Default::default()
    };
    assert_eq!(ids(&apply(&catalog(), &criteria, &locations())), vec![1, 2]);

    let open_max = FilterCriteria {
      creation_year_min: 1990,
      ..Default::default()
    };
    assert_eq!(ids(&apply(&catalog(), &open_max, &locations())), vec![3, 4]);
  }

  #[test]
  fn album_year_filter_fails_open_on_unknown_dates() {
    let criteria = FilterCriteria {
      album_year_min: 1970,
      album_year_max: 1980,
      ..Default::default()
    };
    // Mystery Act has an unparsable date and must survive.
    assert_eq!(ids(&apply(&catalog(), &criteria, &locations())), vec![1, 4]);
  }

  #[test]
  fn extracts_album_year() {
    assert_eq!(extract_album_year("14-03-1973"), Some(1973));
    assert_eq!(extract_album_year("not-a-date"), None);
    assert_eq!(extract_album_year("1973"), None);
    assert_eq!(extract_album_year(""), None);
  }

  #[test]
  fn member_counts_are_ored() {
    let criteria = FilterCriteria {
      member_counts: BTreeSet::from([1, 3]),
      ..Default::default()
    };
    assert_eq!(ids(&apply(&catalog(), &criteria, &locations())), vec![2, 3, 4]);
  }

  #[test]
  fn location_match_is_exact_and_case_insensitive() {
    let criteria = FilterCriteria {
      locations: vec!["LONDON-UK".to_string()],
      ..Default::default()
    };
    assert_eq!(ids(&apply(&catalog(), &criteria, &locations())), vec![1, 3]);

    let partial = FilterCriteria {
      locations: vec!["london".to_string()],
      ..Default::default()
    };
    assert!(apply(&catalog(), &partial, &locations()).is_empty());
  }

  #[test]
  fn location_match_folds_non_ascii_case() {
    assert!(same_location("MÜNCHEN-germany", "münchen-germany"));
    assert!(!same_location("munchen-germany", "münchen-germany"));

    let mut played = locations();
    played.insert(4, vec!["münchen-germany".to_string()]);
    let criteria = FilterCriteria {
      locations: vec!["MÜNCHEN-GERMANY".to_string()],
      ..Default::default()
    };
    assert_eq!(ids(&apply(&catalog(), &criteria, &played)), vec![4]);
  }

  #[test]
  fn artists_without_known_locations_fail_location_filter() {
    let criteria = FilterCriteria {
      locations: vec!["berlin-germany".to_string(), "nowhere".to_string()],
      ..Default::default()
    };
    assert_eq!(ids(&apply(&catalog(), &criteria, &locations())), vec![2]);
  }

  #[test]
  fn query_matches_name_or_member() {
    let criteria = FilterCriteria {
      query: "roger".to_string(),
      ..Default::default()
    };
    assert_eq!(ids(&apply(&catalog(), &criteria, &locations())), vec![1, 2]);
    assert_eq!(ids(&search(&catalog(), "EMIN")), vec![3]);
  }

  #[test]
  fn every_kept_artist_satisfies_every_predicate() {
    let criteria = FilterCriteria {
      creation_year_min: 1960,
      album_year_max: 1990,
      member_counts: BTreeSet::from([3, 4]),
      locations: vec!["london-uk".to_string(), "berlin-germany".to_string()],
      query: "o".to_string(),
      ..Default::default()
    };
    let kept = apply(&catalog(), &criteria, &locations());
    assert_eq!(ids(&kept), vec![1, 2]);
    for artist in &kept {
      assert!(artist.creation_date >= 1960);
      assert!(extract_album_year(&artist.first_album).unwrap() <= 1990);
      assert!(criteria.member_counts.contains(&artist.members.len()));
      assert!(matches_query(artist, &criteria.query));
    }
  }

  #[test]
  fn parses_query_pairs() {
    let criteria = FilterCriteria::from_query_pairs(&pairs(&[
      ("creation_year_min", "1960"),
      ("creation_year_max", "abc"),
      ("album_year_max", " 1990 "),
      ("member_count", "4"),
      ("member_count", "4"),
      ("member_count", "0"),
      ("member_count", "x"),
      ("member_count", " 2"),
      ("location", " london-uk "),
      ("location", "  "),
      ("q", "  queen "),
      ("unrelated", "1"),
    ]));

    assert_eq!(criteria.creation_year_min, 1960);
    assert_eq!(criteria.creation_year_max, 0);
    assert_eq!(criteria.album_year_max, 1990);
    assert_eq!(criteria.member_counts, BTreeSet::from([2, 4]));
    assert_eq!(criteria.locations, vec!["london-uk".to_string()]);
    assert_eq!(criteria.query, "queen");
    assert!(criteria.is_active());
  }

  #[test]
  fn suggestions_tag_artists_and_members() {
    let found = suggestions(&catalog(), "ro");
    assert_eq!(
      found,
      vec![
        Suggestion { text: "Roger Taylor".into(), kind: SuggestionKind::Member, artist_id: 1 },
        Suggestion { text: "Roger Waters".into(), kind: SuggestionKind::Member, artist_id: 2 },
      ]
    );

    let json = serde_json::to_value(&suggestions(&catalog(), "queen")[0]).unwrap();
    assert_eq!(json, serde_json::json!({"text": "Queen", "type": "artist", "artist_id": 1}));
  }

  #[test]
  fn suggestions_stop_at_limit() {
    let crowd: Vec<Artist> = (1..=5)
      .map(|i| artist(i, &format!("Band {}", i), &["Bandmate A", "Bandmate B"], 2000, "01-01-2001"))
      .collect();

    let found = suggestions(&crowd, "band");
    assert_eq!(found.len(), SUGGESTION_LIMIT);
    assert_eq!(found.last().unwrap().artist_id, 3);
    assert!(suggestions(&crowd, "   ").is_empty());
  }

  #[test]
  fn filter_options_cover_catalog() {
    let options = FilterOptions::from_artists(&catalog(), &locations());
    assert_eq!(options.min_creation_year, 1965);
    assert_eq!(options.max_creation_year, 2001);
    assert_eq!(options.min_album_year, 1967);
    assert_eq!(options.max_album_year, 1996);
    assert_eq!(options.member_counts, vec![1, 3, 4]);
    assert_eq!(
      options.locations,
      vec!["berlin-germany", "detroit-usa", "london-uk", "paris-france"]
    );
  }
}
