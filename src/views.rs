//! Server-rendered HTML pages.
//!
//! Every value interpolated into markup goes through [`escape`].

use crate::{
  catalog::{Artist, TourLocation},
  db::models::{Account, Favorite},
  filter::{FilterCriteria, FilterOptions, same_location},
};

const SITE_TITLE: &str = "Tourbook";

/// Member counts offered by the home page filter form
const HOME_MEMBER_CHOICES: std::ops::RangeInclusive<usize> = 1..=8;

pub fn escape(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for c in raw.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

fn layout(title: &str, username: Option<&str>, body: &str) -> String {
  page(title, username, body, "", "")
}

fn page(title: &str, username: Option<&str>, body: &str, head: &str, scripts: &str) -> String {
  let nav = match username {
    Some(name) => format!(
      r#"<a href="/profile">{}</a>
        <form method="post" action="/logout" class="inline"><button type="submit">Log out</button></form>"#,
      escape(name)
    ),
    None => r#"<a href="/login">Log in</a> <a href="/register">Sign up</a>"#.to_string(),
  };

  format!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {site}</title>
    <link rel="stylesheet" href="/static/css/style.css">{head}
</head>
<body>
    <header>
        <a href="/" class="brand">{site}</a>
        <form method="get" action="/search" class="search" autocomplete="off">
            <input type="search" name="q" id="search-input" placeholder="Artist or member">
            <ul id="suggestions"></ul>
        </form>
        <nav><a href="/filters">Filters</a> {nav}</nav>
    </header>
    <main>
{body}
    </main>
    <script src="/static/js/search-suggestions.js"></script>{scripts}
</body>
</html>
"#,
    title = escape(title),
    site = SITE_TITLE,
    nav = nav,
    body = body,
    head = head,
    scripts = scripts,
  )
}

fn artist_card(artist: &Artist) -> String {
  format!(
    r#"<article class="artist-card">
    <a href="/artist/{id}">
        <img src="{image}" alt="{name}">
        <h3>{name}</h3>
    </a>
    <p>{created} &middot; {members} member(s)</p>
</article>"#,
    id = artist.id,
    image = escape(&artist.image),
    name = escape(&artist.name),
    created = artist.creation_date,
    members = artist.members.len(),
  )
}

fn artist_grid(artists: &[Artist]) -> String {
  if artists.is_empty() {
    return r#"<p class="empty">No artists match.</p>"#.to_string();
  }
  let cards: Vec<String> = artists.iter().map(artist_card).collect();
  format!(r#"<section class="artist-grid">{}</section>"#, cards.join("\n"))
}

fn year_input(name: &str, label: &str, value: i32) -> String {
  let value = if value == 0 { String::new() } else { value.to_string() };
  format!(
    r#"<label>{label} <input type="number" name="{name}" value="{value}"></label>"#,
    label = label,
    name = name,
    value = value,
  )
}

fn filter_form(
  action: &str,
  criteria: &FilterCriteria,
  member_choices: impl Iterator<Item = usize>,
  locations: &[String],
) -> String {
  let members: Vec<String> = member_choices
    .map(|count| {
      let checked = if criteria.member_counts.contains(&count) { " checked" } else { "" };
      format!(r#"<label><input type="checkbox" name="member_count" value="{count}"{checked}> {count}</label>"#)
    })
    .collect();

  let places: Vec<String> = locations
    .iter()
    .map(|place| {
      let selected = criteria
        .locations
        .iter()
        .any(|wanted| same_location(wanted, place));
      format!(
        r#"<option value="{value}"{selected}>{value}</option>"#,
        value = escape(place),
        selected = if selected { " selected" } else { "" },
      )
    })
    .collect();

  format!(
    r#"<form method="get" action="{action}" class="filters">
    <fieldset><legend>Creation year</legend>{cmin}{cmax}</fieldset>
    <fieldset><legend>First album</legend>{amin}{amax}</fieldset>
    <fieldset><legend>Members</legend>{members}</fieldset>
    <fieldset><legend>Concert locations</legend><select name="location" multiple>{places}</select></fieldset>
    <input type="text" name="q" value="{query}" placeholder="Name or member">
    <button type="submit">Apply</button> <a href="{action}">Reset</a>
</form>"#,
    action = action,
    cmin = year_input("creation_year_min", "From", criteria.creation_year_min),
    cmax = year_input("creation_year_max", "To", criteria.creation_year_max),
    amin = year_input("album_year_min", "From", criteria.album_year_min),
    amax = year_input("album_year_max", "To", criteria.album_year_max),
    members = members.join(""),
    places = places.join(""),
    query = escape(&criteria.query),
  )
}

pub fn home_page(
  artists: &[Artist],
  criteria: &FilterCriteria,
  locations: &[String],
  username: Option<&str>,
) -> String {
  let body = format!(
    "<h1>Artists</h1>\n{}\n<p>{} artist(s)</p>\n{}",
    filter_form("/", criteria, HOME_MEMBER_CHOICES, locations),
    artists.len(),
    artist_grid(artists),
  );
  layout("Home", username, &body)
}

pub fn filters_page(
  artists: &[Artist],
  criteria: &FilterCriteria,
  options: &FilterOptions,
  username: Option<&str>,
) -> String {
  let summary = if criteria.is_active() {
    format!("<p>{} artist(s) match your filters.</p>", artists.len())
  } else {
    format!("<p>Showing all {} artists.</p>", artists.len())
  };

  let body = format!(
    r#"<h1>Advanced filters</h1>
<p class="hint">Created {cmin}&ndash;{cmax}, first albums {amin}&ndash;{amax}.</p>
{form}
{summary}
{grid}"#,
    cmin = options.min_creation_year,
    cmax = options.max_creation_year,
    amin = options.min_album_year,
    amax = options.max_album_year,
    form = filter_form(
      "/filters",
      criteria,
      options.member_counts.iter().copied(),
      &options.locations
    ),
    summary = summary,
    grid = artist_grid(artists),
  );
  layout("Filters", username, &body)
}

pub fn search_page(query: &str, artists: &[Artist], username: Option<&str>) -> String {
  let body = format!(
    "<h1>Results for &ldquo;{}&rdquo;</h1>\n<p>{} result(s)</p>\n{}",
    escape(query),
    artists.len(),
    artist_grid(artists),
  );
  layout("Search", username, &body)
}

/// Tour stops as JSON that is safe to place inside a `<script>` element.
pub fn tour_locations_json(tours: &[TourLocation]) -> String {
  let json = match serde_json::to_string(tours) {
    Ok(json) => json,
    Err(e) => {
      tracing::warn!("Failed to encode tour locations: {}", e);
      return "[]".to_string();
    }
  };
  json
    .replace('<', "\\u003c")
    .replace('>', "\\u003e")
    .replace('&', "\\u0026")
}

pub fn artist_page(
  artist: &Artist,
  tours: &[TourLocation],
  is_favorite: Option<bool>,
  username: Option<&str>,
) -> String {
  let members: Vec<String> = artist
    .members
    .iter()
    .map(|m| format!("<li>{}</li>", escape(m)))
    .collect();

  let stops: Vec<String> = tours
    .iter()
    .map(|stop| {
      let dates: Vec<String> = stop.dates.iter().map(|d| escape(d)).collect();
      format!("<li><strong>{}</strong>: {}</li>", escape(&stop.name), dates.join(", "))
    })
    .collect();

  let favorite = match is_favorite {
    Some(true) => format!(r#"<a class="favorite on" href="/favorite/toggle/{}">Remove from favorites</a>"#, artist.id),
    Some(false) => format!(r#"<a class="favorite" href="/favorite/toggle/{}">Add to favorites</a>"#, artist.id),
    None => r#"<a class="favorite" href="/login">Log in to save favorites</a>"#.to_string(),
  };

  let spotify = artist
    .spotify_search_url()
    .map(|url| format!(r#"<a href="{}" rel="noopener" target="_blank">Find on Spotify</a>"#, escape(&url)))
    .unwrap_or_default();

  let body = format!(
    r#"<article class="artist">
    <img src="{image}" alt="{name}">
    <h1>{name}</h1>
    <p>Formed in {created}. First album: {first_album}.</p>
    {favorite} {spotify}
    <h2>Members</h2>
    <ul>{members}</ul>
    <h2>Concerts</h2>
    <div id="map" class="tour-map" data-artist-id="{id}"></div>
    <ul class="tour">{stops}</ul>
</article>"#,
    id = artist.id,
    image = escape(&artist.image),
    name = escape(&artist.name),
    created = artist.creation_date,
    first_album = escape(&artist.first_album),
    favorite = favorite,
    spotify = spotify,
    members = members.join(""),
    stops = if stops.is_empty() { "<li>No concerts listed.</li>".to_string() } else { stops.join("") },
  );

  let head = format!(r#"
    <link rel="stylesheet" href="{}">"#, LEAFLET_CSS);
  let scripts = format!(
    r#"
    <script>window.artistLocations = {locations};</script>
    <script src="{leaflet}"></script>
    <script src="/static/js/map.js"></script>"#,
    locations = tour_locations_json(tours),
    leaflet = LEAFLET_JS,
  );
  page(&artist.name, username, &body, &head, &scripts)
}

fn message(class: &str, text: Option<&str>) -> String {
  text
    .map(|t| format!(r#"<p class="{}">{}</p>"#, class, escape(t)))
    .unwrap_or_default()
}

pub fn login_page(error: Option<&str>, success: Option<&str>) -> String {
  let body = format!(
    r#"<h1>Log in</h1>
{error}{success}
<form method="post" action="/login" class="auth">
    <label>Username <input type="text" name="username" required></label>
    <label>Password <input type="password" name="password" required></label>
    <button type="submit">Log in</button>
</form>
<p>No account? <a href="/register">Sign up</a></p>"#,
    error = message("error", error),
    success = message("success", success),
  );
  layout("Log in", None, &body)
}

pub fn register_page(error: Option<&str>) -> String {
  let body = format!(
    r#"<h1>Sign up</h1>
{error}
<form method="post" action="/register" class="auth">
    <label>Username <input type="text" name="username" required minlength="3"></label>
    <label>Email <input type="email" name="email" required></label>
    <label>Password <input type="password" name="password" required minlength="6"></label>
    <button type="submit">Create account</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
    error = message("error", error),
  );
  layout("Sign up", None, &body)
}

pub fn profile_page(
  account: &Account,
  favorites: &[Favorite],
  error: Option<&str>,
  success: Option<&str>,
) -> String {
  let favorites = if favorites.is_empty() {
    "<p>No favorites yet.</p>".to_string()
  } else {
    let items: Vec<String> = favorites
      .iter()
      .map(|f| {
        format!(
          r#"<li><a href="/artist/{id}"><img src="{image}" alt="{name}"> {name}</a> <small>added {added}</small></li>"#,
          id = f.artist_id,
          image = escape(&f.artist_image),
          name = escape(&f.artist_name),
          added = f.added_at.format("%Y-%m-%d"),
        )
      })
      .collect();
    format!(r#"<ul class="favorites">{}</ul>"#, items.join(""))
  };

  let body = format!(
    r#"<h1>{username}</h1>
{error}{success}
<section class="profile">
    <img src="{avatar}" alt="avatar" class="avatar">
    <p>{email}</p>
    <p>Member since {since}</p>
    <form method="post" action="/profile/update">
        <label>Bio <textarea name="bio" maxlength="500">{bio}</textarea></label>
        <button type="submit">Save</button>
    </form>
</section>
<h2>Favorites</h2>
{favorites}"#,
    username = escape(&account.username),
    error = message("error", error),
    success = message("success", success),
    avatar = escape(&account.avatar_url),
    email = escape(&account.email),
    since = account.created_at.format("%Y-%m-%d"),
    bio = escape(&account.bio),
    favorites = favorites,
  );
  layout("Profile", Some(&account.username), &body)
}

pub fn not_found_page() -> String {
  layout(
    "Page not found",
    None,
    r#"<h1>404</h1><p>This page does not exist.</p><p><a href="/">Back to artists</a></p>"#,
  )
}

pub fn error_page(title: &str, detail: &str) -> String {
  let body = format!(
    r#"<h1>{}</h1><p>{}</p><p><a href="/">Back to artists</a></p>"#,
    escape(title),
    escape(detail)
  );
  layout(title, None, &body)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escapes_markup() {
    assert_eq!(escape(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
  }

  #[test]
  fn home_marks_selected_filters() {
    let criteria = FilterCriteria {
      member_counts: [2].into(),
      locations: vec!["london-uk".to_string()],
      query: "<script>".to_string(),
      ..Default::default()
    };
    let html = home_page(&[], &criteria, &["london-uk".to_string()], Some("freddie"));

    assert!(html.contains(r#"value="2" checked"#));
    assert!(html.contains(r#"<option value="london-uk" selected>"#));
    assert!(html.contains(r#"name="q" value="&lt;script&gt;""#));
    assert!(html.contains("freddie"));
  }

  #[test]
  fn selected_location_survives_non_ascii_case() {
    let criteria = FilterCriteria {
      locations: vec!["MÜNCHEN-germany".to_string()],
      ..Default::default()
    };
    let html = home_page(&[], &criteria, &["münchen-germany".to_string()], None);

    assert!(html.contains(r#"<option value="münchen-germany" selected>"#));
  }

  #[test]
  fn artist_page_embeds_tour_locations_for_map() {
    let artist = Artist {
      id: 4,
      name: "Queen".to_string(),
      image: String::new(),
      members: vec![],
      creation_date: 1970,
      first_album: "14-12-1973".to_string(),
    };
    let tours = vec![TourLocation {
      name: "london-uk".to_string(),
      dates: vec!["</script><b>".to_string()],
    }];
    let html = artist_page(&artist, &tours, None, None);

    assert!(html.contains(r#"id="map" class="tour-map" data-artist-id="4""#));
    assert!(html.contains(
      r#"window.artistLocations = [{"name":"london-uk","dates":["\u003c/script\u003e\u003cb\u003e"]}];"#
    ));
    assert!(!html.contains("</script><b>"));
    assert!(html.contains("/static/js/map.js"));
    assert!(html.contains("leaflet.js"));
  }
}
