// src/app/data.rs
use chrono::NaiveDate;
use serde::Deserialize;

/// OMDb-style release date, e.g. "19 Jun 2009".
pub const RELEASED_FORMAT: &str = "%d %b %Y";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Rating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Record exactly as it appears in the bundled JSON.
#[derive(Debug, Deserialize)]
pub(crate) struct RawMovie {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Genre", default)]
    genre: Option<String>,
    #[serde(rename = "Director", default)]
    director: Option<String>,
    #[serde(rename = "Actors", default)]
    actors: Option<String>,
    #[serde(rename = "Language", default)]
    language: Option<String>,
    #[serde(rename = "Plot", default)]
    plot: Option<String>,
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
    #[serde(rename = "Released", default)]
    released: Option<String>,
    #[serde(rename = "Ratings", default)]
    ratings: Option<Vec<Rating>>,
}

/// One catalog entry. Sentinel values ("", "N/A") are already gone: absent
/// fields are `None` and token lists never contain them.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Movie {
    pub title: String,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub language: Option<String>,
    pub plot: Option<String>,
    pub poster: Option<String>,
    pub released: Option<String>,
    pub ratings: Vec<Rating>,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    pub actor_list: Vec<String>,
    pub languages: Vec<String>,
}

impl Movie {
    pub fn released_date(&self) -> Option<NaiveDate> {
        self.released
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, RELEASED_FORMAT).ok())
    }

    /// Title with year suffix, e.g. "Up (2009)".
    pub fn display_title(&self) -> String {
        match &self.year {
            Some(y) => format!("{} ({})", self.title, y),
            None => self.title.clone(),
        }
    }
}

impl From<RawMovie> for Movie {
    fn from(raw: RawMovie) -> Self {
        let genre = present(raw.genre);
        let director = present(raw.director);
        let actors = present(raw.actors);
        let language = present(raw.language);
        Self {
            title: raw.title.trim().to_string(),
            year: present(Some(raw.year)),
            genres: split_and_trim(genre.as_deref()),
            directors: split_and_trim(director.as_deref()),
            actor_list: split_and_trim(actors.as_deref()),
            languages: split_and_trim(language.as_deref()),
            genre,
            director,
            actors,
            language,
            plot: present(raw.plot),
            poster: present(raw.poster),
            released: present(raw.released),
            ratings: raw.ratings.unwrap_or_default(),
        }
    }
}

pub(crate) fn is_sentinel(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case("n/a")
}

/// Trim and drop "" / "N/A".
pub(crate) fn present(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !is_sentinel(v))
}

/// Split a comma separated field into trimmed tokens, skipping sentinels.
pub fn split_and_trim(input: Option<&str>) -> Vec<String> {
    let Some(input) = input else {
        return Vec::new();
    };
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !is_sentinel(s))
        .map(str::to_string)
        .collect()
}
