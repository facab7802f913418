// src/app/catalog.rs
use std::fs;
use std::path::Path;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{info, warn};

use super::data::{Movie, RawMovie};
use super::types::Category;

/// The bundled movie list plus the distinct values of every category.
/// Built once; read-only afterwards.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    movies: Vec<Arc<Movie>>,
    years: Vec<String>,
    genres: Vec<String>,
    directors: Vec<String>,
    actors: Vec<String>,
}

impl CatalogIndex {
    pub fn new(movies: Vec<Movie>) -> Self {
        let movies: Vec<Arc<Movie>> = movies.into_iter().map(Arc::new).collect();

        let years = distinct(movies.iter().filter_map(|m| m.year.clone()));
        let genres = distinct(movies.iter().flat_map(|m| m.genres.iter().cloned()));
        let directors = distinct(movies.iter().flat_map(|m| m.directors.iter().cloned()));
        let actors = distinct(movies.iter().flat_map(|m| m.actor_list.iter().cloned()));

        Self {
            movies,
            years,
            genres,
            directors,
            actors,
        }
    }

    /// Load the JSON catalog. A missing or malformed file yields an empty
    /// catalog; the app keeps running with nothing to show.
    pub fn load(path: &Path) -> Self {
        let loaded = fs::read_to_string(path)
            .map_err(|e| format!("read {}: {e}", path.display()))
            .and_then(|raw| Self::from_json_str(&raw));
        match loaded {
            Ok(catalog) => {
                info!(
                    "Loaded {} movies from {} ({} years, {} genres, {} directors, {} actors)",
                    catalog.len(),
                    path.display(),
                    catalog.years.len(),
                    catalog.genres.len(),
                    catalog.directors.len(),
                    catalog.actors.len()
                );
                catalog
            }
            Err(e) => {
                warn!(
                    "Could not load catalog from {}: {e}; continuing with an empty catalog",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        let parsed: Vec<RawMovie> =
            serde_json::from_str(raw).map_err(|e| format!("decode catalog: {e}"))?;
        Ok(Self::new(parsed.into_iter().map(Movie::from).collect()))
    }

    pub fn all(&self) -> &[Arc<Movie>] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn values_for(&self, category: Category) -> &[String] {
        match category {
            Category::Year => &self.years,
            Category::Genre => &self.genres,
            Category::Directors => &self.directors,
            Category::Actors => &self.actors,
            Category::AllMovies => &[],
        }
    }

    /// Movies carrying `value` in the category's field, in catalog order.
    /// Always empty for `AllMovies`; those rows index `all()` directly.
    pub fn items_for(&self, category: Category, value: &str) -> Vec<Arc<Movie>> {
        let matches = |m: &Movie| -> bool {
            match category {
                Category::Year => m.year.as_deref() == Some(value),
                Category::Genre => m.genres.iter().any(|g| g == value),
                Category::Directors => m.directors.iter().any(|d| d == value),
                Category::Actors => m.actor_list.iter().any(|a| a == value),
                Category::AllMovies => false,
            }
        };
        self.movies.iter().filter(|m| matches(m)).cloned().collect()
    }

    /// Case-insensitive substring search over title, genre, director and
    /// actors. Blank queries match nothing.
    pub fn search(&self, query: &str) -> Vec<Arc<Movie>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let hit = |field: Option<&str>| {
            field.is_some_and(|f| f.to_lowercase().contains(&needle))
        };
        self.movies
            .iter()
            .filter(|m| {
                hit(Some(m.title.as_str()))
                    || hit(m.genre.as_deref())
                    || hit(m.director.as_deref())
                    || hit(m.actors.as_deref())
            })
            .cloned()
            .collect()
    }
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    values.sorted().dedup().collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) const SAMPLE: &str = r#"[
        {"Title":"Up","Year":"2009","Genre":"Animation, Adventure","Director":"Pete Docter",
         "Actors":"Ed Asner, Jordan Nagai"},
        {"Title":"Cars","Year":"2006","Genre":"Animation","Director":"John Lasseter, Joe Ranft",
         "Actors":"Owen Wilson"},
        {"Title":"Batman Begins","Year":"2005","Genre":"Action, Adventure","Director":"Christopher Nolan",
         "Actors":"Christian Bale, Michael Caine"},
        {"Title":"Mystery","Year":"N/A","Genre":"N/A","Director":"","Actors":"N/A"}
    ]"#;

    pub(crate) fn sample() -> CatalogIndex {
        CatalogIndex::from_json_str(SAMPLE).unwrap()
    }

    fn titles(movies: &[Arc<Movie>]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn derives_sorted_distinct_values() {
        let c = sample();
        assert_eq!(c.values_for(Category::Year), ["2005", "2006", "2009"]);
        assert_eq!(
            c.values_for(Category::Genre),
            ["Action", "Adventure", "Animation"]
        );
        assert_eq!(
            c.values_for(Category::Directors),
            ["Christopher Nolan", "Joe Ranft", "John Lasseter", "Pete Docter"]
        );
        assert_eq!(c.values_for(Category::Actors).len(), 5);
        assert!(c.values_for(Category::AllMovies).is_empty());
    }

    #[test]
    fn every_value_has_items() {
        let c = sample();
        for cat in Category::ALL {
            for v in c.values_for(cat) {
                assert!(!c.items_for(cat, v).is_empty(), "{cat:?}/{v}");
            }
        }
    }

    #[test]
    fn items_for_keeps_catalog_order() {
        let c = CatalogIndex::from_json_str(
            r#"[{"Title":"Up","Year":"2009","Genre":"Animation, Adventure"},
                {"Title":"Cars","Year":"2006","Genre":"Animation"}]"#,
        )
        .unwrap();
        assert_eq!(c.values_for(Category::Genre), ["Adventure", "Animation"]);
        assert_eq!(titles(&c.items_for(Category::Genre, "Animation")), ["Up", "Cars"]);
        assert!(c.items_for(Category::AllMovies, "Up").is_empty());
    }

    #[test]
    fn items_for_matches_whole_tokens_only() {
        let c = sample();
        assert!(c.items_for(Category::Genre, "Anim").is_empty());
        assert_eq!(titles(&c.items_for(Category::Directors, "Joe Ranft")), ["Cars"]);
        assert_eq!(titles(&c.items_for(Category::Year, "2005")), ["Batman Begins"]);
    }

    #[test]
    fn search_is_case_insensitive_over_fields() {
        let c = sample();
        assert_eq!(titles(&c.search("batman")), ["Batman Begins"]);
        assert_eq!(titles(&c.search("  ADVENTURE ")), ["Up", "Batman Begins"]);
        assert_eq!(titles(&c.search("owen")), ["Cars"]);
        assert_eq!(titles(&c.search("nolan")), ["Batman Begins"]);
    }

    #[test]
    fn blank_search_is_empty() {
        let c = sample();
        assert!(c.search("").is_empty());
        assert!(c.search("   ").is_empty());
    }

    #[test]
    fn missing_file_gives_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let c = CatalogIndex::load(&dir.path().join("movies.json"));
        assert!(c.is_empty());
        assert!(c.values_for(Category::Genre).is_empty());
        assert!(c.search("up").is_empty());
    }

    #[test]
    fn corrupt_file_gives_empty_catalog() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "[{{\"Title\": 3}}").unwrap();
        assert!(CatalogIndex::load(f.path()).is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();
        let c = CatalogIndex::load(f.path());
        assert_eq!(c.len(), 4);
        assert_eq!(c.all()[3].title, "Mystery");
    }
}
