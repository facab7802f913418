// src/app/types.rs
use std::path::PathBuf;
use std::sync::Arc;

use super::data::Movie;

// ---- categories / modes ----
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Year,
    Genre,
    Directors,
    Actors,
    AllMovies,
}

impl Category {
    /// Section order of the category list.
    pub const ALL: [Category; 5] = [
        Self::Year,
        Self::Genre,
        Self::Directors,
        Self::Actors,
        Self::AllMovies,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Year => "Year",
            Self::Genre => "Genre",
            Self::Directors => "Directors",
            Self::Actors => "Actors",
            Self::AllMovies => "All Movies",
        }
    }

    pub fn from_section(section: usize) -> Option<Self> {
        Self::ALL.get(section).copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    CategoryList,
    SearchResults,
}

// ---- render surface coordinates / content ----
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowPath {
    pub section: usize,
    pub row: usize,
}

impl RowPath {
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

/// What sits at a visual row while the category list is shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryListRow {
    /// A value inside a category, e.g. "2009" or "Animation".
    CategoryValue { value: String, is_expanded: bool },
    /// A movie nested below the expanded value.
    MovieUnderValue(Arc<Movie>),
    /// A movie in the "All Movies" section.
    AllMoviesItem(Arc<Movie>),
}

/// Instructions for the render surface, in the order they must be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControllerEvent {
    InsertRows(Vec<RowPath>),
    RemoveRows(Vec<RowPath>),
    ReloadAll,
    ShowDetail(Arc<Movie>),
}

// ---- posters ----
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterState {
    Pending, // queued or downloading
    Cached,  // file present on disk (ready to upload)
    Ready,   // texture uploaded
    Failed,  // permanent failure, row shows the fallback marker
}

pub struct PosterDone {
    pub path: RowPath,
    pub key: String,
    pub result: Result<PathBuf, String>,
}
