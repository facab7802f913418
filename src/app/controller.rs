// src/app/controller.rs
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::catalog::CatalogIndex;
use super::data::Movie;
use super::expansion::{ExpandOutcome, ExpandedValue, ExpansionState};
use super::rows;
use super::types::{Category, CategoryListRow, ControllerEvent, DisplayMode, RowPath};

/// Owns the browsing state of the home list and turns taps and search edits
/// into state changes plus row deltas for the render surface.
pub struct HomeController {
    catalog: Arc<CatalogIndex>,
    state: ExpansionState,
    mode: DisplayMode,
    search_results: Vec<Arc<Movie>>,
}

impl HomeController {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self {
            catalog,
            state: ExpansionState::default(),
            mode: DisplayMode::CategoryList,
            search_results: Vec::new(),
        }
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.state
    }

    pub const fn mode(&self) -> DisplayMode {
        self.mode
    }

    // ---- render surface queries ----

    pub fn section_count(&self) -> usize {
        match self.mode {
            DisplayMode::CategoryList => Category::ALL.len(),
            DisplayMode::SearchResults => 1,
        }
    }

    pub fn row_count(&self, section: usize) -> usize {
        match self.mode {
            DisplayMode::SearchResults => {
                if section == 0 {
                    self.search_results.len()
                } else {
                    0
                }
            }
            DisplayMode::CategoryList => rows::row_count(&self.catalog, &self.state, section),
        }
    }

    /// Category list content at `(section, row)`; `None` in search mode.
    pub fn row_content(&self, section: usize, row: usize) -> Option<CategoryListRow> {
        match self.mode {
            DisplayMode::CategoryList => rows::resolve_row(&self.catalog, &self.state, section, row),
            DisplayMode::SearchResults => None,
        }
    }

    pub fn search_result(&self, row: usize) -> Option<&Arc<Movie>> {
        match self.mode {
            DisplayMode::SearchResults => self.search_results.get(row),
            DisplayMode::CategoryList => None,
        }
    }

    pub fn is_section_open(&self, section: usize) -> bool {
        self.state.is_section_open(section)
    }

    // ---- events ----

    pub fn tap_header(&mut self, section: usize) -> Vec<ControllerEvent> {
        if self.mode != DisplayMode::CategoryList || Category::from_section(section).is_none() {
            debug!("header tap on section {section} ignored in {:?}", self.mode);
            return Vec::new();
        }

        let mut events = Vec::new();
        if self.state.is_section_open(section) {
            let visible = self.row_count(section);
            self.state.close_section(section);
            push_remove(&mut events, (0..visible).map(|r| RowPath::new(section, r)).collect());
        } else {
            self.state.open_section(section);
            let count = rows::base_row_count(&self.catalog, section);
            push_insert(&mut events, (0..count).map(|r| RowPath::new(section, r)).collect());
        }
        debug!("header {section} tapped -> {events:?}");
        events
    }

    pub fn tap_row(&mut self, path: RowPath) -> Vec<ControllerEvent> {
        if self.mode == DisplayMode::SearchResults {
            return match self.search_results.get(path.row) {
                Some(movie) => vec![ControllerEvent::ShowDetail(Arc::clone(movie))],
                None => {
                    debug!("tap on missing search row {}", path.row);
                    Vec::new()
                }
            };
        }

        match self.row_content(path.section, path.row) {
            Some(CategoryListRow::CategoryValue { .. }) => {
                let idx =
                    rows::value_index_for_row(&self.catalog, &self.state, path.section, path.row);
                match idx {
                    Some(idx) => self.toggle_value(path.section, idx),
                    None => Vec::new(),
                }
            }
            Some(CategoryListRow::MovieUnderValue(movie))
            | Some(CategoryListRow::AllMoviesItem(movie)) => {
                vec![ControllerEvent::ShowDetail(movie)]
            }
            None => {
                debug!("tap on missing row {path:?}");
                Vec::new()
            }
        }
    }

    pub fn update_search(&mut self, text: &str) -> Vec<ControllerEvent> {
        let was_searching = self.mode == DisplayMode::SearchResults;

        if text.trim().is_empty() {
            if !was_searching {
                return Vec::new();
            }
            self.mode = DisplayMode::CategoryList;
            self.search_results.clear();
            self.state.reset_all();
            info!("search cleared; back to categories");
            return vec![ControllerEvent::ReloadAll];
        }

        if !was_searching {
            self.state.reset_all();
        }
        self.mode = DisplayMode::SearchResults;
        self.search_results = self.catalog.search(text);
        debug!("search {text:?} -> {} results", self.search_results.len());
        vec![ControllerEvent::ReloadAll]
    }

    fn toggle_value(&mut self, section: usize, value_index: usize) -> Vec<ControllerEvent> {
        let Some(category) = Category::from_section(section) else {
            return Vec::new();
        };
        let Some(value) = self.catalog.values_for(category).get(value_index).cloned() else {
            return Vec::new();
        };

        let already = self
            .state
            .expanded_value()
            .is_some_and(|e| e.is_at(section, value_index));
        let movies = if already {
            Vec::new()
        } else {
            let movies = self.catalog.items_for(category, &value);
            if movies.is_empty() {
                warn!("No movies found for {}: {value}", category.as_str());
                return Vec::new();
            }
            movies
        };

        let mut events = Vec::new();
        match self.state.expand_value(section, value_index, movies) {
            ExpandOutcome::Ignored => {}
            ExpandOutcome::Collapsed(old) => push_remove(&mut events, nested_paths(&old)),
            ExpandOutcome::Expanded { replaced } => {
                if let Some(old) = replaced {
                    push_remove(&mut events, nested_paths(&old));
                }
                if let Some(new) = self.state.expanded_value() {
                    push_insert(&mut events, nested_paths(new));
                }
            }
        }
        debug!("value {value:?} in section {section} toggled -> {events:?}");
        events
    }
}

/// Row paths of the movie block under an expanded value.
fn nested_paths(e: &ExpandedValue) -> Vec<RowPath> {
    (0..e.movie_count())
        .map(|i| RowPath::new(e.section, e.value_index + 1 + i))
        .collect()
}

fn push_insert(events: &mut Vec<ControllerEvent>, paths: Vec<RowPath>) {
    if !paths.is_empty() {
        events.push(ControllerEvent::InsertRows(paths));
    }
}

fn push_remove(events: &mut Vec<ControllerEvent>, paths: Vec<RowPath>) {
    if !paths.is_empty() {
        events.push(ControllerEvent::RemoveRows(paths));
    }
}
