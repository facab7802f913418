// src/app/rows.rs
//! Visual row ↔ content mapping for the category list.
//!
//! Every open section shows its values; the one expanded value (if it lives
//! in the section) is followed by a block of its movies, pushing the later
//! values down by the block length.

use super::catalog::CatalogIndex;
use super::expansion::ExpansionState;
use super::types::{Category, CategoryListRow};

/// Content of `(section, row)`, or `None` for coordinates that do not exist.
pub fn resolve_row(
    catalog: &CatalogIndex,
    state: &ExpansionState,
    section: usize,
    row: usize,
) -> Option<CategoryListRow> {
    let category = Category::from_section(section)?;

    if category == Category::AllMovies {
        return catalog
            .all()
            .get(row)
            .cloned()
            .map(CategoryListRow::AllMoviesItem);
    }

    let values = catalog.values_for(category);
    let Some(expanded) = state.expanded_in(section) else {
        return values.get(row).map(|v| CategoryListRow::CategoryValue {
            value: v.clone(),
            is_expanded: false,
        });
    };

    let v = expanded.value_index;
    let k = expanded.movie_count();
    if row <= v {
        values.get(row).map(|value| CategoryListRow::CategoryValue {
            value: value.clone(),
            is_expanded: row == v,
        })
    } else if row <= v + k {
        expanded
            .movies
            .get(row - v - 1)
            .cloned()
            .map(CategoryListRow::MovieUnderValue)
    } else {
        values.get(row - k).map(|value| CategoryListRow::CategoryValue {
            value: value.clone(),
            is_expanded: false,
        })
    }
}

/// Rows visible in `section` of the category list.
pub fn row_count(catalog: &CatalogIndex, state: &ExpansionState, section: usize) -> usize {
    let Some(category) = Category::from_section(section) else {
        return 0;
    };
    if !state.is_section_open(section) {
        return 0;
    }
    if category == Category::AllMovies {
        return catalog.len();
    }
    let nested = state.expanded_in(section).map_or(0, |e| e.movie_count());
    catalog.values_for(category).len() + nested
}

/// Rows an open section shows before any value is expanded.
pub fn base_row_count(catalog: &CatalogIndex, section: usize) -> usize {
    match Category::from_section(section) {
        Some(Category::AllMovies) => catalog.len(),
        Some(category) => catalog.values_for(category).len(),
        None => 0,
    }
}

/// Index into `values_for` of the value shown at `row`; `None` unless the row
/// resolves to a `CategoryValue`. Relies on at most one expansion per section.
pub fn value_index_for_row(
    catalog: &CatalogIndex,
    state: &ExpansionState,
    section: usize,
    row: usize,
) -> Option<usize> {
    match resolve_row(catalog, state, section, row)? {
        CategoryListRow::CategoryValue { .. } => {}
        CategoryListRow::MovieUnderValue(_) | CategoryListRow::AllMoviesItem(_) => return None,
    }
    match state.expanded_in(section) {
        Some(e) if row > e.value_index + e.movie_count() => Some(row - e.movie_count()),
        _ => Some(row),
    }
}
