// src/app/expansion.rs
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use super::data::Movie;

/// The one value row currently showing its movies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedValue {
    pub section: usize,
    /// Index of the value within `CatalogIndex::values_for`, not the visual row.
    pub value_index: usize,
    pub movies: Vec<Arc<Movie>>,
}

impl ExpandedValue {
    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn is_at(&self, section: usize, value_index: usize) -> bool {
        self.section == section && self.value_index == value_index
    }
}

/// Result of `ExpansionState::expand_value`, so callers can derive row deltas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// Nothing changed.
    Ignored,
    /// The same value was expanded already and is now collapsed.
    Collapsed(ExpandedValue),
    /// A new value is expanded; `replaced` is the one it displaced, if any.
    Expanded { replaced: Option<ExpandedValue> },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpansionState {
    sections: BTreeSet<usize>,
    value: Option<ExpandedValue>,
}

impl ExpansionState {
    pub fn is_section_open(&self, section: usize) -> bool {
        self.sections.contains(&section)
    }

    pub fn expanded_value(&self) -> Option<&ExpandedValue> {
        self.value.as_ref()
    }

    /// The expanded value, if it lives in `section`.
    pub fn expanded_in(&self, section: usize) -> Option<&ExpandedValue> {
        self.value.as_ref().filter(|v| v.section == section)
    }

    pub fn open_section(&mut self, section: usize) {
        self.sections.insert(section);
    }

    /// Close `section`, dropping its expanded value. Returns that value.
    pub fn close_section(&mut self, section: usize) -> Option<ExpandedValue> {
        self.sections.remove(&section);
        if self.expanded_in(section).is_some() {
            self.value.take()
        } else {
            None
        }
    }

    pub fn expand_value(
        &mut self,
        section: usize,
        value_index: usize,
        movies: Vec<Arc<Movie>>,
    ) -> ExpandOutcome {
        if self.value.as_ref().is_some_and(|v| v.is_at(section, value_index)) {
            return match self.collapse_value() {
                Some(old) => ExpandOutcome::Collapsed(old),
                None => ExpandOutcome::Ignored,
            };
        }
        if movies.is_empty() {
            warn!("no movies for value #{value_index} in section {section}; not expanding");
            return ExpandOutcome::Ignored;
        }
        if !self.is_section_open(section) {
            warn!("section {section} is closed; ignoring value expansion");
            return ExpandOutcome::Ignored;
        }
        let replaced = self.value.replace(ExpandedValue {
            section,
            value_index,
            movies,
        });
        ExpandOutcome::Expanded { replaced }
    }

    pub fn collapse_value(&mut self) -> Option<ExpandedValue> {
        self.value.take()
    }

    pub fn reset_all(&mut self) {
        self.sections.clear();
        self.value = None;
    }

    pub fn is_pristine(&self) -> bool {
        self.sections.is_empty() && self.value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies(titles: &[&str]) -> Vec<Arc<Movie>> {
        titles
            .iter()
            .map(|t| {
                Arc::new(Movie {
                    title: (*t).to_string(),
                    ..Movie::default()
                })
            })
            .collect()
    }

    #[test]
    fn starts_pristine() {
        let s = ExpansionState::default();
        assert!(s.is_pristine());
        assert!(!s.is_section_open(0));
    }

    #[test]
    fn closing_section_drops_its_value_only() {
        let mut s = ExpansionState::default();
        s.open_section(1);
        s.open_section(2);
        s.expand_value(1, 0, movies(&["Up"]));

        assert_eq!(s.close_section(2), None);
        assert!(s.expanded_value().is_some());

        let dropped = s.close_section(1).unwrap();
        assert_eq!(dropped.value_index, 0);
        assert!(s.expanded_value().is_none());
        assert!(!s.is_section_open(1));
    }

    #[test]
    fn same_value_toggles_off() {
        let mut s = ExpansionState::default();
        s.open_section(0);
        let before = s.clone();
        assert!(matches!(
            s.expand_value(0, 2, movies(&["Up"])),
            ExpandOutcome::Expanded { replaced: None }
        ));
        assert!(matches!(
            s.expand_value(0, 2, movies(&["Up"])),
            ExpandOutcome::Collapsed(_)
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn new_value_replaces_previous() {
        let mut s = ExpansionState::default();
        s.open_section(0);
        s.open_section(3);
        s.expand_value(0, 1, movies(&["Up"]));
        let out = s.expand_value(3, 4, movies(&["Cars", "Heat"]));
        let ExpandOutcome::Expanded { replaced: Some(old) } = out else {
            panic!("expected replacement, got {out:?}");
        };
        assert!(old.is_at(0, 1));
        assert!(s.expanded_value().unwrap().is_at(3, 4));
        assert!(s.expanded_in(0).is_none());
    }

    #[test]
    fn empty_or_closed_expansion_is_ignored() {
        let mut s = ExpansionState::default();
        s.open_section(0);
        assert_eq!(s.expand_value(0, 0, Vec::new()), ExpandOutcome::Ignored);
        assert_eq!(s.expand_value(1, 0, movies(&["Up"])), ExpandOutcome::Ignored);
        assert!(s.expanded_value().is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = ExpansionState::default();
        s.open_section(0);
        s.open_section(4);
        s.expand_value(0, 0, movies(&["Up"]));
        s.reset_all();
        assert!(s.is_pristine());
    }
}
