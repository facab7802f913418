// src/app/ui.rs
use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui as eg;
use tracing::debug;

use super::data::Movie;
use super::types::{Category, CategoryListRow, DisplayMode, RowPath};

pub const ROW_HEIGHT: f32 = 44.0;
const THUMB_W: f32 = 26.0;
pub const SEARCH_HINT: &str = "Search movies by title/genre/actor/director";

/// One line of the flattened list handed to the scroll area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Line {
    Header(usize),
    Row(RowPath),
    SearchRow(usize),
}

enum Tap {
    Header(usize),
    Row(RowPath),
}

impl crate::app::MovieDbApp {
    pub(crate) fn ui_render_top_bar(&mut self, ctx: &eg::Context) {
        eg::TopBottomPanel::top("search_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("Movie Database");
                ui.add_space(12.0);
                let resp = ui.add(
                    eg::TextEdit::singleline(&mut self.search_text)
                        .hint_text(SEARCH_HINT)
                        .desired_width(f32::INFINITY),
                );
                if resp.changed() {
                    let text = self.search_text.clone();
                    let events = self.controller.update_search(&text);
                    self.apply_events(events);
                }
            });
            ui.add_space(4.0);
        });
    }

    pub(crate) fn ui_render_list(&mut self, ctx: &eg::Context) {
        eg::CentralPanel::default().show(ctx, |ui| {
            let lines = self.flatten_lines();
            if lines.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(eg::RichText::new("No movies found.").weak());
                });
                return;
            }

            let mut tap: Option<Tap> = None;
            let mut visible: HashSet<RowPath> = HashSet::new();

            eg::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show_rows(ui, ROW_HEIGHT, lines.len(), |ui, range| {
                    for line in &lines[range] {
                        match *line {
                            Line::Header(section) => {
                                if self.ui_header(ui, section) {
                                    tap = Some(Tap::Header(section));
                                }
                            }
                            Line::Row(path) => {
                                let Some(content) =
                                    self.controller.row_content(path.section, path.row)
                                else {
                                    debug!("no content for {path:?}; skipping");
                                    continue;
                                };
                                if self.ui_category_row(ui, path, &content, &mut visible) {
                                    tap = Some(Tap::Row(path));
                                }
                            }
                            Line::SearchRow(row) => {
                                let Some(movie) = self.controller.search_result(row).cloned()
                                else {
                                    continue;
                                };
                                let path = RowPath::new(0, row);
                                visible.insert(path);
                                if self.ui_movie_row(ui, path, &movie, 0.0) {
                                    tap = Some(Tap::Row(path));
                                }
                            }
                        }
                    }
                });

            if let Some(loader) = self.posters.as_mut() {
                loader.retain_visible(&visible);
            }

            match tap {
                Some(Tap::Header(section)) => {
                    let events = self.controller.tap_header(section);
                    self.apply_events(events);
                }
                Some(Tap::Row(path)) => {
                    let events = self.controller.tap_row(path);
                    self.apply_events(events);
                }
                None => {}
            }
        });
    }

    fn flatten_lines(&self) -> Vec<Line> {
        let c = &self.controller;
        match c.mode() {
            DisplayMode::SearchResults => (0..c.row_count(0)).map(Line::SearchRow).collect(),
            DisplayMode::CategoryList => {
                let mut lines = Vec::new();
                for section in 0..c.section_count() {
                    lines.push(Line::Header(section));
                    lines.extend(
                        (0..c.row_count(section)).map(|row| Line::Row(RowPath::new(section, row))),
                    );
                }
                lines
            }
        }
    }

    /// Section header with its disclosure arrow. Returns true when clicked.
    fn ui_header(&self, ui: &mut eg::Ui, section: usize) -> bool {
        let title = Category::from_section(section).map_or("?", Category::as_str);
        let arrow = if self.controller.is_section_open(section) {
            "▼"
        } else {
            "▶"
        };
        let text = eg::RichText::new(format!("{arrow}  {title}")).strong().size(16.0);
        ui.add_sized(
            [ui.available_width(), ROW_HEIGHT - 4.0],
            eg::Button::new(text).frame(false),
        )
        .clicked()
    }

    fn ui_category_row(
        &mut self,
        ui: &mut eg::Ui,
        path: RowPath,
        content: &CategoryListRow,
        visible: &mut HashSet<RowPath>,
    ) -> bool {
        match content {
            CategoryListRow::CategoryValue { value, is_expanded } => {
                let marker = if *is_expanded { "−" } else { "+" };
                ui.add_sized(
                    [ui.available_width(), ROW_HEIGHT - 4.0],
                    eg::SelectableLabel::new(*is_expanded, format!("    {marker} {value}")),
                )
                .clicked()
            }
            CategoryListRow::MovieUnderValue(movie) => {
                visible.insert(path);
                self.ui_movie_row(ui, path, movie, 36.0)
            }
            CategoryListRow::AllMoviesItem(movie) => {
                visible.insert(path);
                self.ui_movie_row(ui, path, movie, 16.0)
            }
        }
    }

    /// Thumbnail, title and genre line for a movie. Returns true when clicked.
    fn ui_movie_row(&mut self, ui: &mut eg::Ui, path: RowPath, movie: &Arc<Movie>, indent: f32) -> bool {
        if let Some(url) = movie.poster.as_deref() {
            self.request_poster(path, url);
        }

        let selected = self
            .selected
            .as_ref()
            .is_some_and(|s| Arc::ptr_eq(s, movie));
        let resp = ui
            .horizontal(|ui| {
                ui.set_height(ROW_HEIGHT - 4.0);
                ui.add_space(indent);
                self.ui_poster(ui, movie, eg::vec2(THUMB_W, THUMB_W * 1.5));
                ui.vertical(|ui| {
                    let title = ui.selectable_label(selected, movie.display_title());
                    if let Some(genre) = movie.genre.as_deref() {
                        ui.label(eg::RichText::new(genre).small().weak());
                    }
                    title
                })
                .inner
            })
            .inner;
        resp.clicked()
    }
}
