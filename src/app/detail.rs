// src/app/detail.rs
use std::collections::HashMap;

use chrono::NaiveDate;
use eframe::egui as eg;
use once_cell::sync::Lazy;

use super::data::{Movie, Rating, RELEASED_FORMAT};
use super::types::PosterState;

static RATING_TITLES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Internet Movie Database", "IMDb"),
        ("Rotten Tomatoes", "Tomatoes"),
    ])
});

pub const NO_PLOT: &str = "Plot information not available.";

/// Short label for a rating source ("Internet Movie Database" → "IMDb").
pub fn rating_title(source: &str) -> &str {
    RATING_TITLES.get(source).copied().unwrap_or(source)
}

/// Index of the rating shown first: the preferred source, else the first one.
pub fn default_rating_index(ratings: &[Rating], preferred: &str) -> Option<usize> {
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().position(|r| r.source == preferred).unwrap_or(0))
}

pub fn released_line(movie: &Movie) -> String {
    let shown = match (movie.released_date(), movie.released.as_deref()) {
        (Some(d), _) => format_date(d),
        (None, Some(raw)) => raw.to_string(),
        (None, None) => "N/A".to_string(),
    };
    format!("Released: {shown}")
}

fn format_date(d: NaiveDate) -> String {
    d.format(RELEASED_FORMAT).to_string()
}

pub fn genre_line(movie: &Movie) -> String {
    if movie.genres.is_empty() {
        "Genre: N/A".to_string()
    } else {
        format!("Genre: {}", movie.genres.join(", "))
    }
}

pub fn cast_crew_text(movie: &Movie) -> String {
    let mut parts = Vec::new();
    if !movie.directors.is_empty() {
        parts.push(format!("Director(s): {}", movie.directors.join(", ")));
    }
    if !movie.actor_list.is_empty() {
        parts.push(format!("Actors: {}", movie.actor_list.join(", ")));
    }
    if parts.is_empty() {
        "Cast & Crew: N/A".to_string()
    } else {
        parts.join("\n")
    }
}

pub fn language_line(movie: &Movie) -> Option<String> {
    (!movie.languages.is_empty()).then(|| format!("Language: {}", movie.languages.join(", ")))
}

impl crate::app::MovieDbApp {
    pub(crate) fn ui_render_detail_panel(&mut self, ctx: &eg::Context) {
        let Some(movie) = self.selected.clone() else {
            return;
        };

        eg::SidePanel::right("detail_panel")
            .resizable(true)
            .default_width(360.0)
            .min_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.heading("Details");
                    ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            self.selected = None;
                        }
                    });
                });
                ui.separator();

                eg::ScrollArea::vertical().show(ui, |ui| {
                    let avail_w = ui.available_width().clamp(120.0, 360.0);
                    let poster_size = eg::vec2(avail_w, avail_w * 1.5);
                    self.ui_poster(ui, &movie, poster_size);

                    ui.add_space(8.0);
                    ui.heading(&movie.title);
                    ui.label(eg::RichText::new(released_line(&movie)).weak());
                    ui.label(eg::RichText::new(genre_line(&movie)).weak());
                    if let Some(lang) = language_line(&movie) {
                        ui.label(eg::RichText::new(lang).weak());
                    }

                    ui.add_space(12.0);
                    ui.label(eg::RichText::new("Plot Summary").strong());
                    ui.label(movie.plot.as_deref().unwrap_or(NO_PLOT));

                    ui.add_space(12.0);
                    ui.label(eg::RichText::new("Cast & Crew").strong());
                    ui.label(cast_crew_text(&movie));

                    ui.add_space(12.0);
                    ui.label(eg::RichText::new("Ratings").strong());
                    self.ui_ratings(ui, &movie);
                });
            });
    }

    fn ui_ratings(&mut self, ui: &mut eg::Ui, movie: &Movie) {
        let Some(default_idx) =
            default_rating_index(&movie.ratings, &self.config.default_rating_source)
        else {
            ui.label(eg::RichText::new("N/A").size(24.0).strong());
            ui.label(eg::RichText::new("No ratings available").weak());
            return;
        };

        let mut idx = self
            .rating_choice
            .filter(|i| *i < movie.ratings.len())
            .unwrap_or(default_idx);
        ui.horizontal_wrapped(|ui| {
            for (i, r) in movie.ratings.iter().enumerate() {
                if ui.selectable_label(i == idx, rating_title(&r.source)).clicked() {
                    idx = i;
                }
            }
        });
        self.rating_choice = Some(idx);

        let r = &movie.ratings[idx];
        ui.label(eg::RichText::new(&r.value).size(24.0).strong());
        ui.label(eg::RichText::new(&r.source).weak());
    }

    /// Poster, placeholder while loading, or a fallback marker on failure.
    pub(crate) fn ui_poster(&mut self, ui: &mut eg::Ui, movie: &Movie, size: eg::Vec2) {
        let tex = movie.poster.as_deref().and_then(|url| self.poster_texture(url));
        if let Some(tex) = tex {
            ui.image((tex.id(), size));
            return;
        }

        let state = movie.poster.as_deref().and_then(|url| self.poster_state(url));
        let (rect, _resp) = ui.allocate_exact_size(size, eg::Sense::hover());
        ui.painter()
            .rect_filled(rect, 4.0, eg::Color32::from_gray(40));
        let (glyph, color) = match state {
            Some(PosterState::Failed) => ("!", eg::Color32::from_rgb(220, 80, 80)),
            Some(PosterState::Pending | PosterState::Cached) => ("…", eg::Color32::GRAY),
            _ => ("🎞", eg::Color32::GRAY),
        };
        ui.painter().text(
            rect.center(),
            eg::Align2::CENTER_CENTER,
            glyph,
            eg::FontId::proportional((size.y * 0.3).clamp(10.0, 32.0)),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(source: &str, value: &str) -> Rating {
        Rating {
            source: source.to_string(),
            value: value.to_string(),
        }
    }

    fn movie() -> Movie {
        Movie {
            title: "Up".into(),
            released: Some("29 May 2009".into()),
            genres: vec!["Animation".into(), "Adventure".into()],
            directors: vec!["Pete Docter".into(), "Bob Peterson".into()],
            actor_list: vec!["Ed Asner".into()],
            ..Movie::default()
        }
    }

    #[test]
    fn rating_titles_shorten_known_sources() {
        assert_eq!(rating_title("Internet Movie Database"), "IMDb");
        assert_eq!(rating_title("Rotten Tomatoes"), "Tomatoes");
        assert_eq!(rating_title("Metacritic"), "Metacritic");
        assert_eq!(rating_title("Letterboxd"), "Letterboxd");
    }

    #[test]
    fn default_rating_prefers_configured_source() {
        let ratings = vec![
            rating("Rotten Tomatoes", "98%"),
            rating("Internet Movie Database", "8.3/10"),
        ];
        assert_eq!(default_rating_index(&ratings, "Internet Movie Database"), Some(1));
        assert_eq!(default_rating_index(&ratings, "Metacritic"), Some(0));
        assert_eq!(default_rating_index(&[], "Metacritic"), None);
    }

    #[test]
    fn formats_detail_lines() {
        let m = movie();
        assert_eq!(released_line(&m), "Released: 29 May 2009");
        assert_eq!(genre_line(&m), "Genre: Animation, Adventure");
        assert_eq!(
            cast_crew_text(&m),
            "Director(s): Pete Docter, Bob Peterson\nActors: Ed Asner"
        );
        assert_eq!(language_line(&m), None);
    }

    #[test]
    fn missing_fields_read_na() {
        let m = Movie {
            title: "Blank".into(),
            released: Some("sometime in 1999".into()),
            ..Movie::default()
        };
        assert_eq!(released_line(&m), "Released: sometime in 1999");
        assert_eq!(genre_line(&m), "Genre: N/A");
        assert_eq!(cast_crew_text(&m), "Cast & Crew: N/A");
        assert_eq!(released_line(&Movie::default()), "Released: N/A");
    }
}
