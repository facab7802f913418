// src/app/mod.rs — category browser + search + detail panel + poster loading

// ---- Standard lib imports ----
use std::collections::HashMap;
use std::sync::Arc;

// ---- Crates ----
use eframe::egui::{self as eg, TextureHandle};
use tracing::{debug, info, warn};

// ---- Local modules ----
pub mod cache;
pub mod catalog;
pub mod controller;
pub mod data;
pub mod detail;
pub mod expansion;
pub mod gfx;
pub mod posters;
pub mod rows;
pub mod types;
pub mod ui;

pub use catalog::CatalogIndex;
pub use controller::HomeController;
pub use data::{Movie, Rating};
pub use types::{Category, CategoryListRow, ControllerEvent, DisplayMode, PosterState, RowPath};

use crate::config::{posters_disabled, AppConfig};
use cache::PosterCache;
use posters::PosterLoader;

// ---- Tunables ----
const MAX_UPLOADS_PER_FRAME: usize = 4;

pub struct MovieDbApp {
    config: AppConfig,
    controller: HomeController,
    search_text: String,

    // detail panel
    selected: Option<Arc<Movie>>,
    rating_choice: Option<usize>,

    // posters, keyed by cache key
    posters: Option<PosterLoader>,
    poster_keys: HashMap<String, String>, // url -> key
    poster_states: HashMap<String, PosterState>,
    poster_paths: HashMap<String, std::path::PathBuf>,
    textures: HashMap<String, TextureHandle>,
}

impl MovieDbApp {
    pub fn new(config: AppConfig, catalog: Arc<CatalogIndex>) -> Self {
        let posters = if posters_disabled() {
            info!("Poster loading disabled via MOVIEDB_DISABLE_POSTERS");
            None
        } else {
            let cache = PosterCache::new(&config.cache_dir, config.poster_retention_days);
            match PosterLoader::new(cache, config.poster_workers) {
                Ok(loader) => Some(loader),
                Err(e) => {
                    warn!("{e}; posters will show placeholders");
                    None
                }
            }
        };

        Self {
            controller: HomeController::new(catalog),
            config,
            search_text: String::new(),
            selected: None,
            rating_choice: None,
            posters,
            poster_keys: HashMap::new(),
            poster_states: HashMap::new(),
            poster_paths: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    /// Apply controller output. The list is rebuilt from the controller every
    /// frame, so row deltas only need to invalidate row-bound work.
    pub(crate) fn apply_events(&mut self, events: Vec<ControllerEvent>) {
        for ev in events {
            match ev {
                ControllerEvent::InsertRows(paths) | ControllerEvent::RemoveRows(paths) => {
                    debug!("row delta over {} rows", paths.len());
                    let Some(first) = paths.first().copied() else {
                        continue;
                    };
                    // rows at and below the delta now show different content
                    if let Some(loader) = self.posters.as_mut() {
                        loader.cancel_from(first.section, first.row);
                    }
                }
                ControllerEvent::ReloadAll => {
                    if let Some(loader) = self.posters.as_mut() {
                        loader.cancel_all();
                    }
                }
                ControllerEvent::ShowDetail(movie) => {
                    info!("showing details for {}", movie.display_title());
                    self.selected = Some(movie);
                    self.rating_choice = None;
                }
            }
        }
    }

    fn request_poster(&mut self, path: RowPath, url: &str) {
        let Some(loader) = self.posters.as_mut() else {
            return;
        };
        let key = match self.poster_keys.get(url) {
            Some(k) => k.clone(),
            None => {
                let k = cache::url_to_cache_key(url);
                self.poster_keys.insert(url.to_string(), k.clone());
                k
            }
        };
        match self.poster_states.get(&key) {
            Some(PosterState::Ready | PosterState::Cached | PosterState::Failed) => {}
            // Pending re-requests: a row that scrolled away mid-fetch was cancelled.
            Some(PosterState::Pending) | None => {
                loader.request(path, url);
                self.poster_states.insert(key, PosterState::Pending);
            }
        }
    }

    fn poster_texture(&self, url: &str) -> Option<TextureHandle> {
        let key = self.poster_keys.get(url)?;
        self.textures.get(key).cloned()
    }

    fn poster_state(&self, url: &str) -> Option<PosterState> {
        let key = self.poster_keys.get(url)?;
        self.poster_states.get(key).copied()
    }

    /// Collect finished downloads and upload a few textures per frame.
    fn poll_posters(&mut self, ctx: &eg::Context) {
        if let Some(loader) = self.posters.as_mut() {
            let done = loader.poll();
            if !done.is_empty() {
                ctx.request_repaint();
            }
            for d in done {
                match d.result {
                    Ok(path) => {
                        self.poster_states.insert(d.key.clone(), PosterState::Cached);
                        self.poster_paths.insert(d.key, path);
                    }
                    Err(e) => {
                        warn!("poster for {:?} failed: {e}", d.path);
                        self.poster_states.insert(d.key, PosterState::Failed);
                    }
                }
            }
        }

        let cached: Vec<String> = self
            .poster_states
            .iter()
            .filter(|(_, s)| matches!(s, PosterState::Cached))
            .map(|(k, _)| k.clone())
            .take(MAX_UPLOADS_PER_FRAME)
            .collect();
        for key in cached {
            let Some(path) = self.poster_paths.get(&key) else {
                continue;
            };
            match gfx::load_texture_from_path(ctx, path, &key) {
                Ok(tex) => {
                    self.textures.insert(key.clone(), tex);
                    self.poster_states.insert(key, PosterState::Ready);
                }
                Err(e) => {
                    warn!("poster upload failed for {key}: {e}");
                    self.poster_states.insert(key, PosterState::Failed);
                }
            }
            ctx.request_repaint();
        }
    }
}

impl eframe::App for MovieDbApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        self.poll_posters(ctx);
        self.ui_render_top_bar(ctx);
        self.ui_render_detail_panel(ctx);
        self.ui_render_list(ctx);

        if self.posters.as_ref().is_some_and(|p| p.in_flight() > 0) {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn app_with_slow_posters() -> MovieDbApp {
        let loader = PosterLoader::with_fetcher(1, |url, _key| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(PathBuf::from(url))
        });
        MovieDbApp {
            config: AppConfig::default(),
            controller: HomeController::new(Arc::new(catalog::tests::sample())),
            search_text: String::new(),
            selected: None,
            rating_choice: None,
            posters: Some(loader),
            poster_keys: HashMap::new(),
            poster_states: HashMap::new(),
            poster_paths: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    fn in_flight(app: &MovieDbApp) -> usize {
        app.posters.as_ref().map_or(0, PosterLoader::in_flight)
    }

    #[test]
    fn delta_in_one_section_keeps_other_sections_fetching() {
        let mut app = app_with_slow_posters();
        app.request_poster(RowPath::new(4, 0), "http://x/up.jpg");
        app.request_poster(RowPath::new(1, 1), "http://x/cars.jpg");
        assert_eq!(in_flight(&app), 2);

        app.apply_events(vec![ControllerEvent::InsertRows(vec![
            RowPath::new(1, 3),
            RowPath::new(1, 4),
        ])]);
        assert_eq!(in_flight(&app), 2);
    }

    #[test]
    fn delta_cancels_rows_it_shifts() {
        let mut app = app_with_slow_posters();
        app.request_poster(RowPath::new(1, 0), "http://x/a.jpg");
        app.request_poster(RowPath::new(1, 4), "http://x/b.jpg");

        app.apply_events(vec![ControllerEvent::RemoveRows(vec![
            RowPath::new(1, 2),
            RowPath::new(1, 3),
        ])]);
        assert_eq!(in_flight(&app), 1);
    }

    #[test]
    fn reload_cancels_everything_and_detail_selects_movie() {
        let mut app = app_with_slow_posters();
        app.request_poster(RowPath::new(4, 0), "http://x/up.jpg");
        let movie = Arc::new(Movie {
            title: "Up".into(),
            ..Movie::default()
        });
        app.rating_choice = Some(2);

        app.apply_events(vec![
            ControllerEvent::ReloadAll,
            ControllerEvent::ShowDetail(Arc::clone(&movie)),
        ]);
        assert_eq!(in_flight(&app), 0);
        assert_eq!(app.selected.as_deref(), Some(&*movie));
        assert_eq!(app.rating_choice, None);
    }
}
