use std::{fs, path::Path, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_CATALOG_FILE: &str = "movies.json";
pub const DEFAULT_CACHE_DIR: &str = ".moviedb_cache";
pub const DEFAULT_RATING_SOURCE: &str = "Internet Movie Database";
pub const DEFAULT_POSTER_WORKERS: usize = 4;
pub const DEFAULT_POSTER_RETENTION_DAYS: u64 = 14;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub cache_dir: PathBuf,
    pub poster_workers: usize,
    pub default_rating_source: String,
    pub poster_retention_days: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_FILE),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            poster_workers: DEFAULT_POSTER_WORKERS,
            default_rating_source: DEFAULT_RATING_SOURCE.to_string(),
            poster_retention_days: DEFAULT_POSTER_RETENTION_DAYS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(alias = "movies_json")]
    catalog_path: Option<String>,
    cache_dir: Option<String>,
    poster_workers: Option<usize>,
    default_rating_source: Option<String>,
    poster_retention_days: Option<u64>,
}

/// Reads `config.json` from the working directory; anything missing or
/// unparseable falls back to defaults.
pub fn load_config() -> AppConfig {
    load_config_from(Path::new(CONFIG_FILE))
}

pub fn load_config_from(cfg_path: &Path) -> AppConfig {
    match fs::read_to_string(cfg_path) {
        Ok(raw) => match parse_config(&raw) {
            Ok(cfg) => {
                info!("Loaded config from {}", cfg_path.display());
                cfg
            }
            Err(err) => {
                warn!(
                    "Failed to parse {} ({}). Using defaults.",
                    cfg_path.display(),
                    err
                );
                AppConfig::default()
            }
        },
        Err(_) => {
            info!("No {} found; using defaults", cfg_path.display());
            AppConfig::default()
        }
    }
}

pub fn parse_config(raw: &str) -> Result<AppConfig, String> {
    let parsed: RawConfig = serde_json::from_str(raw).map_err(|e| format!("{e}"))?;
    let mut cfg = AppConfig::default();

    if let Some(path) = parsed.catalog_path.filter(|s| !s.trim().is_empty()) {
        cfg.catalog_path = PathBuf::from(path);
        if raw.contains("\"movies_json\"") {
            warn!("`movies_json` is deprecated; rename it to `catalog_path` in config.json.");
        }
    }
    if let Some(dir) = parsed.cache_dir.filter(|s| !s.trim().is_empty()) {
        cfg.cache_dir = PathBuf::from(dir);
    }
    if let Some(n) = parsed.poster_workers {
        let clamped = n.clamp(1, 16);
        if clamped != n {
            warn!("poster_workers={n} out of range; using {clamped}");
        }
        cfg.poster_workers = clamped;
    }
    if let Some(source) = parsed.default_rating_source {
        let source = source.trim();
        if !source.is_empty() {
            cfg.default_rating_source = source.to_string();
        }
    }
    if let Some(days) = parsed.poster_retention_days {
        cfg.poster_retention_days = days.max(1);
    }

    Ok(cfg)
}

pub fn posters_disabled() -> bool {
    std::env::var_os("MOVIEDB_DISABLE_POSTERS").is_some()
}
