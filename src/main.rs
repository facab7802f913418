// src/main.rs
use std::env;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use moviedb::app::{CatalogIndex, MovieDbApp};
use moviedb::config::load_config;

fn pick_renderer() -> eframe::Renderer {
    match env::var("MOVIEDB_RENDERER").as_deref() {
        Ok("glow") => eframe::Renderer::Glow,
        Ok("wgpu") => eframe::Renderer::Wgpu,
        _ => {
            // Default: Windows = WGPU (DX12), Others = Glow (GL)
            #[cfg(target_os = "windows")]
            { eframe::Renderer::Wgpu }
            #[cfg(not(target_os = "windows"))]
            { eframe::Renderer::Glow }
        }
    }
}

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let config = load_config();
    let catalog = Arc::new(CatalogIndex::load(&config.catalog_path));
    info!("catalog ready: {} movies", catalog.len());

    let options = eframe::NativeOptions {
        renderer: pick_renderer(),
        multisampling: 0,
        ..Default::default()
    };

    match eframe::run_native(
        "Movie Database",
        options,
        Box::new(move |_cc| Ok(Box::new(MovieDbApp::new(config, catalog)))),
    ) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("eframe failed to start: {e:?}");
            error!("Hint: try MOVIEDB_RENDERER=wgpu or glow.");
            Err(e)
        }
    }
}
