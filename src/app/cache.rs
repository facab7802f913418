use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use reqwest::blocking::Client;
use tracing::{debug, warn};

pub const RESIZE_MAX_W: u32 = 300;
pub const RESIZE_QUALITY: u8 = 80;

/// On-disk poster store: `<cache_dir>/posters/<md5(url)>.jpg`.
#[derive(Clone, Debug)]
pub struct PosterCache {
    dir: PathBuf,
    retention: Duration,
}

impl PosterCache {
    /// Create the poster folder under `cache_dir`, falling back to the cache
    /// root itself when the subfolder cannot be created.
    pub fn new(cache_dir: &Path, retention_days: u64) -> Self {
        let mut dir = cache_dir.join("posters");
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("failed to create poster cache dir {}: {e}", dir.display());
            dir = cache_dir.to_path_buf();
            if let Err(e) = fs::create_dir_all(&dir) {
                warn!("failed to create cache dir {}: {e}", dir.display());
            }
        }
        Self {
            dir,
            retention: Duration::from_secs(retention_days * 24 * 60 * 60),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.jpg"))
    }

    pub fn find(&self, key: &str) -> Option<PathBuf> {
        let p = self.path_for_key(key);
        p.exists().then_some(p)
    }

    /// Remove posters older than the retention period and leftover `.part`
    /// files. Returns how many files went away.
    pub fn prune(&self) -> std::io::Result<usize> {
        let cutoff = SystemTime::now()
            .checked_sub(self.retention)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut removed = 0usize;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_ascii_lowercase());
            let stale = match ext.as_deref() {
                Some("part") => true,
                Some("jpg" | "jpeg" | "png" | "webp") => {
                    let modified = entry
                        .metadata()?
                        .modified()
                        .unwrap_or(SystemTime::UNIX_EPOCH);
                    modified < cutoff
                }
                _ => false,
            };
            if stale {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Download `url`, resize to `RESIZE_MAX_W` and store as JPEG under `key`.
    /// Reuses an existing file without touching the network.
    pub fn fetch_with_client(&self, client: &Client, url: &str, key: &str) -> Result<PathBuf, String> {
        if let Some(dest) = self.find(key) {
            return Ok(dest);
        }

        let bytes = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map_err(|e| format!("download {url}: {e}"))?;

        self.store(&bytes, key)
    }

    /// Decode, shrink and write image bytes. Written to `.part` then renamed.
    pub fn store(&self, bytes: &[u8], key: &str) -> Result<PathBuf, String> {
        let img = image::load_from_memory(bytes).map_err(|e| format!("decode {key}: {e}"))?;
        let out = shrink(img, RESIZE_MAX_W);

        let mut jpeg_bytes: Vec<u8> = Vec::new();
        {
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, RESIZE_QUALITY);
            encoder
                .encode_image(&out.to_rgb8())
                .map_err(|e| format!("jpeg encode: {e}"))?;
        }

        let dest = self.path_for_key(key);
        let tmp = dest.with_extension("jpg.part");
        {
            let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
            f.write_all(&jpeg_bytes).map_err(|e| format!("write: {e}"))?;
        }
        fs::rename(&tmp, &dest).map_err(|e| format!("rename: {e}"))?;
        debug!("stored poster {}", dest.display());
        Ok(dest)
    }
}

pub fn url_to_cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

/// Resize to at most `max_width`, keeping aspect.
fn shrink(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w <= max_width {
        return img;
    }
    let new_h = ((h as f32) * (max_width as f32 / w as f32)).round().max(1.0) as u32;
    img.resize_exact(max_width, new_h, FilterType::CatmullRom)
}

/// Return (width, height, RGBA8 bytes) for a cached poster.
pub fn load_rgba(path: &Path) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::ImageReader::open(path)
        .map_err(|e| format!("open image {}: {e}", path.display()))?
        .with_guessed_format()
        .map_err(|e| format!("guess format {}: {e}", path.display()))?
        .decode()
        .map_err(|e| format!("decode {}: {e}", path.display()))?;
    let (w, h) = img.dimensions();
    Ok((w, h, img.to_rgba8().into_raw()))
}
