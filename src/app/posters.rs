// src/app/posters.rs
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use super::cache::{url_to_cache_key, PosterCache};
use super::types::{PosterDone, RowPath};

const MAX_DONE_PER_POLL: usize = 12;

/// Fetch function run on a worker: `(url, cache key) -> stored file`.
pub type FetchFn = dyn Fn(&str, &str) -> Result<PathBuf, String> + Send + Sync;

struct FetchJob {
    path: RowPath,
    ticket: u64,
    url: String,
    key: String,
    cancelled: Arc<AtomicBool>,
}

struct WorkerDone {
    ticket: u64,
    done: PosterDone,
}

/// The fetch currently owned by a visible row.
struct Slot {
    ticket: u64,
    key: String,
    cancelled: Arc<AtomicBool>,
}

/// Background poster fetcher with at most one in-flight request per visible
/// row. A row that asks for a different poster, or scrolls away, cancels its
/// request; results that arrive for a cancelled request are dropped.
pub struct PosterLoader {
    work_tx: Option<Sender<FetchJob>>,
    done_rx: Receiver<WorkerDone>,
    slots: HashMap<RowPath, Slot>,
    next_ticket: u64,
}

impl PosterLoader {
    /// Workers downloading through a shared HTTP client into `cache`.
    pub fn new(cache: PosterCache, workers: usize) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("moviedb/posters")
            .timeout(Duration::from_secs(20))
            .default_headers({
                use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
                let mut h = HeaderMap::new();
                h.insert(
                    ACCEPT,
                    HeaderValue::from_static("image/avif,image/webp,image/*;q=0.8,*/*;q=0.5"),
                );
                h
            })
            .build()
            .map_err(|e| format!("http client build failed: {e}"))?;

        if let Err(e) = cache.prune() {
            warn!("poster cache prune failed: {e}");
        }

        Ok(Self::with_fetcher(workers, move |url: &str, key: &str| {
            cache.fetch_with_client(&client, url, key)
        }))
    }

    pub fn with_fetcher<F>(workers: usize, fetch: F) -> Self
    where
        F: Fn(&str, &str) -> Result<PathBuf, String> + Send + Sync + 'static,
    {
        let (work_tx, work_rx) = mpsc::channel::<FetchJob>();
        let (done_tx, done_rx) = mpsc::channel::<WorkerDone>();
        let work_rx = Arc::new(Mutex::new(work_rx));
        let fetch: Arc<FetchFn> = Arc::new(fetch);

        for _ in 0..workers.max(1) {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let fetch = Arc::clone(&fetch);

            std::thread::spawn(move || loop {
                let job = {
                    let Ok(rx) = work_rx.lock() else {
                        break;
                    };
                    rx.recv()
                };
                let Ok(job) = job else {
                    break;
                };
                if job.cancelled.load(Ordering::Relaxed) {
                    continue;
                }

                let result = fetch(&job.url, &job.key);
                if job.cancelled.load(Ordering::Relaxed) {
                    continue;
                }
                let done = PosterDone {
                    path: job.path,
                    key: job.key,
                    result,
                };
                if done_tx.send(WorkerDone { ticket: job.ticket, done }).is_err() {
                    break;
                }
            });
        }

        Self {
            work_tx: Some(work_tx),
            done_rx,
            slots: HashMap::new(),
            next_ticket: 0,
        }
    }

    /// Ask for the poster at `url` to be shown at `path`. Returns the cache key.
    /// Repeating the same request while it is in flight is a no-op.
    pub fn request(&mut self, path: RowPath, url: &str) -> String {
        let key = url_to_cache_key(url);
        if self.slots.get(&path).is_some_and(|s| s.key == key) {
            return key;
        }
        self.cancel(path);

        let Some(tx) = &self.work_tx else {
            return key;
        };
        self.next_ticket += 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        let job = FetchJob {
            path,
            ticket: self.next_ticket,
            url: url.to_string(),
            key: key.clone(),
            cancelled: Arc::clone(&cancelled),
        };
        if tx.send(job).is_ok() {
            self.slots.insert(
                path,
                Slot {
                    ticket: self.next_ticket,
                    key: key.clone(),
                    cancelled,
                },
            );
        }
        key
    }

    pub fn cancel(&mut self, path: RowPath) {
        if let Some(old) = self.slots.remove(&path) {
            old.cancelled.store(true, Ordering::Relaxed);
            debug!("cancelled poster fetch for {path:?}");
        }
    }

    /// Cancel every request whose row is no longer on screen.
    pub fn retain_visible(&mut self, visible: &HashSet<RowPath>) {
        let gone: Vec<RowPath> = self
            .slots
            .keys()
            .filter(|p| !visible.contains(p))
            .copied()
            .collect();
        for p in gone {
            self.cancel(p);
        }
    }

    /// Cancel requests for rows at or below `row` in `section`, whose content
    /// moved. Other sections are untouched.
    pub fn cancel_from(&mut self, section: usize, row: usize) {
        let shifted: Vec<RowPath> = self
            .slots
            .keys()
            .filter(|p| p.section == section && p.row >= row)
            .copied()
            .collect();
        for p in shifted {
            self.cancel(p);
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, slot) in self.slots.drain() {
            slot.cancelled.store(true, Ordering::Relaxed);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.slots.len()
    }

    /// Drain finished fetches that still belong to their row.
    pub fn poll(&mut self) -> Vec<PosterDone> {
        let mut out = Vec::new();
        while out.len() < MAX_DONE_PER_POLL {
            match self.done_rx.try_recv() {
                Ok(msg) => {
                    let current = self
                        .slots
                        .get(&msg.done.path)
                        .is_some_and(|s| s.ticket == msg.ticket);
                    if current {
                        self.slots.remove(&msg.done.path);
                        out.push(msg.done);
                    } else {
                        debug!("discarding superseded poster for {:?}", msg.done.path);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}

impl Drop for PosterLoader {
    fn drop(&mut self) {
        self.cancel_all();
        // closing the channel stops the workers
        self.work_tx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    fn wait_for(loader: &mut PosterLoader, n: usize) -> Vec<PosterDone> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = Vec::new();
        while got.len() < n && Instant::now() < deadline {
            got.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        got
    }

    #[test]
    fn delivers_result_for_visible_row() {
        let mut loader = PosterLoader::with_fetcher(2, |url, _key| Ok(PathBuf::from(url)));
        let p = RowPath::new(4, 0);
        let key = loader.request(p, "http://x/a.jpg");
        let done = wait_for(&mut loader, 1);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].path, p);
        assert_eq!(done[0].key, key);
        assert_eq!(done[0].result, Ok(PathBuf::from("http://x/a.jpg")));
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn superseded_request_is_discarded() {
        let mut loader = PosterLoader::with_fetcher(1, |url, _key| {
            std::thread::sleep(Duration::from_millis(20));
            Ok(PathBuf::from(url))
        });
        let p = RowPath::new(1, 2);
        loader.request(p, "http://x/old.jpg");
        loader.request(p, "http://x/new.jpg");
        assert_eq!(loader.in_flight(), 1);

        let done = wait_for(&mut loader, 1);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].result, Ok(PathBuf::from("http://x/new.jpg")));
        std::thread::sleep(Duration::from_millis(50));
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn offscreen_rows_are_cancelled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut loader = PosterLoader::with_fetcher(1, move |url, _key| {
            seen.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            Ok(PathBuf::from(url))
        });
        let a = RowPath::new(4, 0);
        let b = RowPath::new(4, 1);
        loader.request(a, "http://x/a.jpg");
        loader.request(b, "http://x/b.jpg");

        let visible: HashSet<RowPath> = [b].into_iter().collect();
        loader.retain_visible(&visible);
        assert_eq!(loader.in_flight(), 1);

        let done = wait_for(&mut loader, 1);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].path, b);
        assert!(calls.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn cancel_from_only_touches_shifted_rows_of_one_section() {
        let mut loader = PosterLoader::with_fetcher(1, |url, _key| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(PathBuf::from(url))
        });
        let above = RowPath::new(1, 2);
        let below = RowPath::new(1, 5);
        let other = RowPath::new(4, 7);
        loader.request(above, "http://x/a.jpg");
        loader.request(below, "http://x/b.jpg");
        loader.request(other, "http://x/c.jpg");

        loader.cancel_from(1, 3);
        assert_eq!(loader.in_flight(), 2);
        assert!(loader.slots.contains_key(&above));
        assert!(loader.slots.contains_key(&other));
        assert!(!loader.slots.contains_key(&below));
    }

    #[test]
    fn failures_are_reported_per_row() {
        let mut loader = PosterLoader::with_fetcher(1, |_url, key| Err(format!("HTTP 404 for {key}")));
        let p = RowPath::new(0, 3);
        loader.request(p, "http://x/missing.jpg");
        let done = wait_for(&mut loader, 1);
        assert!(done[0].result.is_err());
    }

    #[test]
    fn repeated_request_is_not_requeued() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut loader = PosterLoader::with_fetcher(1, move |url, _key| {
            seen.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            Ok(PathBuf::from(url))
        });
        let p = RowPath::new(2, 0);
        loader.request(p, "http://x/a.jpg");
        loader.request(p, "http://x/a.jpg");
        wait_for(&mut loader, 1);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
