//! A resource manager to load textures by URL.

use crate::asset::{AssetSource, LoadHandle};
use crate::error::AssetError;
use crate::resource::TextureImage;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use web_time::Instant;

/// Where a texture request stands.
#[derive(Clone, Debug, PartialEq)]
pub enum TextureStatus {
    /// Decoded and cached.
    Ready(Arc<TextureImage>),
    /// Requested and not answered yet.
    Pending,
    /// The last request failed. Requesting the URL again retries it.
    Failed(AssetError),
    /// Never requested.
    Unknown,
}

/// The texture manager.
///
/// It keeps a cache of already-loaded textures keyed by URL, and fetches new ones through
/// an [`AssetSource`]. Requests are asynchronous: [`TextureManager::request`] starts them,
/// and [`TextureManager::poll`] collects whatever arrived, usually once per frame.
pub struct TextureManager {
    source: Rc<dyn AssetSource>,
    textures: HashMap<String, Arc<TextureImage>>,
    pending: HashMap<String, LoadHandle<Vec<u8>>>,
    failed: HashMap<String, AssetError>,
    timeout: Option<Duration>,
}

impl TextureManager {
    /// Creates a new texture manager fetching from `source`.
    pub fn new(source: Rc<dyn AssetSource>) -> TextureManager {
        TextureManager {
            source,
            textures: HashMap::new(),
            pending: HashMap::new(),
            failed: HashMap::new(),
            timeout: None,
        }
    }

    /// Fails requests still pending after `timeout`.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Starts loading `url` unless it is cached or already in flight.
    pub fn request(&mut self, url: &str, now: Instant) {
        if self.textures.contains_key(url) || self.pending.contains_key(url) {
            return;
        }

        let _ = self.failed.remove(url);
        let mut handle = self.source.fetch(url);
        if let Some(timeout) = self.timeout {
            handle = handle.with_timeout(now, timeout);
        }
        let _ = self.pending.insert(url.to_string(), handle);
    }

    /// Collects finished requests. Returns the number of requests that completed,
    /// successfully or not.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut finished = Vec::new();

        for (url, handle) in self.pending.iter_mut() {
            if let Some(result) = handle.try_take_at(now) {
                finished.push((url.clone(), result));
            }
        }

        for (url, result) in &finished {
            let _ = self.pending.remove(url);

            match result
                .clone()
                .and_then(|bytes| TextureImage::decode(url, &bytes))
            {
                Ok(image) => {
                    log::debug!("Loaded texture {} ({:?})", url, image.size());
                    let _ = self.textures.insert(url.clone(), image);
                }
                Err(e) => {
                    log::error!("Unable to load texture {}: {}", url, e);
                    let _ = self.failed.insert(url.clone(), e);
                }
            }
        }

        finished.len()
    }

    /// The state of `url`.
    pub fn status(&self, url: &str) -> TextureStatus {
        if let Some(texture) = self.textures.get(url) {
            TextureStatus::Ready(texture.clone())
        } else if self.pending.contains_key(url) {
            TextureStatus::Pending
        } else if let Some(e) = self.failed.get(url) {
            TextureStatus::Failed(e.clone())
        } else {
            TextureStatus::Unknown
        }
    }

    /// Get a texture with the specified URL. Returns `None` if it is not loaded.
    pub fn get(&self, url: &str) -> Option<Arc<TextureImage>> {
        self.textures.get(url).cloned()
    }

    /// Registers an already decoded texture under `url`.
    pub fn insert(&mut self, url: &str, image: Arc<TextureImage>) {
        let _ = self.pending.remove(url);
        let _ = self.failed.remove(url);
        let _ = self.textures.insert(url.to_string(), image);
    }

    /// Cancels every request in flight.
    pub fn cancel_all(&mut self) {
        for handle in self.pending.values_mut() {
            handle.cancel();
        }
        self.pending.clear();
    }

    /// Number of requests in flight.
    pub fn num_pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MemorySource;

    fn png() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn cached_textures_are_fetched_once() {
        let source = Rc::new(MemorySource::new());
        source.insert("a.png", png());
        let mut manager = TextureManager::new(source.clone());
        let now = Instant::now();

        manager.request("a.png", now);
        assert_eq!(manager.status("a.png"), TextureStatus::Pending);
        assert_eq!(manager.poll(now), 1);
        assert!(matches!(manager.status("a.png"), TextureStatus::Ready(_)));

        manager.request("a.png", now);
        assert_eq!(source.requests(), vec!["a.png"]);
    }

    #[test]
    fn failures_are_recorded_and_retried() {
        let source = Rc::new(MemorySource::new());
        let mut manager = TextureManager::new(source.clone());
        let now = Instant::now();

        manager.request("missing.png", now);
        let _ = manager.poll(now);
        assert_eq!(
            manager.status("missing.png"),
            TextureStatus::Failed(AssetError::NotFound("missing.png".into()))
        );

        source.insert("missing.png", png());
        manager.request("missing.png", now);
        let _ = manager.poll(now);
        assert!(manager.get("missing.png").is_some());
    }

    #[test]
    fn stalled_requests_time_out() {
        let source = Rc::new(MemorySource::new());
        source.set_deferred(true);
        let mut manager = TextureManager::new(source);
        manager.set_timeout(Some(Duration::from_secs(10)));
        let start = Instant::now();

        manager.request("slow.png", start);
        assert_eq!(manager.poll(start + Duration::from_secs(9)), 0);
        assert_eq!(manager.poll(start + Duration::from_secs(10)), 1);
        assert!(matches!(
            manager.status("slow.png"),
            TextureStatus::Failed(AssetError::Timeout { .. })
        ));
    }

    #[test]
    fn undecodable_bytes_fail_with_parse_error() {
        let source = Rc::new(MemorySource::new());
        source.insert("bad.jpg", vec![0, 1, 2]);
        let mut manager = TextureManager::new(source);
        let now = Instant::now();

        manager.request("bad.jpg", now);
        let _ = manager.poll(now);
        assert!(matches!(
            manager.status("bad.jpg"),
            TextureStatus::Failed(AssetError::Parse(_))
        ));
    }
}
