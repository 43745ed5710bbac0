use crate::asset::LoadHandle;
use crate::error::AssetError;
use std::cell::RefCell;
use std::collections::HashMap;

/// Something that can fetch raw bytes by URL.
///
/// Viewers never talk to the network or the filesystem directly: they are given a
/// source at construction time. Browser builds use [`FetchSource`], native builds
/// [`FileSource`], and tests a [`MemorySource`].
pub trait AssetSource {
    /// Starts fetching `url`. The returned handle resolves with the raw bytes.
    fn fetch(&self, url: &str) -> LoadHandle<Vec<u8>>;
}

/// An in-memory asset source.
///
/// In deferred mode, requests stay pending until [`MemorySource::flush`] is called,
/// which lets callers observe the intermediate states of a viewer.
#[derive(Default)]
pub struct MemorySource {
    assets: RefCell<HashMap<String, Vec<u8>>>,
    deferred: RefCell<bool>,
    pending: RefCell<Vec<(String, crate::asset::LoadSender<Vec<u8>>)>>,
    requests: RefCell<Vec<String>>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the bytes served for `url`.
    pub fn insert(&self, url: &str, bytes: Vec<u8>) {
        let _ = self.assets.borrow_mut().insert(url.to_string(), bytes);
    }

    /// Chooses whether requests resolve immediately or on [`MemorySource::flush`].
    pub fn set_deferred(&self, deferred: bool) {
        *self.deferred.borrow_mut() = deferred;
    }

    /// Resolves every pending request. Returns the number of resolved requests.
    pub fn flush(&self) -> usize {
        let pending: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        let count = pending.len();
        for (url, sender) in pending {
            sender.resolve(self.lookup(&url));
        }
        count
    }

    /// Every URL requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn lookup(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        self.assets
            .borrow()
            .get(url)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(url.to_string()))
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, url: &str) -> LoadHandle<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());

        if *self.deferred.borrow() {
            let (sender, handle) = LoadHandle::channel(url);
            self.pending.borrow_mut().push((url.to_string(), sender));
            handle
        } else {
            LoadHandle::ready(url, self.lookup(url))
        }
    }
}

/// Reads assets from a directory on a worker thread.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileSource {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSource {
    /// Serves URLs relative to `root`.
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetSource for FileSource {
    fn fetch(&self, url: &str) -> LoadHandle<Vec<u8>> {
        let (sender, handle) = LoadHandle::channel(url);
        let path = self.root.join(url.trim_start_matches('/'));
        let url = url.to_string();

        let spawned = std::thread::Builder::new()
            .name("showroom-asset".to_string())
            .spawn(move || {
                let result = std::fs::read(&path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => AssetError::NotFound(url.clone()),
                    _ => AssetError::Network(format!("{}: {}", url, e)),
                });
                sender.resolve(result);
            });

        if let Err(e) = spawned {
            log::error!("Unable to spawn an asset loader thread: {}", e);
        }

        handle
    }
}

/// Fetches assets over HTTP with the browser's `fetch`.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct FetchSource {
    base_url: String,
}

#[cfg(target_arch = "wasm32")]
impl FetchSource {
    /// Resolves relative URLs against `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve_url(&self, url: &str) -> String {
        if self.base_url.is_empty() || url.contains("://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl AssetSource for FetchSource {
    fn fetch(&self, url: &str) -> LoadHandle<Vec<u8>> {
        let (sender, handle) = LoadHandle::channel(url);
        let full_url = self.resolve_url(url);
        wasm_bindgen_futures::spawn_local(async move {
            sender.resolve(fetch_bytes(&full_url).await);
        });
        handle
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AssetError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let js_err = |e: wasm_bindgen::JsValue| AssetError::Network(format!("{}: {:?}", url, e));

    let win = web_sys::window().ok_or_else(|| AssetError::Network("no window".to_string()))?;
    let resp_val = JsFuture::from(win.fetch_with_str(url))
        .await
        .map_err(js_err)?;
    let resp: web_sys::Response = resp_val.dyn_into().map_err(js_err)?;

    if resp.status() == 404 {
        return Err(AssetError::NotFound(url.to_string()));
    }

    if !resp.ok() {
        return Err(AssetError::Network(format!(
            "{}: HTTP {} {}",
            url,
            resp.status(),
            resp.status_text()
        )));
    }

    let buf_promise = resp.array_buffer().map_err(js_err)?;
    let buf_val = JsFuture::from(buf_promise).await.map_err(js_err)?;
    let bytes = js_sys::Uint8Array::new(&buf_val);
    let mut out = vec![0u8; bytes.length() as usize];
    bytes.copy_to(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_serves_and_reports_missing() {
        let source = MemorySource::new();
        source.insert("a.jpg", vec![1, 2, 3]);

        assert_eq!(source.fetch("a.jpg").try_take(), Some(Ok(vec![1, 2, 3])));
        assert_eq!(
            source.fetch("b.jpg").try_take(),
            Some(Err(AssetError::NotFound("b.jpg".into())))
        );
        assert_eq!(source.requests(), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn deferred_requests_resolve_on_flush() {
        let source = MemorySource::new();
        source.insert("a.jpg", vec![9]);
        source.set_deferred(true);

        let mut handle = source.fetch("a.jpg");
        assert_eq!(handle.try_take(), None);
        assert_eq!(source.flush(), 1);
        assert_eq!(handle.try_take(), Some(Ok(vec![9])));
    }

    #[test]
    fn file_source_reads_from_disk() {
        let dir = std::env::temp_dir().join(format!("showroom-file-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("swatch.bin"), [4u8, 2]).unwrap();

        let source = FileSource::new(&dir);
        assert_eq!(source.fetch("swatch.bin").wait(), Ok(vec![4, 2]));
        assert_eq!(
            source.fetch("missing.bin").wait(),
            Err(AssetError::NotFound("missing.bin".into()))
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
