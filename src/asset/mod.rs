//! Asynchronous asset requests.
//!
//! Loading is split between an [`AssetSource`], which knows how to obtain bytes,
//! and a [`LoadHandle`], which the frame loop polls until the bytes arrive.

pub use self::handle::{LoadHandle, LoadSender};
#[cfg(target_arch = "wasm32")]
pub use self::source::FetchSource;
#[cfg(not(target_arch = "wasm32"))]
pub use self::source::FileSource;
pub use self::source::{AssetSource, MemorySource};

mod handle;
mod source;
