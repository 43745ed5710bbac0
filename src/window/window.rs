//! The window hosting one viewer.

use std::sync::mpsc::{self, Receiver};

use crate::builtin::PhysicalRenderer;
use crate::dom::DomEvents;
use crate::error::RenderError;
use crate::event::WindowEvent;
use crate::resource::GpuTextureCache;
use crate::window::canvas::CanvasSetup;
use crate::window::Canvas;

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;

/// A canvas with the renderer drawing a viewer's scene into it.
///
/// The render loop is driven by [`Window::render`]:
///
/// ```no_run
/// # use showroom::dom::MemoryDocument;
/// # use showroom::viewer::ViewerController;
/// # use showroom::window::Window;
/// # async fn run(mut viewer: ViewerController, document: MemoryDocument) {
/// let mut window = Window::new("Furniture").await.unwrap();
/// while window.render(&mut viewer, &document).await {}
/// # }
/// ```
pub struct Window {
    pub(super) canvas: Canvas,
    pub(super) events: Receiver<WindowEvent>,
    pub(super) renderer: PhysicalRenderer,
    pub(super) textures: GpuTextureCache,
    /// Page events, subscribed to on the first frame.
    pub(super) dom_events: Option<DomEvents>,
    pub(super) should_close: bool,
}

impl Window {
    /// Creates a new window with default settings.
    pub async fn new(title: &str) -> Result<Window, RenderError> {
        Window::new_with_setup(title, DEFAULT_WIDTH, DEFAULT_HEIGHT, CanvasSetup::default()).await
    }

    /// Creates a new window with custom dimensions.
    pub async fn new_with_size(title: &str, width: u32, height: u32) -> Result<Window, RenderError> {
        Window::new_with_setup(title, width, height, CanvasSetup::default()).await
    }

    /// Creates a new window with custom setup options.
    pub async fn new_with_setup(
        title: &str,
        width: u32,
        height: u32,
        setup: CanvasSetup,
    ) -> Result<Window, RenderError> {
        let (event_send, event_receive) = mpsc::channel();
        let canvas = Canvas::open(title, width, height, setup, event_send).await?;
        let renderer = PhysicalRenderer::new(canvas.surface_format(), canvas.sample_count());

        log::info!(
            "Window `{}` opened at {}x{} with {} samples.",
            title,
            canvas.size().0,
            canvas.size().1,
            canvas.sample_count()
        );

        Ok(Window {
            canvas,
            events: event_receive,
            renderer,
            textures: GpuTextureCache::new(),
            dom_events: None,
            should_close: false,
        })
    }

    /// Indicates whether this window should be closed.
    #[inline]
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    /// Closes the window: the next [`Window::render`] returns `false`.
    #[inline]
    pub fn close(&mut self) {
        self.should_close = true;
    }

    /// The window width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.canvas.size().0
    }

    /// The window height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.canvas.size().1
    }

    pub fn set_title(&mut self, title: &str) {
        self.canvas.set_title(title)
    }

    /// The underlying canvas.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}
