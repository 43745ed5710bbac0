//! The drawing surface of a viewer: a native window, or a `<canvas>` element on the web.

use std::cell::RefCell;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::context::Context;
use crate::error::RenderError;
#[cfg(not(target_arch = "wasm32"))]
use crate::event::Modifiers;
use crate::event::WindowEvent;
use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::window::WindowAttributes;

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

// winit allows a single event loop per program. It is created with the first canvas
// and reused by the following ones.
#[cfg(not(target_arch = "wasm32"))]
thread_local! {
    static EVENT_LOOP: RefCell<Option<EventLoop<()>>> = const { RefCell::new(None) };
}

/// The possible number of samples for multisample anti-aliasing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NumSamples {
    /// Multisampling disabled.
    One = 1,
    /// Four samples, the only other count every backend supports.
    Four = 4,
}

/// Options fixed when a canvas opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasSetup {
    pub vsync: bool,
    pub samples: NumSamples,
    /// On the web, the selector of the element the canvas is appended to. The canvas
    /// with id `canvas` is reused, or appended to the body, when `None`.
    pub container: Option<String>,
}

impl Default for CanvasSetup {
    fn default() -> Self {
        CanvasSetup {
            vsync: true,
            samples: NumSamples::Four,
            container: None,
        }
    }
}

/// A window for native applications, and a canvas for web applications.
///
/// Input is translated to [`WindowEvent`]s and sent to the channel given to
/// [`Canvas::open`] every time [`Canvas::poll_events`] runs.
pub struct Canvas {
    window: Arc<winit::window::Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    out_events: Sender<WindowEvent>,
    /// Modifier keys held, tracked across event loop pumps.
    #[cfg(not(target_arch = "wasm32"))]
    modifiers: Modifiers,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    sample_count: u32,
    /// Copy of the last presented frame, read back for screenshots.
    readback_texture: wgpu::Texture,
    #[cfg(target_arch = "wasm32")]
    pending_events: Rc<RefCell<Vec<WindowEvent>>>,
    /// Keeps the DOM listeners alive.
    #[cfg(target_arch = "wasm32")]
    _listeners: Vec<wasm_bindgen::JsValue>,
}

impl Canvas {
    /// Opens a new window, initializing the wgpu context if needed.
    pub async fn open(
        title: &str,
        width: u32,
        height: u32,
        setup: CanvasSetup,
        out_events: Sender<WindowEvent>,
    ) -> Result<Canvas, RenderError> {
        let attributes = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(LogicalSize::new(width as f64, height as f64));

        let window = Arc::new(Self::create_window(attributes, &setup)?);
        let (surface, surface_format) = Self::create_surface(window.clone()).await?;

        let ctxt = Context::get();
        let surface_caps = surface.get_capabilities(&ctxt.adapter);
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: surface_format,
            width,
            height,
            present_mode: if setup.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&ctxt.device, &surface_config);

        let sample_count = setup.samples as u32;

        #[cfg(target_arch = "wasm32")]
        let (pending_events, _listeners) = {
            use winit::platform::web::WindowExtWebSys;

            let pending_events = Rc::new(RefCell::new(Vec::new()));
            let listeners = match window.canvas() {
                Some(canvas) => super::events::listen(&canvas, pending_events.clone()),
                None => Vec::new(),
            };
            (pending_events, listeners)
        };

        Ok(Canvas {
            window,
            surface,
            out_events,
            #[cfg(not(target_arch = "wasm32"))]
            modifiers: Modifiers::empty(),
            depth_view: Self::create_depth_view(&ctxt.device, (width, height), sample_count),
            msaa_view: Self::create_msaa_view(
                &ctxt.device,
                (width, height),
                surface_format,
                sample_count,
            ),
            sample_count,
            readback_texture: Self::create_readback_texture(
                &ctxt.device,
                (width, height),
                surface_format,
            ),
            surface_config,
            #[cfg(target_arch = "wasm32")]
            pending_events,
            #[cfg(target_arch = "wasm32")]
            _listeners,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn create_window(
        attributes: WindowAttributes,
        _setup: &CanvasSetup,
    ) -> Result<winit::window::Window, RenderError> {
        EVENT_LOOP.with(|cell| {
            let mut event_loop = cell.borrow_mut();
            if event_loop.is_none() {
                *event_loop =
                    Some(EventLoop::new().map_err(|e| RenderError::EventLoop(e.to_string()))?);
            }

            match event_loop.as_ref() {
                #[allow(deprecated)]
                Some(event_loop) => event_loop
                    .create_window(attributes)
                    .map_err(|e| RenderError::Window(e.to_string())),
                None => Err(RenderError::EventLoop("event loop unavailable".to_string())),
            }
        })
    }

    #[cfg(target_arch = "wasm32")]
    fn create_window(
        attributes: WindowAttributes,
        setup: &CanvasSetup,
    ) -> Result<winit::window::Window, RenderError> {
        use wasm_bindgen::JsCast;
        use winit::platform::web::{WindowAttributesExtWebSys, WindowExtWebSys};

        let no_document = || RenderError::Window("no document".to_string());
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(no_document)?;

        let existing = document
            .get_element_by_id("canvas")
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok());

        let canvas = match existing {
            Some(canvas) => canvas,
            None => {
                let canvas = document
                    .create_element("canvas")
                    .ok()
                    .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
                    .ok_or_else(|| RenderError::Window("cannot create a canvas".to_string()))?;
                canvas.set_id("canvas");

                let parent: Option<web_sys::Element> = match &setup.container {
                    Some(selector) => document.query_selector(selector).ok().flatten(),
                    None => document.body().map(Into::into),
                };
                if let Some(parent) = parent {
                    let _ = parent.append_child(&canvas);
                }
                canvas
            }
        };

        let events = EventLoop::new().map_err(|e| RenderError::EventLoop(e.to_string()))?;
        #[allow(deprecated)]
        let window = events
            .create_window(attributes.with_canvas(Some(canvas)))
            .map_err(|e| RenderError::Window(e.to_string()))?;

        // winit overwrites the canvas style on creation.
        if let Some(canvas) = window.canvas() {
            let style = canvas.style();
            let _ = style.set_property("display", "block");
            let _ = style.set_property("width", "100%");
            let _ = style.set_property("height", "100%");
        }

        Ok(window)
    }

    async fn create_surface(
        window: Arc<winit::window::Window>,
    ) -> Result<(wgpu::Surface<'static>, wgpu::TextureFormat), RenderError> {
        let surface_error = |e: wgpu::CreateSurfaceError| RenderError::Surface(e.to_string());

        // Non-sRGB formats everywhere: WebGL2 often lacks sRGB framebuffers, so the
        // shaders apply gamma themselves.
        let pick_format = |caps: wgpu::SurfaceCapabilities| {
            caps.formats
                .iter()
                .find(|f| !f.is_srgb())
                .or(caps.formats.first())
                .copied()
                .ok_or_else(|| RenderError::Surface("no supported format".to_string()))
        };

        if let Some(ctxt) = Context::try_get() {
            let surface = ctxt
                .instance
                .create_surface(window)
                .map_err(surface_error)?;
            let format = pick_format(surface.get_capabilities(&ctxt.adapter))?;
            return Ok((surface, format));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).map_err(surface_error)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::Adapter(e.to_string()))?;

        #[cfg(target_arch = "wasm32")]
        let limits = wgpu::Limits::downlevel_webgl2_defaults();
        #[cfg(not(target_arch = "wasm32"))]
        let limits = wgpu::Limits::default();

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("showroom device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await
            .map_err(|e| RenderError::Device(e.to_string()))?;

        let format = pick_format(surface.get_capabilities(&adapter))?;
        Context::init(instance, device, queue, adapter);

        Ok((surface, format))
    }

    fn create_attachment(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
        usage: wgpu::TextureUsages,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        })
    }

    fn create_depth_view(
        device: &wgpu::Device,
        size: (u32, u32),
        sample_count: u32,
    ) -> wgpu::TextureView {
        Self::create_attachment(
            device,
            "depth_texture",
            size,
            Context::depth_format(),
            sample_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )
        .create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// `None` without multisampling: the pass then draws straight into the frame.
    fn create_msaa_view(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        (sample_count > 1).then(|| {
            Self::create_attachment(
                device,
                "msaa_texture",
                size,
                format,
                sample_count,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
            .create_view(&wgpu::TextureViewDescriptor::default())
        })
    }

    fn create_readback_texture(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
    ) -> wgpu::Texture {
        Self::create_attachment(
            device,
            "readback_texture",
            size,
            format,
            1,
            wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::COPY_SRC,
        )
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0
            || height == 0
            || (width == self.surface_config.width && height == self.surface_config.height)
        {
            return;
        }

        let ctxt = Context::get();
        let format = self.surface_config.format;

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&ctxt.device, &self.surface_config);

        let size = (width, height);
        self.depth_view = Self::create_depth_view(&ctxt.device, size, self.sample_count);
        self.msaa_view = Self::create_msaa_view(&ctxt.device, size, format, self.sample_count);
        self.readback_texture = Self::create_readback_texture(&ctxt.device, size, format);
    }

    /// Polls the events that occurred since the last call and forwards them.
    pub fn poll_events(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        let events = {
            use winit::platform::pump_events::EventLoopExtPumpEvents;

            let mut collector =
                super::events::EventCollector::new(self.window.id(), self.modifiers);
            EVENT_LOOP.with(|cell| {
                if let Some(event_loop) = cell.borrow_mut().as_mut() {
                    let _ = event_loop
                        .pump_app_events(Some(std::time::Duration::ZERO), &mut collector);
                }
            });
            let (events, modifiers) = collector.into_parts();
            self.modifiers = modifiers;
            events
        };

        #[cfg(target_arch = "wasm32")]
        let events: Vec<WindowEvent> = {
            let mut events: Vec<_> = self.pending_events.borrow_mut().drain(..).collect();
            let size = self.window.inner_size();
            if size.width != self.surface_config.width
                || size.height != self.surface_config.height
            {
                events.push(WindowEvent::FramebufferSize(size.width, size.height));
            }
            events
        };

        for event in events {
            if let WindowEvent::FramebufferSize(w, h) = event {
                self.resize(w, h);
            }
            let _ = self.out_events.send(event);
        }
    }

    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// Records a copy of `frame` into the readback texture.
    pub fn copy_frame_to_readback(
        &self,
        frame: &wgpu::SurfaceTexture,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: &self.readback_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: self.surface_config.width,
                height: self.surface_config.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Reads the last frame copied with [`Canvas::copy_frame_to_readback`].
    ///
    /// Returns tightly packed RGBA rows, top row first.
    pub async fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        let ctxt = Context::get();
        let (width, height) = self.size();
        let (width, height) = (width as usize, height as usize);

        // Rows of a texture-to-buffer copy are aligned to 256 bytes.
        let unpadded_bytes_per_row = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let staging_buffer = ctxt.create_buffer(&wgpu::BufferDescriptor {
            label: Some("screenshot_staging_buffer"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = ctxt.create_command_encoder(Some("screenshot_copy_encoder"));
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.readback_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row as u32),
                    rows_per_image: Some(height as u32),
                },
            },
            wgpu::Extent3d {
                width: width as u32,
                height: height as u32,
                depth_or_array_layers: 1,
            },
        );
        ctxt.submit(std::iter::once(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        let (sender, receiver) = oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        #[cfg(not(target_arch = "wasm32"))]
        let _ = ctxt.device.poll(wgpu::PollType::wait_indefinitely());

        receiver
            .await
            .map_err(|e| RenderError::Readback(e.to_string()))?
            .map_err(|e| RenderError::Readback(e.to_string()))?;

        let is_bgra = matches!(
            self.surface_config.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );

        let data = buffer_slice.get_mapped_range();
        let mut out = Vec::with_capacity(width * height * 4);
        for row in data.chunks(padded_bytes_per_row).take(height) {
            for texel in row[..unpadded_bytes_per_row].chunks_exact(4) {
                if is_bgra {
                    out.extend_from_slice(&[texel[2], texel[1], texel[0], 255]);
                } else {
                    out.extend_from_slice(&[texel[0], texel[1], texel[2], 255]);
                }
            }
        }

        drop(data);
        staging_buffer.unmap();
        Ok(out)
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// The multisampled color target, resolved into the frame. `None` with one sample.
    pub fn msaa_view(&self) -> Option<&wgpu::TextureView> {
        self.msaa_view.as_ref()
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// The size of the render surface, in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// The scale factor between physical and CSS pixels.
    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title)
    }
}
