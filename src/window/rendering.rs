//! The render loop.

use web_time::Instant;

use crate::context::Context;
use crate::dom::{DomEvent, Document};
use crate::event::{Action, Key, WindowEvent};
use crate::viewer::ViewerController;
#[cfg(not(target_arch = "wasm32"))]
use crate::event::Modifiers;

use super::Window;

/// Consumes the viewer's redraw request and draws. A frame that could not be drawn stays
/// requested.
fn draw_if_requested(
    viewer: &mut ViewerController,
    draw: impl FnOnce(&ViewerController) -> bool,
) -> bool {
    if viewer.is_inert() || !viewer.take_redraw_request() {
        return false;
    }

    let drawn = draw(viewer);
    if !drawn {
        viewer.request_redraw();
    }
    drawn
}

impl Window {
    /// Runs one iteration of the render loop for `viewer`.
    ///
    /// Page events and window input are forwarded to the viewer, its loads and animations
    /// are advanced, and a frame is drawn if anything changed. A pending screenshot is
    /// read back and offered to the page as a download.
    ///
    /// Returns `true` if rendering should continue, `false` if the window should close.
    ///
    /// # Platform-specific
    /// - **Native**: sleeps for a frame's duration when nothing had to be drawn.
    /// - **WASM**: yields to the browser and returns on the next animation frame.
    pub async fn render(&mut self, viewer: &mut ViewerController, document: &dyn Document) -> bool {
        let now = Instant::now();

        let dom_events = self.dom_events.get_or_insert_with(|| document.subscribe());
        for event in dom_events.drain() {
            viewer.handle_dom_event(&event, document, now);
        }

        self.canvas.poll_events();
        let events: Vec<_> = self.events.try_iter().collect();
        for event in events {
            self.handle_event(viewer, document, &event, now);
        }

        let _ = viewer.update(now);
        let drawn = draw_if_requested(viewer, |viewer| self.draw(viewer));

        if drawn && viewer.take_screenshot_request() {
            match self.snap_png().await {
                Ok(png) => viewer.save_screenshot(document, &png),
                Err(e) => log::error!("Screenshot failed: {}", e),
            }
        }

        self.wait_next_frame(drawn).await;
        !self.should_close()
    }

    fn handle_event(
        &mut self,
        viewer: &mut ViewerController,
        document: &dyn Document,
        event: &WindowEvent,
        now: Instant,
    ) {
        match *event {
            WindowEvent::Close | WindowEvent::Key(Key::Escape, Action::Release, _) => {
                self.close();
            }
            WindowEvent::FramebufferSize(..) => viewer.request_redraw(),
            // On the web the page dispatches these itself.
            #[cfg(not(target_arch = "wasm32"))]
            WindowEvent::Key(key, Action::Release, modifiers) => {
                let key_up = DomEvent::KeyUp {
                    key,
                    alt: modifiers.contains(Modifiers::ALT),
                };
                viewer.handle_dom_event(&key_up, document, now);
            }
            #[cfg(not(target_arch = "wasm32"))]
            WindowEvent::CursorPos(x, y, _) => {
                let scale = self.canvas.scale_factor();
                let mouse_move = DomEvent::MouseMove {
                    x: (x / scale) as f32,
                    y: (y / scale) as f32,
                };
                viewer.handle_dom_event(&mouse_move, document, now);
            }
            _ => {}
        }

        viewer.handle_event(event);
    }

    /// Draws the viewer's scene. Returns `false` if no surface texture was available.
    fn draw(&mut self, viewer: &ViewerController) -> bool {
        let frame = match self.canvas.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Failed to acquire surface texture: {:?}", e);
                return false;
            }
        };
        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let ctxt = Context::get();
        let mut encoder = ctxt.create_command_encoder(Some("showroom_frame_encoder"));
        let lights = viewer.lights().collect();
        let bg = viewer.background();

        // Multisampled frames are resolved into the surface texture.
        let (color_view, resolve_target) = match self.canvas.msaa_view() {
            Some(msaa_view) => (msaa_view, Some(&frame_view)),
            None => (&frame_view, None),
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        // The surface is not sRGB: the background is cleared as authored.
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.r as f64,
                            g: bg.g as f64,
                            b: bg.b as f64,
                            a: bg.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.canvas.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer.render(
                viewer.scene(),
                viewer.camera(),
                &lights,
                &mut self.textures,
                &mut render_pass,
            );
        }

        self.canvas.copy_frame_to_readback(&frame, &mut encoder);
        ctxt.submit(std::iter::once(encoder.finish()));
        self.textures.end_frame();

        frame.present();
        true
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn wait_next_frame(&self, drawn: bool) {
        // Presenting already waited for vsync.
        if !drawn {
            std::thread::sleep(std::time::Duration::from_millis(16));
        }
    }

    #[cfg(target_arch = "wasm32")]
    async fn wait_next_frame(&self, _drawn: bool) {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::JsCast;

        if let Some(window) = web_sys::window() {
            let (s, r) = oneshot::channel();
            let closure = Closure::once(move || {
                let _ = s.send(());
            });

            if window
                .request_animation_frame(closure.as_ref().unchecked_ref())
                .is_ok()
            {
                let _ = r.await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::AppearanceCatalog;
    use crate::asset::MemorySource;
    use crate::dom::{MemoryDocument, MemoryElement};
    use crate::viewer::ViewerConfig;
    use std::rc::Rc;

    fn fabric_viewer() -> ViewerController {
        let doc = MemoryDocument::new();
        let _ = doc
            .body()
            .append(MemoryElement::new("div").with_class("js-fabric-viewer"));
        let mut viewer = ViewerController::new(
            ViewerConfig::fabric(),
            AppearanceCatalog::new(),
            Rc::new(MemorySource::new()),
        );
        viewer.initialize(&doc, Instant::now());
        viewer
    }

    #[test]
    fn failed_frames_stay_requested() {
        let mut viewer = fabric_viewer();
        viewer.request_redraw();

        assert!(!draw_if_requested(&mut viewer, |_| false));
        let mut calls = 0;
        assert!(draw_if_requested(&mut viewer, |_| {
            calls += 1;
            true
        }));
        assert_eq!(calls, 1);
        assert!(!draw_if_requested(&mut viewer, |_| panic!("nothing to draw")));
    }

    #[test]
    fn inert_viewers_are_never_drawn() {
        let mut viewer = ViewerController::new(
            ViewerConfig::fabric(),
            AppearanceCatalog::new(),
            Rc::new(MemorySource::new()),
        );
        viewer.initialize(&MemoryDocument::new(), Instant::now());
        viewer.request_redraw();
        assert!(!draw_if_requested(&mut viewer, |_| panic!("inert viewer drawn")));
    }
}
