//! Translation of platform input into [`WindowEvent`]s.

use crate::event::{Action, Key, Modifiers, MouseButton, WindowEvent};

#[cfg(not(target_arch = "wasm32"))]
pub(super) use self::native::EventCollector;
#[cfg(target_arch = "wasm32")]
pub(super) use self::web::listen;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::*;
    use winit::application::ApplicationHandler;
    use winit::event::{ElementState, MouseScrollDelta, WindowEvent as WinitWindowEvent};
    use winit::event_loop::ActiveEventLoop;
    use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
    use winit::window::WindowId;

    /// Gathers the events of one window during an event loop pump.
    pub struct EventCollector {
        window_id: WindowId,
        modifiers: Modifiers,
        events: Vec<WindowEvent>,
    }

    impl EventCollector {
        pub fn new(window_id: WindowId, modifiers: Modifiers) -> Self {
            EventCollector {
                window_id,
                modifiers,
                events: Vec::new(),
            }
        }

        /// The collected events, and the modifiers held at the end of the pump.
        pub fn into_parts(self) -> (Vec<WindowEvent>, Modifiers) {
            (self.events, self.modifiers)
        }
    }

    impl ApplicationHandler for EventCollector {
        fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

        fn window_event(
            &mut self,
            _event_loop: &ActiveEventLoop,
            window_id: WindowId,
            event: WinitWindowEvent,
        ) {
            if window_id != self.window_id {
                return;
            }

            let m = self.modifiers;
            match event {
                WinitWindowEvent::CloseRequested => self.events.push(WindowEvent::Close),
                WinitWindowEvent::Resized(size) => {
                    if size.width > 0 && size.height > 0 {
                        self.events
                            .push(WindowEvent::FramebufferSize(size.width, size.height));
                    }
                }
                WinitWindowEvent::CursorMoved { position, .. } => {
                    self.events
                        .push(WindowEvent::CursorPos(position.x, position.y, m));
                }
                WinitWindowEvent::MouseInput { state, button, .. } => {
                    self.events.push(WindowEvent::MouseButton(
                        translate_mouse_button(button),
                        translate_action(state),
                        m,
                    ));
                }
                WinitWindowEvent::MouseWheel { delta, .. } => {
                    let (x, y) = match delta {
                        MouseScrollDelta::LineDelta(dx, dy) => (dx as f64 * 10.0, dy as f64 * 10.0),
                        MouseScrollDelta::PixelDelta(delta) => (delta.x, delta.y),
                    };
                    self.events.push(WindowEvent::Scroll(x, y, m));
                }
                WinitWindowEvent::KeyboardInput { event, .. } => {
                    self.events.push(WindowEvent::Key(
                        translate_key(event.physical_key),
                        translate_action(event.state),
                        m,
                    ));
                    if let winit::keyboard::Key::Character(ref c) = event.logical_key {
                        self.events.extend(c.chars().map(WindowEvent::Char));
                    }
                }
                WinitWindowEvent::ModifiersChanged(modifiers) => {
                    self.modifiers = translate_modifiers(modifiers.state());
                }
                _ => {}
            }
        }
    }

    fn translate_action(state: ElementState) -> Action {
        match state {
            ElementState::Pressed => Action::Press,
            ElementState::Released => Action::Release,
        }
    }

    fn translate_modifiers(state: ModifiersState) -> Modifiers {
        let mut res = Modifiers::empty();
        res.set(Modifiers::SHIFT, state.shift_key());
        res.set(Modifiers::CONTROL, state.control_key());
        res.set(Modifiers::ALT, state.alt_key());
        res.set(Modifiers::SUPER, state.super_key());
        res
    }

    fn translate_mouse_button(button: winit::event::MouseButton) -> MouseButton {
        match button {
            winit::event::MouseButton::Left => MouseButton::Button1,
            winit::event::MouseButton::Right => MouseButton::Button2,
            winit::event::MouseButton::Middle => MouseButton::Button3,
            winit::event::MouseButton::Back => MouseButton::Button4,
            _ => MouseButton::Button5,
        }
    }

    fn translate_key(physical_key: PhysicalKey) -> Key {
        let PhysicalKey::Code(code) = physical_key else {
            return Key::Unknown;
        };

        match code {
            KeyCode::Escape => Key::Escape,
            KeyCode::Space => Key::Space,
            KeyCode::Enter => Key::Return,
            KeyCode::Tab => Key::Tab,
            KeyCode::ArrowLeft => Key::Left,
            KeyCode::ArrowRight => Key::Right,
            KeyCode::ArrowUp => Key::Up,
            KeyCode::ArrowDown => Key::Down,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::ShiftLeft => Key::LShift,
            KeyCode::ShiftRight => Key::RShift,
            KeyCode::ControlLeft => Key::LControl,
            KeyCode::ControlRight => Key::RControl,
            KeyCode::AltLeft => Key::LAlt,
            KeyCode::AltRight => Key::RAlt,
            // Letters and digits share their name with the DOM `KeyboardEvent.code`.
            other => Key::from_code(&format!("{:?}", other)),
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};

    type Pending = Rc<RefCell<Vec<WindowEvent>>>;

    fn modifiers(shift: bool, control: bool, alt: bool, meta: bool) -> Modifiers {
        let mut res = Modifiers::empty();
        res.set(Modifiers::SHIFT, shift);
        res.set(Modifiers::CONTROL, control);
        res.set(Modifiers::ALT, alt);
        res.set(Modifiers::SUPER, meta);
        res
    }

    fn mouse_modifiers(event: &web_sys::MouseEvent) -> Modifiers {
        modifiers(
            event.shift_key(),
            event.ctrl_key(),
            event.alt_key(),
            event.meta_key(),
        )
    }

    fn mouse_button(button: i16) -> MouseButton {
        match button {
            1 => MouseButton::Button3,
            2 => MouseButton::Button2,
            3 => MouseButton::Button4,
            4 => MouseButton::Button5,
            _ => MouseButton::Button1,
        }
    }

    fn add<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
        target: &web_sys::EventTarget,
        name: &str,
        handler: impl FnMut(E) + 'static,
        out: &mut Vec<JsValue>,
    ) {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        out.push(closure.into_js_value());
    }

    /// Registers the canvas and keyboard listeners feeding `pending`.
    ///
    /// The returned values keep the listeners alive.
    pub fn listen(canvas: &web_sys::HtmlCanvasElement, pending: Pending) -> Vec<JsValue> {
        let mut listeners = Vec::new();

        {
            let pending = pending.clone();
            let canvas = canvas.clone();
            add(
                &canvas.clone(),
                "pointermove",
                move |event: web_sys::PointerEvent| {
                    // From CSS pixels to canvas pixels.
                    let rect = canvas.get_bounding_client_rect();
                    let scale_x = canvas.width() as f64 / rect.width().max(1.0);
                    let scale_y = canvas.height() as f64 / rect.height().max(1.0);
                    let x = (event.client_x() as f64 - rect.left()) * scale_x;
                    let y = (event.client_y() as f64 - rect.top()) * scale_y;
                    pending
                        .borrow_mut()
                        .push(WindowEvent::CursorPos(x, y, mouse_modifiers(&event)));
                },
                &mut listeners,
            );
        }

        for (name, action) in [("pointerdown", Action::Press), ("pointerup", Action::Release)] {
            let pending = pending.clone();
            add(
                canvas,
                name,
                move |event: web_sys::PointerEvent| {
                    if event.pointer_type() == "mouse" {
                        pending.borrow_mut().push(WindowEvent::MouseButton(
                            mouse_button(event.button()),
                            action,
                            mouse_modifiers(&event),
                        ));
                    }
                },
                &mut listeners,
            );
        }

        {
            let pending = pending.clone();
            add(
                canvas,
                "wheel",
                move |event: web_sys::WheelEvent| {
                    event.prevent_default();
                    // Browsers report about 100 pixels per notch.
                    let scale = match event.delta_mode() {
                        web_sys::WheelEvent::DOM_DELTA_PIXEL => 0.1,
                        web_sys::WheelEvent::DOM_DELTA_LINE => 1.0,
                        _ => 10.0,
                    };
                    pending.borrow_mut().push(WindowEvent::Scroll(
                        event.delta_x() * scale,
                        -event.delta_y() * scale,
                        mouse_modifiers(&event),
                    ));
                },
                &mut listeners,
            );
        }

        add(
            canvas,
            "contextmenu",
            |event: web_sys::MouseEvent| event.prevent_default(),
            &mut listeners,
        );

        if let Some(window) = web_sys::window() {
            for (name, action) in [("keydown", Action::Press), ("keyup", Action::Release)] {
                let pending = pending.clone();
                add(
                    &window,
                    name,
                    move |event: web_sys::KeyboardEvent| {
                        let m = modifiers(
                            event.shift_key(),
                            event.ctrl_key(),
                            event.alt_key(),
                            event.meta_key(),
                        );
                        pending
                            .borrow_mut()
                            .push(WindowEvent::Key(Key::from_code(&event.code()), action, m));
                    },
                    &mut listeners,
                );
            }
        }

        listeners
    }
}
