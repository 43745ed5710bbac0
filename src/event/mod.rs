//! Window events, as delivered by a [`Canvas`](crate::window::Canvas) and consumed by
//! cameras and viewers.

pub use self::window_event::{Action, Key, Modifiers, MouseButton, WindowEvent};

mod window_event;
