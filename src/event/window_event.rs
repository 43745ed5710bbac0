use bitflags::bitflags;

/// Whether a key or button went down or up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Press,
    Release,
}

/// Mouse buttons, numbered like winit does: 1 is left, 2 is right, 3 is middle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Button1,
    Button2,
    Button3,
    Button4,
    Button5,
}

impl MouseButton {
    /// The primary (left) button.
    pub const LEFT: MouseButton = MouseButton::Button1;
    /// The secondary (right) button.
    pub const RIGHT: MouseButton = MouseButton::Button2;
    /// The middle button.
    pub const MIDDLE: MouseButton = MouseButton::Button3;
}

/// The keys viewers react to. Every other key maps to [`Key::Unknown`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Escape,
    Space,
    Return,
    Tab,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    LShift,
    RShift,
    LControl,
    RControl,
    LAlt,
    RAlt,
    Unknown,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.code` (e.g. `"KeyO"`, `"ArrowUp"`) to a key.
    pub fn from_code(code: &str) -> Key {
        if let Some(letter) = code.strip_prefix("Key") {
            if let Some(c) = single_char(letter) {
                return Key::from_letter(c);
            }
        }

        if let Some(digit) = code.strip_prefix("Digit") {
            if let Some(c) = single_char(digit) {
                return Key::from_digit(c);
            }
        }

        match code {
            "Escape" => Key::Escape,
            "Space" => Key::Space,
            "Enter" => Key::Return,
            "Tab" => Key::Tab,
            "ArrowLeft" => Key::Left,
            "ArrowRight" => Key::Right,
            "ArrowUp" => Key::Up,
            "ArrowDown" => Key::Down,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            "Home" => Key::Home,
            "End" => Key::End,
            "ShiftLeft" => Key::LShift,
            "ShiftRight" => Key::RShift,
            "ControlLeft" => Key::LControl,
            "ControlRight" => Key::RControl,
            "AltLeft" => Key::LAlt,
            "AltRight" => Key::RAlt,
            _ => Key::Unknown,
        }
    }

    fn from_letter(c: char) -> Key {
        const LETTERS: [Key; 26] = [
            Key::A,
            Key::B,
            Key::C,
            Key::D,
            Key::E,
            Key::F,
            Key::G,
            Key::H,
            Key::I,
            Key::J,
            Key::K,
            Key::L,
            Key::M,
            Key::N,
            Key::O,
            Key::P,
            Key::Q,
            Key::R,
            Key::S,
            Key::T,
            Key::U,
            Key::V,
            Key::W,
            Key::X,
            Key::Y,
            Key::Z,
        ];

        match c.to_ascii_uppercase() {
            c @ 'A'..='Z' => LETTERS[(c as u8 - b'A') as usize],
            _ => Key::Unknown,
        }
    }

    fn from_digit(c: char) -> Key {
        const DIGITS: [Key; 10] = [
            Key::Key0,
            Key::Key1,
            Key::Key2,
            Key::Key3,
            Key::Key4,
            Key::Key5,
            Key::Key6,
            Key::Key7,
            Key::Key8,
            Key::Key9,
        ];

        c.to_digit(10)
            .map(|d| DIGITS[d as usize])
            .unwrap_or(Key::Unknown)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

bitflags! {
    /// Modifier keys held while an event happened.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

/// An input event targeted at a canvas.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WindowEvent {
    /// The window was asked to close.
    Close,
    /// The drawable area changed size, in physical pixels.
    FramebufferSize(u32, u32),
    /// The cursor moved to the given position, in physical pixels from the top-left corner.
    CursorPos(f64, f64, Modifiers),
    MouseButton(MouseButton, Action, Modifiers),
    /// Horizontal and vertical wheel offsets. Positive `y` scrolls up.
    Scroll(f64, f64, Modifiers),
    Key(Key, Action, Modifiers),
    Char(char),
}

impl WindowEvent {
    /// Whether this is a keyboard event.
    pub fn is_keyboard_event(&self) -> bool {
        matches!(self, WindowEvent::Key(..) | WindowEvent::Char(..))
    }

    /// Whether this is a mouse event.
    pub fn is_mouse_event(&self) -> bool {
        matches!(
            self,
            WindowEvent::CursorPos(..) | WindowEvent::MouseButton(..) | WindowEvent::Scroll(..)
        )
    }
}
