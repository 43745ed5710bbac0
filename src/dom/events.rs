use crate::dom::ElementRef;
use crate::event::Key;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// Page-level input, as seen by viewers and animators.
#[derive(Clone, Debug)]
pub enum DomEvent {
    /// An element was clicked. The element is the innermost one under the pointer.
    Click(ElementRef),
    KeyUp { key: Key, alt: bool },
    /// Pointer position in viewport coordinates.
    MouseMove { x: f32, y: f32 },
    /// Wheel motion. Positive values scroll down.
    Wheel { delta_y: f32 },
    /// The page scrolled.
    Scroll,
    /// The viewport was resized.
    Resize,
}

type Queue = RefCell<VecDeque<DomEvent>>;

/// A subscriber's queue of pending events.
///
/// The queue stops receiving events once dropped.
#[derive(Debug)]
pub struct DomEvents {
    queue: Rc<Queue>,
}

impl DomEvents {
    /// Removes and returns every pending event, oldest first.
    pub fn drain(&self) -> Vec<DomEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

/// Fans events out to every live [`DomEvents`] queue.
#[derive(Debug, Default)]
pub struct EventHub {
    subscribers: RefCell<Vec<Weak<Queue>>>,
}

impl EventHub {
    pub fn new() -> Self {
        EventHub::default()
    }

    pub fn subscribe(&self) -> DomEvents {
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        self.subscribers.borrow_mut().push(Rc::downgrade(&queue));
        DomEvents { queue }
    }

    pub fn dispatch(&self, event: DomEvent) {
        self.subscribers.borrow_mut().retain(|subscriber| {
            if let Some(queue) = subscriber.upgrade() {
                queue.borrow_mut().push_back(event.clone());
                true
            } else {
                false
            }
        });
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|s| s.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
