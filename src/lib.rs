/*!
# Showroom

Interactive 3D product viewers and scroll-linked animators for product pages.

A page carries viewer elements and option controls (appearance swatches, color chips,
light presets, camera views). A [`ViewerController`](viewer::ViewerController) binds one
viewer element to a 3D scene: it loads the product model, builds the stage around it,
shares one physically-based material between the configured objects and swaps the
texture maps of that material when an appearance option is clicked.

Three viewer flavors are configured out of the box:

* **furniture**: a product on a floor with a grid and a key light, with appearance
  swatches and a room toggle.
* **ring**: a metallic ring under environment light presets, with per-part colors, an
  engraving, camera views and a PNG screenshot.
* **fabric**: a spinning sphere wrapped in fabric appearances, with a texture repeat scale.

The [`scroll`] module maps page scroll and wheel input to animation players and to a
camera, for scroll-driven product stories.

```no_run
use std::rc::Rc;
use showroom::appearance::AppearanceCatalog;
use showroom::asset::FileSource;
use showroom::dom::MemoryDocument;
use showroom::viewer::{ViewerConfig, ViewerController};
use showroom::window::Window;
use web_time::Instant;

async fn run(document: MemoryDocument, catalog: AppearanceCatalog) {
    let source = Rc::new(FileSource::new("assets"));
    let mut viewer = ViewerController::new(ViewerConfig::furniture(), catalog, source);
    viewer.initialize(&document, Instant::now());

    let mut window = Window::new("Furniture").await.unwrap();
    while window.render(&mut viewer, &document).await {}
    viewer.teardown();
}
```

On native platforms the async rendering API is driven with `pollster::block_on`. On
WASM, [`Window::render`](window::Window::render) yields to the browser and resumes on
the next animation frame.

Default controls:

* `scroll`: zoom in / zoom out, within the viewer's distance bounds.
* `left click + drag`: orbit around the product.
* `right click + drag`: pan, when the viewer allows it.
*/
#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub use glamx;

#[cfg(not(target_arch = "wasm32"))]
#[doc(hidden)]
pub use pollster;

#[cfg(target_arch = "wasm32")]
#[doc(hidden)]
pub use wasm_bindgen_futures;

pub mod animation;
pub mod appearance;
pub mod asset;
pub mod builtin;
pub mod camera;
pub mod color;
pub mod context;
pub mod dom;
pub mod error;
pub mod event;
pub mod light;
pub mod loader;
pub mod procedural;
pub mod resource;
pub mod scene;
pub mod scroll;
pub mod viewer;
pub mod window;

pub mod prelude {
    pub use crate::animation::*;
    pub use crate::appearance::*;
    pub use crate::asset::*;
    pub use crate::camera::*;
    pub use crate::color::{self, Color};
    pub use crate::dom::{Document, DomEvent, Element, ElementRef, MemoryDocument};
    pub use crate::event::*;
    pub use crate::light::*;
    pub use crate::resource::*;
    pub use crate::scene::*;
    pub use crate::scroll::*;
    pub use crate::viewer::*;
    pub use crate::window::*;
    pub use glamx::{Pose3, Quat, Vec2, Vec3};
    pub use std::cell::RefCell;
    pub use std::rc::Rc;
}
