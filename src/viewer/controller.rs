use crate::animation::{Animated, Ease, Repeat, Tween};
use crate::appearance::{AppearanceCatalog, AppearanceSet};
use crate::asset::{AssetSource, LoadHandle, LoadSender};
use crate::camera::{Camera3d, CameraView, OrbitCamera3d};
use crate::color::{self, Color};
use crate::dom::{set_exclusive_class, Document, DomEvent, ElementRef};
use crate::error::{AssetError, Result, ViewerError};
use crate::event::{Key, WindowEvent};
use crate::light::LightRig;
use crate::loader;
use crate::procedural;
use crate::resource::{MapSlot, PhysicalMaterial, TextureBinding, TextureManager, TextureStatus};
use crate::scene::SceneNode;
use crate::viewer::{
    effective_repeat, LoadingIndicator, Primitive, ViewerConfig, ViewerOptions, ViewerState,
    ACTIVE_CLASS, LOADING_CLASS, VISIBLE_CLASS,
};
use glamx::{Quat, Vec2, Vec3};
use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;
use web_time::Instant;

/// File name offered for screenshot downloads.
pub const SCREENSHOT_FILE: &str = "ring-configurator.png";

const CAMERA_TWEEN_DURATION: f32 = 1.0;
const SPOTLIGHT_TWEEN_DURATION: f32 = 1.0;
const SPOTLIGHT_FACTOR: f32 = 0.00005;

struct PendingModel {
    url: String,
    bytes: LoadHandle<Vec<u8>>,
    sender: LoadSender<SceneNode>,
}

struct PendingSwap {
    id: String,
    set: AppearanceSet,
    repeat: f32,
}

struct MouseSpotlight {
    name: String,
    initial: Vec3,
    position: Animated<Vec3>,
}

/// One product viewer: a camera, lights, a model, and the appearance of its surfaces.
///
/// A controller goes through the following steps:
///
/// 1. [`ViewerController::initialize`] finds the viewer element, builds the scene and
///    the camera, and starts loading the model. Without a viewer element the controller
///    stays inert and every operation does nothing.
/// 2. [`ViewerController::update`], called every frame, collects the model once loaded.
///    The named objects then share a single [`PhysicalMaterial`] and the first texture
///    option of the page is applied.
/// 3. Page events, fed through [`ViewerController::handle_dom_event`], swap
///    appearances, lights, colors and camera views.
///
/// Every change requests a redraw, which the render loop consumes with
/// [`ViewerController::take_redraw_request`].
pub struct ViewerController {
    config: ViewerConfig,
    catalog: AppearanceCatalog,
    source: Rc<dyn AssetSource>,
    textures: TextureManager,

    element: Option<ElementRef>,
    inert: bool,
    state: ViewerState,
    options: ViewerOptions,

    root: SceneNode,
    model: Option<SceneNode>,
    pending_model: Option<PendingModel>,
    targets: Vec<SceneNode>,
    room: Vec<SceneNode>,
    material: Option<Rc<RefCell<PhysicalMaterial>>>,
    appearance: Option<String>,
    swap: Option<PendingSwap>,
    loading: LoadingIndicator,

    camera: OrbitCamera3d,
    camera_tween: Option<Animated<CameraView>>,
    lights: LightRig,
    background: Color,
    env_light: Option<String>,
    pending_env: Option<String>,
    spotlight: Option<MouseSpotlight>,
    spin: Option<(SceneNode, Animated<f32>)>,
    viewport: Vec2,

    engraving: Option<String>,
    screenshot_requested: bool,
    redraw: bool,
    last_update: Option<Instant>,
}

impl ViewerController {
    /// Creates an uninitialized viewer.
    ///
    /// `catalog` lists the appearance sets the options may select, and `source` serves
    /// the model and texture files.
    pub fn new(
        config: ViewerConfig,
        catalog: AppearanceCatalog,
        source: Rc<dyn AssetSource>,
    ) -> Self {
        let mut textures = TextureManager::new(source.clone());
        textures.set_timeout(config.timeout());

        let camera = Self::make_camera(&config);
        let lights = config.lights.rig();
        let background = config.background_color().unwrap_or(color::STUDIO_GRAY);
        let loading = LoadingIndicator::new(config.loading_floor());

        ViewerController {
            config,
            catalog,
            source,
            textures,
            element: None,
            inert: false,
            state: ViewerState::Uninitialized,
            options: ViewerOptions::default(),
            root: SceneNode::new("scene", None),
            model: None,
            pending_model: None,
            targets: Vec::new(),
            room: Vec::new(),
            material: None,
            appearance: None,
            swap: None,
            loading,
            camera,
            camera_tween: None,
            lights,
            background,
            env_light: None,
            pending_env: None,
            spotlight: None,
            spin: None,
            viewport: Vec2::new(1280.0, 800.0),
            engraving: None,
            screenshot_requested: false,
            redraw: false,
            last_update: None,
        }
    }

    fn make_camera(config: &ViewerConfig) -> OrbitCamera3d {
        let c = &config.camera;
        let mut camera = OrbitCamera3d::new_with_frustum(
            c.fov.to_radians(),
            c.znear,
            c.zfar,
            c.view.position,
            c.view.target,
        );
        camera.set_bounds(c.bounds);
        camera.set_damping(c.damping);
        camera.set_auto_rotate(c.auto_rotate);
        camera.set_pan_enabled(c.pan);
        camera
    }

    /// Binds the viewer to its element and builds the scene.
    ///
    /// If no element matches the configured selector, the viewer becomes inert. Otherwise
    /// the element's markup overrides are applied, the option controls of the page are
    /// collected, and the model starts loading (a primitive is ready at once).
    pub fn initialize(&mut self, document: &dyn Document, now: Instant) {
        if self.state != ViewerState::Uninitialized || self.inert {
            log::warn!("The viewer `{}` is already initialized.", self.config.element_selector);
            return;
        }

        let Some(element) = document.query_selector(&self.config.element_selector) else {
            log::info!(
                "No element matches `{}`, the viewer stays inert.",
                self.config.element_selector
            );
            self.inert = true;
            return;
        };

        self.config = std::mem::take(&mut self.config).with_markup(&*element);
        self.element = Some(element);
        self.options = ViewerOptions::from_document(document, &self.config.selectors);
        self.engraving = self.options.engraving.as_ref().map(|(_, text)| text.clone());
        let (width, height) = document.viewport_size();
        self.viewport = Vec2::new(width, height);

        self.build_environment();
        self.setup_spotlight();

        if let Some(url) = self.config.environment_url.clone() {
            self.textures.request(&url, now);
            self.pending_env = Some(url);
        }

        if let Some(primitive) = self.config.primitive.clone() {
            self.attach_primitive(&primitive, now);
        } else if !self.config.model_url.is_empty() {
            let url = self.config.model_url.clone();
            let _ = self.load_asset(&url, now);
        } else {
            log::warn!("The viewer has neither a model nor a primitive.");
        }

        self.request_redraw();
    }

    fn build_environment(&mut self) {
        let env = &self.config.environment;

        if let Some(size) = env.floor {
            let color = color::parse(&env.floor_color).unwrap_or(color::WHITE);
            let material = PhysicalMaterial::new().with_color(color);
            let _ = self.root.add_mesh(
                "floor",
                procedural::plane(size, size, 1, 1),
                Rc::new(RefCell::new(material)),
            );
        }

        if let Some((size, divisions)) = env.grid {
            let divisions = divisions.max(1);
            let line_width = size / divisions as f32 * 0.01;
            let material = PhysicalMaterial::new()
                .with_color(color::BLACK)
                .with_opacity(env.grid_opacity);
            let _ = self.root.add_mesh(
                "grid",
                procedural::grid(size, divisions, line_width),
                Rc::new(RefCell::new(material)),
            );
        }
    }

    fn setup_spotlight(&mut self) {
        let Some(name) = self.config.mouse_spotlight.clone() else {
            return;
        };

        match self.lights.get_mut(&name) {
            Some(light) => {
                self.spotlight = Some(MouseSpotlight {
                    initial: light.position,
                    position: Animated::new(light.position),
                    name,
                });
            }
            None => log::warn!("The light rig has no light named `{}`.", name),
        }
    }

    fn attach_primitive(&mut self, primitive: &Primitive, now: Instant) {
        match primitive {
            Primitive::Sphere {
                radius,
                subdivisions,
                spin_period,
            } => {
                let subdivisions = (*subdivisions).max(3);
                let node = SceneNode::new("sphere", None);
                let _ = node.add_mesh(
                    "sphere_mesh",
                    procedural::sphere(*radius, subdivisions, subdivisions),
                    Rc::new(RefCell::new(PhysicalMaterial::new())),
                );
                node.set_position(Vec3::new(0.0, *radius, 0.0));
                node.set_rotation(Quat::from_rotation_y(PI * 1.25));

                if let Some(period) = spin_period.filter(|p| *p > 0.0) {
                    let mut angle = Animated::new(0.0);
                    angle.play(
                        Tween::new(0.0, 2.0 * PI, period)
                            .with_ease(Ease::Linear)
                            .with_repeat(Repeat::Forever),
                        now,
                    );
                    self.spin = Some((node.clone(), angle));
                }

                self.attach_model(node, vec!["sphere_mesh".to_string()], now);
            }
        }
    }

    /// Starts loading the model at `url`, replacing the current one once loaded.
    ///
    /// The returned handle resolves with the imported scene. The viewer itself does not
    /// need it: [`update`](Self::update) picks the model up. A load already in progress
    /// is cancelled.
    pub fn load_asset(&mut self, url: &str, now: Instant) -> LoadHandle<SceneNode> {
        if self.inert {
            return LoadHandle::ready(url, Err(AssetError::Cancelled));
        }

        let mut bytes = self.source.fetch(url);
        if let Some(timeout) = self.config.timeout() {
            bytes = bytes.with_timeout(now, timeout);
        }

        let (sender, handle) = LoadHandle::channel(url);
        let pending = PendingModel {
            url: url.to_string(),
            bytes,
            sender,
        };

        if let Some(mut previous) = self.pending_model.replace(pending) {
            log::debug!("Cancelling the load of {}.", previous.url);
            previous.bytes.cancel();
            previous.sender.resolve(Err(AssetError::Cancelled));
        }

        log::info!("Loading model {}", url);
        self.state = ViewerState::LoadingAsset;
        handle
    }

    fn poll_model(&mut self, now: Instant) {
        let Some(result) = self
            .pending_model
            .as_mut()
            .and_then(|p| p.bytes.try_take_at(now))
        else {
            return;
        };

        let Some(pending) = self.pending_model.take() else {
            return;
        };

        match result.and_then(|bytes| loader::load_gltf(&pending.url, &bytes)) {
            Ok(scene) => {
                let names = self.config.model_objects.clone();
                self.attach_model(scene.clone(), names, now);
                pending.sender.resolve(Ok(scene));
            }
            Err(e) => {
                log::error!("Unable to load model {}: {}", pending.url, e);
                self.state = ViewerState::Failed(e.clone());
                pending.sender.resolve(Err(e));
            }
        }
    }

    fn attach_model(&mut self, model: SceneNode, names: Vec<String>, now: Instant) {
        if let Some(previous) = self.model.take() {
            self.root.remove_child(&previous);
        }
        self.root.add_child(model.clone());

        self.targets = model.find_all_by_name(&names);
        for name in &names {
            if model.find_by_name(name).is_none() {
                log::warn!("The model has no object named `{}`.", name);
            }
        }

        self.room = model.find_all_by_name(&self.config.room_objects);
        if self.config.hide_room {
            for node in &self.room {
                node.set_visible(false);
            }
        }

        let params = self.config.material;
        let mut material = PhysicalMaterial::new()
            .with_roughness(params.roughness)
            .with_metalness(params.metalness)
            .with_ao_intensity(params.ao_intensity);
        material.displacement_scale = params.displacement_scale;
        let material = Rc::new(RefCell::new(material));

        for target in &self.targets {
            target.set_material(material.clone());
        }

        self.material = Some(material);
        self.model = Some(model);
        self.state = ViewerState::Ready;
        log::info!("The viewer is ready ({} objects).", self.targets.len());

        if let Some(first) = self.options.textures.first().cloned() {
            if let Err(e) = self.swap_option(&first.appearance_set, &first.base, first.additional_scale, now) {
                log::error!("Unable to apply the initial appearance: {}", e);
            }
        }

        self.request_redraw();
    }

    /// Re-materials the objects with the maps of the appearance set `set_id`.
    ///
    /// The UV repeat is the configured texture scale times `scale` (a missing, zero or
    /// NaN `scale` counting as 1). Textures already loaded are reused. The maps are
    /// replaced all at once, when every texture of the set has arrived. Meanwhile, the
    /// viewer element carries the `is-loading` class.
    pub fn set_appearance(&mut self, set_id: &str, scale: Option<f32>, now: Instant) -> Result<()> {
        if self.inert {
            return Ok(());
        }

        let set = self.catalog.get(set_id)?.clone();
        self.start_swap(set_id, set, scale, now)
    }

    fn swap_option(
        &mut self,
        set_id: &str,
        base: &str,
        scale: Option<f32>,
        now: Instant,
    ) -> Result<()> {
        let set = self.catalog.get(set_id)?.with_base(base);
        self.start_swap(set_id, set, scale, now)
    }

    fn start_swap(
        &mut self,
        id: &str,
        set: AppearanceSet,
        scale: Option<f32>,
        now: Instant,
    ) -> Result<()> {
        if !self.state.is_ready() {
            return Err(ViewerError::NotReady);
        }

        for (_, url) in set.urls() {
            self.textures.request(url, now);
        }

        for slot in MapSlot::ALL.iter().filter(|s| set.url(**s).is_none()) {
            log::warn!("Appearance set `{}` has no {} map.", id, slot);
        }

        self.swap = Some(PendingSwap {
            id: id.to_string(),
            set,
            repeat: effective_repeat(self.config.texture_scale, scale),
        });
        self.state = ViewerState::SwappingAppearance;
        self.loading.start(now);
        if let Some(element) = &self.element {
            element.add_class(LOADING_CLASS);
        }

        self.advance_swap(now);
        Ok(())
    }

    fn advance_swap(&mut self, now: Instant) {
        let _ = self.textures.poll(now);

        let Some(swap) = &self.swap else {
            return;
        };

        let mut maps = Vec::new();
        let mut failure = None;

        for (slot, url) in swap.set.urls() {
            match self.textures.status(url) {
                TextureStatus::Ready(image) => {
                    let mut binding = TextureBinding::new(image).repeated(Vec2::splat(swap.repeat));
                    if slot == MapSlot::Base {
                        binding = binding.with_filter(self.config.material.base_filter);
                    }
                    maps.push((slot, binding));
                }
                TextureStatus::Failed(e) if slot.is_required() => failure = Some((slot, e)),
                TextureStatus::Failed(e) => {
                    log::warn!("Leaving the {} map of `{}` unset: {}", slot, swap.id, e)
                }
                TextureStatus::Pending | TextureStatus::Unknown => return,
            }
        }

        let Some(swap) = self.swap.take() else {
            return;
        };

        match failure {
            Some((slot, e)) => {
                log::error!(
                    "Appearance `{}` not applied, its {} map failed: {}",
                    swap.id,
                    slot,
                    e
                );
            }
            None => {
                if let Some(material) = &self.material {
                    material.borrow_mut().replace_maps(maps);
                }
                log::info!("Applied appearance `{}` (repeat {}).", swap.id, swap.repeat);
                self.appearance = Some(swap.id);
            }
        }

        self.state = ViewerState::Ready;
        self.loading.complete(now);
        self.request_redraw();
    }

    /// Reloads the model after a failed load. Does nothing in any other state.
    pub fn retry(&mut self, now: Instant) {
        if self.state.is_failed() {
            let url = self.config.model_url.clone();
            log::info!("Retrying {}", url);
            let _ = self.load_asset(&url, now);
        }
    }

    /// Switches to the environment light preset `name`.
    pub fn set_env_light(&mut self, name: &str, now: Instant) {
        if self.inert {
            return;
        }

        let Some(light) = self.config.env_lights.get(name).cloned() else {
            log::warn!("Unknown environment light `{}`.", name);
            return;
        };

        self.lights.ambient_color = color::parse(&light.color).unwrap_or(color::WHITE);
        self.lights.ambient_intensity = light.intensity;
        self.env_light = Some(name.to_string());
        self.pending_env = light.url.clone();

        if let Some(url) = &light.url {
            self.textures.request(url, now);
            self.poll_env_light(now);
        }

        self.request_redraw();
    }

    fn poll_env_light(&mut self, now: Instant) {
        let Some(url) = self.pending_env.clone() else {
            return;
        };

        let _ = self.textures.poll(now);
        match self.textures.status(&url) {
            TextureStatus::Ready(image) => {
                let mut tint = image.average_color();
                tint.a = 1.0;
                self.lights.ambient_color = tint;
                self.pending_env = None;
                self.request_redraw();
            }
            TextureStatus::Failed(e) => {
                log::warn!("Keeping the default tint of the environment light: {}", e);
                self.pending_env = None;
            }
            TextureStatus::Pending | TextureStatus::Unknown => {}
        }
    }

    /// Shows or hides the room objects.
    pub fn toggle_room(&mut self) {
        if self.inert {
            return;
        }

        for node in &self.room {
            node.set_visible(!node.is_visible());
        }

        if let Some(toggle) = &self.options.room_toggle {
            let _ = toggle.toggle_class(ACTIVE_CLASS);
        }

        self.request_redraw();
    }

    /// Sets the base color of the objects named `names`.
    pub fn set_model_color<S: AsRef<str>>(&mut self, names: &[S], color: Color) -> Result<()> {
        if self.inert {
            return Ok(());
        }

        let Some(model) = &self.model else {
            return Err(ViewerError::NotReady);
        };

        for name in names {
            let name = name.as_ref();
            let mut found = false;

            model.apply_to_scene_nodes(&mut |node| {
                if node.data().name() == name {
                    node.apply_to_objects_mut(&mut |o| o.material().borrow_mut().color = color);
                    found = true;
                }
            });

            if !found {
                log::warn!("The model has no object named `{}`.", name);
            }
        }

        self.request_redraw();
        Ok(())
    }

    /// Sets the engraving text.
    pub fn set_engraving(&mut self, text: &str) {
        if !self.inert {
            self.engraving = Some(text.to_string());
            self.request_redraw();
        }
    }

    pub fn engraving(&self) -> Option<&str> {
        self.engraving.as_deref()
    }

    /// Asks the render loop for a screenshot of the next frame.
    pub fn screenshot(&mut self) {
        if !self.inert {
            self.screenshot_requested = true;
            self.request_redraw();
        }
    }

    /// Consumes the pending screenshot request.
    pub fn take_screenshot_request(&mut self) -> bool {
        std::mem::take(&mut self.screenshot_requested)
    }

    /// Offers a PNG-encoded frame to the user as `ring-configurator.png`.
    pub fn save_screenshot(&self, document: &dyn Document, png: &[u8]) {
        document.download(SCREENSHOT_FILE, "image/png", png);
    }

    /// Shows or hides the option panel.
    pub fn toggle_panel(&mut self) {
        if let Some(panel) = &self.options.panel {
            let visible = panel.toggle_class(VISIBLE_CLASS);
            log::debug!("Option panel visible: {}", visible);
        }
    }

    /// Moves the camera to `view` over one second.
    pub fn set_camera_view(&mut self, view: CameraView, now: Instant) {
        if self.inert {
            return;
        }

        let mut tween = Animated::new(self.camera.view());
        tween.animate_to(view, CAMERA_TWEEN_DURATION, Ease::SineInOut, now);
        self.camera_tween = Some(tween);
        self.request_redraw();
    }

    fn follow_mouse(&mut self, x: f32, y: f32, now: Instant) {
        let Some(spot) = &mut self.spotlight else {
            return;
        };

        let half = self.viewport / 2.0;
        let cursor = (half - Vec2::new(x, y)) * SPOTLIGHT_FACTOR;
        let target = Vec3::new(
            spot.initial.x - cursor.x,
            spot.initial.y + cursor.y,
            spot.initial.z,
        );
        spot.position
            .animate_to(target, SPOTLIGHT_TWEEN_DURATION, Ease::PowerOut(1), now);
    }

    /// Forwards a canvas input event to the camera.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if !self.inert {
            self.camera.handle_event(event);
        }
    }

    /// Reacts to a page event. Option clicks are ignored until the model is loaded.
    pub fn handle_dom_event(&mut self, event: &DomEvent, document: &dyn Document, now: Instant) {
        if self.inert {
            return;
        }

        match event {
            DomEvent::Click(target) if self.state.is_ready() => self.on_click(target, now),
            DomEvent::KeyUp { key: Key::O, alt: true } if self.state.is_ready() => {
                self.toggle_panel()
            }
            DomEvent::MouseMove { x, y } => self.follow_mouse(*x, *y, now),
            DomEvent::Resize => {
                let (width, height) = document.viewport_size();
                self.viewport = Vec2::new(width, height);
            }
            _ => {}
        }
    }

    fn on_click(&mut self, target: &ElementRef, now: Instant) {
        let hit = |element: &ElementRef| element.contains(&**target);

        if let Some(option) = self.options.textures.iter().find(|o| hit(&o.element)).cloned() {
            let group: Vec<_> = self.options.textures.iter().map(|o| o.element.clone()).collect();
            set_exclusive_class(&group, &*option.element, ACTIVE_CLASS);
            if let Err(e) =
                self.swap_option(&option.appearance_set, &option.base, option.additional_scale, now)
            {
                log::error!("Unable to apply appearance `{}`: {}", option.appearance_set, e);
            }
            return;
        }

        if let Some(option) = self.options.lights.iter().find(|o| hit(&o.element)).cloned() {
            let group: Vec<_> = self.options.lights.iter().map(|o| o.element.clone()).collect();
            set_exclusive_class(&group, &*option.element, ACTIVE_CLASS);
            self.set_env_light(&option.light, now);
            return;
        }

        for group in self.options.colors.clone() {
            if let Some(option) = group.iter().find(|o| hit(&o.element)) {
                let elements: Vec<_> = group.iter().map(|o| o.element.clone()).collect();
                set_exclusive_class(&elements, &*option.element, ACTIVE_CLASS);
                if let Err(e) = self.set_model_color(&option.objects, option.color) {
                    log::error!("Unable to set the model color: {}", e);
                }
                return;
            }
        }

        if let Some(option) = self.options.scenes.iter().find(|o| hit(&o.element)).cloned() {
            let group: Vec<_> = self.options.scenes.iter().map(|o| o.element.clone()).collect();
            set_exclusive_class(&group, &*option.element, ACTIVE_CLASS);
            self.set_camera_view(option.view, now);
            return;
        }

        if self.options.room_toggle.as_ref().is_some_and(hit) {
            self.toggle_room();
        } else if self.options.screenshot.as_ref().is_some_and(hit) {
            self.screenshot();
        }
    }

    /// Advances loads and animations to `now`. Returns `true` if a redraw is pending.
    pub fn update(&mut self, now: Instant) -> bool {
        if self.inert {
            return false;
        }

        let dt = self
            .last_update
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_update = Some(now);

        self.poll_model(now);

        if self.swap.is_some() {
            self.advance_swap(now);
        }

        if self.loading.update(now) {
            if let Some(element) = &self.element {
                element.remove_class(LOADING_CLASS);
            }
        }

        if self.pending_env.is_some() {
            self.poll_env_light(now);
        }

        let mut tween_done = false;
        if let Some(tween) = &mut self.camera_tween {
            if tween.update(now) {
                self.camera.set_view(tween.value());
                self.redraw = true;
            }
            tween_done = !tween.is_animating();
        }
        if tween_done {
            self.camera_tween = None;
        }

        if let Some(spot) = &mut self.spotlight {
            if spot.position.update(now) {
                if let Some(light) = self.lights.get_mut(&spot.name) {
                    light.position = *spot.position.value();
                }
                self.redraw = true;
            }
        }

        if let Some((node, angle)) = &mut self.spin {
            if angle.update(now) {
                node.set_rotation(Quat::from_rotation_y(PI * 1.25 + *angle.value()));
                self.redraw = true;
            }
        }

        if self.camera.update(dt) {
            self.redraw = true;
        }

        self.redraw
    }

    /// Asks for the next frame to be drawn.
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Consumes the redraw request. The render loop calls this once per frame.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Cancels every request in flight. Late results are discarded.
    pub fn teardown(&mut self) {
        if let Some(mut pending) = self.pending_model.take() {
            pending.bytes.cancel();
            pending.sender.resolve(Err(AssetError::Cancelled));
        }
        self.textures.cancel_all();
        self.swap = None;
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Whether the viewer found no element to bind to.
    pub fn is_inert(&self) -> bool {
        self.inert
    }

    pub fn element(&self) -> Option<&ElementRef> {
        self.element.as_ref()
    }

    /// The root of the scene: floor, grid and model.
    pub fn scene(&self) -> &SceneNode {
        &self.root
    }

    pub fn model(&self) -> Option<&SceneNode> {
        self.model.as_ref()
    }

    /// The objects sharing the viewer's material.
    pub fn targets(&self) -> &[SceneNode] {
        &self.targets
    }

    /// The material shared by the targets, once the model is loaded.
    pub fn material(&self) -> Option<&Rc<RefCell<PhysicalMaterial>>> {
        self.material.as_ref()
    }

    /// The id of the last appearance set applied.
    pub fn appearance(&self) -> Option<&str> {
        self.appearance.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_active()
    }

    pub fn camera(&self) -> &OrbitCamera3d {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera3d {
        &mut self.camera
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn env_light(&self) -> Option<&str> {
        self.env_light.as_deref()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }
}

impl Drop for ViewerController {
    fn drop(&mut self) {
        self.teardown();
    }
}
