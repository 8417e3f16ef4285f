//! The editor facade: the one mutation surface over a document.
//!
//! Every command mutates the [`Scene`], then drains its events: the
//! selection tracker and listeners see each event, and any structural change
//! produces exactly one history snapshot (which also schedules an autosave).

use crate::clipboard::Clipboard;
use crate::config::{EditorConfig, ToolDefaults};
use crate::filters::{ImageFilter, NO_FILTER, UnknownFilter};
use crate::history::{History, ReplayDirection, SaveDecision, SaveOrigin};
use crate::hotkeys::{self, HotkeyAction, KeyboardEvent};
use crate::scene::{Scene, SceneError, SceneEvent};
use crate::selection::SelectionTracker;
use crate::shapes::{
    Circle, FontStyle, Image, ObjectId, Path, Polygon, Rectangle, SceneObject, SerializableColor, ShapeStyle,
    TextAlign, Textbox, Triangle,
};
use crate::storage::{AutosaveBridge, DocumentChange};
use crate::surface::{
    ExportFormat, ExportOptions, ImageLoadError, ImageLoader, NoImageLoader, NullSurface, RenderSurface, SurfaceError,
    encode_data_url,
};
use crate::viewport::Viewport;
use crate::workspace::new_workspace;
use kurbo::{Affine, Point, Size};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Stem of every exported file name.
pub const EXPORT_FILE_STEM: &str = "shapy-image";

/// Editor errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("document has no workspace")]
    MissingWorkspace,
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),
}

/// An export ready to hand to a download or save dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub data_url: String,
    /// Suggested file name, e.g. `shapy-image.png`.
    pub file_name: String,
}

/// Overrides for [`Editor::add_text`]; unset fields use the tool defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextOptions {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<u16>,
    pub font_style: Option<FontStyle>,
    pub text_align: Option<TextAlign>,
    pub fill: Option<SerializableColor>,
}

/// Handle returned by [`Editor::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&SceneEvent)>;

/// One open document and everything needed to edit it.
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    viewport: Viewport,
    selection: SelectionTracker,
    history: History,
    clipboard: Clipboard,
    /// Ambient tool state, private to this editor.
    tool: ToolDefaults,
    surface: Box<dyn RenderSurface>,
    images: Box<dyn ImageLoader>,
    autosave: AutosaveBridge,
    on_save: Option<Box<dyn FnMut(DocumentChange)>>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    drawing_mode: bool,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("scene", &self.scene)
            .field("viewport", &self.viewport)
            .field("history", &self.history)
            .field("drawing_mode", &self.drawing_mode)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// An empty default-sized document with no pixel engine attached.
    pub fn new(config: EditorConfig) -> Self {
        Self::open(config, Box::new(NullSurface::new()), Box::new(NoImageLoader), None)
    }

    /// Open a document.
    ///
    /// `initial` is the `{json, width, height}` triple of a saved document.
    /// If it is absent or cannot be parsed, the editor starts with an empty
    /// document sized from the config. Either way history starts with
    /// exactly one entry. Invalid config sections fall back to defaults.
    pub fn open(
        config: EditorConfig,
        surface: Box<dyn RenderSurface>,
        images: Box<dyn ImageLoader>,
        initial: Option<DocumentChange>,
    ) -> Self {
        let config = config.sanitized();
        let mut editor = Self {
            viewport: Viewport::new(config.viewport),
            history: History::new(config.history_limit),
            clipboard: Clipboard::new(config.paste_offset),
            tool: config.tool.clone(),
            autosave: AutosaveBridge::new(Duration::from_millis(config.autosave_debounce_ms)),
            scene: Scene::new(),
            selection: SelectionTracker::new(),
            surface,
            images,
            on_save: None,
            listeners: Vec::new(),
            next_listener: 0,
            drawing_mode: false,
            config,
        };

        let mut size = Size::new(editor.config.workspace.width, editor.config.workspace.height);
        if let Some(state) = initial {
            match Scene::parse_snapshot(&state.json) {
                Ok(snapshot) => {
                    editor.scene.replace(snapshot.objects);
                    if state.width > 0.0 && state.height > 0.0 {
                        size = Size::new(state.width, state.height);
                    }
                    log::info!("opened document with {} objects", editor.scene.len());
                }
                Err(e) => log::error!("initial document is unreadable, starting empty: {e}"),
            }
        }
        editor.ensure_workspace(size);
        editor.scene.drain_events();

        match editor.scene.to_json() {
            Ok(json) => editor.history.seed(json),
            Err(e) => log::error!("failed to seed history: {e}"),
        }
        editor.render();
        editor
    }

    fn ensure_workspace(&mut self, size: Size) {
        if self.scene.workspace().is_none() {
            log::debug!("adding {}x{} workspace", size.width, size.height);
            self.scene
                .add(new_workspace(size.width, size.height, self.config.workspace.background));
        }
        self.scene.enforce_workspace();
    }

    // --- collaborators and observers ---

    /// Receive debounced document changes.
    pub fn set_on_save(&mut self, callback: impl FnMut(DocumentChange) + 'static) {
        self.on_save = Some(Box::new(callback));
    }

    /// Run `callback` whenever the selection is cleared.
    pub fn set_on_selection_cleared(&mut self, callback: impl FnMut() + 'static) {
        self.selection.set_on_cleared(callback);
    }

    /// Observe every scene event. Listeners are released on
    /// [`Editor::unsubscribe`] or when the editor is dropped.
    pub fn subscribe(&mut self, listener: impl FnMut(&SceneEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    // --- state access ---

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn tool_defaults(&self) -> &ToolDefaults {
        &self.tool
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Tracked selection, resolved to objects.
    pub fn selected_objects(&self) -> Vec<&SceneObject> {
        self.selection
            .selected()
            .iter()
            .filter_map(|&id| self.scene.get(id))
            .collect()
    }

    fn first_selected(&self) -> Option<&SceneObject> {
        self.selection.selected().first().and_then(|&id| self.scene.get(id))
    }

    pub fn get_workspace(&self) -> Option<&SceneObject> {
        self.scene.workspace()
    }

    // --- event plumbing ---

    /// Feed pending events to the tracker and listeners. Returns true if
    /// any of them changed persisted state.
    fn flush_events(&mut self) -> bool {
        let events = self.scene.drain_events();
        let mut structural = false;
        for event in &events {
            self.selection.handle(event);
            for (_, listener) in self.listeners.iter_mut() {
                listener(event);
            }
            structural |= event.is_structural();
        }
        structural
    }

    /// Finish a command: dispatch events, snapshot once, redraw.
    fn settle(&mut self) {
        if self.flush_events() {
            self.commit(SaveOrigin::Engine, false);
        }
        self.render();
    }

    fn commit(&mut self, origin: SaveOrigin, skip: bool) {
        if self.history.request_save(origin, skip) != SaveDecision::Record {
            return;
        }
        match self.scene.to_json() {
            Ok(json) => {
                self.history.push(json.clone());
                let change = self.document_change(json);
                self.autosave.schedule(change);
            }
            Err(e) => log::error!("failed to serialize scene: {e}"),
        }
    }

    /// Record a snapshot now unless `skip` is set.
    pub fn save(&mut self, skip: bool) {
        self.flush_events();
        self.commit(SaveOrigin::Command, skip);
    }

    fn render(&mut self) {
        self.surface.request_render(&self.scene);
    }

    fn document_change(&self, json: String) -> DocumentChange {
        let size = self.scene.workspace_size().unwrap_or(Size::ZERO);
        DocumentChange {
            json,
            width: size.width,
            height: size.height,
        }
    }

    /// The current document as a `{json, width, height}` triple.
    pub fn document(&self) -> Result<DocumentChange, EditorError> {
        Ok(self.document_change(self.scene.to_json()?))
    }

    // --- autosave ---

    /// Deliver the pending autosave if its debounce delay has passed.
    pub fn poll_autosave(&mut self, now: Instant) -> bool {
        match self.autosave.poll_at(now) {
            Some(change) => {
                self.deliver(change);
                true
            }
            None => false,
        }
    }

    pub fn tick(&mut self) -> bool {
        self.poll_autosave(Instant::now())
    }

    /// Persist the current document immediately, bypassing debounce.
    pub fn force_save(&mut self) {
        self.autosave.cancel();
        match self.document() {
            Ok(change) => self.deliver(change),
            Err(e) => log::error!("force save failed: {e}"),
        }
    }

    fn deliver(&mut self, change: DocumentChange) {
        match self.on_save.as_mut() {
            Some(callback) => callback(change),
            None => log::debug!("autosave: no save callback installed"),
        }
    }

    // --- creation ---

    fn shape_style(&self) -> ShapeStyle {
        ShapeStyle::new(self.tool.fill, self.tool.stroke, self.tool.stroke_width)
    }

    /// Center on the workspace, add on top, select.
    fn add_to_scene(&mut self, mut object: SceneObject) -> ObjectId {
        if let Some(center) = self.scene.workspace_center() {
            object.set_center(center);
        }
        let id = self.scene.add(object);
        self.scene.set_active(&[id]);
        self.settle();
        id
    }

    pub fn add_circle(&mut self) -> ObjectId {
        let circle = Circle::new(Circle::DEFAULT_RADIUS, self.shape_style());
        self.add_to_scene(SceneObject::Circle(circle))
    }

    pub fn add_rectangle(&mut self) -> ObjectId {
        let size = Rectangle::DEFAULT_SIZE;
        self.add_to_scene(SceneObject::Rect(Rectangle::new(size, size, self.shape_style())))
    }

    pub fn add_soft_rectangle(&mut self) -> ObjectId {
        let size = Rectangle::DEFAULT_SIZE;
        let rect = Rectangle::new(size, size, self.shape_style()).with_corner_radius(Rectangle::SOFT_CORNER_RADIUS);
        self.add_to_scene(SceneObject::Rect(rect))
    }

    pub fn add_triangle(&mut self) -> ObjectId {
        let size = Triangle::DEFAULT_SIZE;
        self.add_to_scene(SceneObject::Triangle(Triangle::new(size, size, self.shape_style())))
    }

    pub fn add_inverse_triangle(&mut self) -> ObjectId {
        let size = Polygon::INVERTED_TRIANGLE_SIZE;
        let polygon = Polygon::inverted_triangle(size, size, self.shape_style());
        self.add_to_scene(SceneObject::Polygon(polygon))
    }

    pub fn add_diamond(&mut self) -> ObjectId {
        let size = Polygon::DIAMOND_SIZE;
        self.add_to_scene(SceneObject::Polygon(Polygon::diamond(size, size, self.shape_style())))
    }

    /// Add a text box filled with the ambient fill color.
    pub fn add_text(&mut self, value: &str, options: TextOptions) -> ObjectId {
        let style = ShapeStyle {
            fill: Some(options.fill.unwrap_or(self.tool.fill)),
            ..ShapeStyle::default()
        };
        let family = options.font_family.unwrap_or_else(|| self.tool.font_family.clone());
        let size = options.font_size.unwrap_or(self.tool.font_size);
        let mut text = Textbox::new(value, family, size, style);
        text.font_weight = options.font_weight.unwrap_or(self.tool.font_weight);
        text.font_style = options.font_style.unwrap_or_default();
        text.text_align = options.text_align.unwrap_or_default();
        text.width = text.approximate_width();
        self.add_to_scene(SceneObject::Textbox(text))
    }

    /// Fetch an image and add it stretched over the whole workspace.
    ///
    /// On failure the scene is left unchanged.
    pub async fn add_image(&mut self, url: &str) -> Result<ObjectId, EditorError> {
        let Some(target) = self.scene.workspace_size() else {
            log::warn!("add_image: document has no workspace");
            return Err(EditorError::MissingWorkspace);
        };
        let loaded = match self.images.load(url).await {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("failed to load image: {e}");
                return Err(e.into());
            }
        };
        let mut image = Image::new(loaded.src, loaded.width, loaded.height);
        image.scale_to_fill(target);
        Ok(self.add_to_scene(SceneObject::Image(image)))
    }

    // --- drawing mode ---

    /// Enter freehand drawing. Clears the selection.
    pub fn enable_drawing_mode(&mut self) {
        self.scene.discard_active();
        self.drawing_mode = true;
        self.settle();
    }

    pub fn disable_drawing_mode(&mut self) {
        self.drawing_mode = false;
    }

    pub fn is_drawing_mode(&self) -> bool {
        self.drawing_mode
    }

    /// Commit a brush stroke drawn with the ambient stroke color and width.
    /// Ignored outside drawing mode.
    pub fn add_freehand_path(&mut self, points: &[Point]) -> Option<ObjectId> {
        if !self.drawing_mode {
            log::warn!("freehand path ignored: drawing mode is off");
            return None;
        }
        let style = ShapeStyle {
            fill: None,
            stroke: Some(self.tool.stroke),
            stroke_width: self.tool.stroke_width,
            ..ShapeStyle::default()
        };
        let path = Path::from_points(points, style)?;
        let id = self.scene.add(SceneObject::Path(path));
        self.settle();
        Some(id)
    }

    // --- selection ---

    /// Make `ids` the active selection. Non-selectable objects are skipped.
    pub fn select(&mut self, ids: &[ObjectId]) {
        let ids: Vec<ObjectId> = ids
            .iter()
            .copied()
            .filter(|&id| self.scene.get(id).is_some_and(SceneObject::is_selectable))
            .collect();
        self.scene.set_active(&ids);
        self.settle();
    }

    /// Select every selectable object (never the workspace).
    pub fn select_all(&mut self) {
        let ids: Vec<ObjectId> = self
            .scene
            .objects()
            .iter()
            .filter(|o| o.is_selectable())
            .map(SceneObject::id)
            .collect();
        self.scene.discard_active();
        self.scene.set_active(&ids);
        self.settle();
    }

    pub fn clear_selection(&mut self) {
        self.scene.discard_active();
        self.settle();
    }

    /// Apply a host-driven change (drag, resize, rotate) to one object.
    pub fn update_object(&mut self, id: ObjectId, update: impl FnOnce(&mut SceneObject)) -> bool {
        let Some(object) = self.scene.get_mut(id) else {
            return false;
        };
        update(object);
        self.scene.mark_modified(id);
        self.settle();
        true
    }

    // --- property setters ---

    /// Run `apply` on every active object; those it reports as changed are
    /// marked modified.
    fn modify_active(&mut self, mut apply: impl FnMut(&mut SceneObject) -> bool) {
        let ids = self.scene.active_ids().to_vec();
        for id in ids {
            let changed = match self.scene.get_mut(id) {
                Some(object) => apply(object),
                None => false,
            };
            if changed {
                self.scene.mark_modified(id);
            }
        }
        self.settle();
    }

    fn modify_active_text(&mut self, mut apply: impl FnMut(&mut Textbox)) {
        self.modify_active(|object| match object.as_text_mut() {
            Some(text) => {
                apply(text);
                true
            }
            None => false,
        });
    }

    pub fn change_fill_color(&mut self, color: SerializableColor) {
        self.tool.fill = color;
        self.modify_active(|object| {
            object.style_mut().fill = Some(color);
            true
        });
    }

    /// Text has no visible stroke, so on text boxes this sets the fill.
    pub fn change_stroke_color(&mut self, color: SerializableColor) {
        self.tool.stroke = color;
        self.modify_active(|object| {
            if object.is_text() {
                object.style_mut().fill = Some(color);
            } else {
                object.style_mut().stroke = Some(color);
            }
            true
        });
    }

    pub fn change_stroke_width(&mut self, width: f64) {
        let width = width.max(0.0);
        self.tool.stroke_width = width;
        self.modify_active(|object| {
            object.style_mut().stroke_width = width;
            true
        });
    }

    pub fn change_stroke_dash_array(&mut self, dash_array: Vec<f64>) {
        self.tool.stroke_dash_array = dash_array.clone();
        self.modify_active(|object| {
            object.style_mut().stroke_dash_array = Some(dash_array.clone());
            true
        });
    }

    pub fn change_opacity(&mut self, opacity: f64) {
        let opacity = opacity.clamp(0.0, 1.0);
        self.modify_active(|object| {
            object.style_mut().opacity = opacity;
            true
        });
    }

    pub fn change_font_family(&mut self, family: &str) {
        self.tool.font_family = family.to_string();
        self.modify_active_text(|text| text.font_family = family.to_string());
    }

    pub fn change_font_weight(&mut self, weight: u16) {
        self.modify_active_text(|text| text.font_weight = weight);
    }

    pub fn change_font_style(&mut self, style: FontStyle) {
        self.modify_active_text(|text| text.font_style = style);
    }

    pub fn change_font_underline(&mut self, underline: bool) {
        self.modify_active_text(|text| text.underline = underline);
    }

    pub fn change_font_linethrough(&mut self, linethrough: bool) {
        self.modify_active_text(|text| text.linethrough = linethrough);
    }

    pub fn change_font_size(&mut self, size: f64) {
        let size = size.max(1.0);
        self.modify_active_text(|text| text.font_size = size);
    }

    pub fn change_text_align(&mut self, align: TextAlign) {
        self.modify_active_text(|text| text.text_align = align);
    }

    // --- getters ---

    pub fn get_active_fill_color(&self) -> SerializableColor {
        self.first_selected()
            .and_then(|o| o.style().fill)
            .unwrap_or(self.tool.fill)
    }

    pub fn get_active_stroke_color(&self) -> SerializableColor {
        self.first_selected()
            .and_then(|o| o.style().stroke)
            .unwrap_or(self.tool.stroke)
    }

    /// A zero width falls back to the ambient width.
    pub fn get_active_stroke_width(&self) -> f64 {
        self.first_selected()
            .map(|o| o.style().stroke_width)
            .filter(|&w| w > 0.0)
            .unwrap_or(self.tool.stroke_width)
    }

    pub fn get_active_stroke_dash_array(&self) -> Vec<f64> {
        match self.first_selected() {
            Some(object) => object.style().stroke_dash_array.clone().unwrap_or_default(),
            None => self.tool.stroke_dash_array.clone(),
        }
    }

    pub fn get_active_opacity(&self) -> f64 {
        self.first_selected().map_or(1.0, |o| o.style().opacity)
    }

    fn first_selected_text(&self) -> Option<&Textbox> {
        self.first_selected().and_then(SceneObject::as_text)
    }

    pub fn get_active_font_family(&self) -> String {
        self.first_selected_text()
            .map_or_else(|| self.tool.font_family.clone(), |t| t.font_family.clone())
    }

    pub fn get_active_font_weight(&self) -> u16 {
        self.first_selected_text().map_or(self.tool.font_weight, |t| t.font_weight)
    }

    pub fn get_active_font_style(&self) -> FontStyle {
        self.first_selected_text().map(|t| t.font_style).unwrap_or_default()
    }

    pub fn get_active_font_underline(&self) -> bool {
        self.first_selected_text().is_some_and(|t| t.underline)
    }

    pub fn get_active_font_linethrough(&self) -> bool {
        self.first_selected_text().is_some_and(|t| t.linethrough)
    }

    pub fn get_active_font_size(&self) -> f64 {
        self.first_selected_text().map_or(self.tool.font_size, |t| t.font_size)
    }

    pub fn get_active_text_align(&self) -> TextAlign {
        self.first_selected_text().map(|t| t.text_align).unwrap_or_default()
    }

    /// Catalog name of the first selected image's filter, or `"none"`.
    pub fn get_active_image_filter(&self) -> &'static str {
        self.first_selected()
            .and_then(SceneObject::as_image)
            .and_then(Image::filter)
            .map_or(NO_FILTER, ImageFilter::name)
    }

    // --- z-order ---

    pub fn bring_forward(&mut self) {
        let ids = self.scene.active_ids().to_vec();
        for id in ids {
            if self.scene.bring_forward(id) {
                self.scene.mark_modified(id);
            }
        }
        self.settle();
    }

    /// Send the active objects back one layer. The workspace stays at the
    /// very back.
    pub fn send_backward(&mut self) {
        let ids = self.scene.active_ids().to_vec();
        for id in ids {
            if self.scene.send_backward(id) {
                self.scene.mark_modified(id);
            }
        }
        self.scene.pin_workspace();
        self.settle();
    }

    // --- deletion and clipboard ---

    /// Remove every active object, then clear the selection.
    pub fn delete(&mut self) {
        let ids = self.scene.active_ids().to_vec();
        for id in ids {
            self.scene.remove(id);
        }
        self.scene.discard_active();
        self.settle();
    }

    /// Copy the active object (or the whole active selection).
    pub fn copy(&mut self) {
        let objects: Vec<SceneObject> = self.scene.active_objects().cloned().collect();
        self.clipboard.copy(&objects);
    }

    /// Paste fresh copies of the clipboard and select them.
    pub fn paste(&mut self) {
        let Some(objects) = self.clipboard.paste() else {
            return;
        };
        self.scene.discard_active();
        let ids: Vec<ObjectId> = objects.into_iter().map(|o| self.scene.add(o)).collect();
        self.scene.set_active(&ids);
        self.settle();
    }

    // --- filters ---

    /// Apply a catalog filter to the selected images and record it.
    pub fn change_image_filter(&mut self, name: &str) -> Result<(), UnknownFilter> {
        self.set_image_filter(name, true)
    }

    /// Show a filter on the selected images without recording history,
    /// e.g. while hovering over the filter picker.
    pub fn preview_image_filter(&mut self, name: &str) -> Result<(), UnknownFilter> {
        self.set_image_filter(name, false)
    }

    fn set_image_filter(&mut self, name: &str, commit: bool) -> Result<(), UnknownFilter> {
        let filter = ImageFilter::from_name(name).inspect_err(|e| log::warn!("{e}"))?;
        let ids = self.scene.active_ids().to_vec();
        for id in ids {
            let Some(image) = self.scene.get_mut(id).and_then(SceneObject::as_image_mut) else {
                continue;
            };
            image.set_filter(filter.clone());
            if commit {
                self.scene.mark_modified(id);
            }
        }
        self.settle();
        Ok(())
    }

    // --- workspace and viewport ---

    /// Resize the workspace, re-fit the view and record a snapshot.
    pub fn change_size(&mut self, size: Size) -> Result<(), EditorError> {
        if !self.scene.resize_workspace(size) {
            log::warn!("change_size: document has no workspace");
            return Err(EditorError::MissingWorkspace);
        }
        self.auto_zoom();
        self.save(false);
        Ok(())
    }

    /// Repaint the workspace background and record a snapshot.
    pub fn change_background(&mut self, color: SerializableColor) -> Result<(), EditorError> {
        if !self.scene.set_workspace_background(color) {
            log::warn!("change_background: document has no workspace");
            return Err(EditorError::MissingWorkspace);
        }
        self.render();
        self.save(false);
        Ok(())
    }

    /// The host container was resized.
    pub fn set_container_size(&mut self, size: Size) {
        self.viewport.set_container_size(size);
        self.auto_zoom();
    }

    /// Fit the workspace into the container and center it.
    pub fn auto_zoom(&mut self) {
        let Some(workspace) = self.scene.workspace_rect() else {
            log::warn!("auto_zoom: document has no workspace");
            return;
        };
        if self.viewport.auto_zoom(workspace) {
            self.apply_viewport();
        }
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.apply_viewport();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.apply_viewport();
    }

    fn apply_viewport(&mut self) {
        self.surface.set_viewport_transform(self.viewport.transform());
        self.render();
    }

    // --- serialization ---

    /// Replace the whole document from JSON text and re-fit the view.
    ///
    /// Malformed input leaves the document untouched.
    pub fn load_json(&mut self, json: &str) -> Result<(), EditorError> {
        if let Err(e) = self.scene.load_json(json) {
            log::error!("failed to load document: {e}");
            return Err(e.into());
        }
        let size = Size::new(self.config.workspace.width, self.config.workspace.height);
        self.ensure_workspace(size);
        self.settle();
        self.auto_zoom();
        log::info!("loaded document with {} objects", self.scene.len());
        Ok(())
    }

    /// Tab-indented JSON export.
    pub fn save_json(&self) -> Result<ExportedFile, EditorError> {
        let value = self.scene.to_value()?;
        let mut bytes = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"\t"));
        value.serialize(&mut serializer).map_err(SceneError::from)?;
        Ok(ExportedFile {
            data_url: encode_data_url(ExportFormat::Json.mime_type(), &bytes),
            file_name: export_file_name(ExportFormat::Json),
        })
    }

    pub fn save_png(&mut self) -> Result<ExportedFile, EditorError> {
        self.export(ExportFormat::Png)
    }

    pub fn save_jpg(&mut self) -> Result<ExportedFile, EditorError> {
        self.export(ExportFormat::Jpeg)
    }

    pub fn save_svg(&mut self) -> Result<ExportedFile, EditorError> {
        self.export(ExportFormat::Svg)
    }

    /// Export the workspace region at 1:1 scale.
    ///
    /// The view transform is reset to identity while the surface encodes,
    /// then the auto-fit zoom is restored.
    pub fn export(&mut self, format: ExportFormat) -> Result<ExportedFile, EditorError> {
        if format == ExportFormat::Json {
            return self.save_json();
        }
        let Some(region) = self.scene.workspace_rect() else {
            log::warn!("export: document has no workspace");
            return Err(EditorError::MissingWorkspace);
        };

        let saved = self.viewport.clone();
        self.viewport.reset_transform();
        self.surface.set_viewport_transform(Affine::IDENTITY);
        let options = ExportOptions {
            format,
            region,
            quality: 1.0,
        };
        let result = self.surface.to_data_url(&self.scene, &options);
        if !self.viewport.auto_zoom(region) {
            // No container to fit into; put the previous view back.
            self.viewport = saved;
        }
        self.apply_viewport();

        let data_url = result.inspect_err(|e| log::error!("export failed: {e}"))?;
        log::info!("exported workspace as {}", format.extension());
        Ok(ExportedFile {
            data_url,
            file_name: export_file_name(format),
        })
    }

    // --- history ---

    /// Step back one snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.replay(ReplayDirection::Undo)
    }

    /// Step forward one snapshot. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.replay(ReplayDirection::Redo)
    }

    fn replay(&mut self, direction: ReplayDirection) -> Result<bool, EditorError> {
        let mut next = Some(direction);
        let mut replayed = false;
        while let Some(direction) = next.take() {
            let Some(snapshot) = self.history.begin_replay(direction) else {
                break;
            };
            let result = self.scene.load_json(&snapshot);
            if result.is_ok() {
                self.scene.enforce_workspace();
            }
            // Saves requested by the replay's own events are dropped here.
            self.settle();

            let completion = self.history.finish_replay(result.is_ok());
            if completion.flush_pending_save {
                self.commit(SaveOrigin::Command, false);
            }
            if let Err(e) = result {
                log::error!("{direction:?} failed: {e}");
                return Err(e.into());
            }
            log::debug!("{direction:?} to snapshot {}", self.history.current_index());
            self.auto_zoom();
            replayed = true;
            next = completion.next;
        }
        Ok(replayed)
    }

    // --- keyboard ---

    /// Dispatch a key press. Returns true if it was consumed, in which case
    /// the host should suppress the default action.
    pub fn handle_key(&mut self, event: &KeyboardEvent) -> bool {
        let Some(action) = hotkeys::resolve(event) else {
            return false;
        };
        match action {
            HotkeyAction::Delete => self.delete(),
            HotkeyAction::Undo => {
                if let Err(e) = self.undo() {
                    log::warn!("undo hotkey: {e}");
                }
            }
            HotkeyAction::Redo => {
                if let Err(e) = self.redo() {
                    log::warn!("redo hotkey: {e}");
                }
            }
            HotkeyAction::Copy => self.copy(),
            HotkeyAction::Paste => self.paste(),
            HotkeyAction::Save => self.force_save(),
            HotkeyAction::ClearSelection => self.clear_selection(),
            HotkeyAction::SelectAll => self.select_all(),
        }
        true
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.autosave.cancel();
        self.listeners.clear();
    }
}

fn export_file_name(format: ExportFormat) -> String {
    format!("{}.{}", EXPORT_FILE_STEM, format.extension())
}
