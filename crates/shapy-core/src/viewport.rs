//! Viewport module for zoom/pan transforms and fitting the workspace into
//! its container.

use crate::config::ViewportConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Viewport manages the view transform for the scene.
///
/// Zoom is a uniform scale, offset a translation in screen pixels. Scene
/// coordinates map to screen coordinates as `offset + zoom * point`.
#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f64,
    offset: Vec2,
    container: Size,
    config: ViewportConfig,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Viewport {
    /// Create an identity viewport with no container. An invalid zoom
    /// range is replaced by the default one.
    pub fn new(config: ViewportConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("{e}; using default viewport limits");
                ViewportConfig::default()
            }
        };
        Self {
            zoom: 1.0,
            offset: Vec2::ZERO,
            container: Size::ZERO,
            config,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn container_size(&self) -> Size {
        self.container
    }

    /// Record a new container size. Callers re-fit with [`Viewport::auto_zoom`].
    pub fn set_container_size(&mut self, size: Size) {
        self.container = Size::new(size.width.max(0.0), size.height.max(0.0));
    }

    /// Visual center of the container in screen coordinates.
    pub fn container_center(&self) -> Point {
        Point::new(self.container.width / 2.0, self.container.height / 2.0)
    }

    /// Scene-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-scene transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_scene(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn scene_to_screen(&self, scene_point: Point) -> Point {
        self.transform() * scene_point
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Set the zoom to `zoom`, keeping `screen_point` fixed on screen.
    ///
    /// The zoom is clamped to the configured range.
    pub fn zoom_to_point(&mut self, screen_point: Point, zoom: f64) {
        let new_zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let scene_point = self.screen_to_scene(screen_point);
        self.zoom = new_zoom;

        // Adjust offset so scene_point stays at screen_point
        let new_screen = self.scene_to_screen(scene_point);
        self.offset += screen_point - new_screen;
    }

    /// Zoom in one step around the container center.
    pub fn zoom_in(&mut self) {
        let target = self.zoom + self.config.zoom_step;
        self.zoom_to_point(self.container_center(), target);
    }

    /// Zoom out one step around the container center.
    pub fn zoom_out(&mut self) {
        let target = self.zoom - self.config.zoom_step;
        self.zoom_to_point(self.container_center(), target);
    }

    /// Fit `workspace` into the container and center it.
    ///
    /// Returns false, leaving the transform alone, when either the container
    /// or the workspace has no area.
    pub fn auto_zoom(&mut self, workspace: Rect) -> bool {
        if self.container.is_zero_area() || workspace.is_zero_area() {
            return false;
        }

        let scale = (self.container.width / workspace.width()).min(self.container.height / workspace.height());
        self.zoom = (scale * self.config.fit_ratio).clamp(self.config.min_zoom, self.config.max_zoom);

        let center = workspace.center();
        self.offset = Vec2::new(
            self.container.width / 2.0 - center.x * self.zoom,
            self.container.height / 2.0 - center.y * self.zoom,
        );
        log::debug!("auto-zoom to {:.3} for container {:?}", self.zoom, self.container);
        true
    }

    /// Reset to the identity transform (1:1, no pan), used before export.
    pub fn reset_transform(&mut self) {
        self.zoom = 1.0;
        self.offset = Vec2::ZERO;
    }
}
