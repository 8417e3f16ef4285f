//! The workspace: the one clip rectangle that bounds a document.
//!
//! It lives in the scene like any other rectangle but is recognized by its
//! name, is never selectable, and always sits at the back of the z-order.

use crate::scene::Scene;
use crate::shapes::{Rectangle, SceneObject, SerializableColor, Shadow, ShapeStyle};
use kurbo::{Point, Rect, Size};

/// Name carried by the workspace rectangle.
pub const WORKSPACE_NAME: &str = "clip";

/// Blur radius of the workspace drop shadow.
pub const WORKSPACE_SHADOW_BLUR: f64 = 5.0;

/// Shadow color of the workspace (`rgba(0,0,0,0.8)`).
pub const WORKSPACE_SHADOW_COLOR: SerializableColor = SerializableColor::new(0, 0, 0, 204);

/// Build a workspace rectangle at the scene origin.
pub fn new_workspace(width: f64, height: f64, background: SerializableColor) -> SceneObject {
    let mut rect = Rectangle::new(
        width,
        height,
        ShapeStyle {
            fill: Some(background),
            stroke: None,
            stroke_width: 0.0,
            ..ShapeStyle::default()
        },
    );
    rect.base.name = Some(WORKSPACE_NAME.to_string());
    rect.base.selectable = false;
    rect.base.shadow = Some(Shadow {
        color: WORKSPACE_SHADOW_COLOR,
        blur: WORKSPACE_SHADOW_BLUR,
        offset_x: 0.0,
        offset_y: 0.0,
    });
    SceneObject::Rect(rect)
}

/// Whether `object` is the workspace.
pub fn is_workspace(object: &SceneObject) -> bool {
    object.as_rect().is_some() && object.base().name.as_deref() == Some(WORKSPACE_NAME)
}

impl Scene {
    /// The workspace, if the document has one.
    pub fn workspace(&self) -> Option<&SceneObject> {
        self.objects().iter().find(|o| is_workspace(o))
    }

    pub fn workspace_mut(&mut self) -> Option<&mut SceneObject> {
        self.objects_mut().iter_mut().find(|o| is_workspace(o))
    }

    pub fn workspace_index(&self) -> Option<usize> {
        self.objects().iter().position(is_workspace)
    }

    /// Workspace bounds in scene coordinates.
    pub fn workspace_rect(&self) -> Option<Rect> {
        self.workspace().map(SceneObject::bounds)
    }

    /// Center of the workspace; new objects are placed here.
    pub fn workspace_center(&self) -> Option<Point> {
        self.workspace_rect().map(|r| r.center())
    }

    /// Workspace size as set by the user, ignoring scale.
    pub fn workspace_size(&self) -> Option<Size> {
        self.workspace()
            .and_then(SceneObject::as_rect)
            .map(|r| Size::new(r.width, r.height))
    }

    /// Resize the workspace. Returns false if there is none.
    pub fn resize_workspace(&mut self, size: Size) -> bool {
        let Some(rect) = self.workspace_mut().and_then(SceneObject::as_rect_mut) else {
            return false;
        };
        rect.width = size.width.max(0.0);
        rect.height = size.height.max(0.0);
        let id = rect.id;
        self.mark_modified(id);
        true
    }

    /// Repaint the workspace background. Returns false if there is none.
    pub fn set_workspace_background(&mut self, color: SerializableColor) -> bool {
        let Some(workspace) = self.workspace_mut() else {
            return false;
        };
        workspace.style_mut().fill = Some(color);
        let id = workspace.id();
        self.mark_modified(id);
        true
    }

    /// Move the workspace to index 0.
    pub fn pin_workspace(&mut self) {
        if let Some(id) = self.workspace().map(SceneObject::id) {
            self.send_to_back(id);
        }
    }

    /// Force workspace invariants after a load: non-selectable, at the back.
    pub(crate) fn enforce_workspace(&mut self) {
        if let Some(workspace) = self.workspace_mut() {
            workspace.base_mut().selectable = false;
        }
        self.pin_workspace();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Circle;

    #[test]
    fn test_new_workspace() {
        let ws = new_workspace(1200.0, 800.0, SerializableColor::white());
        assert!(is_workspace(&ws));
        assert!(!ws.is_selectable());
        assert_eq!(ws.bounds(), Rect::new(0.0, 0.0, 1200.0, 800.0));
        assert_eq!(ws.base().shadow.as_ref().map(|s| s.color.to_string()).as_deref(), Some("rgba(0,0,0,0.8)"));
    }

    #[test]
    fn test_named_circle_is_not_workspace() {
        let mut circle = SceneObject::Circle(Circle::new(10.0, ShapeStyle::default()));
        circle.base_mut().name = Some(WORKSPACE_NAME.to_string());
        assert!(!is_workspace(&circle));
    }

    #[test]
    fn test_resize_and_background() {
        let mut scene = Scene::new();
        assert!(!scene.resize_workspace(Size::new(10.0, 10.0)));
        scene.add(new_workspace(100.0, 100.0, SerializableColor::white()));
        assert!(scene.resize_workspace(Size::new(300.0, 200.0)));
        assert_eq!(scene.workspace_size(), Some(Size::new(300.0, 200.0)));
        assert_eq!(scene.workspace_center(), Some(Point::new(150.0, 100.0)));

        let red = SerializableColor::new(255, 0, 0, 255);
        assert!(scene.set_workspace_background(red));
        assert_eq!(scene.workspace().and_then(|w| w.style().fill), Some(red));
    }

    #[test]
    fn test_enforce_after_load() {
        let mut scene = Scene::new();
        scene.add(SceneObject::Circle(Circle::new(10.0, ShapeStyle::default())));
        let mut ws = new_workspace(100.0, 100.0, SerializableColor::white());
        ws.base_mut().selectable = true;
        scene.add(ws);
        scene.enforce_workspace();
        assert_eq!(scene.workspace_index(), Some(0));
        assert!(!scene.workspace().is_some_and(SceneObject::is_selectable));
    }
}
