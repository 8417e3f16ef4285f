//! In-editor clipboard with a single slot.

use crate::shapes::SceneObject;
use kurbo::Vec2;

/// What was copied.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardContent {
    Object(SceneObject),
    /// An active selection of several objects, kept as separate objects.
    Selection(Vec<SceneObject>),
}

impl ClipboardContent {
    fn objects_mut(&mut self) -> &mut [SceneObject] {
        match self {
            ClipboardContent::Object(object) => std::slice::from_mut(object),
            ClipboardContent::Selection(objects) => objects,
        }
    }

    fn objects(&self) -> &[SceneObject] {
        match self {
            ClipboardContent::Object(object) => std::slice::from_ref(object),
            ClipboardContent::Selection(objects) => objects,
        }
    }
}

/// Last-copy-wins clipboard. Each paste steps further away from the
/// original by `offset`.
#[derive(Debug, Clone)]
pub struct Clipboard {
    content: Option<ClipboardContent>,
    offset: Vec2,
}

impl Clipboard {
    pub fn new(offset: f64) -> Self {
        Self {
            content: None,
            offset: Vec2::new(offset, offset),
        }
    }

    /// Store a deep copy of `objects`. An empty slice leaves the clipboard
    /// unchanged.
    pub fn copy(&mut self, objects: &[SceneObject]) {
        self.content = match objects {
            [] => return,
            [object] => Some(ClipboardContent::Object(object.duplicate())),
            many => Some(ClipboardContent::Selection(
                many.iter().map(SceneObject::duplicate).collect(),
            )),
        };
    }

    pub fn content(&self) -> Option<&ClipboardContent> {
        self.content.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Fresh copies of the clipboard, offset from the stored position. The
    /// stored content moves along too, so the next paste lands further out.
    pub fn paste(&mut self) -> Option<Vec<SceneObject>> {
        let offset = self.offset;
        let content = self.content.as_mut()?;
        for object in content.objects_mut() {
            object.translate(offset);
        }
        Some(content.objects().iter().map(SceneObject::duplicate).collect())
    }

    pub fn clear(&mut self) {
        self.content = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, ShapeStyle};
    use kurbo::Point;

    fn circle_at(x: f64, y: f64) -> SceneObject {
        let mut circle = SceneObject::Circle(Circle::new(10.0, ShapeStyle::default()));
        circle.set_position(Point::new(x, y));
        circle
    }

    #[test]
    fn test_paste_cascades() {
        let mut clipboard = Clipboard::new(10.0);
        clipboard.copy(&[circle_at(100.0, 100.0)]);

        let positions: Vec<Point> = (0..3)
            .map(|_| clipboard.paste().unwrap()[0].position())
            .collect();
        assert_eq!(
            positions,
            vec![Point::new(110.0, 110.0), Point::new(120.0, 120.0), Point::new(130.0, 130.0)]
        );
    }

    #[test]
    fn test_pastes_do_not_share_identity() {
        let source = circle_at(0.0, 0.0);
        let mut clipboard = Clipboard::new(10.0);
        clipboard.copy(std::slice::from_ref(&source));
        let first = clipboard.paste().unwrap();
        let second = clipboard.paste().unwrap();
        assert_ne!(first[0].id(), source.id());
        assert_ne!(first[0].id(), second[0].id());
    }

    #[test]
    fn test_selection_pastes_every_object() {
        let mut clipboard = Clipboard::new(10.0);
        clipboard.copy(&[circle_at(0.0, 0.0), circle_at(50.0, 0.0)]);
        assert!(matches!(clipboard.content(), Some(ClipboardContent::Selection(_))));
        let pasted = clipboard.paste().unwrap();
        assert_eq!(pasted.len(), 2);
        assert_eq!(pasted[1].position(), Point::new(60.0, 10.0));
    }

    #[test]
    fn test_empty_clipboard() {
        let mut clipboard = Clipboard::new(10.0);
        clipboard.copy(&[]);
        assert!(clipboard.is_empty());
        assert!(clipboard.paste().is_none());
    }
}
