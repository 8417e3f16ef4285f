//! Rectangle shape.

use super::{ObjectBase, ObjectId, ObjectTrait, ShapeStyle};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rectangle with optional rounded corners.
///
/// The workspace is a rectangle too; see [`crate::workspace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    #[serde(skip, default = "Uuid::new_v4")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub base: ObjectBase,
    pub width: f64,
    pub height: f64,
    /// Horizontal corner radius (0 = sharp corners).
    #[serde(default)]
    pub rx: f64,
    /// Vertical corner radius (0 = sharp corners).
    #[serde(default)]
    pub ry: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Rectangle {
    /// Default side length for newly created rectangles.
    pub const DEFAULT_SIZE: f64 = 400.0;

    /// Corner radius used by the soft rectangle.
    pub const SOFT_CORNER_RADIUS: f64 = 50.0;

    /// Create a new sharp-cornered rectangle at the origin.
    pub fn new(width: f64, height: f64, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            base: ObjectBase::default(),
            width: width.max(0.0),
            height: height.max(0.0),
            rx: 0.0,
            ry: 0.0,
            style,
        }
    }

    /// Set both corner radii.
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.rx = radius.max(0.0);
        self.ry = radius.max(0.0);
        self
    }

    pub fn is_rounded(&self) -> bool {
        self.rx > 0.0 || self.ry > 0.0
    }
}

impl ObjectTrait for Rectangle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn intrinsic_size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_creation() {
        let rect = Rectangle::new(100.0, 50.0, ShapeStyle::default());
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
        assert!(!rect.is_rounded());
    }

    #[test]
    fn test_soft_corners() {
        let rect = Rectangle::new(400.0, 400.0, ShapeStyle::default())
            .with_corner_radius(Rectangle::SOFT_CORNER_RADIUS);
        assert!(rect.is_rounded());
        assert!((rect.rx - 50.0).abs() < f64::EPSILON);
        assert!((rect.ry - 50.0).abs() < f64::EPSILON);
    }
}
