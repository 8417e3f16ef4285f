//! Circle shape.

use super::{ObjectBase, ObjectId, ObjectTrait, ShapeStyle};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle, positioned by the top-left corner of its bounding square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    #[serde(skip, default = "Uuid::new_v4")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub base: ObjectBase,
    /// Radius (never negative).
    pub radius: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Circle {
    /// Default radius for newly created circles.
    pub const DEFAULT_RADIUS: f64 = 225.0;

    /// Create a new circle at the origin.
    pub fn new(radius: f64, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            base: ObjectBase::default(),
            radius: radius.max(0.0),
            style,
        }
    }
}

impl ObjectTrait for Circle {
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
        Size::new(self.radius * 2.0, self.radius * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_size_is_diameter() {
        let circle = Circle::new(Circle::DEFAULT_RADIUS, ShapeStyle::default());
        assert_eq!(circle.intrinsic_size(), Size::new(450.0, 450.0));
    }

    #[test]
    fn test_negative_radius_clamped() {
        let circle = Circle::new(-5.0, ShapeStyle::default());
        assert!(circle.radius.abs() < f64::EPSILON);
    }
}
