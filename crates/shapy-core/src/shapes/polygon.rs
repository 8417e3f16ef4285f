//! Polygon shape: inverted triangles, diamonds, and arbitrary outlines.

use super::{ObjectBase, ObjectId, ObjectTrait, ShapeStyle};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A closed polygon whose points are relative to its own top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polygon {
    #[serde(skip, default = "Uuid::new_v4")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub base: ObjectBase,
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Polygon {
    /// Default side length of the inverted triangle.
    pub const INVERTED_TRIANGLE_SIZE: f64 = 400.0;

    /// Default side length of the diamond.
    pub const DIAMOND_SIZE: f64 = 600.0;

    /// Create a polygon from points.
    pub fn new(points: Vec<Point>, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            base: ObjectBase::default(),
            points,
            style,
        }
    }

    /// A triangle with its apex at the bottom.
    pub fn inverted_triangle(width: f64, height: f64, style: ShapeStyle) -> Self {
        Self::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(width, 0.0),
                Point::new(width / 2.0, height),
            ],
            style,
        )
    }

    /// A rhombus touching the midpoints of its bounding box.
    pub fn diamond(width: f64, height: f64, style: ShapeStyle) -> Self {
        Self::new(
            vec![
                Point::new(width / 2.0, 0.0),
                Point::new(width, height / 2.0),
                Point::new(width / 2.0, height),
                Point::new(0.0, height / 2.0),
            ],
            style,
        )
    }

    /// Bounding box of the points in local coordinates.
    pub fn local_bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |rect, p| {
            rect.union_pt(*p)
        })
    }
}

impl ObjectTrait for Polygon {
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
        self.local_bounds().size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diamond_bounds() {
        let diamond = Polygon::diamond(600.0, 600.0, ShapeStyle::default());
        assert_eq!(diamond.points.len(), 4);
        assert_eq!(diamond.intrinsic_size(), Size::new(600.0, 600.0));
    }

    #[test]
    fn test_inverted_triangle_apex_at_bottom() {
        let tri = Polygon::inverted_triangle(400.0, 400.0, ShapeStyle::default());
        assert_eq!(tri.points[2], Point::new(200.0, 400.0));
        assert_eq!(tri.intrinsic_size(), Size::new(400.0, 400.0));
    }

    #[test]
    fn test_empty_polygon_has_zero_size() {
        let poly = Polygon::new(Vec::new(), ShapeStyle::default());
        assert_eq!(poly.intrinsic_size(), Size::ZERO);
    }
}
