//! Freehand path shape.

use super::{ObjectBase, ObjectId, ObjectTrait, ShapeStyle};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tolerance used to simplify strokes when they are committed.
const SIMPLIFY_TOLERANCE: f64 = 0.5;

/// A freehand stroke. Points are relative to the object's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    #[serde(skip, default = "Uuid::new_v4")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub base: ObjectBase,
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Path {
    /// Build a path from scene-space points. Returns None for an empty stroke.
    ///
    /// The stroke is simplified and its points rebased so that `left`/`top`
    /// hold the position.
    pub fn from_points(points: &[Point], style: ShapeStyle) -> Option<Self> {
        let first = *points.first()?;
        let bounds = points
            .iter()
            .fold(Rect::from_points(first, first), |rect, p| rect.union_pt(*p));
        let origin = bounds.origin().to_vec2();
        let local: Vec<Point> = rdp_simplify(points, SIMPLIFY_TOLERANCE)
            .into_iter()
            .map(|p| p - origin)
            .collect();

        let mut path = Self {
            id: Uuid::new_v4(),
            base: ObjectBase::default(),
            points: local,
            style,
        };
        path.base.left = bounds.x0;
        path.base.top = bounds.y0;
        Some(path)
    }

    fn local_extent(&self) -> Vec2 {
        self.points
            .iter()
            .fold(Vec2::ZERO, |acc, p| Vec2::new(acc.x.max(p.x), acc.y.max(p.y)))
    }
}

/// Ramer-Douglas-Peucker line simplification.
fn rdp_simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;
    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = rdp_simplify(&points[..=max_index], tolerance);
        let right = rdp_simplify(&points[max_index..], tolerance);
        // Junction point appears in both halves.
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Perpendicular distance from `point` to the line through `a` and `b`.
fn perpendicular_distance(point: Point, a: Point, b: Point) -> f64 {
    let line = b - a;
    let len = line.hypot();
    if len < f64::EPSILON {
        return (point - a).hypot();
    }
    (point - a).cross(line).abs() / len
}

impl ObjectTrait for Path {
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
        let extent = self.local_extent();
        Size::new(extent.x, extent.y)
    }
}
