//! Local-space outlines of scene objects.

use kurbo::{BezPath, Ellipse, Point, Rect, RoundedRect, Shape};
use shapy_core::shapes::SceneObject;

/// Curve flattening tolerance in local units.
const TOLERANCE: f64 = 0.1;

/// Outline of `object` in its unscaled local space (origin at the top-left
/// of its bounding box). Text and images have no vector outline.
pub fn outline(object: &SceneObject) -> Option<BezPath> {
    match object {
        SceneObject::Circle(circle) => {
            let r = circle.radius;
            Some(Ellipse::new(Point::new(r, r), (r, r), 0.0).to_path(TOLERANCE))
        }
        SceneObject::Rect(rect) => {
            let bounds = Rect::new(0.0, 0.0, rect.width, rect.height);
            let radius = rect.rx.max(rect.ry);
            if radius > 0.0 {
                Some(RoundedRect::from_rect(bounds, radius).to_path(TOLERANCE))
            } else {
                Some(bounds.to_path(TOLERANCE))
            }
        }
        SceneObject::Triangle(triangle) => Some(polygon(&[
            Point::new(triangle.width / 2.0, 0.0),
            Point::new(triangle.width, triangle.height),
            Point::new(0.0, triangle.height),
        ])),
        SceneObject::Polygon(shape) => {
            let origin = shape.local_bounds().origin().to_vec2();
            let points: Vec<Point> = shape.points.iter().map(|p| *p - origin).collect();
            Some(polygon(&points))
        }
        SceneObject::Path(path) => polyline(&path.points),
        SceneObject::Textbox(_) | SceneObject::Image(_) => None,
    }
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Open polyline; a single point has nothing to draw.
fn polyline(points: &[Point]) -> Option<BezPath> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut path = BezPath::new();
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    Some(path)
}
