//! SVG serialization of a scene region.

use crate::geometry::outline;
use kurbo::{Affine, Rect};
use shapy_core::shapes::{FontStyle, SceneObject, ShapeStyle, TextAlign, Textbox};
use shapy_core::Scene;
use std::fmt::Write;

/// Render `scene` as a standalone SVG document whose viewport is `region`.
pub fn render_svg(scene: &Scene, region: Rect) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1" width="{}" height="{}" viewBox="{} {} {} {}">"#,
        region.width(),
        region.height(),
        region.x0,
        region.y0,
        region.width(),
        region.height()
    );
    for object in scene.objects() {
        write_object(&mut out, object);
    }
    out.push_str("</svg>\n");
    out
}

fn write_object(out: &mut String, object: &SceneObject) {
    let transform = matrix(object.transform());
    let style = object.style();
    match object {
        SceneObject::Textbox(text) => write_text(out, text, &transform),
        SceneObject::Image(image) => {
            let _ = writeln!(
                out,
                r#"  <image transform="{transform}" width="{}" height="{}" opacity="{}" preserveAspectRatio="none" xlink:href="{}"/>"#,
                image.width,
                image.height,
                style.opacity,
                escape(&image.src)
            );
        }
        _ => {
            let Some(path) = outline(object) else {
                return;
            };
            let fill = match object {
                SceneObject::Path(_) => "none".to_string(),
                _ => paint(style.fill),
            };
            let _ = writeln!(
                out,
                r#"  <path transform="{transform}" d="{}" fill="{fill}"{}/>"#,
                path.to_svg(),
                stroke_attributes(style)
            );
        }
    }
}

fn write_text(out: &mut String, text: &Textbox, transform: &str) {
    let style = &text.style;
    let (anchor, x) = match text.text_align {
        TextAlign::Center => ("middle", text.width / 2.0),
        TextAlign::Right => ("end", text.width),
        TextAlign::Left | TextAlign::Justify => ("start", 0.0),
    };
    let font_style = match text.font_style {
        FontStyle::Normal => "normal",
        FontStyle::Italic => "italic",
    };
    let mut decoration = Vec::new();
    if text.underline {
        decoration.push("underline");
    }
    if text.linethrough {
        decoration.push("line-through");
    }
    let decoration = if decoration.is_empty() {
        String::new()
    } else {
        format!(r#" text-decoration="{}""#, decoration.join(" "))
    };

    let _ = writeln!(
        out,
        r#"  <text transform="{transform}" font-family="{}" font-size="{}" font-weight="{}" font-style="{font_style}" text-anchor="{anchor}" fill="{}" opacity="{}"{decoration}>"#,
        escape(&text.font_family),
        text.font_size,
        text.font_weight,
        paint(style.fill),
        style.opacity
    );
    let line_height = text.font_size * Textbox::LINE_HEIGHT;
    for (i, line) in text.text.lines().enumerate() {
        let _ = writeln!(
            out,
            r#"    <tspan x="{x}" y="{}">{}</tspan>"#,
            text.font_size + i as f64 * line_height,
            escape(line)
        );
    }
    out.push_str("  </text>\n");
}

fn stroke_attributes(style: &ShapeStyle) -> String {
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{}" opacity="{}""#,
        paint(style.stroke),
        style.stroke_width,
        style.opacity
    );
    if let Some(dashes) = style.stroke_dash_array.as_deref().filter(|d| !d.is_empty()) {
        let list: Vec<String> = dashes.iter().map(f64::to_string).collect();
        let _ = write!(attrs, r#" stroke-dasharray="{}""#, list.join(" "));
    }
    attrs
}

fn paint(color: Option<shapy_core::SerializableColor>) -> String {
    color.map_or_else(|| "none".to_string(), |c| c.to_string())
}

fn matrix(affine: Affine) -> String {
    // Adding zero folds negative zeros so they print as "0".
    let [a, b, c, d, e, f] = affine.as_coeffs().map(|v| v + 0.0);
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use shapy_core::shapes::{Circle, Rectangle};
    use shapy_core::SerializableColor;

    #[test]
    fn test_viewbox_matches_region() {
        let svg = render_svg(&Scene::new(), Rect::new(0.0, 0.0, 1200.0, 800.0));
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"viewBox="0 0 1200 800""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_shapes_in_z_order() {
        let mut scene = Scene::new();
        let mut rect = SceneObject::Rect(Rectangle::new(
            10.0,
            10.0,
            ShapeStyle::new(SerializableColor::white(), SerializableColor::black(), 2.0),
        ));
        rect.set_position(Point::new(5.0, 5.0));
        scene.add(rect);
        let mut circle = Circle::new(4.0, ShapeStyle::default());
        circle.style.stroke_dash_array = Some(vec![5.0, 5.0]);
        scene.add(SceneObject::Circle(circle));

        let svg = render_svg(&scene, Rect::new(0.0, 0.0, 20.0, 20.0));
        let rect_at = svg.find("matrix(1 0 0 1 5 5)").unwrap();
        let circle_at = svg.find(r#"stroke-dasharray="5 5""#).unwrap();
        assert!(rect_at < circle_at);
        assert!(svg.contains(r#"fill="rgba(255,255,255,1)""#));
        assert!(svg.contains(r#"fill="none""#));
    }

    #[test]
    fn test_text_is_escaped_per_line() {
        let mut scene = Scene::new();
        let mut text = Textbox::new("a < b\nc & d", "Arial", 20.0, ShapeStyle::default());
        text.text_align = TextAlign::Center;
        text.underline = true;
        scene.add(SceneObject::Textbox(text));

        let svg = render_svg(&scene, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(svg.contains("a &lt; b</tspan>"));
        assert!(svg.contains("c &amp; d</tspan>"));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"text-decoration="underline""#));
    }
}
