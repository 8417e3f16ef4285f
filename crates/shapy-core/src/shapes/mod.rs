//! Scene object definitions.
//!
//! Every object serializes through the persistence allow-list: the `type`
//! tag, placement, paint, and the variant's own geometry. Anything else the
//! editor keeps on an object (its id, for instance) is regenerated on load.

mod circle;
mod image;
mod path;
mod polygon;
mod rectangle;
mod text;
mod triangle;

pub use circle::Circle;
pub use image::Image;
pub use path::Path;
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use text::{FONTS, FontStyle, TextAlign, Textbox};
pub use triangle::Triangle;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for scene objects.
pub type ObjectId = Uuid;

/// Error returned when a CSS color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color: {0:?}")]
pub struct ColorParseError(pub String);

/// Serializable color representation (RGBA8).
///
/// Persists as a CSS `rgba(r,g,b,a)` string so that documents stay readable
/// by any canvas library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Alpha as a CSS fraction, rounded to three decimals.
    pub fn alpha(&self) -> f64 {
        (self.a as f64 / 255.0 * 1000.0).round() / 1000.0
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.alpha())
    }
}

impl FromStr for SerializableColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_lowercase();
        let err = || ColorParseError(s.to_string());

        if let Some(hex) = input.strip_prefix('#') {
            if !hex.is_ascii() {
                return Err(err());
            }
            let digit = |i: usize, len: usize| u8::from_str_radix(&hex[i..i + len], 16).ok();
            return match hex.len() {
                3 | 4 => {
                    let nibble = |i| digit(i, 1).map(|v| v * 17);
                    let a = if hex.len() == 4 { nibble(3) } else { Some(255) };
                    Some(Self::new(nibble(0).ok_or_else(err)?, nibble(1).ok_or_else(err)?, nibble(2).ok_or_else(err)?, a.ok_or_else(err)?))
                }
                6 | 8 => {
                    let a = if hex.len() == 8 { digit(6, 2) } else { Some(255) };
                    Some(Self::new(digit(0, 2).ok_or_else(err)?, digit(2, 2).ok_or_else(err)?, digit(4, 2).ok_or_else(err)?, a.ok_or_else(err)?))
                }
                _ => None,
            }
            .ok_or_else(err);
        }

        let functional = input
            .strip_prefix("rgba(")
            .or_else(|| input.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(args) = functional {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if parts.len() != 3 && parts.len() != 4 {
                return Err(err());
            }
            let channel = |p: &str| -> Result<u8, ColorParseError> {
                let v: f64 = p.parse().map_err(|_| err())?;
                Ok(v.round().clamp(0.0, 255.0) as u8)
            };
            let alpha = match parts.get(3) {
                Some(p) => {
                    let v: f64 = p.parse().map_err(|_| err())?;
                    (v.clamp(0.0, 1.0) * 255.0).round() as u8
                }
                None => 255,
            };
            return Ok(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha));
        }

        match input.as_str() {
            "transparent" => Ok(Self::transparent()),
            "black" => Ok(Self::black()),
            "white" => Ok(Self::white()),
            "red" => Ok(Self::new(255, 0, 0, 255)),
            "green" => Ok(Self::new(0, 128, 0, 255)),
            "blue" => Ok(Self::new(0, 0, 255, 255)),
            "gray" | "grey" => Ok(Self::new(128, 128, 128, 255)),
            _ => Err(err()),
        }
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Drop shadow presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: SerializableColor,
    pub blur: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Placement and metadata shared by every scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectBase {
    /// Left edge in scene coordinates.
    pub left: f64,
    /// Top edge in scene coordinates.
    pub top: f64,
    /// Rotation in degrees around the top-left corner.
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    /// Optional name; the workspace is the object named [`crate::workspace::WORKSPACE_NAME`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "yes", skip_serializing_if = "is_true")]
    pub selectable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

impl Default for ObjectBase {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            name: None,
            selectable: true,
            shadow: None,
        }
    }
}

/// Paint properties for objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill: Option<SerializableColor>,
    /// Stroke color (None = no stroke).
    #[serde(default)]
    pub stroke: Option<SerializableColor>,
    #[serde(default)]
    pub stroke_width: f64,
    /// Dash pattern; None and an empty list both mean a solid stroke.
    #[serde(default)]
    pub stroke_dash_array: Option<Vec<f64>>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "one")]
    pub opacity: f64,
}

impl ShapeStyle {
    /// Create a style from fill, stroke and stroke width.
    pub fn new(fill: SerializableColor, stroke: SerializableColor, stroke_width: f64) -> Self {
        Self {
            fill: Some(fill),
            stroke: Some(stroke),
            stroke_width,
            ..Self::default()
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            stroke_dash_array: None,
            opacity: 1.0,
        }
    }
}

/// Common trait for all scene objects.
pub trait ObjectTrait {
    /// Get the unique identifier.
    fn id(&self) -> ObjectId;

    /// Placement and metadata.
    fn base(&self) -> &ObjectBase;

    /// Mutable placement and metadata.
    fn base_mut(&mut self) -> &mut ObjectBase;

    /// Paint properties.
    fn style(&self) -> &ShapeStyle;

    /// Mutable paint properties.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Size before `scaleX`/`scaleY` are applied.
    fn intrinsic_size(&self) -> Size;
}

/// Kind of a scene object, independent of its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Circle,
    Rect,
    Triangle,
    Polygon,
    Textbox,
    Image,
    Path,
}

/// Enum wrapper for all object types; this is the persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneObject {
    Circle(Circle),
    Rect(Rectangle),
    Triangle(Triangle),
    Polygon(Polygon),
    Textbox(Textbox),
    Image(Image),
    Path(Path),
}

impl SceneObject {
    fn object(&self) -> &dyn ObjectTrait {
        match self {
            SceneObject::Circle(s) => s,
            SceneObject::Rect(s) => s,
            SceneObject::Triangle(s) => s,
            SceneObject::Polygon(s) => s,
            SceneObject::Textbox(s) => s,
            SceneObject::Image(s) => s,
            SceneObject::Path(s) => s,
        }
    }

    fn object_mut(&mut self) -> &mut dyn ObjectTrait {
        match self {
            SceneObject::Circle(s) => s,
            SceneObject::Rect(s) => s,
            SceneObject::Triangle(s) => s,
            SceneObject::Polygon(s) => s,
            SceneObject::Textbox(s) => s,
            SceneObject::Image(s) => s,
            SceneObject::Path(s) => s,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.object().id()
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            SceneObject::Circle(_) => ObjectKind::Circle,
            SceneObject::Rect(_) => ObjectKind::Rect,
            SceneObject::Triangle(_) => ObjectKind::Triangle,
            SceneObject::Polygon(_) => ObjectKind::Polygon,
            SceneObject::Textbox(_) => ObjectKind::Textbox,
            SceneObject::Image(_) => ObjectKind::Image,
            SceneObject::Path(_) => ObjectKind::Path,
        }
    }

    pub fn base(&self) -> &ObjectBase {
        self.object().base()
    }

    pub fn base_mut(&mut self) -> &mut ObjectBase {
        self.object_mut().base_mut()
    }

    pub fn style(&self) -> &ShapeStyle {
        self.object().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.object_mut().style_mut()
    }

    /// Top-left corner in scene coordinates.
    pub fn position(&self) -> Point {
        let base = self.base();
        Point::new(base.left, base.top)
    }

    /// Move the top-left corner to `position`.
    pub fn set_position(&mut self, position: Point) {
        let base = self.base_mut();
        base.left = position.x;
        base.top = position.y;
    }

    /// Move the object by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        let position = self.position() + delta;
        self.set_position(position);
    }

    /// Rendered size (intrinsic size times scale).
    pub fn size(&self) -> Size {
        let intrinsic = self.object().intrinsic_size();
        let base = self.base();
        Size::new(intrinsic.width * base.scale_x, intrinsic.height * base.scale_y)
    }

    /// Map from the object's unscaled local space to scene coordinates:
    /// scale, then rotate about the top-left corner, then place.
    pub fn transform(&self) -> Affine {
        let base = self.base();
        Affine::translate(Vec2::new(base.left, base.top))
            * Affine::rotate(base.angle.to_radians())
            * Affine::scale_non_uniform(base.scale_x, base.scale_y)
    }

    /// Unscaled size in local space.
    pub fn intrinsic_size(&self) -> Size {
        self.object().intrinsic_size()
    }

    /// Axis-aligned bounding box, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Place the object so that its center lands on `center`.
    pub fn set_center(&mut self, center: Point) {
        let size = self.size();
        self.set_position(Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0));
    }

    /// Whether pointer selection can pick this object.
    pub fn is_selectable(&self) -> bool {
        self.base().selectable
    }

    pub fn is_text(&self) -> bool {
        matches!(self, SceneObject::Textbox(_))
    }

    pub fn as_text(&self) -> Option<&Textbox> {
        match self {
            SceneObject::Textbox(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Textbox> {
        match self {
            SceneObject::Textbox(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            SceneObject::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut Image> {
        match self {
            SceneObject::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn as_rect(&self) -> Option<&Rectangle> {
        match self {
            SceneObject::Rect(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_rect_mut(&mut self) -> Option<&mut Rectangle> {
        match self {
            SceneObject::Rect(r) => Some(r),
            _ => None,
        }
    }

    /// Regenerate the object's ID with a new unique identifier.
    /// Used whenever an object is cloned into the scene (paste, load).
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        match self {
            SceneObject::Circle(s) => s.id = new_id,
            SceneObject::Rect(s) => s.id = new_id,
            SceneObject::Triangle(s) => s.id = new_id,
            SceneObject::Polygon(s) => s.id = new_id,
            SceneObject::Textbox(s) => s.id = new_id,
            SceneObject::Image(s) => s.id = new_id,
            SceneObject::Path(s) => s.id = new_id,
        }
    }

    /// Deep copy with a fresh identity.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.regenerate_id();
        copy
    }
}
