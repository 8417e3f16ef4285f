//! Text box shape.

use super::{ObjectBase, ObjectId, ObjectTrait, ShapeStyle};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Font families offered by the font picker.
pub const FONTS: &[&str] = &[
    "Arial",
    "Arial Black",
    "Bookman",
    "Brush Script MT",
    "Comic Sans MS",
    "Courier New",
    "Garamond",
    "Georgia",
    "Geneva",
    "Helvetica",
    "Impact",
    "Lucida Console",
    "Lucida Sans Unicode",
    "Palatino",
    "Tahoma",
    "Times New Roman",
    "Trebuchet MS",
    "Verdana",
];

/// Font style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// A wrapping text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Textbox {
    #[serde(skip, default = "Uuid::new_v4")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub base: ObjectBase,
    pub text: String,
    /// Wrapping width.
    pub width: f64,
    pub font_family: String,
    pub font_size: f64,
    /// CSS numeric weight (400 = regular, 700 = bold).
    pub font_weight: u16,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub linethrough: bool,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Textbox {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 32.0;

    /// Default font weight.
    pub const DEFAULT_FONT_WEIGHT: u16 = 400;

    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.16;

    /// Create a text box sized to fit `text` on its widest line.
    pub fn new(text: impl Into<String>, font_family: impl Into<String>, font_size: f64, style: ShapeStyle) -> Self {
        let mut textbox = Self {
            id: Uuid::new_v4(),
            base: ObjectBase::default(),
            text: text.into(),
            width: 0.0,
            font_family: font_family.into(),
            font_size,
            font_weight: Self::DEFAULT_FONT_WEIGHT,
            font_style: FontStyle::default(),
            underline: false,
            linethrough: false,
            text_align: TextAlign::default(),
            style,
        };
        textbox.width = textbox.approximate_width();
        textbox
    }

    /// Approximate width based on character count and font size.
    /// Actual glyph metrics belong to the rendering engine.
    pub fn approximate_width(&self) -> f64 {
        let max_line_len = self
            .text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let factor = if self.font_weight >= 600 { 0.6 } else { 0.55 };
        (max_line_len as f64 * self.font_size * factor).max(self.font_size)
    }

    /// Number of rendered lines (empty text still occupies one line).
    pub fn line_count(&self) -> usize {
        let count = self.text.lines().count().max(1);
        if self.text.ends_with('\n') { count + 1 } else { count }
    }
}

impl ObjectTrait for Textbox {
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
        Size::new(
            self.width,
            self.line_count() as f64 * self.font_size * Self::LINE_HEIGHT,
        )
    }
}
