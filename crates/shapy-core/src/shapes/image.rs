//! Raster image shape.

use super::{ObjectBase, ObjectId, ObjectTrait, ShapeStyle};
use crate::filters::ImageFilter;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An image referenced by URL (remote, file or data URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(skip, default = "Uuid::new_v4")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub base: ObjectBase,
    pub src: String,
    /// Natural width in pixels.
    pub width: f64,
    /// Natural height in pixels.
    pub height: f64,
    /// Applied filters; the editor keeps at most one.
    #[serde(default)]
    filters: Vec<ImageFilter>,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Image {
    /// Create an image with its natural dimensions.
    pub fn new(src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            base: ObjectBase::default(),
            src: src.into(),
            width,
            height,
            filters: Vec::new(),
            style: ShapeStyle {
                stroke_width: 0.0,
                ..ShapeStyle::default()
            },
        }
    }

    /// Scale each axis independently so the image covers `target` exactly.
    pub fn scale_to_fill(&mut self, target: Size) {
        if self.width > 0.0 {
            self.base.scale_x = target.width / self.width;
        }
        if self.height > 0.0 {
            self.base.scale_y = target.height / self.height;
        }
    }

    /// The active filter, if any.
    pub fn filter(&self) -> Option<&ImageFilter> {
        self.filters.first()
    }

    /// Replace the filter list with at most one filter.
    pub fn set_filter(&mut self, filter: Option<ImageFilter>) {
        self.filters.clear();
        self.filters.extend(filter);
    }
}

impl ObjectTrait for Image {
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
