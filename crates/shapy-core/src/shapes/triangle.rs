//! Triangle shape (apex at the top).

use super::{ObjectBase, ObjectId, ObjectTrait, ShapeStyle};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An isosceles triangle with its apex at the top center of its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Triangle {
    #[serde(skip, default = "Uuid::new_v4")]
    pub(crate) id: ObjectId,
    #[serde(flatten)]
    pub base: ObjectBase,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Triangle {
    /// Default side length for newly created triangles.
    pub const DEFAULT_SIZE: f64 = 400.0;

    pub fn new(width: f64, height: f64, style: ShapeStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            base: ObjectBase::default(),
            width: width.max(0.0),
            height: height.max(0.0),
            style,
        }
    }
}

impl ObjectTrait for Triangle {
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
