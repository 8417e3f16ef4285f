//! Image filter catalog.
//!
//! Each entry carries fixed default parameters. Filters persist as a tagged
//! object inside an image's `filters` list, e.g. `{"type":"sepia"}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog name that clears the active filter.
pub const NO_FILTER: &str = "none";

/// Error returned for names outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown image filter: {0:?}")]
pub struct UnknownFilter(pub String);

/// A filter from the fixed catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImageFilter {
    Greyscale,
    Polaroid,
    Sepia,
    Kodachrome,
    Contrast { contrast: f64 },
    Brightness { brightness: f64 },
    Brownie,
    Vintage,
    Technicolor,
    Pixelate { blocksize: f64 },
    Invert,
    Blur { blur: f64 },
    Sharpen { matrix: Vec<f64> },
    Emboss { matrix: Vec<f64> },
    #[serde(rename = "removecolor")]
    RemoveColor { threshold: f64, distance: f64 },
    #[serde(rename = "blacknwhite")]
    BlackWhite,
    Vibrance { vibrance: f64 },
    #[serde(rename = "blendcolor")]
    BlendColor { color: String, mode: String },
    #[serde(rename = "huerotate")]
    HueRotate { rotation: f64 },
    Resize,
    Gamma { gamma: [f64; 3] },
    Saturation { saturation: f64 },
}

impl ImageFilter {
    /// Every catalog name, in picker order (without [`NO_FILTER`]).
    pub const NAMES: &'static [&'static str] = &[
        "greyscale",
        "polaroid",
        "sepia",
        "kodachrome",
        "contrast",
        "brightness",
        "brownie",
        "vintage",
        "technicolor",
        "pixelate",
        "invert",
        "blur",
        "sharpen",
        "emboss",
        "removecolor",
        "blacknwhite",
        "vibrance",
        "blendcolor",
        "huerotate",
        "resize",
        "gamma",
        "saturation",
    ];

    /// Look up a catalog entry. `"none"` yields `Ok(None)`.
    pub fn from_name(name: &str) -> Result<Option<Self>, UnknownFilter> {
        let filter = match name.trim().to_ascii_lowercase().as_str() {
            NO_FILTER => return Ok(None),
            "greyscale" | "grayscale" => Self::Greyscale,
            "polaroid" => Self::Polaroid,
            "sepia" => Self::Sepia,
            "kodachrome" => Self::Kodachrome,
            "contrast" => Self::Contrast { contrast: 0.3 },
            "brightness" => Self::Brightness { brightness: 0.8 },
            "brownie" => Self::Brownie,
            "vintage" => Self::Vintage,
            "technicolor" => Self::Technicolor,
            "pixelate" => Self::Pixelate { blocksize: 4.0 },
            "invert" => Self::Invert,
            "blur" => Self::Blur { blur: 0.1 },
            "sharpen" => Self::Sharpen {
                matrix: vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0],
            },
            "emboss" => Self::Emboss {
                matrix: vec![1.0, 1.0, 1.0, 1.0, 0.7, -1.0, -1.0, -1.0, -1.0],
            },
            "removecolor" => Self::RemoveColor {
                threshold: 0.2,
                distance: 0.5,
            },
            "blacknwhite" => Self::BlackWhite,
            "vibrance" => Self::Vibrance { vibrance: 1.0 },
            "blendcolor" => Self::BlendColor {
                color: "#00ff00".to_string(),
                mode: "multiply".to_string(),
            },
            "huerotate" => Self::HueRotate { rotation: 0.5 },
            "resize" => Self::Resize,
            "gamma" => Self::Gamma {
                gamma: [1.0, 0.5, 2.1],
            },
            "saturation" => Self::Saturation { saturation: 0.7 },
            _ => return Err(UnknownFilter(name.to_string())),
        };
        Ok(Some(filter))
    }

    /// The catalog name of this filter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Greyscale => "greyscale",
            Self::Polaroid => "polaroid",
            Self::Sepia => "sepia",
            Self::Kodachrome => "kodachrome",
            Self::Contrast { .. } => "contrast",
            Self::Brightness { .. } => "brightness",
            Self::Brownie => "brownie",
            Self::Vintage => "vintage",
            Self::Technicolor => "technicolor",
            Self::Pixelate { .. } => "pixelate",
            Self::Invert => "invert",
            Self::Blur { .. } => "blur",
            Self::Sharpen { .. } => "sharpen",
            Self::Emboss { .. } => "emboss",
            Self::RemoveColor { .. } => "removecolor",
            Self::BlackWhite => "blacknwhite",
            Self::Vibrance { .. } => "vibrance",
            Self::BlendColor { .. } => "blendcolor",
            Self::HueRotate { .. } => "huerotate",
            Self::Resize => "resize",
            Self::Gamma { .. } => "gamma",
            Self::Saturation { .. } => "saturation",
        }
    }
}
