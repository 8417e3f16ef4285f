//! Pixel implementations of the image filter catalog.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use shapy_core::SerializableColor;
use shapy_core::filters::ImageFilter;

/// 3x4 color matrix; the last column is an offset in 0..1 units.
type ColorMatrix = [[f64; 4]; 3];

const SEPIA: ColorMatrix = [
    [0.393, 0.769, 0.189, 0.0],
    [0.349, 0.686, 0.168, 0.0],
    [0.272, 0.534, 0.131, 0.0],
];

const BLACK_WHITE: ColorMatrix = [
    [1.5, 1.5, 1.5, -1.0],
    [1.5, 1.5, 1.5, -1.0],
    [1.5, 1.5, 1.5, -1.0],
];

const POLAROID: ColorMatrix = [
    [1.438, -0.062, -0.062, 0.0],
    [-0.122, 1.378, -0.122, 0.0],
    [-0.016, -0.016, 1.483, 0.0],
];

const KODACHROME: ColorMatrix = [
    [1.128_558_24, -0.396_738_23, -0.039_925_59, 0.249_919_95],
    [-0.164_043_4, 1.083_525_16, -0.054_988_05, 0.096_989_83],
    [-0.167_860_11, -0.560_341_63, 1.601_485_08, 0.139_724_82],
];

const BROWNIE: ColorMatrix = [
    [0.5997, 0.34553, -0.2708, 0.186],
    [-0.0377, 0.86095, 0.15059, -0.1449],
    [0.24113, -0.07441, 0.44972, -0.02965],
];

const VINTAGE: ColorMatrix = [
    [0.62793, 0.32021, -0.03965, 0.03784],
    [0.02578, 0.64411, 0.03259, 0.02926],
    [0.0466, -0.08512, 0.52416, 0.02023],
];

const TECHNICOLOR: ColorMatrix = [
    [1.91252, -0.85453, -0.09155, 0.04624],
    [-0.30878, 1.76589, -0.10601, -0.27589],
    [-0.2311, -0.75018, 1.84759, 0.12137],
];

/// Color removed by `removecolor`.
const REMOVED_COLOR: [f64; 3] = [255.0, 255.0, 255.0];

/// Apply `filter` in place. Returns false when the filter leaves pixels
/// alone (`resize` resamples at draw time).
pub fn apply_filter(filter: &ImageFilter, image: &mut RgbaImage) -> bool {
    match filter {
        ImageFilter::Greyscale => {
            *image = DynamicImage::ImageRgba8(image.clone()).grayscale().to_rgba8();
        }
        ImageFilter::Invert => imageops::invert(image),
        ImageFilter::Brightness { brightness } => {
            *image = imageops::brighten(image, (brightness * 255.0).round() as i32);
        }
        ImageFilter::Contrast { contrast } => {
            *image = imageops::contrast(image, (contrast * 100.0) as f32);
        }
        ImageFilter::HueRotate { rotation } => {
            *image = imageops::huerotate(image, (rotation * 180.0).round() as i32);
        }
        ImageFilter::Blur { blur } => {
            // The amount is relative to the image size.
            let sigma = (blur * f64::from(image.width().max(image.height())) / 4.0).max(0.5);
            *image = imageops::blur(image, sigma as f32);
        }
        ImageFilter::Sharpen { matrix } | ImageFilter::Emboss { matrix } => {
            let Some(kernel) = kernel3x3(matrix) else {
                log::warn!("{} kernel must have 9 entries, got {}", filter.name(), matrix.len());
                return false;
            };
            *image = imageops::filter3x3(image, &kernel);
        }
        ImageFilter::Pixelate { blocksize } => pixelate(image, blocksize.max(1.0) as u32),
        ImageFilter::Sepia => map_rgb(image, |rgb| color_matrix(&SEPIA, rgb)),
        ImageFilter::BlackWhite => map_rgb(image, |rgb| color_matrix(&BLACK_WHITE, rgb)),
        ImageFilter::Polaroid => map_rgb(image, |rgb| color_matrix(&POLAROID, rgb)),
        ImageFilter::Kodachrome => map_rgb(image, |rgb| color_matrix(&KODACHROME, rgb)),
        ImageFilter::Brownie => map_rgb(image, |rgb| color_matrix(&BROWNIE, rgb)),
        ImageFilter::Vintage => map_rgb(image, |rgb| color_matrix(&VINTAGE, rgb)),
        ImageFilter::Technicolor => map_rgb(image, |rgb| color_matrix(&TECHNICOLOR, rgb)),
        ImageFilter::Saturation { saturation } => {
            let adjust = -saturation;
            map_rgb(image, |rgb| {
                let max = rgb[0].max(rgb[1]).max(rgb[2]);
                rgb.map(|v| v + (max - v) * adjust)
            });
        }
        ImageFilter::Vibrance { vibrance } => {
            let adjust = -vibrance;
            map_rgb(image, |rgb| {
                let max = rgb[0].max(rgb[1]).max(rgb[2]);
                let avg = (rgb[0] + rgb[1] + rgb[2]) / 3.0;
                let amount = (max - avg).abs() * 2.0 / 255.0 * adjust;
                rgb.map(|v| if v == max { v } else { v + (max - v) * amount })
            });
        }
        ImageFilter::Gamma { gamma } => {
            let inverse = gamma.map(|g| if g > 0.0 { 1.0 / g } else { 1.0 });
            map_rgb(image, |[r, g, b]| {
                [
                    255.0 * (r / 255.0).powf(inverse[0]),
                    255.0 * (g / 255.0).powf(inverse[1]),
                    255.0 * (b / 255.0).powf(inverse[2]),
                ]
            });
        }
        ImageFilter::RemoveColor { distance, .. } => remove_color(image, REMOVED_COLOR, distance * 255.0),
        ImageFilter::BlendColor { color, mode } => {
            let Ok(tint) = color.parse::<SerializableColor>() else {
                log::warn!("blendcolor: unreadable color {color:?}");
                return false;
            };
            let Some(blend) = blend_fn(mode) else {
                log::warn!("blendcolor: unsupported mode {mode:?}");
                return false;
            };
            let tint = [f64::from(tint.r), f64::from(tint.g), f64::from(tint.b)];
            map_rgb(image, |rgb| [0, 1, 2].map(|i| blend(rgb[i], tint[i])));
        }
        ImageFilter::Resize => {
            log::debug!("resize filter resamples at draw time");
            return false;
        }
    }
    true
}

fn color_matrix(m: &ColorMatrix, [r, g, b]: [f64; 3]) -> [f64; 3] {
    m.map(|row| row[0] * r + row[1] * g + row[2] * b + row[3] * 255.0)
}

fn map_rgb(image: &mut RgbaImage, f: impl Fn([f64; 3]) -> [f64; 3]) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let out = f([f64::from(r), f64::from(g), f64::from(b)]);
        for (channel, value) in pixel.0.iter_mut().zip(out) {
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
    }
}

fn kernel3x3(matrix: &[f64]) -> Option<[f32; 9]> {
    let kernel: [f64; 9] = matrix.try_into().ok()?;
    Some(kernel.map(|v| v as f32))
}

/// Downsample then upsample with nearest-neighbor sampling, so each block
/// takes a single color.
fn pixelate(image: &mut RgbaImage, block: u32) {
    let (width, height) = image.dimensions();
    if block <= 1 || width == 0 || height == 0 {
        return;
    }
    let small = imageops::resize(
        image,
        width.div_ceil(block),
        height.div_ceil(block),
        FilterType::Nearest,
    );
    *image = imageops::resize(&small, width, height, FilterType::Nearest);
}

/// Make pixels within `distance` of `color` on every channel transparent.
fn remove_color(image: &mut RgbaImage, color: [f64; 3], distance: f64) {
    for pixel in image.pixels_mut() {
        let near = pixel.0[..3]
            .iter()
            .zip(color)
            .all(|(&v, c)| (f64::from(v) - c).abs() <= distance);
        if near {
            pixel.0[3] = 0;
        }
    }
}

fn blend_fn(mode: &str) -> Option<fn(f64, f64) -> f64> {
    let blend: fn(f64, f64) -> f64 = match mode {
        "multiply" => |s, t| s * t / 255.0,
        "screen" => |s, t| 255.0 - (255.0 - s) * (255.0 - t) / 255.0,
        "add" => |s, t| s + t,
        "diff" | "difference" => |s, t| (s - t).abs(),
        "subtract" => |s, t| s - t,
        "lighten" => f64::max,
        "darken" => f64::min,
        "exclusion" => |s, t| s + t - 2.0 * s * t / 255.0,
        _ => return None,
    };
    Some(blend)
}
