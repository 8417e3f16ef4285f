//! Headless render surface: CPU raster and SVG export without a window.

use crate::raster::render_scene;
use crate::svg::render_svg;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, RgbaImage};
use kurbo::{Affine, Vec2};
use peniko::Color;
use shapy_core::surface::{ExportFormat, ExportOptions, RenderSurface, SurfaceError, encode_data_url};
use shapy_core::{Scene, SerializableColor};

/// Largest export edge in pixels.
pub const MAX_EXPORT_DIMENSION: u16 = 8192;

/// A [`RenderSurface`] that draws on demand instead of per frame.
///
/// Render requests are only counted; pixels are produced when exporting.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    transform: Affine,
    render_requests: u64,
    /// Background used where JPEG output has no alpha channel.
    matte: SerializableColor,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            transform: Affine::IDENTITY,
            render_requests: 0,
            matte: SerializableColor::white(),
        }
    }

    pub fn with_matte(mut self, matte: SerializableColor) -> Self {
        self.matte = matte;
        self
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }

    /// Rasterize `options.region` under the current view transform, over
    /// `background` when given.
    pub fn rasterize(
        &self,
        scene: &Scene,
        options: &ExportOptions,
        background: Option<Color>,
    ) -> Result<RgbaImage, SurfaceError> {
        let device = self.transform.transform_rect_bbox(options.region);
        let width = device.width().round();
        let height = device.height().round();
        if !(width >= 1.0 && height >= 1.0) {
            return Err(SurfaceError::Encode(format!(
                "export region {}x{} is empty",
                device.width(),
                device.height()
            )));
        }
        let max = f64::from(MAX_EXPORT_DIMENSION);
        if width > max || height > max {
            return Err(SurfaceError::Encode(format!(
                "export region {width}x{height} exceeds {MAX_EXPORT_DIMENSION}px"
            )));
        }
        let view = Affine::translate(-Vec2::new(device.x0, device.y0)) * self.transform;
        Ok(render_scene(scene, view, width as u16, height as u16, background))
    }
}

impl RenderSurface for HeadlessSurface {
    fn request_render(&mut self, scene: &Scene) {
        self.render_requests += 1;
        log::trace!("render requested for {} objects", scene.len());
    }

    fn set_viewport_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn to_data_url(&mut self, scene: &Scene, options: &ExportOptions) -> Result<String, SurfaceError> {
        let bytes = match options.format {
            ExportFormat::Png => encode_png(&self.rasterize(scene, options, None)?)?,
            ExportFormat::Jpeg => {
                let matte = Color::from(SerializableColor::new(self.matte.r, self.matte.g, self.matte.b, 255));
                encode_jpeg(&self.rasterize(scene, options, Some(matte))?, options.quality)?
            }
            ExportFormat::Svg => render_svg(scene, options.region).into_bytes(),
            ExportFormat::Json => return Err(SurfaceError::Unsupported(ExportFormat::Json)),
        };
        log::debug!("encoded {} bytes of {}", bytes.len(), options.format.mime_type());
        Ok(encode_data_url(options.format.mime_type(), &bytes))
    }
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, SurfaceError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| SurfaceError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| SurfaceError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

/// Encode to JPEG at `quality` (0.0 to 1.0). Alpha is dropped, so callers
/// rasterize over an opaque background first.
pub fn encode_jpeg(image: &RgbaImage, quality: f64) -> Result<Vec<u8>, SurfaceError> {
    let quality = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, quality)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| SurfaceError::Encode(format!("JPEG: {e}")))?;
    Ok(jpeg_data)
}
