//! Seams to the pixel engine and the image fetcher.
//!
//! The editor core never draws or decodes anything itself. Hosts plug in a
//! [`RenderSurface`] and an [`ImageLoader`]; `shapy-render` ships headless
//! versions of both.

use crate::scene::Scene;
use crate::storage::BoxFuture;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use kurbo::{Affine, Rect};
use thiserror::Error;

/// Render surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("export format not supported by this surface: {0:?}")]
    Unsupported(ExportFormat),
    #[error("encoding failed: {0}")]
    Encode(String),
}

/// Image loading errors.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("unsupported image source: {0}")]
    Unsupported(String),
}

/// File formats the editor can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Svg,
    Json,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Svg => "svg",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Json => "application/json",
        }
    }

    /// Format for a file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "svg" => Some(ExportFormat::Svg),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Parameters of a rasterize/vectorize request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Scene region to export; always the workspace bounds.
    pub region: Rect,
    /// Encoder quality in `0.0..=1.0` (JPEG only).
    pub quality: f64,
}

/// The pixel engine behind the editor.
pub trait RenderSurface {
    /// Redraw the scene on the next frame.
    fn request_render(&mut self, scene: &Scene);

    /// Replace the scene-to-screen transform.
    fn set_viewport_transform(&mut self, transform: Affine);

    /// Encode `options.region` of the scene as a data URL.
    fn to_data_url(&mut self, scene: &Scene, options: &ExportOptions) -> Result<String, SurfaceError>;
}

/// Surface that draws nothing, for hosts without pixels.
#[derive(Debug, Default)]
pub struct NullSurface {
    renders: usize,
    transform: Affine,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of render requests received.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }
}

impl RenderSurface for NullSurface {
    fn request_render(&mut self, _scene: &Scene) {
        self.renders += 1;
    }

    fn set_viewport_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn to_data_url(&mut self, _scene: &Scene, options: &ExportOptions) -> Result<String, SurfaceError> {
        Err(SurfaceError::Unsupported(options.format))
    }
}

/// A fetched and decoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    /// Source the image object will reference.
    pub src: String,
    /// Natural width in pixels.
    pub width: f64,
    /// Natural height in pixels.
    pub height: f64,
}

/// Fetches and decodes bitmaps for image import.
pub trait ImageLoader {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<LoadedImage, ImageLoadError>>;
}

/// Loader that rejects every source.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImageLoader;

impl ImageLoader for NoImageLoader {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<LoadedImage, ImageLoadError>> {
        Box::pin(async move { Err(ImageLoadError::Unsupported(url.to_string())) })
    }
}

/// Build a base64 `data:` URL.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its MIME type and payload.
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime_type = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime_type.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_round_trip() {
        let url = encode_data_url("application/json", b"{\n\t\"a\": 1\n}");
        assert!(url.starts_with("data:application/json;base64,"));
        let (mime, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(mime, "application/json");
        assert_eq!(bytes, b"{\n\t\"a\": 1\n}");
    }

    #[test]
    fn test_decode_rejects_plain_urls() {
        assert!(decode_data_url("https://example.com/a.png").is_none());
        assert!(decode_data_url("data:text/plain,hello").is_none());
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::from_extension("JPEG"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_null_surface_counts_renders() {
        let mut surface = NullSurface::new();
        surface.request_render(&Scene::new());
        assert_eq!(surface.render_count(), 1);
        let options = ExportOptions {
            format: ExportFormat::Png,
            region: Rect::new(0.0, 0.0, 1.0, 1.0),
            quality: 1.0,
        };
        assert!(surface.to_data_url(&Scene::new(), &options).is_err());
    }
}
