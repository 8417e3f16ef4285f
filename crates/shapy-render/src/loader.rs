//! Image loading from data URLs and the local filesystem.

use image::ImageReader;
use shapy_core::storage::BoxFuture;
use shapy_core::surface::{ImageLoadError, ImageLoader, LoadedImage, decode_data_url, encode_data_url};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Loads `data:` URLs and local files.
///
/// File contents are embedded into the returned source as a data URL, so
/// documents stay self-contained. Remote URLs are rejected.
#[derive(Debug, Clone, Default)]
pub struct FsImageLoader {
    /// Directory relative paths are resolved against.
    base_dir: Option<PathBuf>,
}

impl FsImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn load_sync(&self, url: &str) -> Result<LoadedImage, ImageLoadError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(ImageLoadError::Unsupported(url.to_string()));
        }
        let (embedded, bytes) = match decode_data_url(url) {
            Some((_, bytes)) => (true, bytes),
            None if url.starts_with("data:") => {
                return Err(ImageLoadError::Decode {
                    url: url.to_string(),
                    reason: "malformed data URL".to_string(),
                });
            }
            None => {
                let path = self.resolve(url);
                let bytes = std::fs::read(&path).map_err(|e| ImageLoadError::Fetch {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
                (false, bytes)
            }
        };

        let decode_error = |reason: String| ImageLoadError::Decode {
            url: url.to_string(),
            reason,
        };
        let reader = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| decode_error(e.to_string()))?;
        let Some(format) = reader.format() else {
            return Err(decode_error("unrecognized image format".to_string()));
        };
        let (width, height) = reader.into_dimensions().map_err(|e| decode_error(e.to_string()))?;
        log::debug!("loaded {width}x{height} {format:?} image");

        let src = if embedded {
            url.to_string()
        } else {
            encode_data_url(format.to_mime_type(), &bytes)
        };
        Ok(LoadedImage {
            src,
            width: f64::from(width),
            height: f64::from(height),
        })
    }
}

impl ImageLoader for FsImageLoader {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<LoadedImage, ImageLoadError>> {
        Box::pin(async move { self.load_sync(url) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::encode_png;
    use image::RgbaImage;
    use pollster::block_on;

    fn tiny_png() -> Vec<u8> {
        encode_png(&RgbaImage::new(3, 2)).unwrap()
    }

    #[test]
    fn test_data_url_is_kept() {
        let url = encode_data_url("image/png", &tiny_png());
        let loaded = block_on(FsImageLoader::new().load(&url)).unwrap();
        assert_eq!(loaded.src, url);
        assert_eq!((loaded.width, loaded.height), (3.0, 2.0));
    }

    #[test]
    fn test_file_is_embedded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pic.png"), tiny_png()).unwrap();

        let loader = FsImageLoader::with_base_dir(dir.path());
        let loaded = block_on(loader.load("pic.png")).unwrap();
        assert!(loaded.src.starts_with("data:image/png;base64,"));
        assert_eq!(loaded.width, 3.0);
    }

    #[test]
    fn test_failures() {
        let loader = FsImageLoader::new();
        assert!(matches!(
            block_on(loader.load("/no/such/file.png")),
            Err(ImageLoadError::Fetch { .. })
        ));
        assert!(matches!(
            block_on(loader.load("https://example.com/a.png")),
            Err(ImageLoadError::Unsupported(_))
        ));
        let not_an_image = encode_data_url("image/png", b"hello");
        assert!(matches!(
            block_on(loader.load(&not_an_image)),
            Err(ImageLoadError::Decode { .. })
        ));
    }
}
