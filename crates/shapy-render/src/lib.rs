//! Shapy Render Library
//!
//! Headless pixel engine for the Shapy editor core: a vello_cpu rasterizer for
//! PNG/JPEG export, an SVG writer, and an image loader for local files and
//! data URLs.

mod filters;
mod geometry;
mod loader;
mod raster;
mod surface;
mod svg;

pub use filters::apply_filter;
pub use geometry::outline;
pub use loader::FsImageLoader;
pub use raster::render_scene;
pub use surface::{HeadlessSurface, MAX_EXPORT_DIMENSION, encode_jpeg, encode_png};
pub use svg::render_svg;
