//! Scene rasterization on the sparse-strips CPU renderer.

use crate::filters::apply_filter;
use crate::geometry::outline;
use image::RgbaImage;
use kurbo::{Affine, Cap, Join, Rect, Stroke};
use peniko::{Blob, Color, ImageAlphaType, ImageData, ImageFormat, ImageSampler};
use shapy_core::Scene;
use shapy_core::shapes::{Image, SceneObject};
use shapy_core::surface::decode_data_url;
use vello_cpu::{Image as CpuImage, ImageSource, Pixmap, RenderContext};

/// Rasterize the objects of `scene` under `view` (scene to device) into a
/// `width` x `height` straight-alpha image.
///
/// `background` is painted first when given. Text is not rasterized; images
/// are drawn only when their source is an embedded data URL.
pub fn render_scene(scene: &Scene, view: Affine, width: u16, height: u16, background: Option<Color>) -> RgbaImage {
    let mut ctx = RenderContext::new(width, height);
    if let Some(color) = background {
        ctx.set_paint(color);
        ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(width), f64::from(height)));
    }
    for object in scene.objects() {
        draw_object(&mut ctx, object, view);
    }

    let mut pixmap = Pixmap::new(width, height);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    let mut image = RgbaImage::new(u32::from(width), u32::from(height));
    for (dst, p) in image.pixels_mut().zip(pixmap.take_unpremultiplied()) {
        dst.0 = [p.r, p.g, p.b, p.a];
    }
    image
}

fn draw_object(ctx: &mut RenderContext, object: &SceneObject, view: Affine) {
    let style = object.style();
    let opacity = style.opacity.clamp(0.0, 1.0) as f32;
    if opacity <= 0.0 {
        return;
    }
    let layered = opacity < 1.0;
    if layered {
        ctx.push_layer(None, None, Some(opacity), None, None);
    }

    ctx.set_transform(view * object.transform());
    match object {
        SceneObject::Image(image) => draw_image(ctx, image),
        _ => draw_shape(ctx, object),
    }
    ctx.set_transform(Affine::IDENTITY);

    if layered {
        ctx.pop_layer();
    }
}

fn draw_shape(ctx: &mut RenderContext, object: &SceneObject) {
    let Some(path) = outline(object) else {
        log::trace!("skipping {:?} without a vector outline", object.kind());
        return;
    };
    let style = object.style();

    let closed = !matches!(object, SceneObject::Path(_));
    if let Some(fill) = style.fill.filter(|_| closed) {
        ctx.set_paint(Color::from(fill));
        ctx.fill_path(&path);
    }
    if let Some(stroke) = style.stroke.filter(|_| style.stroke_width > 0.0) {
        // The pen lives in local space, so it scales with the object.
        let mut pen = Stroke::new(style.stroke_width).with_join(Join::Miter).with_caps(Cap::Butt);
        if let Some(dashes) = style.stroke_dash_array.as_deref().filter(|d| !d.is_empty()) {
            pen = pen.with_dashes(0.0, dashes.iter().copied());
        }
        ctx.set_stroke(pen);
        ctx.set_paint(Color::from(stroke));
        ctx.stroke_path(&path);
    }
}

fn draw_image(ctx: &mut RenderContext, image: &Image) {
    let Some((_, bytes)) = decode_data_url(&image.src) else {
        log::debug!("image source is not embedded, skipping");
        return;
    };
    let mut bitmap = match ::image::load_from_memory(&bytes) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(e) => {
            log::warn!("failed to decode embedded image: {e}");
            return;
        }
    };
    if let Some(filter) = image.filter() {
        apply_filter(filter, &mut bitmap);
    }

    let (w, h) = bitmap.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let data = ImageData {
        data: Blob::from(bitmap.into_raw()),
        format: ImageFormat::Rgba8,
        alpha_type: ImageAlphaType::Alpha,
        width: w,
        height: h,
    };
    let paint = CpuImage {
        image: ImageSource::from_peniko_image_data(&data),
        sampler: ImageSampler::default(),
    };

    // The bitmap's natural size may differ from the recorded one.
    let fit = Affine::scale_non_uniform(image.width / f64::from(w), image.height / f64::from(h));
    let transform = *ctx.transform() * fit;
    ctx.set_transform(transform);
    ctx.set_paint(paint);
    ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
}
