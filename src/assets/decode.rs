use std::sync::Arc;

use anyhow::Context as _;

use crate::{
    assets::{ImageRef, PreparedImage},
    error::{PreviewError, PreviewResult},
};

/// Decode asset bytes into a [`PreparedImage`], dispatching on the ref's
/// extension: SVG assets are rasterized at their intrinsic size, everything
/// else goes through the `image` crate.
pub fn decode_asset(image_ref: &ImageRef, bytes: &[u8]) -> PreviewResult<PreparedImage> {
    if image_ref.is_svg() {
        decode_svg(bytes)
    } else {
        decode_image(bytes)
    }
}

pub fn decode_image(bytes: &[u8]) -> PreviewResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub fn decode_svg(bytes: &[u8]) -> PreviewResult<PreparedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let width = dim_to_px(size.width())?;
    let height = dim_to_px(size.height())?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PreviewError::decode("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

fn dim_to_px(v: f32) -> PreviewResult<u32> {
    if !v.is_finite() || v <= 0.0 {
        return Err(PreviewError::decode("svg has invalid width/height"));
    }
    let px = (v.ceil() as u32).max(1);

    const MAX_DIM: u32 = 16_384;
    if px > MAX_DIM {
        return Err(PreviewError::decode(format!(
            "svg raster dimension too large: {px} (max {MAX_DIM})"
        )));
    }
    Ok(px)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
