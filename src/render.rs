use std::collections::HashMap;

use crate::{
    assets::{ImageRef, PreparedImage},
    composite,
    error::{PreviewError, PreviewResult},
    model::{BASE_SIZE_FRACTION, GarmentColor, PlacementState},
    surface::Surface,
};

/// Final composited frame in row-major RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Pixel position of the placement anchor on a surface of the given size.
pub fn anchor_px(placement: &PlacementState, width: f64, height: f64) -> (f64, f64) {
    (
        placement.position().x() / 100.0 * width,
        placement.position().y() / 100.0 * height,
    )
}

/// Draw size of the design in pixels, derived from the shorter surface side,
/// the size class and the design's intrinsic scale.
pub fn design_size_px(min_side: f64, placement: &PlacementState, intrinsic_scale: f64) -> f64 {
    min_side * BASE_SIZE_FRACTION * placement.size_class().scale() * intrinsic_scale
}

/// Memoized conversion of [`PreparedImage`] bytes into backend image paints,
/// keyed by ref so repeated repaints don't re-upload pixels.
#[derive(Default)]
pub struct PaintCache {
    map: HashMap<ImageRef, vello_cpu::Image>,
}

impl PaintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paint_for(
        &mut self,
        image_ref: &ImageRef,
        image: &PreparedImage,
    ) -> PreviewResult<vello_cpu::Image> {
        if let Some(paint) = self.map.get(image_ref) {
            return Ok(paint.clone());
        }

        let pixmap =
            premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.map.insert(image_ref.clone(), paint.clone());
        Ok(paint)
    }

    pub fn invalidate(&mut self, image_ref: &ImageRef) {
        self.map.remove(image_ref);
    }
}

/// Paint the garment mockup stretched to fill the surface exactly (the
/// display frame is a fixed 3:4 box, so no letterboxing), then recolor it
/// when the variant's color has no dedicated asset.
pub fn paint_background(
    surface: &mut Surface,
    paint: &vello_cpu::Image,
    tint: Option<GarmentColor>,
) -> PreviewResult<()> {
    let (img_w, img_h) = image_paint_size(paint)?;
    let (w16, h16) = surface.dims();

    surface.clear();
    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    let transform = kurbo::Affine::scale_non_uniform(
        f64::from(surface.width()) / img_w,
        f64::from(surface.height()) / img_h,
    );
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(paint.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, img_w, img_h));
    ctx.flush();
    ctx.render_to_pixmap(surface.pixmap_mut());

    if let Some(color) = tint {
        composite::tint_in_place(surface.data_mut(), color)?;
    }
    Ok(())
}

/// Clear the design layer and draw the design centered on the placement
/// anchor, rotated clockwise about it, at the placement-derived size.
///
/// A fresh render context (and so a fresh transform) is built per call, so
/// repeated repaints never accumulate rotation.
pub fn paint_foreground(
    surface: &mut Surface,
    paint: &vello_cpu::Image,
    placement: &PlacementState,
    intrinsic_scale: f64,
) -> PreviewResult<()> {
    let (img_w, img_h) = image_paint_size(paint)?;
    let (w16, h16) = surface.dims();
    let w = f64::from(surface.width());
    let h = f64::from(surface.height());

    let (ax, ay) = anchor_px(placement, w, h);
    let size = design_size_px(w.min(h), placement, intrinsic_scale);
    let radians = f64::from(placement.rotation()) * std::f64::consts::PI / 180.0;

    surface.clear();
    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    let transform = kurbo::Affine::translate((ax, ay))
        * kurbo::Affine::rotate(radians)
        * kurbo::Affine::translate((-size / 2.0, -size / 2.0))
        * kurbo::Affine::scale_non_uniform(size / img_w, size / img_h);
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(paint.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, img_w, img_h));
    ctx.flush();
    ctx.render_to_pixmap(surface.pixmap_mut());
    Ok(())
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_paint_size(image: &vello_cpu::Image) -> PreviewResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        vello_cpu::ImageSource::OpaqueId(_) => Err(PreviewError::render(
            "cpu painters do not support opaque image ids",
        )),
    }
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> PreviewResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PreviewError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PreviewError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(PreviewError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}
