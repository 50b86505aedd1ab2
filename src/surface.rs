use crate::{
    error::{PreviewError, PreviewResult},
    model::ViewportSize,
};

/// One independently redrawable raster layer, backed by a premultiplied
/// RGBA8 pixmap sized to the viewport.
pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl Surface {
    pub fn new(viewport: ViewportSize) -> PreviewResult<Self> {
        viewport.validate()?;
        let (width, height) = dims_u16(viewport)?;
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Resize to the viewport, reallocating (and so clearing) the pixel
    /// buffer. Returns whether the dimensions actually changed.
    pub fn resize(&mut self, viewport: ViewportSize) -> PreviewResult<bool> {
        viewport.validate()?;
        let (width, height) = dims_u16(viewport)?;
        if width == self.width && height == self.height {
            return Ok(false);
        }
        self.width = width;
        self.height = height;
        self.pixmap = vello_cpu::Pixmap::new(width, height);
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    pub(crate) fn dims(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }
}

fn dims_u16(viewport: ViewportSize) -> PreviewResult<(u16, u16)> {
    let width: u16 = viewport
        .width
        .try_into()
        .map_err(|_| PreviewError::render("surface width exceeds u16"))?;
    let height: u16 = viewport
        .height
        .try_into()
        .map_err(|_| PreviewError::render("surface height exceeds u16"))?;
    Ok((width, height))
}
