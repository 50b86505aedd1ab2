use crate::{
    assets::{AssetFetcher, ImageRef},
    cache::{ImageCache, LoadEvent, LoadState},
    composite,
    error::PreviewResult,
    model::{DesignAsset, GarmentVariant, PlacementState, ROTATE_STEP_DEG, SizeClass, ViewportSize},
    render::{self, FrameRgba, PaintCache},
    resolver::{AssetResolver, ResolvedGarment},
    snapshot::DesignSnapshot,
    surface::Surface,
};

/// How often each layer's raster surface has actually been painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub background_paints: u64,
    pub foreground_paints: u64,
}

/// Owner of the two layer surfaces and of the placement/selection state.
///
/// The background surface holds the garment mockup and is repainted only
/// when the variant or the viewport changes; the foreground surface holds
/// the design and follows placement changes. The two are composited on
/// demand but never merged, so placement edits never touch the expensive
/// background paint.
pub struct PreviewStage {
    resolver: AssetResolver,
    cache: ImageCache,
    paints: PaintCache,
    background: Surface,
    foreground: Surface,
    viewport: ViewportSize,
    variant: Option<GarmentVariant>,
    design: Option<DesignAsset>,
    placement: PlacementState,
    background_res: Option<ResolvedGarment>,
    design_ref: Option<ImageRef>,
    background_dirty: bool,
    foreground_dirty: bool,
    stats: PaintStats,
}

impl PreviewStage {
    pub fn new(viewport: ViewportSize) -> PreviewResult<Self> {
        Ok(Self {
            resolver: AssetResolver::new(),
            cache: ImageCache::new(),
            paints: PaintCache::new(),
            background: Surface::new(viewport)?,
            foreground: Surface::new(viewport)?,
            viewport,
            variant: None,
            design: None,
            placement: PlacementState::default(),
            background_res: None,
            design_ref: None,
            background_dirty: false,
            foreground_dirty: false,
            stats: PaintStats::default(),
        })
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn variant(&self) -> Option<&GarmentVariant> {
        self.variant.as_ref()
    }

    pub fn design(&self) -> Option<&DesignAsset> {
        self.design.as_ref()
    }

    pub fn placement(&self) -> &PlacementState {
        &self.placement
    }

    pub fn stats(&self) -> PaintStats {
        self.stats
    }

    /// Select the garment. Changing the variant invalidates the background
    /// cache entry when the resolved base image changes; a tint-only change
    /// keeps the decoded base and just repaints.
    pub fn set_variant(&mut self, variant: GarmentVariant) {
        let resolved = self.resolver.resolve_garment(&variant);

        let ref_changed = self
            .background_res
            .as_ref()
            .is_none_or(|old| old.image_ref != resolved.image_ref);
        if ref_changed {
            if let Some(old) = self.background_res.take() {
                self.cache.invalidate(&old.image_ref);
                self.paints.invalidate(&old.image_ref);
            }
            self.cache.request(&resolved.image_ref);
        }

        self.variant = Some(variant);
        self.background_res = Some(resolved);
        self.background_dirty = true;
    }

    /// Select the design to place. The first selection installs the default
    /// placement (centered, 0°, medium); later selections keep the current
    /// placement. The previous design's cache entry is invalidated when the
    /// image reference changes.
    pub fn select_design(&mut self, design: DesignAsset) -> PreviewResult<()> {
        design.validate()?;

        if self.design.is_none() {
            self.placement = PlacementState::default();
        }

        let ref_changed = self
            .design_ref
            .as_ref()
            .is_none_or(|old| *old != design.image);
        if ref_changed {
            if let Some(old) = self.design_ref.take() {
                self.cache.invalidate(&old);
                self.paints.invalidate(&old);
            }
            self.cache.request(&design.image);
        }

        self.design_ref = Some(design.image.clone());
        self.design = Some(design);
        self.foreground_dirty = true;
        Ok(())
    }

    pub fn clear_design(&mut self) {
        if let Some(old) = self.design_ref.take() {
            self.cache.invalidate(&old);
            self.paints.invalidate(&old);
        }
        self.design = None;
        self.foreground_dirty = true;
    }

    pub fn design_selected(&self) -> bool {
        self.design.is_some()
    }

    /// Resize both layer surfaces to the new viewport (clearing their
    /// contents) and schedule a full background-then-foreground repaint.
    pub fn set_viewport(&mut self, viewport: ViewportSize) -> PreviewResult<()> {
        let bg_changed = self.background.resize(viewport)?;
        let fg_changed = self.foreground.resize(viewport)?;
        if bg_changed || fg_changed {
            tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");
            self.viewport = viewport;
            self.background_dirty = true;
            self.foreground_dirty = true;
        }
        Ok(())
    }

    /// Placement mutation outside a drag: repaints the foreground.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.placement.set_position(x, y);
        self.foreground_dirty = true;
    }

    /// Placement mutation mid-drag: the drag proxy tracks the pointer, so
    /// the raster surface is left alone until the drag ends.
    pub(crate) fn publish_drag_position(&mut self, x: f64, y: f64) {
        self.placement.set_position(x, y);
    }

    /// Schedule the single foreground repaint that ends a drag.
    pub(crate) fn end_drag(&mut self) {
        self.foreground_dirty = true;
    }

    pub fn set_size_class(&mut self, size_class: SizeClass) {
        self.placement.set_size_class(size_class);
        self.foreground_dirty = true;
    }

    /// Reinstate a previously saved placement (values re-clamp on the way
    /// in through the placement type itself).
    pub fn restore_placement(&mut self, placement: PlacementState) {
        self.placement = placement;
        self.foreground_dirty = true;
    }

    /// One discrete rotate action. No-op unless a design is selected.
    /// Returns whether the rotation was applied.
    pub fn rotate_design(&mut self) -> bool {
        if self.design.is_none() {
            return false;
        }
        self.placement.rotate_by(ROTATE_STEP_DEG);
        self.foreground_dirty = true;
        true
    }

    /// Run queued image decodes and mark the affected layers dirty as their
    /// bitmaps arrive.
    pub fn pump_assets(&mut self, fetcher: &dyn AssetFetcher) -> Vec<LoadEvent> {
        let events = self.cache.pump_all(fetcher);
        for ev in &events {
            if self
                .background_res
                .as_ref()
                .is_some_and(|r| r.image_ref == ev.image_ref)
            {
                self.background_dirty = true;
            }
            if self.design_ref.as_ref().is_some_and(|r| *r == ev.image_ref) {
                self.foreground_dirty = true;
            }
        }
        events
    }

    /// Repaint whatever is dirty, background strictly before foreground.
    ///
    /// A layer whose bitmap is unavailable is cleared (drawn empty); a layer
    /// whose bitmap is still pending stays dirty and is painted on a later
    /// flush, once its load event lands.
    pub fn flush_paints(&mut self) -> PreviewResult<()> {
        if self.background_dirty {
            match self.background_bitmap() {
                BitmapLookup::Ready(paint) => {
                    let tint = self.background_res.as_ref().and_then(|r| r.tint);
                    render::paint_background(&mut self.background, &paint, tint)?;
                    self.stats.background_paints += 1;
                    self.background_dirty = false;
                }
                BitmapLookup::Absent => {
                    self.background.clear();
                    self.background_dirty = false;
                }
                BitmapLookup::Pending => {}
            }
        }

        if self.foreground_dirty {
            match self.foreground_bitmap() {
                BitmapLookup::Ready(paint) => {
                    let intrinsic = self
                        .design
                        .as_ref()
                        .map(|d| d.intrinsic_scale)
                        .unwrap_or(1.0);
                    render::paint_foreground(
                        &mut self.foreground,
                        &paint,
                        &self.placement,
                        intrinsic,
                    )?;
                    self.stats.foreground_paints += 1;
                    self.foreground_dirty = false;
                }
                BitmapLookup::Absent => {
                    self.foreground.clear();
                    self.foreground_dirty = false;
                }
                BitmapLookup::Pending => {}
            }
        }

        Ok(())
    }

    /// Composite the two layers (background below, foreground above) into a
    /// fresh frame. The layer surfaces themselves stay separate.
    pub fn composite(&mut self) -> PreviewResult<FrameRgba> {
        self.flush_paints()?;

        let mut data = self.background.data().to_vec();
        composite::over_in_place(&mut data, self.foreground.data(), 1.0)?;

        Ok(FrameRgba {
            width: self.background.width(),
            height: self.background.height(),
            data,
            premultiplied: true,
        })
    }

    /// Read-only snapshot for the summary, persistence and order
    /// collaborators. `None` until both a garment and a design are selected.
    pub fn snapshot(&self) -> Option<DesignSnapshot> {
        Some(DesignSnapshot {
            garment_variant: *self.variant.as_ref()?,
            design: self.design.as_ref()?.clone(),
            placement: self.placement,
        })
    }

    pub fn decode_count(&self, image_ref: &ImageRef) -> u64 {
        self.cache.decode_count(image_ref)
    }

    fn background_bitmap(&mut self) -> BitmapLookup {
        let Some(res) = self.background_res.as_ref() else {
            return BitmapLookup::Absent;
        };
        let image_ref = res.image_ref.clone();
        lookup(&self.cache, &mut self.paints, &image_ref)
    }

    fn foreground_bitmap(&mut self) -> BitmapLookup {
        let Some(image_ref) = self.design_ref.clone() else {
            return BitmapLookup::Absent;
        };
        lookup(&self.cache, &mut self.paints, &image_ref)
    }
}

enum BitmapLookup {
    Ready(vello_cpu::Image),
    Pending,
    Absent,
}

fn lookup(cache: &ImageCache, paints: &mut PaintCache, image_ref: &ImageRef) -> BitmapLookup {
    match cache.state(image_ref) {
        Some(LoadState::Ready(img)) => match paints.paint_for(image_ref, img) {
            Ok(paint) => BitmapLookup::Ready(paint),
            Err(err) => {
                tracing::warn!(%image_ref, error = %err, "image paint conversion failed");
                BitmapLookup::Absent
            }
        },
        Some(LoadState::Pending) => BitmapLookup::Pending,
        Some(LoadState::Unavailable) | None => BitmapLookup::Absent,
    }
}
