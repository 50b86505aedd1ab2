use crate::{
    model::DRAG_THROTTLE_MS,
    render::{anchor_px, design_size_px},
    stage::PreviewStage,
};

/// Wall-clock source for the drag throttle. Injectable so tests can drive
/// the state machine with synthetic time.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug)]
pub struct WallClock {
    start: std::time::Instant,
}

impl Default for WallClock {
    fn default() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Clock for WallClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Pointer sample in surface-local device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPx {
    pub x: f64,
    pub y: f64,
}

/// What happened to one pointer-move sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not dragging; the sample was a no-op.
    Ignored,
    /// Inside the throttle window; kept as the pending sample (last value
    /// wins), not published.
    Coalesced,
    /// Published to the placement state.
    Applied,
}

/// Lightweight stand-in drawn by the host while a drag is active, in place
/// of the raster foreground surface. Its fields are derived from the same
/// placement math as the raster paint, so the end states are
/// pixel-equivalent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragProxy {
    pub x_pct: f64,
    pub y_pct: f64,
    pub size_px: f64,
    pub rotation_deg: u16,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Dragging {
        offset_x: f64,
        offset_y: f64,
        last_accept_ms: Option<u64>,
        pending: Option<(f64, f64)>,
    },
}

/// Drag/rotate gesture state machine: `Idle → Dragging → Idle`, with
/// rotation as a discrete one-shot action available in either state.
///
/// All placement mutation funnels through the stage's clamping setters, so
/// no pointer sequence can produce an out-of-bounds position.
pub struct InteractionController<C: Clock = WallClock> {
    phase: Phase,
    clock: C,
}

impl Default for InteractionController<WallClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController<WallClock> {
    pub fn new() -> Self {
        Self::with_clock(WallClock::default())
    }
}

impl<C: Clock> InteractionController<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            phase: Phase::Idle,
            clock,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Pointer-down on the design layer. Starts a drag only when a design is
    /// selected (otherwise a no-op), recording the offset between pointer
    /// and anchor so the design does not jump to the pointer on grab.
    pub fn pointer_down(&mut self, stage: &PreviewStage, pointer: PointerPx) -> bool {
        if !stage.design_selected() || self.is_dragging() {
            return false;
        }

        let w = f64::from(stage.viewport().width);
        let h = f64::from(stage.viewport().height);
        let (ax, ay) = anchor_px(stage.placement(), w, h);

        self.phase = Phase::Dragging {
            offset_x: pointer.x - ax,
            offset_y: pointer.y - ay,
            last_accept_ms: None,
            pending: None,
        };
        true
    }

    /// Pointer-move while dragging. Samples inside the throttle window are
    /// coalesced (last value wins); accepted samples are clamped and
    /// published, but the raster surface is not repainted until drag end.
    pub fn pointer_move(&mut self, stage: &mut PreviewStage, pointer: PointerPx) -> MoveOutcome {
        let Phase::Dragging {
            offset_x,
            offset_y,
            last_accept_ms,
            pending,
        } = &mut self.phase
        else {
            return MoveOutcome::Ignored;
        };

        let w = f64::from(stage.viewport().width);
        let h = f64::from(stage.viewport().height);
        let raw_x = (pointer.x - *offset_x) / w * 100.0;
        let raw_y = (pointer.y - *offset_y) / h * 100.0;

        let now = self.clock.now_ms();
        if last_accept_ms.is_some_and(|t| now.saturating_sub(t) < DRAG_THROTTLE_MS) {
            *pending = Some((raw_x, raw_y));
            return MoveOutcome::Coalesced;
        }

        *last_accept_ms = Some(now);
        *pending = None;
        stage.publish_drag_position(raw_x, raw_y);
        MoveOutcome::Applied
    }

    /// Pointer-up, wherever it lands (the host observes release globally).
    /// Applies the pending coalesced sample, returns to `Idle`, and
    /// schedules exactly one foreground repaint. Returns whether a drag
    /// actually ended.
    pub fn pointer_up(&mut self, stage: &mut PreviewStage) -> bool {
        let Phase::Dragging { pending, .. } = &self.phase else {
            return false;
        };

        if let Some((x, y)) = *pending {
            stage.publish_drag_position(x, y);
        }
        self.phase = Phase::Idle;
        stage.end_drag();
        true
    }

    /// Discrete rotate action: +15° modulo 360, independent of drag state.
    /// No-op (returns false) when no design is selected.
    pub fn rotate(&mut self, stage: &mut PreviewStage) -> bool {
        stage.rotate_design()
    }

    /// Descriptor for the drag-time substitute element, or `None` when not
    /// dragging.
    pub fn drag_proxy(&self, stage: &PreviewStage) -> Option<DragProxy> {
        if !self.is_dragging() {
            return None;
        }
        let placement = stage.placement();
        let min_side = f64::from(stage.viewport().min_side());
        let intrinsic = stage.design().map(|d| d.intrinsic_scale).unwrap_or(1.0);
        Some(DragProxy {
            x_pct: placement.position().x(),
            y_pct: placement.position().y(),
            size_px: design_size_px(min_side, placement, intrinsic),
            rotation_deg: placement.rotation(),
        })
    }
}
