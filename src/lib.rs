#![forbid(unsafe_code)]

pub mod assets;
pub mod cache;
pub mod catalog;
pub mod composite;
pub mod error;
pub mod interact;
pub mod model;
pub mod render;
pub mod resolver;
pub mod snapshot;
pub mod stage;
pub mod surface;

pub use assets::{AssetFetcher, FsFetcher, ImageRef, PreparedImage};
pub use cache::{ImageCache, LoadEvent, LoadOutcome, LoadState};
pub use error::{PreviewError, PreviewResult};
pub use interact::{DragProxy, InteractionController, MoveOutcome, PointerPx, WallClock};
pub use model::{
    DesignAsset, DesignCategory, DesignId, GarmentColor, GarmentKind, GarmentVariant,
    PlacementState, Position, Side, SizeClass, ViewportSize,
};
pub use render::FrameRgba;
pub use resolver::{AssetResolver, ResolvedGarment};
pub use snapshot::{DesignSnapshot, PlacementSummary, SavedDesign};
pub use stage::{PaintStats, PreviewStage};
pub use surface::Surface;
