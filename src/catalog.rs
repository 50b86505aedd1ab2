use std::sync::LazyLock;

use crate::{
    assets::ImageRef,
    model::{DesignAsset, DesignCategory, DesignId, GarmentKind},
};

/// Color palette offered for every garment kind, as `#RRGGBB` tokens.
pub const GARMENT_PALETTE: &[&str] = &[
    "#000000", "#FFFFFF", "#6B7280", "#EF4444", "#3B82F6", "#10B981", "#F59E0B", "#8B5CF6",
];

pub fn garment_palette(_kind: GarmentKind) -> &'static [&'static str] {
    GARMENT_PALETTE
}

static DESIGNS: LazyLock<Vec<DesignAsset>> = LazyLock::new(|| {
    vec![
        DesignAsset::new(
            DesignId(1),
            "Minimal Logo",
            ImageRef::known("designs/minimal-logo.svg"),
            DesignCategory::Logo,
        ),
        DesignAsset::new(
            DesignId(2),
            "Abstract Geometry",
            ImageRef::known("designs/abstract-geometry.svg"),
            DesignCategory::Graphic,
        ),
        DesignAsset::new(
            DesignId(3),
            "Bold Type",
            ImageRef::known("designs/bold-type.svg"),
            DesignCategory::Text,
        ),
        DesignAsset::new(
            DesignId(4),
            "Vintage Pattern",
            ImageRef::known("designs/vintage-pattern.svg"),
            DesignCategory::Graphic,
        )
        .with_intrinsic_scale(1.15),
        DesignAsset::new(
            DesignId(5),
            "Modern Lines",
            ImageRef::known("designs/modern-lines.svg"),
            DesignCategory::Graphic,
        ),
        DesignAsset::new(
            DesignId(6),
            "Statement Text",
            ImageRef::known("designs/statement-text.svg"),
            DesignCategory::Text,
        ),
    ]
});

/// The built-in design table.
pub fn designs() -> &'static [DesignAsset] {
    &DESIGNS
}

pub fn design_by_id(id: DesignId) -> Option<&'static DesignAsset> {
    DESIGNS.iter().find(|d| d.id == id)
}
