use crate::model::{DesignAsset, GarmentVariant, PlacementState};

/// Read-only view of a finished customization, handed to the summary,
/// persistence and order-composition collaborators. This crate never
/// serializes it to storage or composes messages from it itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DesignSnapshot {
    pub garment_variant: GarmentVariant,
    pub design: DesignAsset,
    pub placement: PlacementState,
}

/// Human-readable placement fields for the summary/checkout view.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PlacementSummary {
    pub size_label: &'static str,
    pub x_pct: i32,
    pub y_pct: i32,
    pub rotation_deg: u16,
}

impl DesignSnapshot {
    pub fn summary(&self) -> PlacementSummary {
        PlacementSummary {
            size_label: self.placement.size_class().label(),
            x_pct: self.placement.position().x().round() as i32,
            y_pct: self.placement.position().y().round() as i32,
            rotation_deg: self.placement.rotation(),
        }
    }
}

/// Persistence envelope: the snapshot plus an externally assigned identifier
/// and creation timestamp. The persistence collaborator owns both fields.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SavedDesign {
    pub id: String,
    pub created_at: String,
    #[serde(flatten)]
    pub snapshot: DesignSnapshot,
}

impl SavedDesign {
    pub fn new(id: impl Into<String>, created_at: impl Into<String>, snapshot: DesignSnapshot) -> Self {
        Self {
            id: id.into(),
            created_at: created_at.into(),
            snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::ImageRef,
        model::{
            DesignCategory, DesignId, GarmentColor, GarmentKind, Side, SizeClass,
        },
    };

    fn sample() -> DesignSnapshot {
        let mut placement = PlacementState::default();
        placement.set_position(33.4, 66.6);
        placement.set_rotation(45);
        placement.set_size_class(SizeClass::Large);
        DesignSnapshot {
            garment_variant: GarmentVariant {
                kind: GarmentKind::Shirt,
                color: GarmentColor::parse("#EF4444").unwrap(),
                side: Side::Front,
            },
            design: DesignAsset::new(
                DesignId(2),
                "Abstract Geometry",
                ImageRef::new("designs/abstract-geometry.svg").unwrap(),
                DesignCategory::Graphic,
            ),
            placement,
        }
    }

    #[test]
    fn summary_rounds_position_for_display() {
        let s = sample().summary();
        assert_eq!(s.size_label, "Large");
        assert_eq!(s.x_pct, 33);
        assert_eq!(s.y_pct, 67);
        assert_eq!(s.rotation_deg, 45);
    }

    #[test]
    fn saved_design_json_roundtrip_preserves_placement() {
        let saved = SavedDesign::new("design_42", "2026-08-24T12:00:00Z", sample());
        let json = serde_json::to_string_pretty(&saved).unwrap();
        let back: SavedDesign = serde_json::from_str(&json).unwrap();
        assert_eq!(back, saved);
        assert_eq!(back.snapshot.placement.rotation(), 45);
    }
}
