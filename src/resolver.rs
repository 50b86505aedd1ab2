use crate::{
    assets::ImageRef,
    catalog,
    model::{DesignId, GarmentColor, GarmentKind, GarmentVariant, Side},
};

/// Outcome of a garment lookup: the base mockup to draw, and the tint to
/// apply over it when no dedicated asset exists for the requested color.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedGarment {
    pub image_ref: ImageRef,
    pub tint: Option<GarmentColor>,
}

/// Dedicated mockup photos. Colors without an entry reuse the white base
/// and are recolored by the tint pass. The hoodie has no back mockup yet,
/// so its back view falls back to the front asset.
const GARMENT_TEMPLATES: &[(GarmentKind, &str, Side, &str)] = &[
    (
        GarmentKind::Shirt,
        "white",
        Side::Front,
        "garment-templates/shirt-white-front.jpg",
    ),
    (
        GarmentKind::Shirt,
        "white",
        Side::Back,
        "garment-templates/shirt-white-back.jpg",
    ),
    (
        GarmentKind::Shirt,
        "black",
        Side::Front,
        "garment-templates/shirt-black-front.jpg",
    ),
    (
        GarmentKind::Shirt,
        "black",
        Side::Back,
        "garment-templates/shirt-black-back.jpg",
    ),
    (
        GarmentKind::Hoodie,
        "white",
        Side::Front,
        "garment-templates/hoodie-white-front.svg",
    ),
    (
        GarmentKind::Hoodie,
        "black",
        Side::Front,
        "garment-templates/hoodie-black-front.svg",
    ),
];

const GARMENT_PLACEHOLDER: &str = "garment-templates/placeholder.png";
const DESIGN_PLACEHOLDER: &str = "designs/placeholder.svg";

/// Pure (kind, color, side) → image lookup. No I/O, no state; missing
/// combinations resolve to documented fallbacks rather than failing.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssetResolver;

impl AssetResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve_garment(&self, variant: &GarmentVariant) -> ResolvedGarment {
        let (color_name, tint) = match variant.color.token().as_str() {
            "#FFFFFF" => ("white", None),
            "#000000" => ("black", None),
            _ => ("white", Some(variant.color)),
        };

        let file = template_file(variant.kind, color_name, variant.side)
            .or_else(|| template_file(variant.kind, color_name, Side::Front))
            .unwrap_or(GARMENT_PLACEHOLDER);

        ResolvedGarment {
            image_ref: ImageRef::known(file),
            tint,
        }
    }

    pub fn resolve_design(&self, id: DesignId) -> ImageRef {
        catalog::design_by_id(id)
            .map(|d| d.image.clone())
            .unwrap_or_else(|| ImageRef::known(DESIGN_PLACEHOLDER))
    }
}

fn template_file(kind: GarmentKind, color_name: &str, side: Side) -> Option<&'static str> {
    GARMENT_TEMPLATES
        .iter()
        .find(|(k, c, s, _)| *k == kind && *c == color_name && *s == side)
        .map(|(_, _, _, file)| *file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(kind: GarmentKind, token: &str, side: Side) -> GarmentVariant {
        GarmentVariant {
            kind,
            color: GarmentColor::parse(token).unwrap(),
            side,
        }
    }

    #[test]
    fn dedicated_colors_resolve_without_tint() {
        let r = AssetResolver::new();
        let white = r.resolve_garment(&variant(GarmentKind::Shirt, "#FFFFFF", Side::Front));
        assert_eq!(white.image_ref.source(), "garment-templates/shirt-white-front.jpg");
        assert!(white.tint.is_none());

        let black = r.resolve_garment(&variant(GarmentKind::Shirt, "#000000", Side::Back));
        assert_eq!(black.image_ref.source(), "garment-templates/shirt-black-back.jpg");
        assert!(black.tint.is_none());
    }

    #[test]
    fn other_colors_reuse_white_base_with_tint() {
        let r = AssetResolver::new();
        let red = r.resolve_garment(&variant(GarmentKind::Shirt, "#EF4444", Side::Front));
        assert_eq!(red.image_ref.source(), "garment-templates/shirt-white-front.jpg");
        assert_eq!(red.tint.unwrap().token(), "#EF4444");
    }

    #[test]
    fn hoodie_back_falls_back_to_front_asset() {
        let r = AssetResolver::new();
        let back = r.resolve_garment(&variant(GarmentKind::Hoodie, "#FFFFFF", Side::Back));
        assert_eq!(back.image_ref.source(), "garment-templates/hoodie-white-front.svg");
    }

    #[test]
    fn unknown_design_resolves_to_placeholder() {
        let r = AssetResolver::new();
        assert_eq!(r.resolve_design(DesignId(999)).source(), DESIGN_PLACEHOLDER);
        assert_eq!(r.resolve_design(DesignId(1)).source(), "designs/minimal-logo.svg");
    }

    #[test]
    fn resolution_is_deterministic() {
        let r = AssetResolver::new();
        let v = variant(GarmentKind::Hoodie, "#3B82F6", Side::Front);
        assert_eq!(r.resolve_garment(&v), r.resolve_garment(&v));
    }
}
