use crate::{
    assets::ImageRef,
    error::{PreviewError, PreviewResult},
};

/// Lower clamp bound for design position, in percent of the surface.
pub const POS_MIN: f64 = 10.0;
/// Upper clamp bound for design position, in percent of the surface.
pub const POS_MAX: f64 = 90.0;
/// Rotation increment applied by one rotate action, in degrees.
pub const ROTATE_STEP_DEG: u16 = 15;
/// Base design size as a fraction of the shorter surface side.
pub const BASE_SIZE_FRACTION: f64 = 0.15;
/// Minimum interval between accepted drag samples (one frame at 60 Hz).
pub const DRAG_THROTTLE_MS: u64 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentKind {
    Shirt,
    Hoodie,
}

impl GarmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shirt => "shirt",
            Self::Hoodie => "hoodie",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

/// Coarse color classification driving the background tint strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorBucket {
    NearWhite,
    NearBlack,
    Midtone,
}

/// Garment color parsed from a `#RRGGBB` token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GarmentColor {
    rgb: [u8; 3],
}

impl GarmentColor {
    pub fn parse(token: &str) -> PreviewResult<Self> {
        let hex = token
            .strip_prefix('#')
            .ok_or_else(|| PreviewError::validation("color token must start with '#'"))?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(PreviewError::validation(
                "color token must be 6 hex digits (#RRGGBB)",
            ));
        }
        let mut rgb = [0u8; 3];
        for (i, chunk) in [&hex[0..2], &hex[2..4], &hex[4..6]].into_iter().enumerate() {
            rgb[i] = u8::from_str_radix(chunk, 16)
                .map_err(|_| PreviewError::validation("color token contains non-hex digits"))?;
        }
        Ok(Self { rgb })
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { rgb: [r, g, b] }
    }

    pub fn rgb(self) -> [u8; 3] {
        self.rgb
    }

    pub fn token(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.rgb[0], self.rgb[1], self.rgb[2])
    }

    pub fn bucket(self) -> ColorBucket {
        if self.rgb.iter().all(|&c| c >= 0xF0) {
            ColorBucket::NearWhite
        } else if self.rgb.iter().all(|&c| c <= 0x10) {
            ColorBucket::NearBlack
        } else {
            ColorBucket::Midtone
        }
    }
}

impl TryFrom<String> for GarmentColor {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).map_err(|e| e.to_string())
    }
}

impl From<GarmentColor> for String {
    fn from(c: GarmentColor) -> Self {
        c.token()
    }
}

/// Immutable garment selection for one customization session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GarmentVariant {
    pub kind: GarmentKind,
    pub color: GarmentColor,
    pub side: Side,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DesignId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignCategory {
    Graphic,
    Text,
    Logo,
}

/// Selectable design graphic.
///
/// `intrinsic_scale` compensates for differing natural sizes among design
/// assets so they render at a visually consistent apparent size.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DesignAsset {
    pub id: DesignId,
    pub display_name: String,
    pub image: ImageRef,
    pub category: DesignCategory,
    #[serde(default = "default_intrinsic_scale")]
    pub intrinsic_scale: f64,
}

fn default_intrinsic_scale() -> f64 {
    1.0
}

impl DesignAsset {
    pub fn new(
        id: DesignId,
        display_name: impl Into<String>,
        image: ImageRef,
        category: DesignCategory,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            image,
            category,
            intrinsic_scale: 1.0,
        }
    }

    pub fn with_intrinsic_scale(mut self, scale: f64) -> Self {
        self.intrinsic_scale = scale;
        self
    }

    pub fn validate(&self) -> PreviewResult<()> {
        if !self.intrinsic_scale.is_finite() || self.intrinsic_scale <= 0.0 {
            return Err(PreviewError::validation(
                "design intrinsic_scale must be finite and > 0",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn scale(self) -> f64 {
        match self {
            Self::Small => 0.8,
            Self::Medium => 1.5,
            Self::Large => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

/// Normalized design position in percent of surface width/height.
///
/// Both axes are clamped to `[POS_MIN, POS_MAX]` at construction, so an
/// out-of-bounds position cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawPosition")]
pub struct Position {
    x: f64,
    y: f64,
}

#[derive(serde::Deserialize)]
struct RawPosition {
    x: f64,
    y: f64,
}

impl From<RawPosition> for Position {
    fn from(raw: RawPosition) -> Self {
        Self::new(raw.x, raw.y)
    }
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_pos(x),
            y: clamp_pos(y),
        }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }
}

fn clamp_pos(v: f64) -> f64 {
    if v.is_nan() {
        return POS_MIN;
    }
    v.clamp(POS_MIN, POS_MAX)
}

/// Where and how the design sits on the garment. Single source of truth for
/// the foreground layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawPlacement")]
pub struct PlacementState {
    position: Position,
    rotation: u16,
    size_class: SizeClass,
}

#[derive(serde::Deserialize)]
struct RawPlacement {
    position: Position,
    rotation: u16,
    size_class: SizeClass,
}

impl From<RawPlacement> for PlacementState {
    fn from(raw: RawPlacement) -> Self {
        Self {
            position: raw.position,
            rotation: raw.rotation % 360,
            size_class: raw.size_class,
        }
    }
}

impl Default for PlacementState {
    fn default() -> Self {
        Self {
            position: Position::new(50.0, 50.0),
            rotation: 0,
            size_class: SizeClass::Medium,
        }
    }
}

impl PlacementState {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    pub fn size_class(&self) -> SizeClass {
        self.size_class
    }

    /// Publish a new position; both axes are clamped.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = Position::new(x, y);
    }

    pub fn set_size_class(&mut self, size_class: SizeClass) {
        self.size_class = size_class;
    }

    /// Rotate by `step` degrees, wrapping into `[0, 360)`.
    pub fn rotate_by(&mut self, step: u16) {
        self.rotation = ((u32::from(self.rotation) + u32::from(step)) % 360) as u16;
    }

    pub fn set_rotation(&mut self, degrees: u16) {
        self.rotation = degrees % 360;
    }
}

/// Viewport dimensions in device pixels, as measured from the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> PreviewResult<Self> {
        let v = Self { width, height };
        v.validate()?;
        Ok(v)
    }

    pub fn validate(&self) -> PreviewResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PreviewError::validation(
                "viewport width/height must be > 0",
            ));
        }
        Ok(())
    }

    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_token_roundtrip_and_buckets() {
        let white = GarmentColor::parse("#FFFFFF").unwrap();
        assert_eq!(white.token(), "#FFFFFF");
        assert_eq!(white.bucket(), ColorBucket::NearWhite);

        let off_white = GarmentColor::parse("#F4F2F0").unwrap();
        assert_eq!(off_white.bucket(), ColorBucket::NearWhite);

        assert_eq!(
            GarmentColor::parse("#000000").unwrap().bucket(),
            ColorBucket::NearBlack
        );
        assert_eq!(
            GarmentColor::parse("#6B7280").unwrap().bucket(),
            ColorBucket::Midtone
        );
    }

    #[test]
    fn color_rejects_malformed_tokens() {
        assert!(GarmentColor::parse("FFFFFF").is_err());
        assert!(GarmentColor::parse("#FFF").is_err());
        assert!(GarmentColor::parse("#GGHHII").is_err());
        // Six bytes but not six ASCII hex digits: must error, not panic on a
        // char-boundary slice.
        assert!(GarmentColor::parse("#a\u{ff}a\u{ff}").is_err());
        assert!(GarmentColor::parse("#ééé").is_err());
    }

    #[test]
    fn position_is_clamped_at_construction() {
        let p = Position::new(5.0, 95.0);
        assert_eq!(p.x(), POS_MIN);
        assert_eq!(p.y(), POS_MAX);

        let nan = Position::new(f64::NAN, 50.0);
        assert_eq!(nan.x(), POS_MIN);
    }

    #[test]
    fn rotation_wraps_modulo_360() {
        let mut placement = PlacementState::default();
        for _ in 0..25 {
            placement.rotate_by(ROTATE_STEP_DEG);
        }
        assert_eq!(placement.rotation(), (15 * 25) % 360);

        placement.set_rotation(720);
        assert_eq!(placement.rotation(), 0);

        // Large single steps wrap too instead of overflowing.
        placement.set_rotation(350);
        placement.rotate_by(u16::MAX);
        assert_eq!(
            placement.rotation(),
            ((350u32 + u32::from(u16::MAX)) % 360) as u16
        );
    }

    #[test]
    fn placement_default_is_centered_medium() {
        let placement = PlacementState::default();
        assert_eq!(placement.position().x(), 50.0);
        assert_eq!(placement.position().y(), 50.0);
        assert_eq!(placement.rotation(), 0);
        assert_eq!(placement.size_class(), SizeClass::Medium);
    }

    #[test]
    fn placement_deserialization_reclamps() {
        let json = r#"{"position":{"x":2.0,"y":150.0},"rotation":400,"size_class":"large"}"#;
        let placement: PlacementState = serde_json::from_str(json).unwrap();
        assert_eq!(placement.position().x(), POS_MIN);
        assert_eq!(placement.position().y(), POS_MAX);
        assert_eq!(placement.rotation(), 40);
        assert_eq!(placement.size_class(), SizeClass::Large);
    }

    #[test]
    fn viewport_rejects_zero_dimension() {
        assert!(ViewportSize::new(0, 500).is_err());
        assert!(ViewportSize::new(400, 0).is_err());
        assert_eq!(ViewportSize::new(400, 500).unwrap().min_side(), 400);
    }
}
