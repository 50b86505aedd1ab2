use crate::{
    error::{PreviewError, PreviewResult},
    model::{ColorBucket, GarmentColor},
};

pub type PremulRgba8 = [u8; 4];

/// Tint strength for near-white garments (light additive overlay).
pub const TINT_OVERLAY_STRENGTH: f32 = 0.3;
/// Tint strength for near-black garments (multiplicative darken).
pub const TINT_MULTIPLY_STRENGTH: f32 = 0.8;
/// Tint strength for all other colors (saturating burn).
pub const TINT_BURN_STRENGTH: f32 = 0.6;

pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Source-over composite `src` onto `dst`, both premultiplied RGBA8.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> PreviewResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PreviewError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Recolor a painted garment layer in place.
///
/// The blend mode and strength are chosen per color bucket so recoloring
/// stays visually plausible without needing a dedicated mockup per color:
/// near-white overlays lightly, near-black darkens multiplicatively, and
/// everything else gets a saturating burn. Alpha is left untouched.
pub fn tint_in_place(dst: &mut [u8], color: GarmentColor) -> PreviewResult<()> {
    if !dst.len().is_multiple_of(4) {
        return Err(PreviewError::render(
            "tint_in_place expects an rgba8 buffer",
        ));
    }

    let (mode, strength) = match color.bucket() {
        ColorBucket::NearWhite => (BlendFn::Overlay, TINT_OVERLAY_STRENGTH),
        ColorBucket::NearBlack => (BlendFn::Multiply, TINT_MULTIPLY_STRENGTH),
        ColorBucket::Midtone => (BlendFn::ColorBurn, TINT_BURN_STRENGTH),
    };
    let t = ((strength.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    let tint = color.rgb();

    for px in dst.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            continue;
        }
        for i in 0..3 {
            // Blend in straight-alpha space, then restore premultiplication.
            let straight = (u16::from(px[i]) * 255 / a).min(255);
            let blended = mode.apply(straight as u8, tint[i]);
            let mixed = lerp_u8(straight as u8, blended, t);
            px[i] = ((u16::from(mixed) * a + 127) / 255) as u8;
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
enum BlendFn {
    Overlay,
    Multiply,
    ColorBurn,
}

impl BlendFn {
    fn apply(self, d: u8, s: u8) -> u8 {
        let d = u16::from(d);
        let s = u16::from(s);
        let out = match self {
            Self::Overlay => {
                if d < 128 {
                    2 * d * s / 255
                } else {
                    255 - 2 * (255 - d) * (255 - s) / 255
                }
            }
            Self::Multiply => d * s / 255,
            Self::ColorBurn => {
                if s == 0 {
                    0
                } else {
                    255u16.saturating_sub(((255 - d) * 255 / s).min(255))
                }
            }
        };
        out.min(255) as u8
    }
}

fn lerp_u8(a: u8, b: u8, t: u16) -> u8 {
    let a = i32::from(a);
    let b = i32::from(b);
    let t = i32::from(t);
    (a + ((b - a) * t + 127) / 255).clamp(0, 255) as u8
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opacity_0_is_noop() {
        let dst = [1, 2, 3, 4];
        let src = [200, 200, 200, 200];
        assert_eq!(over(dst, src, 0.0), dst);
    }

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src, 1.0), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn over_dst_transparent_returns_scaled_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn over_in_place_rejects_mismatched_buffers() {
        let mut dst = vec![0u8; 8];
        let src = vec![0u8; 4];
        assert!(over_in_place(&mut dst, &src, 1.0).is_err());
    }

    #[test]
    fn near_black_tint_darkens_white_base() {
        let mut px = vec![255u8, 255, 255, 255];
        tint_in_place(&mut px, GarmentColor::from_rgb(0, 0, 0)).unwrap();
        // multiply(255, 0) = 0, mixed at 80% strength: 255 -> 51.
        assert_eq!(px[3], 255);
        assert!(px[0] < 64, "expected strong darkening, got {}", px[0]);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn near_white_tint_barely_changes_white_base() {
        let mut px = vec![240u8, 240, 240, 255];
        let before = px.clone();
        tint_in_place(&mut px, GarmentColor::from_rgb(255, 255, 255)).unwrap();
        for i in 0..3 {
            assert!(px[i] >= before[i], "overlay with white must not darken");
        }
        assert_eq!(px[3], 255);
    }

    #[test]
    fn midtone_tint_pulls_toward_color() {
        let mut px = vec![220u8, 220, 220, 255];
        tint_in_place(&mut px, GarmentColor::from_rgb(0xEF, 0x44, 0x44)).unwrap();
        assert!(px[0] > px[1], "red channel should survive a red burn");
        assert!(px[1] < 220);
    }

    #[test]
    fn tint_skips_transparent_pixels() {
        let mut px = vec![0u8, 0, 0, 0];
        tint_in_place(&mut px, GarmentColor::from_rgb(0, 0, 0)).unwrap();
        assert_eq!(px, vec![0, 0, 0, 0]);
    }
}
