use glam::{Quat, Vec3};

use crate::common::{channel_to_dc, sigmoid, DEFAULT_LOG_SCALE, DIAGNOSTIC_DC, MAX_REST_COEFFS};
use crate::decode::RawVertex;
use crate::structures::Splat;

/// Turns one raw record into a splat. Fallback order matters:
/// scale defaults before `exp`, opacity prefers `sigmoid(opacity)` over raw
/// `alpha` and clamps last, and color only falls back to RGB when every DC
/// coefficient is exactly zero.
pub fn post_process(raw: &RawVertex) -> Splat {
    let position = Vec3::from_array(raw.position.map(|v| v.map_or(0.0, |v| v as f32)));

    let scale = Vec3::from_array(
        raw.scale
            .map(|v| v.map_or(DEFAULT_LOG_SCALE, |v| v as f32).exp()),
    );

    let [x, y, z, w] = raw.rotation.map(|v| v.map_or(f32::NAN, |v| v as f32));
    let rotation = Quat::from_xyzw(x, y, z, w);

    let opacity = match (raw.opacity, raw.alpha) {
        (Some(o), _) => sigmoid(o as f32),
        (None, Some(a)) => a as f32,
        (None, None) => 1.0,
    }
    .clamp(0.0, 1.0);

    let mut color_rest = [0.0; MAX_REST_COEFFS];
    for (dst, src) in color_rest.iter_mut().zip(raw.rest.iter()) {
        *dst = src.map_or(0.0, |v| v as f32);
    }

    Splat {
        position,
        scale,
        rotation,
        opacity,
        color_dc: resolve_dc(raw),
        color_rest,
    }
}

fn resolve_dc(raw: &RawVertex) -> Vec3 {
    let dc = raw.dc.map(|v| v.map_or(0.0, |v| v as f32));
    if dc.iter().any(|c| c.to_bits() != 0) {
        return Vec3::from_array(dc);
    }

    if raw.rgb8.iter().any(Option::is_some) {
        Vec3::from_array(
            raw.rgb8
                .map(|c| channel_to_dc(c.map_or(0.0, |c| c as f32) / 255.0)),
        )
    } else if raw.rgb.iter().any(Option::is_some) {
        Vec3::from_array(raw.rgb.map(|c| channel_to_dc(c.map_or(0.0, |c| c as f32))))
    } else {
        Vec3::from_array(DIAGNOSTIC_DC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SH_C0;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn empty_record_uses_every_default() {
        let splat = post_process(&RawVertex::default());
        assert_eq!(splat.position, Vec3::ZERO);
        assert_approx_eq!(splat.scale.x, 0.01f32.exp(), 1e-6);
        assert!(splat.rotation.x.is_nan() && splat.rotation.w.is_nan());
        assert_eq!(splat.opacity, 1.0);
        assert_eq!(splat.color_dc, Vec3::new(0.5, 0.0, -0.5));
        assert!(splat.color_rest.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn scale_is_exponentiated() {
        let mut raw = RawVertex::default();
        raw.scale = [Some(0.0), Some(-1.0), None];
        let splat = post_process(&raw);
        assert_eq!(splat.scale.x, 1.0);
        assert_approx_eq!(splat.scale.y, (-1.0f32).exp(), 1e-6);
        assert_approx_eq!(splat.scale.z, 0.01f32.exp(), 1e-6);
    }

    #[test]
    fn rotation_is_read_verbatim() {
        let mut raw = RawVertex::default();
        raw.rotation = [Some(0.0), Some(0.0), Some(2.0), Some(2.0)];
        let splat = post_process(&raw);
        assert_eq!(splat.rotation.to_array(), [0.0, 0.0, 2.0, 2.0]);
    }

    #[test]
    fn opacity_fallback_order() {
        let mut raw = RawVertex::default();
        raw.opacity = Some(0.0);
        raw.alpha = Some(0.1);
        assert_eq!(post_process(&raw).opacity, 0.5);

        raw.opacity = None;
        assert_approx_eq!(post_process(&raw).opacity, 0.1, 1e-6);

        raw.alpha = Some(255.0);
        assert_eq!(post_process(&raw).opacity, 1.0);

        raw.alpha = Some(-3.0);
        assert_eq!(post_process(&raw).opacity, 0.0);
    }

    #[test]
    fn byte_rgb_fallback() {
        let mut raw = RawVertex::default();
        raw.rgb8 = [Some(255.0), Some(0.0), Some(0.0)];
        let dc = post_process(&raw).color_dc;
        assert_approx_eq!(dc.x, (1.0 - 0.5) / SH_C0, 1e-5);
        assert_approx_eq!(dc.y, (0.0 - 0.5) / SH_C0, 1e-5);
        assert_approx_eq!(dc.z, (0.0 - 0.5) / SH_C0, 1e-5);
    }

    #[test]
    fn byte_rgb_wins_over_normalized_rgb() {
        let mut raw = RawVertex::default();
        raw.rgb8 = [Some(0.0), Some(0.0), Some(255.0)];
        raw.rgb = [Some(1.0), Some(0.0), Some(0.0)];
        let dc = post_process(&raw).color_dc;
        assert!(dc.z > 0.0 && dc.x < 0.0);
    }

    #[test]
    fn normalized_rgb_fallback() {
        let mut raw = RawVertex::default();
        raw.rgb = [Some(0.5), Some(1.0), None];
        let dc = post_process(&raw).color_dc;
        assert_eq!(dc.x, 0.0);
        assert_approx_eq!(dc.y, 0.5 / SH_C0, 1e-5);
        assert_approx_eq!(dc.z, -0.5 / SH_C0, 1e-5);
    }

    #[test]
    fn tiny_dc_bypasses_rgb_fallback() {
        let mut raw = RawVertex::default();
        raw.dc = [Some(0.0), Some(1e-30), Some(0.0)];
        raw.rgb8 = [Some(255.0), Some(255.0), Some(255.0)];
        let dc = post_process(&raw).color_dc;
        assert_eq!(dc.x, 0.0);
        assert!(dc.y > 0.0);

        raw.dc = [Some(0.0); 3];
        assert!(post_process(&raw).color_dc.x > 1.0);
    }

    #[test]
    fn rest_coefficients_default_to_zero() {
        let mut raw = RawVertex::default();
        raw.rest[0] = Some(0.25);
        raw.rest[44] = Some(-1.0);
        let splat = post_process(&raw);
        assert_eq!(splat.color_rest[0], 0.25);
        assert_eq!(splat.color_rest[1], 0.0);
        assert_eq!(splat.color_rest[44], -1.0);
    }
}
