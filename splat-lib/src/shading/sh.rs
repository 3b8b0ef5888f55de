use glam::Vec3;

use crate::common::{REST_TRIPLES, SH_C1, SH_C2_XX_YY, SH_C2_XY, SH_C2_ZZ, SH_C2_ZZ_OFFSET};

/// Highest harmonic degree the shading model evaluates.
pub const MAX_SH_DEGREE: u32 = 2;

/// Unit vector from a splat towards the camera.
#[inline]
pub fn view_direction(splat_position: Vec3, camera_position: Vec3) -> Vec3 {
    (camera_position - splat_position).normalize()
}

/// Reconstructs the view dependent color of a splat.
///
/// `base` is the degree-0 color (`0.5 + C0 * dc`), `rest[i]` the (r, g, b)
/// coefficients of basis function `i + 1`. `degree` is clamped to
/// [`MAX_SH_DEGREE`]. The result is not clamped and may leave [0, 1].
pub fn evaluate(base: Vec3, rest: &[Vec3; REST_TRIPLES], dir: Vec3, degree: u32) -> Vec3 {
    let degree = degree.min(MAX_SH_DEGREE);
    let mut color = base;
    if degree == 0 {
        return color;
    }

    let Vec3 { x, y, z } = dir;
    color += -SH_C1 * y * rest[0] + SH_C1 * z * rest[1] - SH_C1 * x * rest[2];
    if degree == 1 {
        return color;
    }

    let (xx, yy, zz) = (x * x, y * y, z * z);
    let (xy, yz, xz) = (x * y, y * z, x * z);
    color += SH_C2_XY * xy * rest[3]
        - SH_C2_XY * yz * rest[4]
        + (SH_C2_ZZ * zz - SH_C2_ZZ_OFFSET) * rest[5]
        - SH_C2_XY * xz * rest[6]
        + SH_C2_XX_YY * (xx - yy) * rest[7];
    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SH_C0;
    use assert_approx_eq::assert_approx_eq;

    fn basis(i: usize) -> [Vec3; REST_TRIPLES] {
        let mut rest = [Vec3::ZERO; REST_TRIPLES];
        rest[i] = Vec3::ONE;
        rest
    }

    #[test]
    fn degree_zero_is_base_color() {
        let base = Vec3::splat(0.5) + SH_C0 * Vec3::new(1.0, 0.0, -1.0);
        let rest = [Vec3::splat(3.0); REST_TRIPLES];
        assert_eq!(evaluate(base, &rest, Vec3::Z, 0), base);
    }

    #[test]
    fn degree_one_terms() {
        let base = Vec3::splat(0.5);
        assert_approx_eq!(evaluate(base, &basis(0), Vec3::Y, 1).x, 0.5 - SH_C1, 1e-6);
        assert_approx_eq!(evaluate(base, &basis(1), Vec3::Z, 1).y, 0.5 + SH_C1, 1e-6);
        assert_approx_eq!(evaluate(base, &basis(2), Vec3::X, 1).z, 0.5 - SH_C1, 1e-6);
        // Degree-2 coefficients are ignored at degree 1.
        assert_eq!(evaluate(base, &basis(5), Vec3::Z, 1), base);
    }

    #[test]
    fn degree_two_terms() {
        let base = Vec3::ZERO;
        let d = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert_approx_eq!(evaluate(base, &basis(3), d, 2).x, SH_C2_XY * 0.5, 1e-6);
        assert_approx_eq!(
            evaluate(base, &basis(5), Vec3::Z, 2).x,
            2.0 * SH_C2_ZZ_OFFSET,
            1e-5
        );
        assert_approx_eq!(evaluate(base, &basis(7), Vec3::X, 2).x, SH_C2_XX_YY, 1e-6);
        assert_approx_eq!(evaluate(base, &basis(7), Vec3::Y, 2).x, -SH_C2_XX_YY, 1e-6);

        let yz = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert_approx_eq!(evaluate(base, &basis(4), yz, 2).x, -SH_C2_XY * 0.5, 1e-6);
        let xz = Vec3::new(1.0, 0.0, 1.0).normalize();
        assert_approx_eq!(evaluate(base, &basis(6), xz, 2).x, -SH_C2_XY * 0.5, 1e-6);
        // Each cross term vanishes off its own plane.
        assert_approx_eq!(evaluate(base, &basis(4), xz, 2).x, 0.0, 1e-6);
        assert_approx_eq!(evaluate(base, &basis(6), yz, 2).x, 0.0, 1e-6);
    }

    #[test]
    fn degree_is_clamped_and_last_triple_unused() {
        let rest: [Vec3; REST_TRIPLES] = std::array::from_fn(|i| Vec3::splat(i as f32 * 0.1));
        let d = Vec3::new(0.2, -0.4, 0.9).normalize();
        assert_eq!(evaluate(Vec3::ZERO, &rest, d, 7), evaluate(Vec3::ZERO, &rest, d, 2));
        assert_eq!(evaluate(Vec3::ZERO, &basis(8), d, 2), Vec3::ZERO);
    }

    #[test]
    fn output_is_not_clamped() {
        let rest = [Vec3::splat(4.0); REST_TRIPLES];
        let c = evaluate(Vec3::splat(0.9), &rest, Vec3::new(-1.0, -1.0, 1.0).normalize(), 1);
        assert!(c.x > 1.0);
    }

    #[test]
    fn direction_points_at_camera() {
        let d = view_direction(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 5.0));
        assert_eq!(d, Vec3::Z);
    }
}
