//! A small synthetic scene: two rings of six splats each.

use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};

use crate::common::{channel_to_dc, MAX_REST_COEFFS};
use crate::error::PlyError;
use crate::header::PlyFormat;
use crate::structures::Splat;
use crate::writer::write_ply;

/// (radius, height, phase) of each ring.
pub const RINGS: [(f32, f32, f32); 2] = [(1.5, 1.0, 0.0), (0.8, -1.0, PI / 6.0)];
pub const POINTS_PER_RING: usize = 6;
/// Log scale of every fixture splat.
pub const RING_LOG_SCALE: f32 = 0.1;

pub fn ring_splats() -> Vec<Splat> {
    let mut splats = Vec::with_capacity(RINGS.len() * POINTS_PER_RING);
    for (ring, &(radius, z, phase)) in RINGS.iter().enumerate() {
        for k in 0..POINTS_PER_RING {
            let theta = phase + k as f32 * TAU / POINTS_PER_RING as f32;
            // Hue walks around the ring; the inner ring is darker.
            let hue = Vec3::new(theta.cos(), (theta + TAU / 3.0).cos(), (theta - TAU / 3.0).cos());
            let rgb = (hue * 0.5 + 0.5) * (1.0 - 0.4 * ring as f32);
            splats.push(Splat {
                position: Vec3::new(radius * theta.cos(), radius * theta.sin(), z),
                scale: Vec3::splat(RING_LOG_SCALE.exp()),
                rotation: Quat::IDENTITY,
                opacity: 0.9,
                color_dc: Vec3::from_array(rgb.to_array().map(channel_to_dc)),
                color_rest: [0.0; MAX_REST_COEFFS],
            });
        }
    }
    splats
}

/// The ring scene encoded as a PLY file.
pub fn ring_fixture_ply(format: PlyFormat) -> Result<Vec<u8>, PlyError> {
    let mut out = Vec::new();
    write_ply(&mut out, &ring_splats(), 0, format)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_splats;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn decodes_twelve_ring_splats() {
        let bytes = ring_fixture_ply(PlyFormat::BinaryLittleEndian).unwrap();
        let collection = decode_splats(&bytes).unwrap();
        assert_eq!(collection.len(), 12);
        assert_eq!(collection.vertex_count, 12);

        let expected_scale = 0.1f32.exp();
        for (i, splat) in collection.splats.iter().enumerate() {
            let (radius, z, phase) = RINGS[i / POINTS_PER_RING];
            let theta = phase + (i % POINTS_PER_RING) as f32 * TAU / 6.0;
            assert_approx_eq!(splat.position.x, radius * theta.cos(), 1e-6);
            assert_approx_eq!(splat.position.y, radius * theta.sin(), 1e-6);
            assert_eq!(splat.position.z, z);
            for s in splat.scale.to_array() {
                assert_approx_eq!(s, expected_scale, 1e-6);
            }
            assert_eq!(splat.rotation, Quat::IDENTITY);
            assert_approx_eq!(splat.opacity, 0.9, 1e-6);
        }
    }

    #[test]
    fn second_ring_is_phase_shifted() {
        let splats = ring_splats();
        let first = splats[POINTS_PER_RING].position;
        assert_approx_eq!(first.y.atan2(first.x), PI / 6.0, 1e-6);
        assert_approx_eq!(first.truncate().length(), 0.8, 1e-6);
    }

    #[test]
    fn fixture_is_visible_from_the_side() {
        let collection = decode_splats(&ring_fixture_ply(PlyFormat::Ascii).unwrap()).unwrap();
        let (min, max) = collection.bounds().unwrap();
        assert_approx_eq!(min.z, -1.0, 1e-6);
        assert_approx_eq!(max.x, 1.5, 1e-6);
    }
}
