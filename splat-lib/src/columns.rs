use glam::{Quat, Vec3};

use crate::common::{dc_to_channel, REST_TRIPLES};
use crate::structures::Splat;

/// Attribute-major copy of a splat collection, laid out the way GPU vertex
/// buffers expect it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStore {
    pub count: usize,
    pub positions: Vec<f32>,
    pub scales: Vec<f32>,
    pub rotations: Vec<f32>,
    pub opacities: Vec<f32>,
    /// `sh_rest[i]` holds `f_rest_{3i}..f_rest_{3i+2}` of every splat.
    pub sh_rest: [Vec<f32>; REST_TRIPLES],
    /// Display color derived from the DC coefficients.
    pub colors: Vec<f32>,
}

/// Everything the shading model reads for one splat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatAttributes {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Quat,
    pub opacity: f32,
    pub color: Vec3,
    pub sh_rest: [Vec3; REST_TRIPLES],
}

impl ColumnStore {
    pub fn from_splats(splats: &[Splat]) -> Self {
        let n = splats.len();
        let mut store = Self {
            count: n,
            positions: Vec::with_capacity(n * 3),
            scales: Vec::with_capacity(n * 3),
            rotations: Vec::with_capacity(n * 4),
            opacities: Vec::with_capacity(n),
            sh_rest: std::array::from_fn(|_| Vec::with_capacity(n * 3)),
            colors: Vec::with_capacity(n * 3),
        };

        for s in splats {
            store.positions.extend_from_slice(&s.position.to_array());
            store.scales.extend_from_slice(&s.scale.to_array());
            store.rotations.extend_from_slice(&s.rotation.to_array());
            store.opacities.push(s.opacity);
            for (i, column) in store.sh_rest.iter_mut().enumerate() {
                column.extend_from_slice(&s.color_rest[i * 3..i * 3 + 3]);
            }
            store
                .colors
                .extend_from_slice(&s.color_dc.to_array().map(dc_to_channel));
        }
        store
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Gathers splat `i` back out of the columns.
    pub fn attributes(&self, i: usize) -> SplatAttributes {
        let v3 = |column: &[f32]| Vec3::from_slice(&column[i * 3..i * 3 + 3]);
        SplatAttributes {
            position: v3(&self.positions),
            scale: v3(&self.scales),
            rotation: Quat::from_slice(&self.rotations[i * 4..i * 4 + 4]),
            opacity: self.opacities[i],
            color: v3(&self.colors),
            sh_rest: std::array::from_fn(|k| v3(&self.sh_rest[k])),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = SplatAttributes> + '_ {
        (0..self.count).map(|i| self.attributes(i))
    }
}
