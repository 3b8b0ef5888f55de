use glam::{Quat, Vec3};

use crate::columns::ColumnStore;
use crate::common::MAX_REST_COEFFS;
use crate::error::PlyError;
use crate::header::{PlyFormat, PropertyDef};

/// One decoded Gaussian primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Splat {
    pub position: Vec3,
    /// Linear scale, already exponentiated.
    pub scale: Vec3,
    /// Raw `rot_0..rot_3` as (x, y, z, w). Not renormalized.
    pub rotation: Quat,
    /// Opacity in [0, 1].
    pub opacity: f32,
    pub color_dc: Vec3,
    pub color_rest: [f32; MAX_REST_COEFFS],
}

/// The decoded splats of one file plus what its header declared.
#[derive(Debug, Clone)]
pub struct SplatCollection {
    pub format: PlyFormat,
    pub vertex_count: usize,
    pub properties: Vec<PropertyDef>,
    pub splats: Vec<Splat>,
}

impl SplatCollection {
    pub fn len(&self) -> usize {
        self.splats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splats.is_empty()
    }

    /// Per-attribute arrays for a render backend.
    pub fn columns(&self) -> ColumnStore {
        ColumnStore::from_splats(&self.splats)
    }

    /// Axis-aligned bounds of the splat centers.
    pub fn bounds(&self) -> Result<(Vec3, Vec3), PlyError> {
        if self.splats.is_empty() {
            return Err(PlyError::EmptyCollection);
        }
        let min = self
            .splats
            .iter()
            .fold(Vec3::INFINITY, |acc, s| acc.min(s.position));
        let max = self
            .splats
            .iter()
            .fold(Vec3::NEG_INFINITY, |acc, s| acc.max(s.position));
        Ok((min, max))
    }
}
