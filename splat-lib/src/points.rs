use glam::{Quat, Vec3};
use log::{debug, warn};

use crate::common::{channel_to_dc, dc_to_channel, MAX_REST_COEFFS};
use crate::decode::{capacity_hint, decode_vertices, Field, RawVertex, Truncation};
use crate::error::PlyError;
use crate::header::{parse_header, PlyHeader};
use crate::structures::{Splat, SplatCollection};

/// Plain colored points, for files that are not Gaussian splat captures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    /// Display colors in [0, 1].
    pub colors: Vec<Vec3>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Round, fully opaque splats of linear radius `size`.
    pub fn to_splats(&self, size: f32) -> Vec<Splat> {
        self.positions
            .iter()
            .zip(&self.colors)
            .map(|(&position, color)| Splat {
                position,
                scale: Vec3::splat(size),
                rotation: Quat::IDENTITY,
                opacity: 1.0,
                color_dc: Vec3::from_array(color.to_array().map(channel_to_dc)),
                color_rest: [0.0; MAX_REST_COEFFS],
            })
            .collect()
    }
}

fn point_color(raw: &RawVertex) -> Vec3 {
    let read = |c: [Option<f64>; 3]| Vec3::from_array(c.map(|v| v.map_or(0.0, |v| v as f32)));
    if raw.rgb8.iter().any(Option::is_some) {
        read(raw.rgb8) / 255.0
    } else if raw.rgb.iter().any(Option::is_some) {
        read(raw.rgb)
    } else if raw.dc.iter().any(Option::is_some) {
        Vec3::from_array(read(raw.dc).to_array().map(dc_to_channel))
    } else {
        Vec3::ONE
    }
}

/// Decodes positions and colors only. A short body yields the complete
/// records that are present instead of an error.
pub fn decode_points(raw_data: &[u8]) -> Result<PointCloud, PlyError> {
    let header = parse_header(raw_data)?;
    let capacity = capacity_hint(raw_data, &header);
    let mut cloud = PointCloud {
        positions: Vec::with_capacity(capacity),
        colors: Vec::with_capacity(capacity),
    };
    let decoded = decode_vertices(raw_data, &header, Truncation::Tolerate, |raw| {
        cloud
            .positions
            .push(Vec3::from_array(raw.position.map(|v| v.map_or(0.0, |v| v as f32))));
        cloud.colors.push(point_color(&raw));
    })?;
    if decoded < header.vertex_count {
        warn!(
            "Point cloud truncated: decoded {} of {} vertices",
            decoded, header.vertex_count
        );
    }
    Ok(cloud)
}

/// What a PLY file turned out to contain.
#[derive(Debug, Clone)]
pub enum Scene {
    Splats(SplatCollection),
    Points(PointCloud),
}

impl Scene {
    pub fn len(&self) -> usize {
        match self {
            Scene::Splats(collection) => collection.len(),
            Scene::Points(cloud) => cloud.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splats ready for rendering; points become round splats of `point_size`.
    pub fn into_splats(self, point_size: f32) -> Vec<Splat> {
        match self {
            Scene::Splats(collection) => collection.splats,
            Scene::Points(cloud) => cloud.to_splats(point_size),
        }
    }
}

/// True when the header declares any attribute beyond position and color.
fn has_gaussian_fields(header: &PlyHeader) -> bool {
    header.properties.iter().any(|p| {
        matches!(
            Field::from_name(&p.name),
            Some(
                Field::Scale(_)
                    | Field::Rotation(_)
                    | Field::Opacity
                    | Field::Dc(_)
                    | Field::Rest(_)
            )
        )
    })
}

/// Decodes a Gaussian splat file, or falls back to a plain point cloud when
/// the file has no Gaussian attributes or its splat decode fails.
pub fn decode_scene(raw_data: &[u8]) -> Result<Scene, PlyError> {
    let header = parse_header(raw_data)?;
    if !has_gaussian_fields(&header) {
        debug!("No Gaussian attributes declared, decoding as point cloud");
        return decode_points(raw_data).map(Scene::Points);
    }
    match crate::decode_splats(raw_data) {
        Ok(collection) => Ok(Scene::Splats(collection)),
        Err(err) => {
            warn!("Splat decode failed ({err}), falling back to point cloud");
            decode_points(raw_data).map(Scene::Points)
        }
    }
}
