use glam::{Mat3, Quat, Vec2, Vec3};

use crate::columns::SplatAttributes;
use crate::shading::camera::Camera;
use crate::shading::config::{FootprintModel, RenderConfig};
use crate::shading::sh::{evaluate, view_direction};

/// Projected 2D covariances with a smaller determinant are not drawn.
const MIN_DETERMINANT: f32 = 1e-10;
/// Coverage of the covariance footprint, in standard deviations.
const SIGMA_EXTENT: f32 = 3.0;
/// Smallest ellipse semi axis, in pixels.
const MIN_AXIS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Footprint {
    /// Inverse of the 2D covariance `[[a, b], [b, c]]`, stored as (a, b, c).
    Conic { conic: Vec3, chi_scale: f32 },
    /// Semi axes in pixels and the pixel space direction of the first one.
    Ellipse { axes: Vec2, axis: Vec2 },
}

/// A splat placed on screen for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedSplat {
    pub center: Vec2,
    /// Pixels further than this from `center` are never covered.
    pub radius: f32,
    pub depth: f32,
    pub color: Vec3,
    pub opacity: f32,
    pub footprint: Footprint,
}

impl ProjectedSplat {
    /// Coverage times opacity at a pixel center, `None` outside the footprint.
    pub fn alpha_at(&self, pixel: Vec2) -> Option<f32> {
        let d = pixel - self.center;
        match self.footprint {
            Footprint::Conic { conic, chi_scale } => {
                let chi2 = conic.x * d.x * d.x + 2.0 * conic.y * d.x * d.y + conic.z * d.y * d.y;
                if chi2 < 0.0 {
                    return None;
                }
                Some(self.opacity * (-0.5 * chi2 * chi_scale).exp())
            }
            Footprint::Ellipse { axes, axis } => {
                let u = d.dot(axis) / axes.x;
                let v = d.dot(axis.perp()) / axes.y;
                let r2 = u * u + v * v;
                (r2 <= 1.0).then(|| self.opacity * (-8.0 * r2).exp())
            }
        }
    }
}

pub fn rotation_matrix(rotation: Quat) -> Mat3 {
    Mat3::from_quat(rotation.normalize())
}

/// World space covariance `R S Sᵀ Rᵀ`.
pub fn covariance_3d(rotation: Quat, scale: Vec3) -> Mat3 {
    let m = rotation_matrix(rotation) * Mat3::from_diagonal(scale);
    m * m.transpose()
}

/// Pixel space covariance of a world covariance centered at `p_cam`.
pub fn covariance_2d(cov3: Mat3, camera: &Camera, p_cam: Vec3) -> Vec3 {
    let t = camera.projection_jacobian(p_cam) * camera.view_linear();
    let cov = t * cov3 * t.transpose();
    Vec3::new(cov.x_axis.x, cov.y_axis.x, cov.y_axis.y)
}

fn shade(attrs: &SplatAttributes, camera: &Camera, config: &RenderConfig) -> Vec3 {
    let dir = view_direction(attrs.position, camera.position);
    evaluate(attrs.color, &attrs.sh_rest, dir, config.degree())
}

pub fn project_covariance(
    attrs: &SplatAttributes,
    camera: &Camera,
    config: &RenderConfig,
) -> Option<ProjectedSplat> {
    let p_cam = camera.to_camera_space(attrs.position);
    let center = camera.project(p_cam)?;

    let cov3 = covariance_3d(attrs.rotation, attrs.scale * config.point_scale);
    let Vec3 { x: a, y: b, z: c } = covariance_2d(cov3, camera, p_cam);
    let det = a * c - b * b;
    // Also rejects NaN coming from malformed rotations.
    if !(det > MIN_DETERMINANT) {
        return None;
    }

    let chi_scale = config.chi_scale.max(f32::EPSILON);
    let mid = 0.5 * (a + c);
    let lambda = mid + (mid * mid - det).max(0.0).sqrt();

    Some(ProjectedSplat {
        center,
        radius: SIGMA_EXTENT * (lambda / chi_scale).sqrt(),
        depth: Camera::depth(p_cam),
        color: shade(attrs, camera, config),
        opacity: attrs.opacity,
        footprint: Footprint::Conic {
            conic: Vec3::new(c, -b, a) / det,
            chi_scale,
        },
    })
}

pub fn project_ellipse(
    attrs: &SplatAttributes,
    camera: &Camera,
    config: &RenderConfig,
) -> Option<ProjectedSplat> {
    let p_cam = camera.to_camera_space(attrs.position);
    let center = camera.project(p_cam)?;

    let scale = attrs.scale * config.point_scale;
    let distance = attrs.position.distance(camera.position);
    let radius = scale.max_element() / distance * camera.focal.y;
    if !(radius > 0.0) || !radius.is_finite() {
        return None;
    }

    let in_plane = scale.x.max(scale.y);
    let axes = if in_plane > 0.0 {
        Vec2::new(scale.x, scale.y) / in_plane * radius
    } else {
        Vec2::splat(radius)
    }
    .max(Vec2::splat(MIN_AXIS));

    // Twist about the view axis: where the splat's local x axis lands on screen.
    let axis_cam = camera.view_linear() * (attrs.rotation.normalize() * Vec3::X);
    let axis = Vec2::new(axis_cam.x, -axis_cam.y)
        .try_normalize()
        .unwrap_or(Vec2::X);

    Some(ProjectedSplat {
        center,
        radius: axes.max_element(),
        depth: Camera::depth(p_cam),
        color: shade(attrs, camera, config),
        opacity: attrs.opacity,
        footprint: Footprint::Ellipse { axes, axis },
    })
}

/// Projects a splat with the footprint model the config selects.
pub fn project(
    attrs: &SplatAttributes,
    camera: &Camera,
    config: &RenderConfig,
) -> Option<ProjectedSplat> {
    match config.footprint {
        FootprintModel::Covariance => project_covariance(attrs, camera, config),
        FootprintModel::Ellipse => project_ellipse(attrs, camera, config),
    }
}
