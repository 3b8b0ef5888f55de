use glam::{Mat3, Mat4, UVec2, Vec2, Vec3};

/// Pinhole camera looking down its local -Z axis, with pixel y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World space position.
    pub position: Vec3,
    /// World to camera transform.
    pub view: Mat4,
    /// Focal lengths in pixels.
    pub focal: Vec2,
    pub viewport: UVec2,
    /// Points closer than this along the view axis are culled.
    pub near: f32,
}

impl Camera {
    pub const DEFAULT_NEAR: f32 = 0.01;

    pub fn from_view(view: Mat4, fov_y: f32, viewport: UVec2) -> Self {
        let fy = 0.5 * viewport.y as f32 / (0.5 * fov_y).tan();
        Self {
            position: view.inverse().transform_point3(Vec3::ZERO),
            view,
            focal: Vec2::splat(fy),
            viewport,
            near: Self::DEFAULT_NEAR,
        }
    }

    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, fov_y: f32, viewport: UVec2) -> Self {
        Self::from_view(Mat4::look_at_rh(eye, target, up), fov_y, viewport)
    }

    /// Rotation and scale block of the view transform.
    pub fn view_linear(&self) -> Mat3 {
        Mat3::from_mat4(self.view)
    }

    pub fn to_camera_space(&self, world: Vec3) -> Vec3 {
        self.view.transform_point3(world)
    }

    /// Distance in front of the camera of a camera space point.
    #[inline]
    pub fn depth(p_cam: Vec3) -> f32 {
        -p_cam.z
    }

    /// Pixel coordinates of a camera space point, `None` behind the near plane.
    pub fn project(&self, p_cam: Vec3) -> Option<Vec2> {
        let depth = Self::depth(p_cam);
        if depth <= self.near {
            return None;
        }
        let principal = self.viewport.as_vec2() * 0.5;
        Some(Vec2::new(
            principal.x + self.focal.x * p_cam.x / depth,
            principal.y - self.focal.y * p_cam.y / depth,
        ))
    }

    /// First order derivative of [`Camera::project`] at `p_cam`. Only the top
    /// two rows are meaningful.
    pub fn projection_jacobian(&self, p_cam: Vec3) -> Mat3 {
        let d = Self::depth(p_cam);
        let (fx, fy) = (self.focal.x, self.focal.y);
        Mat3::from_cols(
            Vec3::new(fx / d, 0.0, 0.0),
            Vec3::new(0.0, -fy / d, 0.0),
            Vec3::new(fx * p_cam.x / (d * d), -fy * p_cam.y / (d * d), 0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> Camera {
        Camera::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            FRAC_PI_2,
            UVec2::new(200, 100),
        )
    }

    #[test]
    fn position_recovered_from_view() {
        let cam = camera();
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));
        assert_approx_eq!(cam.focal.y, 50.0, 1e-3);
    }

    #[test]
    fn target_projects_to_center() {
        let cam = camera();
        let p = cam.project(cam.to_camera_space(Vec3::ZERO)).unwrap();
        assert!(p.abs_diff_eq(Vec2::new(100.0, 50.0), 1e-4));

        // World +Y is up on screen, i.e. towards smaller pixel rows.
        let up = cam.project(cam.to_camera_space(Vec3::Y)).unwrap();
        assert!(up.y < 50.0);
        let right = cam.project(cam.to_camera_space(Vec3::X)).unwrap();
        assert!(right.x > 100.0);
    }

    #[test]
    fn points_behind_are_culled() {
        let cam = camera();
        assert!(cam.project(cam.to_camera_space(Vec3::new(0.0, 0.0, 6.0))).is_none());
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let cam = camera();
        let p = Vec3::new(0.4, -0.3, -3.0);
        let j = cam.projection_jacobian(p);
        let h = 1e-3;
        for (axis, col) in [(Vec3::X, j.x_axis), (Vec3::Y, j.y_axis), (Vec3::Z, j.z_axis)] {
            let a = cam.project(p + axis * h).unwrap();
            let b = cam.project(p - axis * h).unwrap();
            let fd = (a - b) / (2.0 * h);
            assert_approx_eq!(fd.x, col.x, 1e-2);
            assert_approx_eq!(fd.y, col.y, 1e-2);
        }
    }
}
