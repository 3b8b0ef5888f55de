//! Ground robot driven by JSON commands, one rendered frame per command.
//!
//! The world is Z-up: the robot moves in the XY plane and `heading` is the
//! yaw in radians measured from +X towards +Y.

use std::f32::consts::TAU;

use glam::{UVec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::shading::Camera;

/// An incoming command, e.g. `{"type":"forward"}` or
/// `{"type":"turn","value":0.5}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    Forward {
        /// Distance to travel; the configured step when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f32>,
    },
    Turn {
        /// Yaw change in radians, counter-clockwise seen from above.
        value: f32,
    },
}

/// What the relay sends back for each command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reply {
    Frame {
        index: usize,
        width: u32,
        height: u32,
        path: String,
        position: [f32; 3],
        heading: f32,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Default forward distance.
    pub step: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Camera height above the robot's position.
    pub eye_height: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            step: 0.25,
            fov_y: 60f32.to_radians(),
            eye_height: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Robot {
    pub position: Vec3,
    pub heading: f32,
}

impl Default for Robot {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: 0.0,
        }
    }
}

impl Robot {
    /// Places the robot on the -X side of a bounding box, facing its center
    /// from far enough away that the whole box fits the field of view.
    pub fn framing(min: Vec3, max: Vec3, config: &NavConfig) -> Self {
        let center = (min + max) * 0.5;
        let radius = ((max - min) * 0.5).length().max(f32::EPSILON);
        let distance = radius / (0.5 * config.fov_y).sin().max(0.1);
        Self {
            position: center - Vec3::X * distance - Vec3::Z * config.eye_height,
            heading: 0.0,
        }
    }

    pub fn forward_dir(&self) -> Vec3 {
        Vec3::new(self.heading.cos(), self.heading.sin(), 0.0)
    }

    pub fn apply(&mut self, command: Command, config: &NavConfig) {
        match command {
            Command::Forward { value } => {
                self.position += self.forward_dir() * value.unwrap_or(config.step);
            }
            Command::Turn { value } => {
                self.heading = (self.heading + value).rem_euclid(TAU);
            }
        }
    }

    pub fn camera(&self, config: &NavConfig, viewport: UVec2) -> Camera {
        let eye = self.position + Vec3::Z * config.eye_height;
        Camera::look_at(eye, eye + self.forward_dir(), Vec3::Z, config.fov_y, viewport)
    }

    pub fn frame_reply(&self, index: usize, viewport: UVec2, path: String) -> Reply {
        Reply::Frame {
            index,
            width: viewport.x,
            height: viewport.y,
            path,
            position: self.position.to_array(),
            heading: self.heading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn command_wire_format() {
        let forward: Command = serde_json::from_str(r#"{"type":"forward"}"#).unwrap();
        assert_eq!(forward, Command::Forward { value: None });

        let turn: Command = serde_json::from_str(r#"{"type":"turn","value":-0.5}"#).unwrap();
        assert_eq!(turn, Command::Turn { value: -0.5 });

        assert!(serde_json::from_str::<Command>(r#"{"type":"jump"}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"type":"turn"}"#).is_err());
    }

    #[test]
    fn reply_wire_format() {
        let reply = Reply::Error {
            message: "bad".into(),
        };
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"type":"error","message":"bad"}"#
        );

        let frame = Robot::default().frame_reply(3, UVec2::new(4, 2), "f.png".into());
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "frame");
        assert_eq!(json["index"], 3);
        assert_eq!(json["path"], "f.png");
    }

    #[test]
    fn turn_then_forward() {
        let config = NavConfig::default();
        let mut robot = Robot::default();
        robot.apply(Command::Turn { value: FRAC_PI_2 }, &config);
        robot.apply(Command::Forward { value: None }, &config);
        assert_approx_eq!(robot.position.x, 0.0, 1e-6);
        assert_approx_eq!(robot.position.y, config.step, 1e-6);

        robot.apply(Command::Forward { value: Some(-1.0) }, &config);
        assert_approx_eq!(robot.position.y, config.step - 1.0, 1e-6);
    }

    #[test]
    fn heading_wraps() {
        let config = NavConfig::default();
        let mut robot = Robot::default();
        robot.apply(Command::Turn { value: -FRAC_PI_2 }, &config);
        assert_approx_eq!(robot.heading, 3.0 * FRAC_PI_2, 1e-6);
    }

    #[test]
    fn camera_looks_along_heading() {
        let config = NavConfig::default();
        let robot = Robot {
            position: Vec3::new(-3.0, 0.0, 0.0),
            heading: 0.0,
        };
        let camera = robot.camera(&config, UVec2::new(32, 32));
        let ahead = camera.to_camera_space(Vec3::ZERO);
        assert!(Camera::depth(ahead) > 2.9);
        let center = camera.project(ahead).unwrap();
        assert_approx_eq!(center.x, 16.0, 1e-4);
        assert_approx_eq!(center.y, 16.0, 1e-4);
        // +Z is up on screen.
        let above = camera.project(camera.to_camera_space(Vec3::Z)).unwrap();
        assert!(above.y < 16.0);
    }

    #[test]
    fn framing_sees_the_whole_box() {
        let config = NavConfig::default();
        let (min, max) = (Vec3::splat(-1.0), Vec3::splat(1.0));
        let robot = Robot::framing(min, max, &config);
        let camera = robot.camera(&config, UVec2::new(64, 64));
        for corner in [min, max, Vec3::new(-1.0, 1.0, 1.0), Vec3::new(1.0, -1.0, -1.0)] {
            let p = camera.project(camera.to_camera_space(corner)).unwrap();
            assert!(p.cmpge(glam::Vec2::ZERO).all() && p.cmple(glam::Vec2::splat(64.0)).all());
        }
    }
}
