use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shading::sh::MAX_SH_DEGREE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootprintModel {
    /// Projected 3D covariance with Gaussian falloff.
    #[default]
    Covariance,
    /// Screen aligned ellipse sized by the largest scale axis.
    Ellipse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
}

impl FromStr for FootprintModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "covariance" => Ok(Self::Covariance),
            "ellipse" => Ok(Self::Ellipse),
            other => Err(format!("unknown footprint model '{other}'")),
        }
    }
}

impl FromStr for BlendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "additive" => Ok(Self::Additive),
            other => Err(format!("unknown blend mode '{other}'")),
        }
    }
}

/// Everything one draw call needs besides the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub sh_degree: u32,
    /// Multiplier on every splat's scale.
    pub point_scale: f32,
    /// Multiplier on the Mahalanobis distance of the covariance footprint.
    pub chi_scale: f32,
    pub footprint: FootprintModel,
    pub blend: BlendMode,
    pub background: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sh_degree: MAX_SH_DEGREE,
            point_scale: 1.0,
            chi_scale: 1.0,
            footprint: FootprintModel::Covariance,
            blend: BlendMode::Normal,
            background: [0.0; 3],
        }
    }
}

impl RenderConfig {
    /// Requested degree, clamped to what the shading model evaluates.
    pub fn degree(&self) -> u32 {
        self.sh_degree.min(MAX_SH_DEGREE)
    }
}
