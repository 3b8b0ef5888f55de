//! CPU reference of the per-splat shading math. A GPU shader implementing the
//! same footprints must agree with these functions within float tolerance.

pub mod camera;
pub mod config;
pub mod footprint;
pub mod sh;

pub use camera::Camera;
pub use config::{BlendMode, FootprintModel, RenderConfig};
pub use footprint::{project, Footprint, ProjectedSplat};
