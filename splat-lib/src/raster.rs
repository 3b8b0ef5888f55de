use glam::{Vec2, Vec3};
use log::debug;

use crate::columns::ColumnStore;
use crate::common::clamp_u8;
use crate::shading::{project, BlendMode, Camera, RenderConfig};

/// Linear RGB image the reference rasterizer draws into.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub drawn: usize,
    pub culled: usize,
    pub fragments: usize,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, background: Vec3) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[self.index(x, y)]
    }

    /// Packed 8 bit RGB rows; out of range channels saturate.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| p.to_array().map(clamp_u8))
            .collect()
    }

    #[inline]
    fn blend(&mut self, x: u32, y: u32, color: Vec3, alpha: f32, mode: BlendMode) {
        let index = self.index(x, y);
        let dst = &mut self.pixels[index];
        *dst = match mode {
            BlendMode::Normal => color * alpha + *dst * (1.0 - alpha),
            BlendMode::Additive => *dst + color * alpha,
        };
    }
}

/// Splats every column-store entry in order, without depth sorting.
pub fn render(
    columns: &ColumnStore,
    camera: &Camera,
    config: &RenderConfig,
) -> (Framebuffer, RenderStats) {
    let (width, height) = (camera.viewport.x, camera.viewport.y);
    let mut frame = Framebuffer::new(width, height, Vec3::from_array(config.background));
    let mut stats = RenderStats::default();

    for attrs in columns.iter() {
        let Some(splat) = project(&attrs, camera, config) else {
            stats.culled += 1;
            continue;
        };

        let min = (splat.center - splat.radius).floor().max(Vec2::ZERO);
        let max = (splat.center + splat.radius)
            .ceil()
            .min(Vec2::new(width as f32, height as f32));
        if min.x >= max.x || min.y >= max.y {
            stats.culled += 1;
            continue;
        }
        stats.drawn += 1;

        for y in min.y as u32..max.y as u32 {
            for x in min.x as u32..max.x as u32 {
                let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if let Some(alpha) = splat.alpha_at(pixel) {
                    let alpha = alpha.min(1.0);
                    frame.blend(x, y, splat.color, alpha, config.blend);
                    stats.fragments += 1;
                }
            }
        }
    }

    debug!(
        "Rendered {}x{}: {} splats drawn, {} culled, {} fragments",
        width, height, stats.drawn, stats.culled, stats.fragments
    );
    (frame, stats)
}
