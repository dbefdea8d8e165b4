//! Drawing surfaces and DOM bindings
//!
//! Effects draw through the [`Surface`] trait and mutate elements through the
//! small traits in `fx`. The browser implementations live in `canvas` and
//! `dom`; `recording` captures draw calls for headless runs.

pub mod color;
pub mod recording;

#[cfg(target_arch = "wasm32")]
pub mod canvas;
#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use color::Rgb;
pub use recording::{DrawCmd, RecordingSurface};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use glam::Vec2;

/// An owned 2D drawing target
pub trait Surface {
    /// Current size in surface pixels
    fn size(&self) -> Vec2;

    /// Resize the backing store (contents may be discarded)
    fn resize(&mut self, width: f32, height: f32);

    /// Paint translucent black over the whole surface (trail effect)
    fn fade(&mut self, alpha: f32);

    /// Fill an axis-aligned rectangle
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Rgb, alpha: f32);

    /// Select the monospace font size for the following glyphs
    fn begin_glyphs(&mut self, font_px: f32);

    /// Draw one glyph with its baseline at `pos`
    fn fill_glyph(&mut self, glyph: char, pos: Vec2, color: Rgb);
}

/// Axis-aligned rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(left, top),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.pos.x
            && p.y >= self.pos.y
            && p.x <= self.pos.x + self.size.x
            && p.y <= self.pos.y + self.size.y
    }

    /// Position of `p` relative to the centre, each axis in [-0.5, 0.5]
    pub fn normalized(&self, p: Vec2) -> Vec2 {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return Vec2::ZERO;
        }
        ((p - self.pos) / self.size - Vec2::splat(0.5)).clamp(Vec2::splat(-0.5), Vec2::splat(0.5))
    }
}
