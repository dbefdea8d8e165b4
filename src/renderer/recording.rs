//! In-memory surface that records draw calls
//!
//! Used by the headless host and by tests to observe what an effect painted
//! without a browser.

use glam::Vec2;

use super::{Rgb, Surface};

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Fade { alpha: f32 },
    Rect { pos: Vec2, size: Vec2, color: Rgb, alpha: f32 },
    Font { px: f32 },
    Glyph { glyph: char, pos: Vec2, color: Rgb },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Vec2,
    commands: Vec<DrawCmd>,
    resizes: u32,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
            resizes: 0,
        }
    }

    /// Drain recorded commands (one frame's worth, typically)
    pub fn take(&mut self) -> Vec<DrawCmd> {
        std::mem::take(&mut self.commands)
    }

    /// Number of times the backing store was resized
    pub fn resizes(&self) -> u32 {
        self.resizes
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
        self.resizes += 1;
    }

    fn fade(&mut self, alpha: f32) {
        self.commands.push(DrawCmd::Fade { alpha });
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Rgb, alpha: f32) {
        self.commands.push(DrawCmd::Rect {
            pos,
            size,
            color,
            alpha,
        });
    }

    fn begin_glyphs(&mut self, font_px: f32) {
        self.commands.push(DrawCmd::Font { px: font_px });
    }

    fn fill_glyph(&mut self, glyph: char, pos: Vec2, color: Rgb) {
        self.commands.push(DrawCmd::Glyph { glyph, pos, color });
    }
}
