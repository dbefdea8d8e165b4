//! Canvas 2D surface

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Rgb, Surface};

/// A `<canvas>` element and its 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    size: Vec2,
}

impl CanvasSurface {
    /// Wrap a canvas, sizing it to `width` x `height`.
    ///
    /// Returns `None` when the browser refuses a 2D context; callers treat
    /// that as "effect disabled".
    pub fn attach(canvas: HtmlCanvasElement, width: f32, height: f32) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let mut surface = Self {
            canvas,
            ctx,
            size: Vec2::ZERO,
        };
        surface.resize(width, height);
        Some(surface)
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn resize(&mut self, width: f32, height: f32) {
        let (w, h) = (width.max(0.0) as u32, height.max(0.0) as u32);
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.size = Vec2::new(w as f32, h as f32);
    }

    fn fade(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style_str(&Rgb::BLACK.css(alpha));
        self.ctx
            .fill_rect(0.0, 0.0, self.size.x as f64, self.size.y as f64);
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Rgb, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
        self.ctx.set_global_alpha(1.0);
    }

    fn begin_glyphs(&mut self, font_px: f32) {
        self.ctx.set_font(&format!("{font_px}px monospace"));
    }

    fn fill_glyph(&mut self, glyph: char, pos: Vec2, color: Rgb) {
        let mut buf = [0u8; 4];
        self.ctx.set_fill_style_str(&color.to_string());
        let _ = self
            .ctx
            .fill_text(glyph.encode_utf8(&mut buf), pos.x as f64, pos.y as f64);
    }
}
