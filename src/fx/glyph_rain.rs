//! Glyph rain: columns of falling characters on a fixed 20 Hz tick
//!
//! One drop per `floor(width / glyph_size)` column. On resize every column
//! restarts at the default height; a brief flicker is acceptable here,
//! unlike the particle field which keeps its positions.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Effect;
use crate::consts::GLYPH_DEFAULT_DROP;
use crate::platform::{Event, Handles, Host, Source, Wake};
use crate::renderer::{Rgb, Surface};
use crate::settings::{EffectsConfig, GlyphRainConfig};

pub struct GlyphRain<S: Surface> {
    config: GlyphRainConfig,
    tick_ms: u32,
    glyphs: Vec<char>,
    accents: [Rgb; 2],
    surface: Option<S>,
    /// Drop height per column, in glyph rows
    drops: Vec<f32>,
    rng: Pcg32,
    pending_resize: Option<Vec2>,
    handles: Handles,
    running: bool,
}

impl<S: Surface> GlyphRain<S> {
    pub fn new(surface: Option<S>, config: &EffectsConfig, seed: u64) -> Self {
        let rain_config = config.glyph_rain.sanitized();
        let mut rain = Self {
            glyphs: rain_config.glyphs.chars().collect(),
            tick_ms: config.effective_glyph_tick_ms().max(1),
            config: rain_config,
            accents: config.palette.accents(),
            surface,
            drops: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            pending_resize: None,
            handles: Handles::new(),
            running: false,
        };
        match rain.surface.as_ref().map(|s| s.size()) {
            Some(size) => rain.reset_columns(size.x),
            None => log::warn!("Glyph rain has no drawing surface; disabled"),
        }
        rain
    }

    fn reset_columns(&mut self, width: f32) {
        let columns = (width.max(0.0) / self.config.glyph_size).floor() as usize;
        self.drops.clear();
        self.drops.resize(columns, GLYPH_DEFAULT_DROP);
    }

    pub fn columns(&self) -> usize {
        self.drops.len()
    }

    pub fn drops(&self) -> &[f32] {
        &self.drops
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Resize the surface and restart every column at the default height
    pub fn resize(&mut self, width: f32, height: f32) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.resize(width, height);
        let width = surface.size().x;
        self.reset_columns(width);
    }

    /// Draw one glyph per column and advance the drops
    pub fn tick(&mut self) {
        if let Some(size) = self.pending_resize.take() {
            self.resize(size.x, size.y);
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let height = surface.size().y;
        let cell = self.config.glyph_size;

        surface.fade(self.config.trail_alpha);
        surface.begin_glyphs(cell);
        for (i, drop) in self.drops.iter_mut().enumerate() {
            let glyph = self.glyphs[self.rng.random_range(0..self.glyphs.len())];
            let color = self.accents[self.rng.random_range(0..self.accents.len())];
            surface.fill_glyph(glyph, Vec2::new(i as f32 * cell, *drop * cell), color);

            if *drop * cell > height && self.rng.random::<f32>() > self.config.reset_threshold {
                *drop = 0.0;
            }
            *drop += 1.0;
        }
    }
}

impl<S: Surface> Effect for GlyphRain<S> {
    fn mount(&mut self, host: &mut dyn Host) {
        if self.running || self.surface.is_none() {
            return;
        }
        self.running = true;
        self.handles.track(host.set_interval(self.tick_ms, Wake::Tick));
        self.handles.track(host.listen(Source::Resize));
        log::debug!("Glyph rain started with {} columns", self.drops.len());
    }

    fn handle(&mut self, event: &Event, _host: &mut dyn Host) {
        match *event {
            Event::Timer(Wake::Tick) if self.running => self.tick(),
            Event::Resize { width, height } => {
                self.pending_resize = Some(Vec2::new(width, height));
            }
            _ => {}
        }
    }

    fn unmount(&mut self, host: &mut dyn Host) {
        self.handles.release_all(host);
        self.pending_resize = None;
        self.running = false;
    }
}
