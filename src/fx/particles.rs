//! Particle field: falling streaks redrawn every display frame
//!
//! The field owns its surface and a fixed-size particle array. Each frame it
//! paints a translucent black fill (so old streaks fade into trails), draws
//! every particle, moves it down by its speed, and recycles anything that
//! fell past the bottom edge back to the top at a fresh column.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Effect;
use crate::platform::{Event, HandleId, Handles, Host, Source};
use crate::renderer::{Rgb, Surface};
use crate::settings::{EffectsConfig, ParticleConfig};

/// A single falling streak
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per frame, always > 0
    pub speed: f32,
    pub color: Rgb,
}

pub struct ParticleField<S: Surface> {
    config: ParticleConfig,
    accents: [Rgb; 2],
    surface: Option<S>,
    particles: Vec<Particle>,
    rng: Pcg32,
    /// Latest resize not yet applied (coalesced until the next frame)
    pending_resize: Option<Vec2>,
    frame: Option<HandleId>,
    handles: Handles,
    running: bool,
}

impl<S: Surface> ParticleField<S> {
    /// Build the field and scatter particles over the surface.
    ///
    /// A missing surface yields an inert field that never draws.
    pub fn new(surface: Option<S>, config: &EffectsConfig, seed: u64) -> Self {
        let mut field = Self {
            config: ParticleConfig {
                count: config.effective_particle_count(),
                ..config.particles.sanitized()
            },
            accents: config.palette.accents(),
            surface,
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            pending_resize: None,
            frame: None,
            handles: Handles::new(),
            running: false,
        };
        match field.surface.as_ref().map(|s| s.size()) {
            Some(size) => field.spawn_all(size),
            None => log::warn!("Particle field has no drawing surface; disabled"),
        }
        field
    }

    fn spawn_all(&mut self, size: Vec2) {
        let mut particles = Vec::with_capacity(self.config.count);
        for _ in 0..self.config.count {
            let pos = Vec2::new(
                self.rng.random::<f32>() * size.x,
                self.rng.random::<f32>() * size.y,
            );
            particles.push(self.spawn(pos));
        }
        self.particles = particles;
    }

    fn spawn(&mut self, pos: Vec2) -> Particle {
        let (lo, hi) = (self.config.speed_min, self.config.speed_max);
        let speed = if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            lo
        };
        let color = self.accents[self.rng.random_range(0..self.accents.len())];
        Particle { pos, speed, color }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
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

    /// Resize the surface, keeping every particle where it is.
    ///
    /// Particles that end up right of a narrower surface are folded back
    /// into range; nothing is respawned.
    pub fn resize(&mut self, width: f32, height: f32) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.resize(width, height);
        let width = surface.size().x;
        if width <= 0.0 {
            return;
        }
        for p in self.particles.iter_mut() {
            if p.pos.x >= width {
                p.pos.x %= width;
            }
        }
    }

    /// Draw and advance one frame
    pub fn tick(&mut self) {
        if let Some(size) = self.pending_resize.take() {
            self.resize(size.x, size.y);
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let size = surface.size();

        surface.fade(self.config.trail_alpha);
        for p in self.particles.iter_mut() {
            surface.fill_rect(p.pos, self.config.streak, p.color, self.config.particle_alpha);
            p.pos.y += p.speed;
            if p.pos.y > size.y {
                p.pos.y = 0.0;
                p.pos.x = self.rng.random::<f32>() * size.x;
            }
        }
    }

    fn schedule(&mut self, host: &mut dyn Host) {
        self.frame = self.handles.track(host.request_frame());
    }
}

impl<S: Surface> Effect for ParticleField<S> {
    fn mount(&mut self, host: &mut dyn Host) {
        if self.running || self.surface.is_none() {
            return;
        }
        self.running = true;
        self.handles.track(host.listen(Source::Resize));
        self.schedule(host);
        log::debug!("Particle field started with {} particles", self.particles.len());
    }

    fn handle(&mut self, event: &Event, host: &mut dyn Host) {
        match *event {
            Event::Frame { .. } => {
                if let Some(id) = self.frame.take() {
                    self.handles.forget(id);
                }
                if self.running {
                    self.tick();
                    self.schedule(host);
                }
            }
            Event::Resize { width, height } => {
                self.pending_resize = Some(Vec2::new(width, height));
            }
            _ => {}
        }
    }

    fn unmount(&mut self, host: &mut dyn Host) {
        self.handles.release_all(host);
        self.frame = None;
        self.pending_resize = None;
        self.running = false;
    }
}
