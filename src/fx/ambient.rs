//! Ambient lights: two glowing streaks sweeping across the viewport and a
//! scatter of small dots that float up and back on their own loops
//!
//! The layout (dot anchors, loop periods, start delays) is rolled once from
//! the effect's seed. Every display frame the current offsets are handed to
//! an [`AmbientLayer`], which owns the actual elements.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Effect;
use super::ease::pulse;
use super::reveal::Side;
use crate::platform::{Event, HandleId, Handles, Host};
use crate::renderer::Rgb;
use crate::settings::{AmbientConfig, EffectsConfig};

/// A vertical light streak anchored to one viewport edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Streak {
    /// Edge the streak starts from; it travels toward the other one
    pub side: Side,
    pub period_ms: f64,
    pub color: Rgb,
}

impl Streak {
    /// Horizontal offset from the anchor edge after `elapsed_ms`
    pub fn offset(&self, elapsed_ms: f64, width: f32) -> f32 {
        if self.period_ms <= 0.0 {
            return 0.0;
        }
        let phase = (elapsed_ms.max(0.0) % self.period_ms / self.period_ms) as f32;
        match self.side {
            Side::Right => -phase * width,
            _ => phase * width,
        }
    }
}

/// A floating dot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    /// Anchor position in percent of the layer, each axis in [0, 100)
    pub anchor: Vec2,
    pub color: Rgb,
    pub period_ms: f64,
    pub delay_ms: f64,
}

/// Where a dot is drawn this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotPose {
    /// Pixels above the anchor
    pub lift: f32,
    pub opacity: f32,
}

impl Dot {
    pub fn pose(&self, elapsed_ms: f64, config: &AmbientConfig) -> DotPose {
        let t = elapsed_ms - self.delay_ms;
        DotPose {
            lift: pulse(t, self.period_ms, 0.0, config.dot_rise),
            opacity: pulse(t, self.period_ms, config.dot_opacity_min, config.dot_opacity_max),
        }
    }
}

/// Host layer holding the streak and dot elements
pub trait AmbientLayer {
    /// Create one element per streak and dot
    fn build(&mut self, streaks: &[Streak], dots: &[Dot]);

    fn place_streak(&mut self, index: usize, offset: f32);

    fn place_dot(&mut self, index: usize, pose: &DotPose);

    /// Remove everything `build` created
    fn clear(&mut self);
}

pub struct AmbientLights<L: AmbientLayer> {
    config: AmbientConfig,
    layer: L,
    streaks: [Streak; 2],
    dots: Vec<Dot>,
    origin_ms: f64,
    frame: Option<HandleId>,
    handles: Handles,
    mounted: bool,
}

impl<L: AmbientLayer> AmbientLights<L> {
    pub fn new(layer: L, config: &EffectsConfig, seed: u64) -> Self {
        let ambient = config.ambient.sanitized();
        let [primary, secondary] = config.palette.accents();
        let mut rng = Pcg32::seed_from_u64(seed);

        let dots = (0..ambient.dot_count)
            .map(|i| {
                let (lo, hi) = (ambient.dot_period_min_ms, ambient.dot_period_max_ms);
                Dot {
                    anchor: Vec2::new(rng.random::<f32>() * 100.0, rng.random::<f32>() * 100.0),
                    color: if i % 2 == 0 { primary } else { secondary },
                    period_ms: if hi > lo { rng.random_range(lo..hi) } else { lo },
                    delay_ms: rng.random::<f64>() * ambient.dot_delay_max_ms,
                }
            })
            .collect();
        let streaks = [
            Streak {
                side: Side::Left,
                period_ms: ambient.streak_periods_ms[0],
                color: primary,
            },
            Streak {
                side: Side::Right,
                period_ms: ambient.streak_periods_ms[1],
                color: secondary,
            },
        ];

        Self {
            config: ambient,
            layer,
            streaks,
            dots,
            origin_ms: 0.0,
            frame: None,
            handles: Handles::new(),
            mounted: false,
        }
    }

    pub fn streaks(&self) -> &[Streak] {
        &self.streaks
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }

    pub fn is_running(&self) -> bool {
        self.mounted
    }

    fn render(&mut self, now_ms: f64, width: f32) {
        let elapsed = now_ms - self.origin_ms;
        for (i, streak) in self.streaks.iter().enumerate() {
            self.layer.place_streak(i, streak.offset(elapsed, width));
        }
        for (i, dot) in self.dots.iter().enumerate() {
            self.layer.place_dot(i, &dot.pose(elapsed, &self.config));
        }
    }
}

impl<L: AmbientLayer> Effect for AmbientLights<L> {
    fn mount(&mut self, host: &mut dyn Host) {
        if self.mounted {
            return;
        }
        self.frame = self.handles.track(host.request_frame());
        if self.frame.is_none() {
            log::warn!("Ambient lights have no display frames; disabled");
            return;
        }
        self.mounted = true;
        self.origin_ms = host.now_ms();
        self.layer.build(&self.streaks, &self.dots);
        log::debug!("Ambient lights started with {} dots", self.dots.len());
    }

    fn handle(&mut self, event: &Event, host: &mut dyn Host) {
        let Event::Frame { now_ms } = *event else {
            return;
        };
        if let Some(id) = self.frame.take() {
            self.handles.forget(id);
        }
        if self.mounted {
            self.render(now_ms, host.viewport().x);
            self.frame = self.handles.track(host.request_frame());
        }
    }

    fn unmount(&mut self, host: &mut dyn Host) {
        self.handles.release_all(host);
        self.frame = None;
        if self.mounted {
            self.layer.clear();
        }
        self.mounted = false;
    }
}
