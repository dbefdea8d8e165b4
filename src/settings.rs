//! Effect configuration
//!
//! One immutable value per page, handed to each effect at construction.
//! Every field has a default so partial JSON from the host page works.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::finite_or;
use crate::fx::Ease;
use crate::renderer::Rgb;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Multiplier applied to the configured particle count
    pub fn particle_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 2.0,
        }
    }

    /// Multiplier applied to the glyph rain tick interval
    pub fn tick_scale(&self) -> u32 {
        match self {
            QualityPreset::Low => 2,
            QualityPreset::Medium | QualityPreset::High => 1,
        }
    }
}

/// The two accent hues every effect draws with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb::new(0x00, 0xBF, 0xFF),
            secondary: Rgb::new(0xFF, 0x00, 0x33),
        }
    }
}

impl Palette {
    pub fn accents(&self) -> [Rgb; 2] {
        [self.primary, self.secondary]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Fall speed range in pixels per frame
    pub speed_min: f32,
    pub speed_max: f32,
    /// Opacity of the black fill painted over the previous frame
    pub trail_alpha: f32,
    pub particle_alpha: f32,
    /// Size of each streak in pixels
    pub streak: Vec2,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: PARTICLE_COUNT,
            speed_min: PARTICLE_SPEED_MIN,
            speed_max: PARTICLE_SPEED_MAX,
            trail_alpha: PARTICLE_TRAIL_ALPHA,
            particle_alpha: PARTICLE_ALPHA,
            streak: Vec2::new(1.0, 10.0),
        }
    }
}

impl ParticleConfig {
    /// Hard cap so a typo cannot allocate millions of particles
    pub const MAX_COUNT: usize = 10_000;

    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let speed_min = finite_or(self.speed_min, d.speed_min, 0.01, 1000.0);
        let speed_max = finite_or(self.speed_max, d.speed_max, 0.01, 1000.0).max(speed_min);
        Self {
            count: self.count.min(Self::MAX_COUNT),
            speed_min,
            speed_max,
            trail_alpha: finite_or(self.trail_alpha, d.trail_alpha, 0.0, 1.0),
            particle_alpha: finite_or(self.particle_alpha, d.particle_alpha, 0.0, 1.0),
            streak: if self.streak.is_finite() {
                self.streak.max(Vec2::ZERO)
            } else {
                d.streak
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphRainConfig {
    /// Glyph cell size in pixels (also the font size)
    pub glyph_size: f32,
    pub tick_ms: u32,
    pub glyphs: String,
    pub trail_alpha: f32,
    /// A column past the bottom restarts when a uniform draw exceeds this
    pub reset_threshold: f32,
}

impl Default for GlyphRainConfig {
    fn default() -> Self {
        Self {
            glyph_size: GLYPH_SIZE,
            tick_ms: GLYPH_TICK_MS,
            glyphs: "0123456789".to_string(),
            trail_alpha: GLYPH_TRAIL_ALPHA,
            reset_threshold: GLYPH_RESET_THRESHOLD,
        }
    }
}

impl GlyphRainConfig {
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            glyph_size: finite_or(self.glyph_size, d.glyph_size, 1.0, 512.0),
            tick_ms: self.tick_ms.clamp(1, 60_000),
            glyphs: if self.glyphs.is_empty() {
                d.glyphs
            } else {
                self.glyphs.clone()
            },
            trail_alpha: finite_or(self.trail_alpha, d.trail_alpha, 0.0, 1.0),
            reset_threshold: finite_or(self.reset_threshold, d.reset_threshold, 0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Ring diameters in pixels
    pub inner_size: f32,
    pub outer_size: f32,
    /// Pulse periods
    pub inner_pulse_ms: f64,
    pub outer_pulse_ms: f64,
    /// Peak scale of each ring's pulse
    pub inner_peak_scale: f32,
    pub outer_peak_scale: f32,
    /// Outer ring opacity at rest and at the pulse peak
    pub outer_opacity: f32,
    pub outer_peak_opacity: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            inner_size: 16.0,
            outer_size: 32.0,
            inner_pulse_ms: 500.0,
            outer_pulse_ms: 1000.0,
            inner_peak_scale: 1.2,
            outer_peak_scale: 1.5,
            outer_opacity: 0.5,
            outer_peak_opacity: 0.2,
        }
    }
}

impl CursorConfig {
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let period = |v: f64, fallback: f64| {
            if v.is_finite() && v > 0.0 { v } else { fallback }
        };
        Self {
            inner_size: finite_or(self.inner_size, d.inner_size, 0.0, 512.0),
            outer_size: finite_or(self.outer_size, d.outer_size, 0.0, 512.0),
            inner_pulse_ms: period(self.inner_pulse_ms, d.inner_pulse_ms),
            outer_pulse_ms: period(self.outer_pulse_ms, d.outer_pulse_ms),
            inner_peak_scale: finite_or(self.inner_peak_scale, d.inner_peak_scale, 0.0, 10.0),
            outer_peak_scale: finite_or(self.outer_peak_scale, d.outer_peak_scale, 0.0, 10.0),
            outer_opacity: finite_or(self.outer_opacity, d.outer_opacity, 0.0, 1.0),
            outer_peak_opacity: finite_or(self.outer_peak_opacity, d.outer_peak_opacity, 0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    pub alphabet: String,
    pub tick_ms: u32,
    pub max_iterations: usize,
    pub interval_ms: u32,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            alphabet: GLITCH_ALPHABET.to_string(),
            tick_ms: GLITCH_TICK_MS,
            max_iterations: GLITCH_MAX_ITERATIONS,
            interval_ms: GLITCH_INTERVAL_MS,
        }
    }
}

impl GlitchConfig {
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            alphabet: if self.alphabet.is_empty() {
                d.alphabet
            } else {
                self.alphabet.clone()
            },
            tick_ms: self.tick_ms.clamp(1, 10_000),
            max_iterations: self.max_iterations.min(1024),
            interval_ms: self.interval_ms.clamp(1, 3_600_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Fraction of viewport height (from the top) where reveals fire
    pub start_fraction: f32,
    /// Fraction of viewport height where timeline progress reaches 100%
    pub end_fraction: f32,
    pub duration_ms: f64,
    pub stagger_ms: f64,
    /// Offset of the initial state from rest, in pixels
    pub distance: f32,
    pub ease: Ease,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            start_fraction: REVEAL_START,
            end_fraction: REVEAL_END,
            duration_ms: REVEAL_DURATION_MS,
            stagger_ms: REVEAL_STAGGER_MS,
            distance: REVEAL_DISTANCE,
            ease: Ease::Power1Out,
        }
    }
}

impl RevealConfig {
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let non_negative = |v: f64, fallback: f64| {
            if v.is_finite() && v >= 0.0 { v } else { fallback }
        };
        let start_fraction = finite_or(self.start_fraction, d.start_fraction, 0.0, 1.0);
        Self {
            start_fraction,
            end_fraction: finite_or(self.end_fraction, d.end_fraction, 0.0, start_fraction),
            duration_ms: non_negative(self.duration_ms, d.duration_ms),
            stagger_ms: non_negative(self.stagger_ms, d.stagger_ms),
            distance: finite_or(self.distance, d.distance, 0.0, 1000.0),
            ease: self.ease,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    /// Rotation at the card edge, in degrees
    pub max_deg: f32,
    pub duration_ms: f64,
    pub ease: Ease,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_deg: 10.0,
            duration_ms: 500.0,
            ease: Ease::Power2Out,
        }
    }
}

impl TiltConfig {
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            max_deg: finite_or(self.max_deg, d.max_deg, 0.0, 90.0),
            duration_ms: if self.duration_ms.is_finite() && self.duration_ms >= 0.0 {
                self.duration_ms
            } else {
                d.duration_ms
            },
            ease: self.ease,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    /// Floating dots scattered over the layer
    pub dot_count: usize,
    /// How far a dot floats up at the top of its loop, in pixels
    pub dot_rise: f32,
    pub dot_opacity_min: f32,
    pub dot_opacity_max: f32,
    /// Each dot loops with a random period in this range
    pub dot_period_min_ms: f64,
    pub dot_period_max_ms: f64,
    /// Each dot starts after a random delay up to this
    pub dot_delay_max_ms: f64,
    /// Time for a light streak to cross the viewport (left, right)
    pub streak_periods_ms: [f64; 2],
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            dot_count: AMBIENT_DOT_COUNT,
            dot_rise: 30.0,
            dot_opacity_min: 0.3,
            dot_opacity_max: 0.8,
            dot_period_min_ms: 3000.0,
            dot_period_max_ms: 5000.0,
            dot_delay_max_ms: 2000.0,
            streak_periods_ms: AMBIENT_STREAK_PERIODS_MS,
        }
    }
}

impl AmbientConfig {
    pub const MAX_DOTS: usize = 200;

    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let period = |v: f64, fallback: f64| {
            if v.is_finite() && v > 0.0 { v } else { fallback }
        };
        let dot_period_min_ms = period(self.dot_period_min_ms, d.dot_period_min_ms);
        let dot_opacity_min = finite_or(self.dot_opacity_min, d.dot_opacity_min, 0.0, 1.0);
        Self {
            dot_count: self.dot_count.min(Self::MAX_DOTS),
            dot_rise: finite_or(self.dot_rise, d.dot_rise, 0.0, 1000.0),
            dot_opacity_min,
            dot_opacity_max: finite_or(self.dot_opacity_max, d.dot_opacity_max, dot_opacity_min, 1.0),
            dot_period_min_ms,
            dot_period_max_ms: period(self.dot_period_max_ms, d.dot_period_max_ms).max(dot_period_min_ms),
            dot_delay_max_ms: if self.dot_delay_max_ms.is_finite() {
                self.dot_delay_max_ms.max(0.0)
            } else {
                d.dot_delay_max_ms
            },
            streak_periods_ms: [0, 1].map(|i| period(self.streak_periods_ms[i], d.streak_periods_ms[i])),
        }
    }
}

/// Configuration for every effect on a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub quality: QualityPreset,
    pub palette: Palette,
    pub particles: ParticleConfig,
    pub glyph_rain: GlyphRainConfig,
    pub cursor: CursorConfig,
    pub glitch: GlitchConfig,
    pub reveal: RevealConfig,
    pub tilt: TiltConfig,
    pub ambient: AmbientConfig,
}

impl EffectsConfig {
    /// Parse (possibly partial) JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(|c| c.sanitized())
    }

    /// Clamp every value into a safe range, replacing nonsense with defaults
    pub fn sanitized(&self) -> Self {
        let out = Self {
            quality: self.quality,
            palette: self.palette,
            particles: self.particles.sanitized(),
            glyph_rain: self.glyph_rain.sanitized(),
            cursor: self.cursor.sanitized(),
            glitch: self.glitch.sanitized(),
            reveal: self.reveal.sanitized(),
            tilt: self.tilt.sanitized(),
            ambient: self.ambient.sanitized(),
        };
        if out != *self {
            log::warn!("Effect configuration had out-of-range values; clamped");
        }
        out
    }

    /// Particle count after the quality preset is applied
    pub fn effective_particle_count(&self) -> usize {
        let scaled = self.particles.count as f32 * self.quality.particle_scale();
        (scaled.round() as usize).min(ParticleConfig::MAX_COUNT)
    }

    /// Glyph rain tick after the quality preset is applied
    pub fn effective_glyph_tick_ms(&self) -> u32 {
        self.glyph_rain.tick_ms.saturating_mul(self.quality.tick_scale())
    }
}
