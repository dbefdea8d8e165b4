//! Neon FX - decorative canvas and DOM effects for the browser
//!
//! Core modules:
//! - `fx`: Effect state machines (particles, glyph rain, cursor, glitch, reveal, tilt, ambient lights)
//! - `renderer`: Drawing surfaces and DOM bindings
//! - `platform`: Host abstraction (frames, timers, listeners) for browser and headless runs
//! - `settings`: Data-driven effect configuration

pub mod fx;
pub mod platform;
pub mod renderer;
pub mod settings;

pub use fx::Effect;
pub use platform::{Event, HandleId, Host};
pub use settings::EffectsConfig;

/// Shared timing and palette constants
pub mod consts {
    /// Display frame interval assumed by the headless host (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Accent hues shared by every effect
    pub const ACCENT_BLUE: &str = "#00BFFF";
    pub const ACCENT_RED: &str = "#FF0033";

    /// Particle rain defaults
    pub const PARTICLE_COUNT: usize = 50;
    pub const PARTICLE_SPEED_MIN: f32 = 1.0;
    pub const PARTICLE_SPEED_MAX: f32 = 3.0;
    pub const PARTICLE_TRAIL_ALPHA: f32 = 0.05;
    pub const PARTICLE_ALPHA: f32 = 0.3;

    /// Glyph rain defaults (50 ms tick, about 20 Hz)
    pub const GLYPH_SIZE: f32 = 5.0;
    pub const GLYPH_TICK_MS: u32 = 50;
    pub const GLYPH_TRAIL_ALPHA: f32 = 0.1;
    pub const GLYPH_RESET_THRESHOLD: f32 = 0.975;
    pub const GLYPH_DEFAULT_DROP: f32 = 1.0;

    /// Glitch text defaults
    pub const GLITCH_ALPHABET: &str = "!<>-_\\/[]{}—=+*^?#_01";
    pub const GLITCH_TICK_MS: u32 = 50;
    pub const GLITCH_MAX_ITERATIONS: usize = 5;
    pub const GLITCH_INTERVAL_MS: u32 = 5000;

    /// Reveal trigger band (fractions of viewport height from the top)
    pub const REVEAL_START: f32 = 0.85;
    pub const REVEAL_END: f32 = 0.2;
    pub const REVEAL_DURATION_MS: f64 = 1000.0;
    pub const REVEAL_STAGGER_MS: f64 = 100.0;
    pub const REVEAL_DISTANCE: f32 = 50.0;

    /// Ambient light layer defaults
    pub const AMBIENT_DOT_COUNT: usize = 20;
    pub const AMBIENT_STREAK_PERIODS_MS: [f64; 2] = [8000.0, 10000.0];
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Replace a non-finite value with a fallback, then clamp
#[inline]
pub fn finite_or(value: f32, fallback: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
