//! Effect state machines
//!
//! Every effect is a single owned value driven by one dispatch function:
//! - `mount` acquires frames, timers and listeners from the host
//! - `handle` reacts to exactly one external event
//! - `unmount` releases everything it acquired (safe to call twice)
//!
//! No effect shares mutable state with another; randomness comes from a
//! seeded PCG stream owned by the effect.

pub mod ambient;
pub mod cursor;
pub mod ease;
pub mod glitch;
pub mod glyph_rain;
pub mod particles;
pub mod reveal;
pub mod tilt;

pub use ambient::{AmbientLayer, AmbientLights, Dot, DotPose, Streak};
pub use cursor::{CursorState, CursorTracker, RingOverlay, RingPose};
pub use ease::{Ease, Tween};
pub use glitch::{GlitchScrambler, TextNode};
pub use glyph_rain::GlyphRain;
pub use particles::{Particle, ParticleField};
pub use reveal::{Axis, RevealController, RevealElement, RevealHandle, RevealIntent, RevealOptions, Side, Visual};
pub use tilt::{PointerTilt, TiltTarget};

use crate::platform::{Event, Host};

/// A mounted visual effect
pub trait Effect {
    /// Acquire resources and start running
    fn mount(&mut self, host: &mut dyn Host);

    /// React to one event from the host
    fn handle(&mut self, event: &Event, host: &mut dyn Host);

    /// Release every resource; idempotent
    fn unmount(&mut self, host: &mut dyn Host);
}
