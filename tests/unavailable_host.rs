//! A host that refuses frames, timers and listeners leaves every effect
//! inert: nothing is drawn or built, no text, ring or tilt changes, reveal targets
//! end at rest, and nothing is released twice.

use std::cell::Cell;
use std::rc::Rc;

use neon_fx::fx::{
    AmbientLayer, AmbientLights, CursorTracker, Dot, DotPose, Streak, GlitchScrambler, GlyphRain, ParticleField, PointerTilt, RevealController,
    RevealElement, RevealIntent, RevealOptions, RingOverlay, RingPose, TextNode, TiltTarget,
    Visual,
};
use neon_fx::platform::HeadlessHost;
use neon_fx::renderer::{Rect, RecordingSurface};
use neon_fx::{Effect, EffectsConfig, Event};

/// Element double that counts what the effects write to it
#[derive(Clone, Default)]
struct Recorder {
    writes: Rc<Cell<usize>>,
    last: Rc<Cell<Option<Visual>>>,
}

impl Recorder {
    fn hit(&self) {
        self.writes.set(self.writes.get() + 1);
    }

    fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl PartialEq for Recorder {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.writes, &other.writes)
    }
}

impl RingOverlay for Recorder {
    fn show(&mut self, _inner: &RingPose, _outer: &RingPose) {
        self.hit();
    }

    // Hidden is the resting state; only showing counts
    fn hide(&mut self) {}
}

impl TextNode for Recorder {
    fn source_text(&self) -> Option<String> {
        Some("SYSTEM_ONLINE".to_string())
    }

    fn set_text(&mut self, _text: &str) {
        self.hit();
    }
}

impl TiltTarget for Recorder {
    fn bounds(&self) -> Option<Rect> {
        Some(Rect::new(0.0, 0.0, 400.0, 300.0))
    }

    fn apply_rotation(&mut self, _rx: f32, _ry: f32) {
        self.hit();
    }
}

impl RevealElement for Recorder {
    fn bounds(&self) -> Option<Rect> {
        Some(Rect::new(0.0, 100.0, 400.0, 300.0))
    }

    fn apply(&mut self, visual: &Visual) {
        self.hit();
        self.last.set(Some(*visual));
    }
}

impl AmbientLayer for Recorder {
    fn build(&mut self, _streaks: &[Streak], _dots: &[Dot]) {
        self.hit();
    }

    fn place_streak(&mut self, _index: usize, _offset: f32) {
        self.hit();
    }

    fn place_dot(&mut self, _index: usize, _pose: &DotPose) {
        self.hit();
    }

    fn clear(&mut self) {
        self.hit();
    }
}

/// Mount, feed every kind of input, then unmount twice
fn exercise<E: Effect>(effect: &mut E) -> HeadlessHost {
    let mut host = HeadlessHost::unavailable(1200.0, 900.0);
    effect.mount(&mut host);
    assert!(!host.dispatch(effect, Event::PointerMove { x: 100.0, y: 100.0 }));
    host.advance(effect, 6000.0);
    assert!(!host.dispatch(effect, Event::Scroll));
    host.resize(effect, 800.0, 600.0);
    assert!(!host.dispatch(effect, Event::PointerLeave));
    host.advance(effect, 6000.0);
    effect.unmount(&mut host);
    effect.unmount(&mut host);
    host
}

fn assert_untouched(host: &HeadlessHost) {
    assert_eq!(host.live_handles(), 0);
    assert_eq!(host.stale_releases(), 0);
}

#[test]
fn test_cursor_never_renders() {
    let recorder = Recorder::default();
    let mut fx = CursorTracker::new(recorder.clone(), &EffectsConfig::default());
    let host = exercise(&mut fx);
    assert_untouched(&host);
    assert_eq!(recorder.writes(), 0);
}

#[test]
fn test_glitch_never_scrambles() {
    let recorder = Recorder::default();
    let mut fx = GlitchScrambler::attach(recorder.clone(), &EffectsConfig::default(), 1);
    let host = exercise(&mut fx);
    assert_untouched(&host);
    assert!(!fx.is_running());
    assert_eq!(recorder.writes(), 0);
}

#[test]
fn test_tilt_never_rotates() {
    let recorder = Recorder::default();
    let mut fx = PointerTilt::new(recorder.clone(), &EffectsConfig::default());
    let host = exercise(&mut fx);
    assert_untouched(&host);
    assert_eq!(recorder.writes(), 0);
}

#[test]
fn test_reveal_leaves_targets_visible() {
    let mut fx = RevealController::new(&EffectsConfig::default());
    let mut setup = HeadlessHost::unavailable(1200.0, 900.0);
    let fade = Recorder::default();
    let pop = Recorder::default();
    fx.register(fade.clone(), RevealOptions::default(), &mut setup);
    fx.register(pop.clone(), RevealOptions::new(RevealIntent::Pop { from_scale: 0.0 }), &mut setup);
    // Initial state only until mounted
    assert_eq!(fade.writes(), 1);

    let host = exercise(&mut fx);
    assert_untouched(&host);
    assert_eq!(fade.last.get(), Some(Visual::REST));
    assert_eq!(pop.last.get(), Some(Visual::REST));
    assert_eq!(fade.writes(), 2);
    assert_eq!(pop.writes(), 2);
}

#[test]
fn test_ambient_lights_never_build() {
    let recorder = Recorder::default();
    let mut fx = AmbientLights::new(recorder.clone(), &EffectsConfig::default(), 4);
    let host = exercise(&mut fx);
    assert_untouched(&host);
    assert!(!fx.is_running());
    assert_eq!(recorder.writes(), 0);
}

#[test]
fn test_canvas_effects_never_draw() {
    let config = EffectsConfig::default();
    let mut field = ParticleField::new(Some(RecordingSurface::new(1200.0, 900.0)), &config, 1);
    let host = exercise(&mut field);
    assert_untouched(&host);
    assert!(field.surface_mut().is_some_and(|s| s.take().is_empty()));

    let mut rain = GlyphRain::new(Some(RecordingSurface::new(1200.0, 900.0)), &config, 2);
    let host = exercise(&mut rain);
    assert_untouched(&host);
    assert!(rain.surface_mut().is_some_and(|s| s.take().is_empty()));
}
