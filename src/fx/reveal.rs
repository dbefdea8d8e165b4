//! Viewport reveal controller
//!
//! Elements are registered with an intent and start in their initial state
//! (transparent, offset from rest). The controller watches scroll and resize
//! while anything is observed:
//!
//! - One-shot intents fire when the element's top crosses the trigger line
//!   (`start_fraction` of the viewport height) and tween to rest. Once a
//!   one-shot reveal has played the element is no longer observed.
//! - Repeating intents snap back when the element drops below the line and
//!   fire again on the next entry.
//! - Timeline intents map scroll progress through the band onto an extent
//!   (0..100%). When progress leaves [0, 1] the band edge it crossed is
//!   written once and the extent stays there.
//!
//! Listeners are held only while something is observed and frames only
//! while a tween is in flight. A host that refuses scroll observation or
//! frames gets every affected target written at rest, so content is never
//! left hidden.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::Effect;
use super::ease::{Ease, Tween};
use crate::platform::{Event, HandleId, Handles, Host, Source};
use crate::renderer::Rect;
use crate::settings::{EffectsConfig, RevealConfig};

/// Host element the controller animates
pub trait RevealElement {
    /// Viewport rectangle, or `None` once the element left the document
    fn bounds(&self) -> Option<Rect>;

    /// Write the visual state to the element
    fn apply(&mut self, visual: &Visual);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Width,
    Height,
}

/// What the reveal does to its element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevealIntent {
    /// Fade in place
    Fade,
    /// Fade in while rising into place
    #[default]
    FadeRise,
    /// Fade in while sliding in from one side (`top` drops from above)
    FadeSlide { from: Side },
    /// Fade in while scaling up from `from_scale`
    Pop {
        #[serde(default = "default_pop_scale")]
        from_scale: f32,
    },
    /// Grow an extent from 0% to `percent` (progress bars)
    Grow { axis: Axis, percent: f32 },
    /// Extent follows scroll progress through the trigger band
    Timeline { axis: Axis },
}

fn default_pop_scale() -> f32 {
    0.9
}

/// Per-target options; unset fields use the controller's configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealOptions {
    pub intent: RevealIntent,
    /// Fire only on the first entry
    pub once: bool,
    pub delay_ms: f64,
    /// Position among siblings; each step adds one stagger interval
    pub stagger_index: u32,
    pub duration_ms: Option<f64>,
    pub ease: Option<Ease>,
    pub start_fraction: Option<f32>,
    /// Offset of the initial state in pixels
    pub distance: Option<f32>,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            intent: RevealIntent::FadeRise,
            once: true,
            delay_ms: 0.0,
            stagger_index: 0,
            duration_ms: None,
            ease: None,
            start_fraction: None,
            distance: None,
        }
    }
}

impl RevealOptions {
    pub fn new(intent: RevealIntent) -> Self {
        Self {
            intent,
            ..Self::default()
        }
    }

    pub fn repeat(mut self) -> Self {
        self.once = false;
        self
    }

    pub fn delay(mut self, ms: f64) -> Self {
        self.delay_ms = ms;
        self
    }

    pub fn stagger(mut self, index: u32) -> Self {
        self.stagger_index = index;
        self
    }

    pub fn duration(mut self, ms: f64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    pub fn start_at(mut self, fraction: f32) -> Self {
        self.start_fraction = Some(fraction);
        self
    }

    pub fn distance(mut self, px: f32) -> Self {
        self.distance = Some(px);
        self
    }
}

/// Visual attributes written to an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visual {
    pub opacity: f32,
    /// Translation from the resting position, in pixels
    pub offset: Vec2,
    pub scale: f32,
    /// Size along an axis, in percent of the container
    pub extent: Option<(Axis, f32)>,
}

impl Visual {
    pub const REST: Visual = Visual {
        opacity: 1.0,
        offset: Vec2::ZERO,
        scale: 1.0,
        extent: None,
    };

    /// State before the reveal fires
    pub fn initial(intent: RevealIntent, distance: f32) -> Self {
        match intent {
            RevealIntent::Fade => Visual {
                opacity: 0.0,
                ..Self::REST
            },
            RevealIntent::FadeRise => Visual {
                opacity: 0.0,
                offset: Vec2::new(0.0, distance),
                ..Self::REST
            },
            RevealIntent::FadeSlide { from } => Visual {
                opacity: 0.0,
                offset: match from {
                    Side::Left => Vec2::new(-distance, 0.0),
                    Side::Right => Vec2::new(distance, 0.0),
                    Side::Top => Vec2::new(0.0, -distance),
                    Side::Bottom => Vec2::new(0.0, distance),
                },
                ..Self::REST
            },
            RevealIntent::Pop { from_scale } => Visual {
                opacity: 0.0,
                scale: from_scale,
                ..Self::REST
            },
            RevealIntent::Grow { axis, .. } | RevealIntent::Timeline { axis } => Visual {
                extent: Some((axis, 0.0)),
                ..Self::REST
            },
        }
    }

    /// State once the reveal has played
    pub fn resting(intent: RevealIntent) -> Self {
        match intent {
            RevealIntent::Grow { axis, percent } => Visual {
                extent: Some((axis, percent.clamp(0.0, 100.0))),
                ..Self::REST
            },
            RevealIntent::Timeline { axis } => Visual {
                extent: Some((axis, 100.0)),
                ..Self::REST
            },
            _ => Self::REST,
        }
    }

    pub fn lerp(&self, to: &Visual, t: f32) -> Visual {
        let extent = match (self.extent, to.extent) {
            (Some((axis, a)), Some((_, b))) => Some((axis, crate::lerp(a, b, t))),
            (a, b) => b.or(a),
        };
        Visual {
            opacity: crate::lerp(self.opacity, to.opacity, t),
            offset: self.offset.lerp(to.offset, t),
            scale: crate::lerp(self.scale, to.scale, t),
            extent,
        }
    }

    /// CSS `transform` value for the offset and scale
    pub fn transform_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.offset.x, self.offset.y, self.scale
        )
    }
}

/// Token returned by `register`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Observed, waiting for the trigger line
    Waiting,
    /// Tween in flight
    Playing(Tween),
    /// Played; observed again only when repeating
    Done,
    /// Scroll-linked; progress last written, clamped to [0, 1]
    Tracking(f32),
}

struct Target<E> {
    handle: RevealHandle,
    element: E,
    options: RevealOptions,
    initial: Visual,
    resting: Visual,
    phase: Phase,
}

impl<E> Target<E> {
    fn observed(&self) -> bool {
        match self.phase {
            Phase::Waiting | Phase::Tracking(_) => true,
            Phase::Done => !self.options.once,
            Phase::Playing(_) => false,
        }
    }
}

/// Scroll progress of `rect` through the band between two viewport lines
///
/// 0 when the top touches `start_line`, 1 when the bottom reaches `end_line`.
pub fn timeline_progress(rect: &Rect, start_line: f32, end_line: f32) -> f32 {
    let span = start_line - end_line + rect.size.y;
    if span <= 0.0 {
        return if rect.top() <= start_line { 1.0 } else { 0.0 };
    }
    (start_line - rect.top()) / span
}

pub struct RevealController<E: RevealElement + PartialEq> {
    config: RevealConfig,
    targets: Vec<Target<E>>,
    next_handle: u32,
    scroll: Option<HandleId>,
    resize: Option<HandleId>,
    frame: Option<HandleId>,
    handles: Handles,
    mounted: bool,
}

impl<E: RevealElement + PartialEq> RevealController<E> {
    pub fn new(config: &EffectsConfig) -> Self {
        Self {
            config: config.reveal.sanitized(),
            targets: Vec::new(),
            next_handle: 1,
            scroll: None,
            resize: None,
            frame: None,
            handles: Handles::new(),
            mounted: false,
        }
    }

    /// Start observing `element`; registering it again returns the same handle
    pub fn register(&mut self, element: E, options: RevealOptions, host: &mut dyn Host) -> RevealHandle {
        if let Some(existing) = self.targets.iter().find(|t| t.element == element) {
            return existing.handle;
        }
        let handle = RevealHandle(self.next_handle);
        self.next_handle += 1;

        let options = self.sanitize_options(options);
        let initial = Visual::initial(options.intent, options.distance.unwrap_or(self.config.distance));
        let mut target = Target {
            handle,
            element,
            options,
            initial,
            resting: Visual::resting(options.intent),
            phase: match options.intent {
                RevealIntent::Timeline { .. } => Phase::Tracking(0.0),
                _ => Phase::Waiting,
            },
        };
        target.element.apply(&initial);
        self.targets.push(target);

        if self.mounted {
            self.evaluate(host);
            self.sync(host);
        }
        handle
    }

    /// Stop observing; unknown handles are ignored
    pub fn unregister(&mut self, handle: RevealHandle, host: &mut dyn Host) {
        let before = self.targets.len();
        self.targets.retain(|t| t.handle != handle);
        if self.targets.len() != before {
            self.sync(host);
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_registered(&self, handle: RevealHandle) -> bool {
        self.targets.iter().any(|t| t.handle == handle)
    }

    /// Whether a registered target has finished its one-shot reveal
    pub fn is_done(&self, handle: RevealHandle) -> bool {
        self.targets
            .iter()
            .any(|t| t.handle == handle && t.phase == Phase::Done)
    }

    fn sanitize_options(&self, mut o: RevealOptions) -> RevealOptions {
        if !o.delay_ms.is_finite() || o.delay_ms < 0.0 {
            o.delay_ms = 0.0;
        }
        o.duration_ms = o.duration_ms.filter(|d| d.is_finite() && *d >= 0.0);
        o.start_fraction = o.start_fraction.filter(|f| f.is_finite()).map(|f| f.clamp(0.0, 1.0));
        o.distance = o.distance.filter(|d| d.is_finite()).map(|d| d.clamp(0.0, 1000.0));
        match o.intent {
            RevealIntent::Grow { axis, percent } => {
                o.intent = RevealIntent::Grow {
                    axis,
                    percent: crate::finite_or(percent, 100.0, 0.0, 100.0),
                };
                o.ease = o.ease.or(Some(Ease::Power3Out));
            }
            RevealIntent::Pop { from_scale } => {
                o.intent = RevealIntent::Pop {
                    from_scale: crate::finite_or(from_scale, default_pop_scale(), 0.0, 2.0),
                };
            }
            _ => {}
        }
        o
    }

    /// Check every observed target against the trigger band
    fn evaluate(&mut self, host: &mut dyn Host) {
        let now = host.now_ms();
        let vh = host.viewport().y;
        let config = &self.config;
        self.targets.retain_mut(|t| {
            if !t.observed() {
                return true;
            }
            let Some(rect) = t.element.bounds() else {
                log::debug!("Reveal target {:?} detached; dropping", t.handle);
                return false;
            };
            let start_line = t.options.start_fraction.unwrap_or(config.start_fraction) * vh;
            match t.phase {
                Phase::Waiting if rect.top() <= start_line => {
                    let delay = t.options.delay_ms + t.options.stagger_index as f64 * config.stagger_ms;
                    t.phase = Phase::Playing(Tween::new(
                        now + delay,
                        t.options.duration_ms.unwrap_or(config.duration_ms),
                        t.options.ease.unwrap_or(config.ease),
                    ));
                }
                Phase::Done if rect.top() > start_line => {
                    t.element.apply(&t.initial);
                    t.phase = Phase::Waiting;
                }
                Phase::Tracking(last) => {
                    let end_line = config.end_fraction * vh;
                    // Outside the band this is the edge just crossed; written once
                    let p = timeline_progress(&rect, start_line, end_line).clamp(0.0, 1.0);
                    if p != last {
                        let visual = t.initial.lerp(&t.resting, p);
                        t.element.apply(&visual);
                        t.phase = Phase::Tracking(p);
                    }
                }
                _ => {}
            }
            true
        });
    }

    /// Advance in-flight tweens
    fn animate(&mut self, now_ms: f64) {
        self.targets.retain_mut(|t| {
            let Phase::Playing(tween) = t.phase else {
                return true;
            };
            if t.element.bounds().is_none() {
                log::debug!("Reveal target {:?} detached mid-tween; dropping", t.handle);
                return false;
            }
            let visual = t.initial.lerp(&t.resting, tween.sample(now_ms));
            t.element.apply(&visual);
            if tween.is_done(now_ms) {
                t.phase = Phase::Done;
            }
            true
        });
    }

    /// Write every target at rest and stop tracking it
    fn settle_all(&mut self) {
        for t in self.targets.iter_mut() {
            t.element.apply(&t.resting);
        }
        self.targets.clear();
    }

    /// Hold exactly the listeners and frame the current targets need
    fn sync(&mut self, host: &mut dyn Host) {
        let observing = self.mounted && self.targets.iter().any(|t| t.observed());
        if observing && self.scroll.is_none() {
            self.scroll = self.handles.track(host.listen(Source::Scroll));
            self.resize = self.handles.track(host.listen(Source::Resize));
            if self.scroll.is_none() {
                log::warn!("Scroll observation unavailable; showing reveal targets at rest");
                if let Some(id) = self.resize.take() {
                    self.handles.release(id, host);
                }
                self.settle_all();
            }
        } else if !observing {
            for id in [self.scroll.take(), self.resize.take()].into_iter().flatten() {
                self.handles.release(id, host);
            }
        }

        let animating = self.mounted && self.targets.iter().any(|t| matches!(t.phase, Phase::Playing(_)));
        if animating && self.frame.is_none() {
            self.frame = self.handles.track(host.request_frame());
            if self.frame.is_none() {
                log::warn!("Display frames unavailable; finishing reveals at rest");
                for t in self.targets.iter_mut() {
                    if matches!(t.phase, Phase::Playing(_)) {
                        t.element.apply(&t.resting);
                        t.phase = Phase::Done;
                    }
                }
            }
        } else if !animating {
            if let Some(id) = self.frame.take() {
                self.handles.release(id, host);
            }
        }
    }
}

impl<E: RevealElement + PartialEq> Effect for RevealController<E> {
    fn mount(&mut self, host: &mut dyn Host) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.evaluate(host);
        self.sync(host);
    }

    fn handle(&mut self, event: &Event, host: &mut dyn Host) {
        if !self.mounted {
            return;
        }
        match *event {
            Event::Scroll | Event::Resize { .. } => self.evaluate(host),
            Event::Frame { now_ms } => {
                if let Some(id) = self.frame.take() {
                    self.handles.forget(id);
                }
                self.animate(now_ms);
            }
            _ => return,
        }
        self.sync(host);
    }

    fn unmount(&mut self, host: &mut dyn Host) {
        self.handles.release_all(host);
        self.scroll = None;
        self.resize = None;
        self.frame = None;
        self.targets.clear();
        self.mounted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessHost;
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Element whose rectangle the test moves around
    #[derive(Clone)]
    struct FakeElement {
        id: u32,
        rect: Rc<Cell<Option<Rect>>>,
        applied: Rc<RefCell<Vec<Visual>>>,
    }

    impl FakeElement {
        fn at(id: u32, top: f32, height: f32) -> Self {
            Self {
                id,
                rect: Rc::new(Cell::new(Some(Rect::new(0.0, top, 300.0, height)))),
                applied: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn move_to(&self, top: f32) {
            if let Some(mut r) = self.rect.get() {
                r.pos.y = top;
                self.rect.set(Some(r));
            }
        }

        fn detach(&self) {
            self.rect.set(None);
        }

        fn last(&self) -> Visual {
            *self.applied.borrow().last().unwrap()
        }

        fn writes(&self) -> usize {
            self.applied.borrow().len()
        }
    }

    impl PartialEq for FakeElement {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }

    impl RevealElement for FakeElement {
        fn bounds(&self) -> Option<Rect> {
            self.rect.get()
        }

        fn apply(&mut self, visual: &Visual) {
            self.applied.borrow_mut().push(*visual);
        }
    }

    fn controller() -> (HeadlessHost, RevealController<FakeElement>) {
        let mut host = HeadlessHost::new(1000.0, 1000.0);
        let mut c = RevealController::new(&EffectsConfig::default());
        c.mount(&mut host);
        (host, c)
    }

    #[test]
    fn test_registered_target_starts_in_initial_state() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 2000.0, 100.0);
        c.register(el.clone(), RevealOptions::default(), &mut host);
        assert_eq!(el.writes(), 1);
        let v = el.last();
        assert_eq!(v.opacity, 0.0);
        assert_eq!(v.offset, Vec2::new(0.0, 50.0));
        assert!(host.is_listening(Source::Scroll));
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn test_fires_when_top_crosses_trigger_line() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 900.0, 100.0);
        let h = c.register(el.clone(), RevealOptions::default(), &mut host);
        host.dispatch(&mut c, Event::Scroll);
        assert_eq!(el.writes(), 1);

        el.move_to(840.0);
        host.dispatch(&mut c, Event::Scroll);
        assert_eq!(host.pending_frames(), 1);
        // Once fired, nothing else is observed
        assert!(!host.is_listening(Source::Scroll));

        host.advance(&mut c, 1100.0);
        assert_eq!(el.last(), Visual::REST);
        assert!(c.is_done(h));
        assert_eq!(host.live_handles(), 0);
    }

    #[test]
    fn test_visible_at_registration_fires_immediately() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 100.0, 100.0);
        let pop = RevealIntent::Pop { from_scale: 0.9 };
        c.register(el.clone(), RevealOptions::new(pop), &mut host);
        assert_eq!(el.last().scale, 0.9);
        host.advance(&mut c, 1100.0);
        assert_eq!(el.last(), Visual::REST);
    }

    #[test]
    fn test_double_register_returns_same_handle() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(7, 2000.0, 100.0);
        let a = c.register(el.clone(), RevealOptions::default(), &mut host);
        let b = c.register(el.clone(), RevealOptions::default(), &mut host);
        assert_eq!(a, b);
        assert_eq!(c.len(), 1);
        assert_eq!(el.writes(), 1);
    }

    #[test]
    fn test_one_shot_never_refires() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 500.0, 100.0);
        c.register(el.clone(), RevealOptions::default(), &mut host);
        host.advance(&mut c, 1100.0);
        let writes = el.writes();

        el.move_to(2000.0);
        c.handle(&Event::Scroll, &mut host);
        el.move_to(300.0);
        c.handle(&Event::Scroll, &mut host);
        host.advance(&mut c, 2000.0);
        assert_eq!(el.writes(), writes);
    }

    #[test]
    fn test_repeat_refires_on_each_entry() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 500.0, 100.0);
        c.register(el.clone(), RevealOptions::default().repeat(), &mut host);
        host.advance(&mut c, 1100.0);
        assert_eq!(el.last(), Visual::REST);

        el.move_to(2000.0);
        host.dispatch(&mut c, Event::Scroll);
        assert_eq!(el.last().opacity, 0.0);

        el.move_to(300.0);
        host.dispatch(&mut c, Event::Scroll);
        host.advance(&mut c, 1100.0);
        assert_eq!(el.last(), Visual::REST);
    }

    #[test]
    fn test_unregister_stops_all_mutation() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 2000.0, 100.0);
        let h = c.register(el.clone(), RevealOptions::default(), &mut host);
        c.unregister(h, &mut host);
        c.unregister(h, &mut host);
        c.unregister(RevealHandle(999), &mut host);
        assert!(!c.is_registered(h));
        assert!(!host.is_listening(Source::Scroll));

        el.move_to(100.0);
        c.handle(&Event::Scroll, &mut host);
        host.advance(&mut c, 2000.0);
        assert_eq!(el.writes(), 1);
        assert_eq!(host.stale_releases(), 0);
    }

    #[test]
    fn test_unregister_mid_tween_stops_frames() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 100.0, 100.0);
        let h = c.register(el.clone(), RevealOptions::default(), &mut host);
        host.advance(&mut c, 200.0);
        c.unregister(h, &mut host);
        let writes = el.writes();
        host.advance(&mut c, 2000.0);
        assert_eq!(el.writes(), writes);
        assert_eq!(host.live_handles(), 0);
    }

    #[test]
    fn test_stagger_offsets_siblings() {
        let (mut host, mut c) = controller();
        let cards: Vec<FakeElement> = (0..3).map(|i| FakeElement::at(i, 2000.0, 100.0)).collect();
        for (i, card) in cards.iter().enumerate() {
            c.register(
                card.clone(),
                RevealOptions::new(RevealIntent::FadeSlide { from: Side::Left }).stagger(i as u32 * 2),
                &mut host,
            );
        }
        for card in &cards {
            card.move_to(500.0);
        }
        host.dispatch(&mut c, Event::Scroll);
        host.advance(&mut c, 150.0);

        assert!(cards[0].last().opacity > 0.0);
        assert_eq!(cards[1].last().opacity, 0.0);
        assert_eq!(cards[2].last().offset, Vec2::new(-50.0, 0.0));

        host.advance(&mut c, 1500.0);
        assert!(cards.iter().all(|card| card.last() == Visual::REST));
    }

    #[test]
    fn test_grow_tweens_extent_to_level() {
        let (mut host, mut c) = controller();
        let bar = FakeElement::at(1, 800.0, 8.0);
        let opts = RevealOptions::new(RevealIntent::Grow {
            axis: Axis::Width,
            percent: 85.0,
        })
        .duration(1500.0)
        .start_at(0.9);
        c.register(bar.clone(), opts, &mut host);
        assert_eq!(bar.applied.borrow()[0].extent, Some((Axis::Width, 0.0)));

        host.advance(&mut c, 1600.0);
        assert_eq!(bar.last().extent, Some((Axis::Width, 85.0)));
    }

    #[test]
    fn test_timeline_tracks_then_freezes() {
        let (mut host, mut c) = controller();
        let line = FakeElement::at(1, 900.0, 600.0);
        c.register(line.clone(), RevealOptions::new(RevealIntent::Timeline { axis: Axis::Height }), &mut host);
        // Above the start line (850): not yet in band
        assert_eq!(line.writes(), 1);

        let extent = |el: &FakeElement| el.last().extent.unwrap().1;
        line.move_to(850.0);
        host.dispatch(&mut c, Event::Scroll);
        assert_eq!(extent(&line), 0.0);

        // span = 850 - 200 + 600 = 1250; top 225 => p = 0.5
        line.move_to(225.0);
        host.dispatch(&mut c, Event::Scroll);
        assert!((extent(&line) - 50.0).abs() < 1e-3);

        // Jumping past the band end lands on 100% once, then stays
        let writes = line.writes();
        line.move_to(-1000.0);
        host.dispatch(&mut c, Event::Scroll);
        assert_eq!(line.writes(), writes + 1);
        assert_eq!(extent(&line), 100.0);

        line.move_to(-1500.0);
        host.dispatch(&mut c, Event::Scroll);
        assert_eq!(line.writes(), writes + 1);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn test_timeline_registered_past_band_is_full() {
        let (mut host, mut c) = controller();
        let line = FakeElement::at(1, -3000.0, 600.0);
        c.register(line.clone(), RevealOptions::new(RevealIntent::Timeline { axis: Axis::Height }), &mut host);
        assert_eq!(line.last().extent, Some((Axis::Height, 100.0)));

        line.move_to(-3200.0);
        host.dispatch(&mut c, Event::Scroll);
        assert_eq!(line.writes(), 2);
    }

    #[test]
    fn test_timeline_scrolling_back_above_band_returns_to_zero() {
        let (mut host, mut c) = controller();
        let line = FakeElement::at(1, 225.0, 600.0);
        c.register(line.clone(), RevealOptions::new(RevealIntent::Timeline { axis: Axis::Height }), &mut host);
        assert!((line.last().extent.unwrap().1 - 50.0).abs() < 1e-3);

        line.move_to(2000.0);
        host.dispatch(&mut c, Event::Scroll);
        assert_eq!(line.last().extent, Some((Axis::Height, 0.0)));
    }

    #[test]
    fn test_fade_only_has_no_offset() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 2000.0, 100.0);
        c.register(el.clone(), RevealOptions::new(RevealIntent::Fade), &mut host);
        assert_eq!(el.last(), Visual { opacity: 0.0, ..Visual::REST });
    }

    #[test]
    fn test_slide_from_top_drops_in() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 100.0, 100.0);
        let opts = RevealOptions::new(RevealIntent::FadeSlide { from: Side::Top }).distance(20.0);
        c.register(el.clone(), opts, &mut host);
        assert_eq!(el.applied.borrow()[0].offset, Vec2::new(0.0, -20.0));

        host.advance(&mut c, 1100.0);
        assert_eq!(el.last(), Visual::REST);
    }

    #[test]
    fn test_per_target_distance_overrides_config() {
        let (mut host, mut c) = controller();
        let near = FakeElement::at(1, 2000.0, 100.0);
        let far = FakeElement::at(2, 2000.0, 100.0);
        let right = FakeElement::at(3, 2000.0, 100.0);
        c.register(near.clone(), RevealOptions::default().distance(30.0), &mut host);
        c.register(far.clone(), RevealOptions::default(), &mut host);
        c.register(
            right.clone(),
            RevealOptions::new(RevealIntent::FadeSlide { from: Side::Right }).distance(20.0),
            &mut host,
        );
        assert_eq!(near.last().offset, Vec2::new(0.0, 30.0));
        assert_eq!(far.last().offset, Vec2::new(0.0, 50.0));
        assert_eq!(right.last().offset, Vec2::new(20.0, 0.0));
    }

    #[test]
    fn test_pop_from_custom_scale() {
        let (mut host, mut c) = controller();
        let stat = FakeElement::at(1, 2000.0, 100.0);
        let button = FakeElement::at(2, 2000.0, 100.0);
        c.register(stat.clone(), RevealOptions::new(RevealIntent::Pop { from_scale: 0.8 }), &mut host);
        c.register(button.clone(), RevealOptions::new(RevealIntent::Pop { from_scale: 0.0 }), &mut host);
        assert_eq!(stat.last().scale, 0.8);
        assert_eq!(button.last().scale, 0.0);
        assert_eq!(button.last().opacity, 0.0);

        stat.move_to(100.0);
        button.move_to(100.0);
        host.dispatch(&mut c, Event::Scroll);
        host.advance(&mut c, 1100.0);
        assert_eq!(stat.last(), Visual::REST);
        assert_eq!(button.last(), Visual::REST);
    }

    #[test]
    fn test_bad_distance_and_scale_are_sanitized() {
        let (mut host, mut c) = controller();
        let a = FakeElement::at(1, 2000.0, 100.0);
        let b = FakeElement::at(2, 2000.0, 100.0);
        let c3 = FakeElement::at(3, 2000.0, 100.0);
        c.register(a.clone(), RevealOptions::default().distance(f32::NAN), &mut host);
        c.register(b.clone(), RevealOptions::default().distance(-40.0), &mut host);
        c.register(c3.clone(), RevealOptions::new(RevealIntent::Pop { from_scale: f32::INFINITY }), &mut host);
        assert_eq!(a.last().offset, Vec2::new(0.0, 50.0));
        assert_eq!(b.last().offset, Vec2::ZERO);
        assert_eq!(c3.last().scale, 0.9);
    }

    #[test]
    fn test_unavailable_host_shows_targets_at_rest() {
        let mut host = HeadlessHost::unavailable(1000.0, 1000.0);
        let mut c = RevealController::new(&EffectsConfig::default());
        c.mount(&mut host);
        let below = FakeElement::at(1, 2000.0, 100.0);
        let visible = FakeElement::at(2, 100.0, 100.0);
        c.register(below.clone(), RevealOptions::default(), &mut host);
        c.register(visible.clone(), RevealOptions::default(), &mut host);
        assert_eq!(below.last(), Visual::REST);
        assert_eq!(visible.last(), Visual::REST);
        assert_eq!(visible.writes(), 2);

        visible.move_to(2000.0);
        c.handle(&Event::Scroll, &mut host);
        host.advance(&mut c, 2000.0);
        assert_eq!(visible.writes(), 2);
        assert_eq!(host.live_handles(), 0);
        assert_eq!(host.stale_releases(), 0);
    }

    #[test]
    fn test_detached_target_is_dropped_quietly() {
        let (mut host, mut c) = controller();
        let a = FakeElement::at(1, 2000.0, 100.0);
        let b = FakeElement::at(2, 2000.0, 100.0);
        c.register(a.clone(), RevealOptions::default(), &mut host);
        let hb = c.register(b.clone(), RevealOptions::default(), &mut host);
        a.detach();
        host.dispatch(&mut c, Event::Scroll);
        assert_eq!(c.len(), 1);
        assert!(c.is_registered(hb));

        b.move_to(100.0);
        host.dispatch(&mut c, Event::Scroll);
        b.detach();
        host.advance(&mut c, 2000.0);
        assert!(c.is_empty());
        assert_eq!(host.live_handles(), 0);
    }

    #[test]
    fn test_bad_options_are_clamped() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 100.0, 100.0);
        c.register(el.clone(), RevealOptions::default().delay(-50.0).duration(f64::NAN), &mut host);
        host.advance(&mut c, 1100.0);
        assert_eq!(el.last(), Visual::REST);
    }

    #[test]
    fn test_register_before_mount_waits_for_mount() {
        let mut host = HeadlessHost::new(1000.0, 1000.0);
        let mut c = RevealController::new(&EffectsConfig::default());
        let el = FakeElement::at(1, 100.0, 100.0);
        c.register(el.clone(), RevealOptions::default(), &mut host);
        assert_eq!(host.live_handles(), 0);
        c.mount(&mut host);
        assert_eq!(host.pending_frames(), 1);
    }

    #[test]
    fn test_unmount_twice_releases_everything_once() {
        let (mut host, mut c) = controller();
        let el = FakeElement::at(1, 100.0, 100.0);
        c.register(el.clone(), RevealOptions::default(), &mut host);
        c.register(FakeElement::at(2, 5000.0, 10.0), RevealOptions::default(), &mut host);
        assert_eq!(host.live_handles(), 3);
        c.unmount(&mut host);
        c.unmount(&mut host);
        assert_eq!(host.live_handles(), 0);
        assert_eq!(host.stale_releases(), 0);
        assert!(c.is_empty());
    }

    #[test]
    fn test_options_from_json() {
        let o: RevealOptions = serde_json::from_str(
            r#"{"intent": {"kind": "fade_slide", "from": "right"}, "stagger_index": 3}"#,
        )
        .unwrap();
        assert_eq!(o.intent, RevealIntent::FadeSlide { from: Side::Right });
        assert_eq!(o.stagger_index, 3);
        assert!(o.once);

        let o: RevealOptions =
            serde_json::from_str(r#"{"intent": {"kind": "pop"}, "distance": 20}"#).unwrap();
        assert_eq!(o.intent, RevealIntent::Pop { from_scale: 0.9 });
        assert_eq!(o.distance, Some(20.0));
        let o: RevealOptions = serde_json::from_str(r#"{"intent": {"kind": "fade"}}"#).unwrap();
        assert_eq!(o.intent, RevealIntent::Fade);
    }

    proptest! {
        #[test]
        fn prop_timeline_extent_is_monotone(
            height in 1.0f32..2000.0,
            mut tops in prop::collection::vec(-3000.0f32..3000.0, 1..40),
        ) {
            // Scrolling down only: tops decrease
            tops.sort_by(|a, b| b.total_cmp(a));
            let (mut host, mut c) = controller();
            let el = FakeElement::at(1, tops[0], height);
            c.register(el.clone(), RevealOptions::new(RevealIntent::Timeline { axis: Axis::Height }), &mut host);

            let mut last = 0.0f32;
            for top in tops {
                el.move_to(top);
                host.dispatch(&mut c, Event::Scroll);
                let extent = el.last().extent.unwrap().1;
                prop_assert!((0.0..=100.0).contains(&extent));
                prop_assert!(extent >= last - 1e-3);
                last = extent;
            }
        }
    }
}
