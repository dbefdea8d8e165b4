//! Pointer tilt: eases a card's 3D rotation toward the pointer
//!
//! While the pointer is over the card the target rotation is proportional to
//! its offset from the centre; outside the card or after the pointer leaves
//! the document the target is flat. Frames run only until the rotation
//! settles.

use glam::Vec2;

use super::Effect;
use super::ease::Tween;
use crate::platform::{Event, HandleId, Handles, Host, Source};
use crate::renderer::Rect;
use crate::settings::{EffectsConfig, TiltConfig};

/// Element that can be rotated in 3D
pub trait TiltTarget {
    /// Viewport rectangle, or `None` once detached
    fn bounds(&self) -> Option<Rect>;

    /// Apply `rotateX(rx) rotateY(ry)` in degrees
    fn apply_rotation(&mut self, rx: f32, ry: f32);
}

pub struct PointerTilt<T: TiltTarget> {
    config: TiltConfig,
    target: T,
    /// Applied rotation as (rx, ry)
    current: Vec2,
    from: Vec2,
    to: Vec2,
    tween: Option<Tween>,
    frame: Option<HandleId>,
    handles: Handles,
    mounted: bool,
}

impl<T: TiltTarget> PointerTilt<T> {
    pub fn new(target: T, config: &EffectsConfig) -> Self {
        Self {
            config: config.tilt.sanitized(),
            target,
            current: Vec2::ZERO,
            from: Vec2::ZERO,
            to: Vec2::ZERO,
            tween: None,
            frame: None,
            handles: Handles::new(),
            mounted: false,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Applied rotation as (rx, ry) in degrees
    pub fn rotation(&self) -> Vec2 {
        self.current
    }

    /// Rotation the card is easing toward
    pub fn goal(&self) -> Vec2 {
        self.to
    }

    pub fn is_settled(&self) -> bool {
        self.tween.is_none()
    }

    /// Target rotation for a pointer at `p`
    pub fn rotation_for(&self, bounds: &Rect, p: Vec2) -> Vec2 {
        if !bounds.contains(p) {
            return Vec2::ZERO;
        }
        let n = bounds.normalized(p);
        Vec2::new(-n.y * self.config.max_deg, n.x * self.config.max_deg)
    }

    fn retarget(&mut self, goal: Vec2, host: &mut dyn Host) {
        if goal == self.to && (self.tween.is_some() || goal == self.current) {
            return;
        }
        self.from = self.current;
        self.to = goal;
        self.tween = Some(Tween::new(host.now_ms(), self.config.duration_ms, self.config.ease));
        if self.frame.is_none() {
            self.frame = self.handles.track(host.request_frame());
        }
    }

    fn animate(&mut self, now_ms: f64) {
        let Some(tween) = self.tween else {
            return;
        };
        self.current = self.from.lerp(self.to, tween.sample(now_ms));
        self.target.apply_rotation(self.current.x, self.current.y);
        if tween.is_done(now_ms) {
            self.tween = None;
        }
    }
}

impl<T: TiltTarget> Effect for PointerTilt<T> {
    fn mount(&mut self, host: &mut dyn Host) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.handles.track(host.listen(Source::PointerMove));
        self.handles.track(host.listen(Source::PointerLeave));
    }

    fn handle(&mut self, event: &Event, host: &mut dyn Host) {
        if !self.mounted {
            return;
        }
        match *event {
            Event::PointerMove { x, y } => {
                let Some(bounds) = self.target.bounds() else {
                    return;
                };
                let goal = self.rotation_for(&bounds, Vec2::new(x, y));
                self.retarget(goal, host);
            }
            Event::PointerLeave => self.retarget(Vec2::ZERO, host),
            Event::Frame { now_ms } => {
                if let Some(id) = self.frame.take() {
                    self.handles.forget(id);
                }
                self.animate(now_ms);
                if self.tween.is_some() {
                    self.frame = self.handles.track(host.request_frame());
                }
            }
            _ => {}
        }
    }

    fn unmount(&mut self, host: &mut dyn Host) {
        self.handles.release_all(host);
        self.frame = None;
        self.tween = None;
        self.mounted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessHost;
    use proptest::prelude::*;

    struct FakeCard {
        rect: Option<Rect>,
        applied: Vec<(f32, f32)>,
    }

    impl FakeCard {
        fn new() -> Self {
            Self {
                rect: Some(Rect::new(100.0, 100.0, 200.0, 200.0)),
                applied: Vec::new(),
            }
        }
    }

    impl TiltTarget for FakeCard {
        fn bounds(&self) -> Option<Rect> {
            self.rect
        }

        fn apply_rotation(&mut self, rx: f32, ry: f32) {
            self.applied.push((rx, ry));
        }
    }

    fn tilt() -> (HeadlessHost, PointerTilt<FakeCard>) {
        let mut host = HeadlessHost::new(1000.0, 1000.0);
        let mut t = PointerTilt::new(FakeCard::new(), &EffectsConfig::default());
        t.mount(&mut host);
        (host, t)
    }

    #[test]
    fn test_corner_targets_max_rotation() {
        let (mut host, mut t) = tilt();
        host.dispatch(&mut t, Event::PointerMove { x: 300.0, y: 100.0 });
        // Right edge tilts around Y, top edge around X
        assert_eq!(t.goal(), Vec2::new(5.0, 5.0));
        host.advance(&mut t, 600.0);
        assert_eq!(t.rotation(), Vec2::new(5.0, 5.0));
        assert!(t.is_settled());
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn test_centre_is_flat() {
        let (mut host, mut t) = tilt();
        host.dispatch(&mut t, Event::PointerMove { x: 200.0, y: 200.0 });
        assert_eq!(t.goal(), Vec2::ZERO);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn test_leave_eases_back_to_flat() {
        let (mut host, mut t) = tilt();
        host.dispatch(&mut t, Event::PointerMove { x: 120.0, y: 280.0 });
        host.advance(&mut t, 200.0);
        let mid = t.rotation();
        assert!(mid != Vec2::ZERO);

        host.dispatch(&mut t, Event::PointerLeave);
        host.advance(&mut t, 100.0);
        assert!(t.rotation().length() < mid.length());
        host.advance(&mut t, 600.0);
        assert_eq!(t.rotation(), Vec2::ZERO);
        assert_eq!(t.target().applied.last(), Some(&(0.0, 0.0)));
    }

    #[test]
    fn test_pointer_outside_card_targets_flat() {
        let (mut host, mut t) = tilt();
        host.dispatch(&mut t, Event::PointerMove { x: 150.0, y: 150.0 });
        assert!(t.goal() != Vec2::ZERO);
        host.dispatch(&mut t, Event::PointerMove { x: 900.0, y: 900.0 });
        assert_eq!(t.goal(), Vec2::ZERO);
    }

    #[test]
    fn test_unmount_mid_ease_releases_frame() {
        let (mut host, mut t) = tilt();
        host.dispatch(&mut t, Event::PointerMove { x: 150.0, y: 150.0 });
        host.advance(&mut t, 50.0);
        assert_eq!(host.live_handles(), 3);
        t.unmount(&mut host);
        t.unmount(&mut host);
        assert_eq!(host.live_handles(), 0);
        assert_eq!(host.stale_releases(), 0);

        let applied = t.target().applied.len();
        t.handle(&Event::Frame { now_ms: 999.0 }, &mut host);
        assert_eq!(t.target().applied.len(), applied);
    }

    proptest! {
        #[test]
        fn prop_rotation_bounded_by_max(x in -500.0f32..1500.0, y in -500.0f32..1500.0) {
            let t = PointerTilt::new(FakeCard::new(), &EffectsConfig::default());
            let bounds = Rect::new(100.0, 100.0, 200.0, 200.0);
            let r = t.rotation_for(&bounds, Vec2::new(x, y));
            prop_assert!(r.x.abs() <= 5.0 && r.y.abs() <= 5.0);
        }
    }
}
