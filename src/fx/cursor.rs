//! Cursor tracker: a two-ring halo that follows the pointer
//!
//! State machine:
//!
//! ```text
//! Hidden --PointerMove--> Visible --PointerLeave--> Hidden
//! ```
//!
//! Touch-only devices never send a pointer move, so the tracker stays hidden
//! for the whole page lifetime. Frames are requested only while visible.

use glam::Vec2;

use super::Effect;
use super::ease::pulse;
use crate::platform::{Event, HandleId, Handles, Host, Source};
use crate::settings::{CursorConfig, EffectsConfig};

/// Tracker state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CursorState {
    #[default]
    Hidden,
    Visible { pos: Vec2 },
}

/// Where and how one ring is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingPose {
    /// Ring centre in viewport coordinates
    pub center: Vec2,
    /// Diameter before scaling
    pub size: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl RingPose {
    /// Top-left corner of the unscaled ring box
    pub fn origin(&self) -> Vec2 {
        self.center - Vec2::splat(self.size / 2.0)
    }
}

/// Overlay that displays the two rings; must not intercept pointer events
pub trait RingOverlay {
    fn show(&mut self, inner: &RingPose, outer: &RingPose);
    fn hide(&mut self);
}

pub struct CursorTracker<O: RingOverlay> {
    config: CursorConfig,
    overlay: O,
    state: CursorState,
    /// Time the pulses started (first move after becoming visible)
    pulse_origin_ms: f64,
    frame: Option<HandleId>,
    handles: Handles,
    mounted: bool,
}

impl<O: RingOverlay> CursorTracker<O> {
    pub fn new(overlay: O, config: &EffectsConfig) -> Self {
        Self {
            config: config.cursor.sanitized(),
            overlay,
            state: CursorState::Hidden,
            pulse_origin_ms: 0.0,
            frame: None,
            handles: Handles::new(),
            mounted: false,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    /// Ring poses at `now_ms`, or `None` while hidden
    pub fn poses(&self, now_ms: f64) -> Option<(RingPose, RingPose)> {
        let CursorState::Visible { pos } = self.state else {
            return None;
        };
        let c = &self.config;
        let elapsed = now_ms - self.pulse_origin_ms;
        let inner = RingPose {
            center: pos,
            size: c.inner_size,
            scale: pulse(elapsed, c.inner_pulse_ms, 1.0, c.inner_peak_scale),
            opacity: 1.0,
        };
        let outer = RingPose {
            center: pos,
            size: c.outer_size,
            scale: pulse(elapsed, c.outer_pulse_ms, 1.0, c.outer_peak_scale),
            opacity: pulse(elapsed, c.outer_pulse_ms, c.outer_opacity, c.outer_peak_opacity),
        };
        Some((inner, outer))
    }

    fn render(&mut self, now_ms: f64) {
        match self.poses(now_ms) {
            Some((inner, outer)) => self.overlay.show(&inner, &outer),
            None => self.overlay.hide(),
        }
    }

    fn ensure_frame(&mut self, host: &mut dyn Host) {
        if self.frame.is_none() {
            self.frame = self.handles.track(host.request_frame());
        }
    }

    fn cancel_frame(&mut self, host: &mut dyn Host) {
        if let Some(id) = self.frame.take() {
            self.handles.release(id, host);
        }
    }
}

impl<O: RingOverlay> Effect for CursorTracker<O> {
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
                let now = host.now_ms();
                if self.state == CursorState::Hidden {
                    self.pulse_origin_ms = now;
                }
                self.state = CursorState::Visible {
                    pos: Vec2::new(x, y),
                };
                self.render(now);
                self.ensure_frame(host);
            }
            Event::PointerLeave => {
                self.state = CursorState::Hidden;
                self.cancel_frame(host);
                self.overlay.hide();
            }
            Event::Frame { now_ms } => {
                if let Some(id) = self.frame.take() {
                    self.handles.forget(id);
                }
                if matches!(self.state, CursorState::Visible { .. }) {
                    self.render(now_ms);
                    self.ensure_frame(host);
                }
            }
            _ => {}
        }
    }

    fn unmount(&mut self, host: &mut dyn Host) {
        self.handles.release_all(host);
        self.frame = None;
        if self.mounted {
            self.overlay.hide();
        }
        self.state = CursorState::Hidden;
        self.mounted = false;
    }
}
