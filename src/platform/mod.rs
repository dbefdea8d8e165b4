//! Platform abstraction layer
//!
//! Effects never touch the browser directly. They ask a [`Host`] for:
//! - Display frame requests
//! - Interval timers
//! - Event subscriptions (resize, pointer, scroll)
//!
//! and receive [`Event`]s back through `Effect::handle`. Every handle an effect
//! acquires is tracked in its own [`Handles`] set so teardown can release all
//! of them exactly once.

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use headless::HeadlessHost;

use glam::Vec2;

/// Opaque id of a frame request, timer or listener handed out by a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u32);

/// Which of an effect's timers fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wake {
    /// Fixed-rate draw tick
    Tick,
    /// Short inner animation step
    Inner,
    /// Long recurring outer timer
    Outer,
}

/// Event sources an effect may subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Window resized
    Resize,
    /// Pointer moved anywhere over the window
    PointerMove,
    /// Pointer left the document
    PointerLeave,
    /// Window scrolled
    Scroll,
}

/// External events delivered to an effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A requested display frame (one-shot; request again for the next)
    Frame { now_ms: f64 },
    /// An interval timer fired
    Timer(Wake),
    /// Viewport resized to the given size
    Resize { width: f32, height: f32 },
    /// Pointer moved to viewport coordinates
    PointerMove { x: f32, y: f32 },
    /// Pointer left the document bounds
    PointerLeave,
    /// Viewport scrolled
    Scroll,
}

impl Event {
    /// Subscription needed to receive this event, if any
    pub fn source(&self) -> Option<Source> {
        match self {
            Event::Resize { .. } => Some(Source::Resize),
            Event::PointerMove { .. } => Some(Source::PointerMove),
            Event::PointerLeave => Some(Source::PointerLeave),
            Event::Scroll => Some(Source::Scroll),
            Event::Frame { .. } | Event::Timer(_) => None,
        }
    }
}

/// Resource broker an effect runs against
///
/// Acquisition returns `None` when the environment cannot provide the
/// resource; effects treat that as "stay inert" and never fail.
pub trait Host {
    /// Monotonic time in milliseconds
    fn now_ms(&self) -> f64;

    /// Current viewport size in CSS pixels
    fn viewport(&self) -> Vec2;

    /// Request one display frame
    fn request_frame(&mut self) -> Option<HandleId>;

    /// Start a repeating timer
    fn set_interval(&mut self, period_ms: u32, wake: Wake) -> Option<HandleId>;

    /// Subscribe to an event source
    fn listen(&mut self, source: Source) -> Option<HandleId>;

    /// Cancel a frame request, timer or listener
    fn release(&mut self, id: HandleId);
}

/// The set of live handles owned by one effect
#[derive(Debug, Default)]
pub struct Handles {
    live: Vec<HandleId>,
}

impl Handles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a freshly acquired handle (passes the value through)
    pub fn track(&mut self, id: Option<HandleId>) -> Option<HandleId> {
        if let Some(id) = id {
            self.live.push(id);
        }
        id
    }

    /// Drop a handle the host has already retired (a delivered frame)
    pub fn forget(&mut self, id: HandleId) {
        self.live.retain(|h| *h != id);
    }

    /// Release one handle if this set still owns it
    ///
    /// Returns whether anything was released; a second call is a no-op.
    pub fn release(&mut self, id: HandleId, host: &mut dyn Host) -> bool {
        let before = self.live.len();
        self.live.retain(|h| *h != id);
        if self.live.len() == before {
            return false;
        }
        host.release(id);
        true
    }

    /// Release every owned handle
    pub fn release_all(&mut self, host: &mut dyn Host) {
        for id in self.live.drain(..) {
            host.release(id);
        }
    }

    pub fn contains(&self, id: HandleId) -> bool {
        self.live.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_release_is_idempotent() {
        let mut host = HeadlessHost::new(800.0, 600.0);
        let mut handles = Handles::new();
        let id = handles.track(host.set_interval(50, Wake::Tick)).unwrap();
        assert_eq!(host.live_handles(), 1);

        assert!(handles.release(id, &mut host));
        assert!(!handles.release(id, &mut host));
        assert_eq!(host.live_handles(), 0);
        assert_eq!(host.stale_releases(), 0);
    }

    #[test]
    fn test_handles_release_all() {
        let mut host = HeadlessHost::new(800.0, 600.0);
        let mut handles = Handles::new();
        let resize = handles.track(host.listen(Source::Resize)).unwrap();
        handles.track(host.request_frame());
        handles.track(None);
        assert_eq!(handles.len(), 2);
        assert!(handles.contains(resize));

        handles.release_all(&mut host);
        handles.release_all(&mut host);
        assert!(handles.is_empty());
        assert_eq!(host.live_handles(), 0);
        assert_eq!(host.stale_releases(), 0);
    }

    #[test]
    fn test_event_sources() {
        assert_eq!(Event::Scroll.source(), Some(Source::Scroll));
        assert_eq!(Event::Timer(Wake::Tick).source(), None);
        assert_eq!(Event::Frame { now_ms: 0.0 }.source(), None);
    }
}
