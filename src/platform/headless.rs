//! Headless host driven by a virtual clock
//!
//! Runs effects without a browser: time only moves when `advance` is called,
//! frames arrive on a fixed 60 Hz grid, and every handle is accounted for so
//! teardown leaks and double releases are observable.

use glam::Vec2;

use super::{Event, HandleId, Host, Source, Wake};
use crate::consts::FRAME_MS;
use crate::fx::Effect;

#[derive(Debug, Clone)]
struct Timer {
    id: HandleId,
    period_ms: f64,
    wake: Wake,
    due_ms: f64,
}

#[derive(Debug)]
pub struct HeadlessHost {
    now_ms: f64,
    viewport: Vec2,
    next_id: u32,
    frames: Vec<HandleId>,
    next_frame_ms: f64,
    timers: Vec<Timer>,
    listeners: Vec<(HandleId, Source)>,
    stale_releases: usize,
    available: bool,
}

impl HeadlessHost {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            now_ms: 0.0,
            viewport: Vec2::new(width, height),
            next_id: 1,
            frames: Vec::new(),
            next_frame_ms: FRAME_MS,
            timers: Vec::new(),
            listeners: Vec::new(),
            stale_releases: 0,
            available: true,
        }
    }

    /// A host that refuses every frame, timer and listener
    pub fn unavailable(width: f32, height: f32) -> Self {
        Self {
            available: false,
            ..Self::new(width, height)
        }
    }

    /// Frame requests, timers and listeners currently outstanding
    pub fn live_handles(&self) -> usize {
        self.frames.len() + self.timers.len() + self.listeners.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn is_listening(&self, source: Source) -> bool {
        self.listeners.iter().any(|(_, s)| *s == source)
    }

    /// Releases of ids that were not live (double frees)
    pub fn stale_releases(&self) -> usize {
        self.stale_releases
    }

    /// Deliver an input event; dropped when nothing subscribed to its source
    pub fn dispatch<E: Effect + ?Sized>(&mut self, effect: &mut E, event: Event) -> bool {
        if let Some(source) = event.source() {
            if !self.is_listening(source) {
                return false;
            }
        }
        effect.handle(&event, self);
        true
    }

    /// Change the viewport and deliver the matching resize event
    pub fn resize<E: Effect + ?Sized>(&mut self, effect: &mut E, width: f32, height: f32) -> bool {
        self.viewport = Vec2::new(width, height);
        self.dispatch(effect, Event::Resize { width, height })
    }

    /// Move the virtual clock forward, firing frames and timers in time order
    pub fn advance<E: Effect + ?Sized>(&mut self, effect: &mut E, ms: f64) {
        let target = self.now_ms + ms.max(0.0);
        loop {
            let next_timer = self
                .timers
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.due_ms.total_cmp(&b.1.due_ms))
                .map(|(i, t)| (i, t.due_ms));
            let next_frame = (!self.frames.is_empty()).then_some(self.next_frame_ms);

            match (next_timer, next_frame) {
                (Some((i, due)), frame) if due <= target && frame.is_none_or(|f| due < f) => {
                    self.now_ms = due;
                    let timer = &mut self.timers[i];
                    timer.due_ms += timer.period_ms;
                    let wake = timer.wake;
                    effect.handle(&Event::Timer(wake), self);
                }
                (_, Some(frame)) if frame <= target => {
                    self.now_ms = frame;
                    self.next_frame_ms = frame + FRAME_MS;
                    self.frames.clear();
                    effect.handle(&Event::Frame { now_ms: frame }, self);
                }
                _ => break,
            }
        }
        self.now_ms = target;
    }

    /// Advance by `n` display frames
    pub fn run_frames<E: Effect + ?Sized>(&mut self, effect: &mut E, n: usize) {
        for _ in 0..n {
            self.advance(effect, FRAME_MS);
        }
    }

    fn next_handle(&mut self) -> Option<HandleId> {
        if !self.available {
            return None;
        }
        let id = HandleId(self.next_id);
        self.next_id += 1;
        Some(id)
    }
}

impl Host for HeadlessHost {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn viewport(&self) -> Vec2 {
        self.viewport
    }

    fn request_frame(&mut self) -> Option<HandleId> {
        let id = self.next_handle()?;
        if self.next_frame_ms <= self.now_ms {
            self.next_frame_ms = self.now_ms + FRAME_MS;
        }
        self.frames.push(id);
        Some(id)
    }

    fn set_interval(&mut self, period_ms: u32, wake: Wake) -> Option<HandleId> {
        let id = self.next_handle()?;
        let period_ms = period_ms.max(1) as f64;
        self.timers.push(Timer {
            id,
            period_ms,
            wake,
            due_ms: self.now_ms + period_ms,
        });
        Some(id)
    }

    fn listen(&mut self, source: Source) -> Option<HandleId> {
        let id = self.next_handle()?;
        self.listeners.push((id, source));
        Some(id)
    }

    fn release(&mut self, id: HandleId) {
        let before = self.live_handles();
        self.frames.retain(|f| *f != id);
        self.timers.retain(|t| t.id != id);
        self.listeners.retain(|(l, _)| *l != id);
        if self.live_handles() == before {
            log::debug!("release of unknown handle {:?}", id);
            self.stale_releases += 1;
        }
    }
}
