//! Browser host
//!
//! Each mounted effect gets its own [`WebHost`]. Browser callbacks push
//! [`Event`]s into a sink that borrows the effect and dispatches; a callback
//! arriving while the effect is already borrowed (re-entrant) is dropped.
//!
//! Closure lifetimes:
//! - One animation-frame closure lives as long as the host
//! - Interval and listener closures live in maps keyed by handle
//! - Released closures move to a graveyard emptied at the start of the next
//!   dispatch, since the released closure may be the one currently running

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, MouseEvent, Window};

use super::{Event, HandleId, Host, Source, Wake};
use crate::fx::Effect;

type Sink = Rc<dyn Fn(Event)>;

struct Interval {
    js_id: i32,
    _closure: Closure<dyn FnMut()>,
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

pub struct WebHost {
    window: Window,
    sink: Sink,
    next_id: u32,
    frame_cb: Closure<dyn FnMut(f64)>,
    /// Pending animation frame as (handle, browser id)
    frame: Option<(HandleId, i32)>,
    intervals: HashMap<HandleId, Interval>,
    listeners: HashMap<HandleId, Listener>,
    graveyard: Vec<Box<dyn Any>>,
}

impl WebHost {
    fn new(window: Window, sink: Sink) -> Self {
        let frame_sink = sink.clone();
        let frame_cb = Closure::<dyn FnMut(f64)>::new(move |now_ms: f64| {
            frame_sink(Event::Frame { now_ms });
        });
        Self {
            window,
            sink,
            next_id: 1,
            frame_cb,
            frame: None,
            intervals: HashMap::new(),
            listeners: HashMap::new(),
            graveyard: Vec::new(),
        }
    }

    fn next_handle(&mut self) -> HandleId {
        let id = HandleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Called before every dispatch
    fn begin_dispatch(&mut self, event: &Event) {
        self.graveyard.clear();
        if matches!(event, Event::Frame { .. }) {
            self.frame = None;
        }
    }

    fn event_for(window: &Window, source: Source, raw: &web_sys::Event) -> Option<Event> {
        match source {
            Source::Resize => {
                let (width, height) = window_size(window);
                Some(Event::Resize { width, height })
            }
            Source::PointerMove => {
                let mouse = raw.dyn_ref::<MouseEvent>()?;
                Some(Event::PointerMove {
                    x: mouse.client_x() as f32,
                    y: mouse.client_y() as f32,
                })
            }
            Source::PointerLeave => Some(Event::PointerLeave),
            Source::Scroll => Some(Event::Scroll),
        }
    }

    /// Release everything still outstanding
    fn clear(&mut self) {
        let ids: Vec<HandleId> = self
            .intervals
            .keys()
            .chain(self.listeners.keys())
            .copied()
            .chain(self.frame.map(|(id, _)| id))
            .collect();
        for id in ids {
            self.release(id);
        }
    }
}

fn window_size(window: &Window) -> (f32, f32) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    (dim(window.inner_width()), dim(window.inner_height()))
}

impl Host for WebHost {
    fn now_ms(&self) -> f64 {
        self.window.performance().map(|p| p.now()).unwrap_or(0.0)
    }

    fn viewport(&self) -> Vec2 {
        let (w, h) = window_size(&self.window);
        Vec2::new(w, h)
    }

    fn request_frame(&mut self) -> Option<HandleId> {
        if let Some((_, js_id)) = self.frame.take() {
            let _ = self.window.cancel_animation_frame(js_id);
        }
        let js_id = self
            .window
            .request_animation_frame(self.frame_cb.as_ref().unchecked_ref())
            .ok()?;
        let id = self.next_handle();
        self.frame = Some((id, js_id));
        Some(id)
    }

    fn set_interval(&mut self, period_ms: u32, wake: Wake) -> Option<HandleId> {
        let sink = self.sink.clone();
        let closure = Closure::<dyn FnMut()>::new(move || sink(Event::Timer(wake)));
        let js_id = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period_ms.min(i32::MAX as u32) as i32,
            )
            .ok()?;
        let id = self.next_handle();
        self.intervals.insert(
            id,
            Interval {
                js_id,
                _closure: closure,
            },
        );
        Some(id)
    }

    fn listen(&mut self, source: Source) -> Option<HandleId> {
        let (target, kind): (EventTarget, &'static str) = match source {
            Source::Resize => (self.window.clone().into(), "resize"),
            Source::PointerMove => (self.window.clone().into(), "mousemove"),
            Source::PointerLeave => (self.window.document()?.into(), "mouseleave"),
            Source::Scroll => (self.window.clone().into(), "scroll"),
        };
        let sink = self.sink.clone();
        let window = self.window.clone();
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |raw: web_sys::Event| {
            if let Some(event) = WebHost::event_for(&window, source, &raw) {
                sink(event);
            }
        });
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .ok()?;
        let id = self.next_handle();
        self.listeners.insert(
            id,
            Listener {
                target,
                kind,
                closure,
            },
        );
        Some(id)
    }

    fn release(&mut self, id: HandleId) {
        if let Some((frame_id, js_id)) = self.frame {
            if frame_id == id {
                let _ = self.window.cancel_animation_frame(js_id);
                self.frame = None;
                return;
            }
        }
        if let Some(interval) = self.intervals.remove(&id) {
            self.window.clear_interval_with_handle(interval.js_id);
            self.graveyard.push(Box::new(interval));
            return;
        }
        if let Some(listener) = self.listeners.remove(&id) {
            let _ = listener
                .target
                .remove_event_listener_with_callback(listener.kind, listener.closure.as_ref().unchecked_ref());
            self.graveyard.push(Box::new(listener));
            return;
        }
        log::debug!("release of unknown handle {:?}", id);
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        self.clear();
    }
}

struct Slot<E> {
    effect: E,
    host: WebHost,
}

impl<E: Effect> Slot<E> {
    fn dispatch(&mut self, event: Event) {
        let Slot { effect, host } = self;
        host.begin_dispatch(&event);
        effect.handle(&event, host);
    }
}

/// An effect mounted against the live page
///
/// Dropping it unmounts the effect and releases every browser resource.
pub struct Mounted<E: Effect + 'static> {
    slot: Rc<RefCell<Slot<E>>>,
}

impl<E: Effect + 'static> Mounted<E> {
    /// Mount `effect` on the current window; `None` outside a browser
    pub fn mount(effect: E) -> Option<Self> {
        let window = web_sys::window()?;
        let slot = Rc::new_cyclic(|weak: &Weak<RefCell<Slot<E>>>| {
            let weak = weak.clone();
            let sink: Sink = Rc::new(move |event: Event| {
                let Some(slot) = weak.upgrade() else {
                    return;
                };
                let Ok(mut guard) = slot.try_borrow_mut() else {
                    log::debug!("Dropped re-entrant {:?}", event);
                    return;
                };
                guard.dispatch(event);
            });
            RefCell::new(Slot {
                effect,
                host: WebHost::new(window, sink),
            })
        });
        {
            let mut guard = slot.borrow_mut();
            let Slot { effect, host } = &mut *guard;
            effect.mount(host);
        }
        Some(Self { slot })
    }

    /// Run `f` with the effect and its host; `None` while it is dispatching
    pub fn with<R>(&self, f: impl FnOnce(&mut E, &mut dyn Host) -> R) -> Option<R> {
        let mut guard = self.slot.try_borrow_mut().ok()?;
        let Slot { effect, host } = &mut *guard;
        Some(f(effect, host))
    }

    /// Unmount the effect; safe to call more than once
    pub fn unmount(&self) {
        match self.slot.try_borrow_mut() {
            Ok(mut guard) => {
                let Slot { effect, host } = &mut *guard;
                effect.unmount(host);
                host.clear();
            }
            Err(_) => log::warn!("Unmount requested during dispatch; ignored"),
        }
    }
}

impl<E: Effect + 'static> Drop for Mounted<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}
