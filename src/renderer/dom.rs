//! DOM element bindings for the element-driven effects
//!
//! Reveal and tilt targets are plain `HtmlElement`s, glitch text is any
//! `Element`; the cursor rings and ambient lights create their own divs and
//! remove them on drop.
//!
//! Style writes go through `style.setProperty`; failures (detached or
//! read-only elements) are ignored since the next write replaces them.

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use super::Rect;
use crate::fx::ambient::{AmbientLayer, Dot, DotPose, Streak};
use crate::fx::cursor::{RingOverlay, RingPose};
use crate::fx::glitch::TextNode;
use crate::fx::reveal::{Axis, RevealElement, Side, Visual};
use crate::fx::tilt::TiltTarget;

/// Viewport rectangle of a connected element
pub fn client_rect(el: &Element) -> Option<Rect> {
    if !el.is_connected() {
        return None;
    }
    let r = el.get_bounding_client_rect();
    Some(Rect::new(
        r.left() as f32,
        r.top() as f32,
        r.width() as f32,
        r.height() as f32,
    ))
}

fn set_style(el: &HtmlElement, name: &str, value: &str) {
    let _ = el.style().set_property(name, value);
}

impl RevealElement for HtmlElement {
    fn bounds(&self) -> Option<Rect> {
        client_rect(self)
    }

    fn apply(&mut self, visual: &Visual) {
        match visual.extent {
            Some((axis, percent)) => {
                let name = match axis {
                    Axis::Width => "width",
                    Axis::Height => "height",
                };
                set_style(self, name, &format!("{percent}%"));
            }
            None => {
                set_style(self, "opacity", &visual.opacity.to_string());
                set_style(self, "transform", &visual.transform_css());
            }
        }
    }
}

impl TiltTarget for HtmlElement {
    fn bounds(&self) -> Option<Rect> {
        client_rect(self)
    }

    fn apply_rotation(&mut self, rx: f32, ry: f32) {
        set_style(
            self,
            "transform",
            &format!("perspective(1000px) rotateX({rx}deg) rotateY({ry}deg)"),
        );
    }
}

/// Text element scrambled by the glitch effect
///
/// The canonical text comes from `data-text` when present so a run that was
/// interrupted by the page never becomes the new source.
impl TextNode for Element {
    fn source_text(&self) -> Option<String> {
        if !self.is_connected() {
            return None;
        }
        self.get_attribute("data-text")
            .or_else(|| self.text_content())
    }

    fn set_text(&mut self, text: &str) {
        self.set_text_content(Some(text));
    }
}

/// Cursor overlay appended to the body: a glowing dot inside a ring
///
/// Neither element takes pointer events. Both are removed on drop.
pub struct DomRings {
    inner: HtmlElement,
    outer: HtmlElement,
}

impl DomRings {
    pub fn create(document: &Document, inner_color: &str, outer_color: &str) -> Option<Self> {
        let body = document.body()?;
        let overlay = |z: &str, look: &[(&str, String)]| -> Option<HtmlElement> {
            let el = document.create_element("div").ok()?.dyn_into::<HtmlElement>().ok()?;
            for (name, value) in [
                ("position", "fixed"),
                ("left", "0"),
                ("top", "0"),
                ("pointer-events", "none"),
                ("border-radius", "50%"),
                ("z-index", z),
                ("display", "none"),
            ] {
                set_style(&el, name, value);
            }
            for (name, value) in look {
                set_style(&el, name, value);
            }
            body.append_child(&el).ok()?;
            Some(el)
        };
        let inner = overlay(
            "9999",
            &[
                ("background-color", inner_color.to_string()),
                ("box-shadow", format!("0 0 20px {inner_color}, 0 0 40px {inner_color}")),
                ("mix-blend-mode", "screen".to_string()),
            ],
        )?;
        let outer = match overlay("9998", &[("border", format!("2px solid {outer_color}"))]) {
            Some(el) => el,
            None => {
                inner.remove();
                return None;
            }
        };
        Some(Self { inner, outer })
    }

    fn place(el: &HtmlElement, pose: &RingPose) {
        let Vec2 { x, y } = pose.origin();
        set_style(el, "display", "block");
        set_style(el, "width", &format!("{}px", pose.size));
        set_style(el, "height", &format!("{}px", pose.size));
        set_style(el, "opacity", &pose.opacity.to_string());
        set_style(
            el,
            "transform",
            &format!("translate({x}px, {y}px) scale({})", pose.scale),
        );
    }
}

impl RingOverlay for DomRings {
    fn show(&mut self, inner: &RingPose, outer: &RingPose) {
        Self::place(&self.inner, inner);
        Self::place(&self.outer, outer);
    }

    fn hide(&mut self) {
        set_style(&self.inner, "display", "none");
        set_style(&self.outer, "display", "none");
    }
}

impl Drop for DomRings {
    fn drop(&mut self) {
        self.inner.remove();
        self.outer.remove();
    }
}

/// Streak and dot divs inside a page container (`#fx-ambient`)
pub struct DomAmbient {
    document: Document,
    container: Element,
    streaks: Vec<HtmlElement>,
    dots: Vec<HtmlElement>,
}

impl DomAmbient {
    pub fn new(document: &Document, container: Element) -> Self {
        Self {
            document: document.clone(),
            container,
            streaks: Vec::new(),
            dots: Vec::new(),
        }
    }

    fn child(&self, styles: &[(&str, String)]) -> Option<HtmlElement> {
        let el = self.document.create_element("div").ok()?.dyn_into::<HtmlElement>().ok()?;
        set_style(&el, "position", "absolute");
        set_style(&el, "pointer-events", "none");
        for (name, value) in styles {
            set_style(&el, name, value);
        }
        self.container.append_child(&el).ok()?;
        Some(el)
    }
}

impl AmbientLayer for DomAmbient {
    fn build(&mut self, streaks: &[Streak], dots: &[Dot]) {
        self.clear();
        for streak in streaks {
            let color = streak.color.to_string();
            let edge = match streak.side {
                Side::Right => "right",
                _ => "left",
            };
            let styles = [
                ("top", "0".to_string()),
                (edge, "0".to_string()),
                ("width", "4px".to_string()),
                ("height", "100%".to_string()),
                ("opacity", "0.2".to_string()),
                ("background", format!("linear-gradient(to bottom, transparent, {color}, transparent)")),
                ("box-shadow", format!("0 0 20px {color}")),
            ];
            let el = self.child(&styles);
            self.streaks.extend(el);
        }
        for dot in dots {
            let color = dot.color.to_string();
            let styles = [
                ("left", format!("{}%", dot.anchor.x)),
                ("top", format!("{}%", dot.anchor.y)),
                ("width", "4px".to_string()),
                ("height", "4px".to_string()),
                ("border-radius", "50%".to_string()),
                ("background-color", color.clone()),
                ("box-shadow", format!("0 0 10px {color}")),
            ];
            let el = self.child(&styles);
            self.dots.extend(el);
        }
    }

    fn place_streak(&mut self, index: usize, offset: f32) {
        if let Some(el) = self.streaks.get(index) {
            set_style(el, "transform", &format!("translateX({offset}px)"));
        }
    }

    fn place_dot(&mut self, index: usize, pose: &DotPose) {
        if let Some(el) = self.dots.get(index) {
            set_style(el, "transform", &format!("translateY({}px)", -pose.lift));
            set_style(el, "opacity", &pose.opacity.to_string());
        }
    }

    fn clear(&mut self) {
        for el in self.streaks.drain(..).chain(self.dots.drain(..)) {
            el.remove();
        }
    }
}

impl Drop for DomAmbient {
    fn drop(&mut self) {
        self.clear();
    }
}
