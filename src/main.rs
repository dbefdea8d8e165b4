//! Neon FX entry point
//!
//! On the web this discovers effect hosts in the page and mounts them. The
//! native build runs every effect headless against a virtual clock and
//! reports what it drew and whether teardown released everything.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_page {
    use std::cell::RefCell;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, Window};

    use neon_fx::fx::{
        AmbientLights, CursorTracker, GlitchScrambler, GlyphRain, ParticleField, PointerTilt,
        RevealController, RevealHandle, RevealOptions,
    };
    use neon_fx::platform::web::Mounted;
    use neon_fx::renderer::CanvasSurface;
    use neon_fx::renderer::dom::{DomAmbient, DomRings};
    use neon_fx::settings::{EffectsConfig, QualityPreset};

    /// Every effect mounted on the page; dropping it tears them all down
    #[derive(Default)]
    struct Page {
        particles: Option<Mounted<ParticleField<CanvasSurface>>>,
        rain: Option<Mounted<GlyphRain<CanvasSurface>>>,
        ambient: Option<Mounted<AmbientLights<DomAmbient>>>,
        cursor: Option<Mounted<CursorTracker<DomRings>>>,
        glitches: Vec<Mounted<GlitchScrambler<Element>>>,
        reveals: Option<Mounted<RevealController<HtmlElement>>>,
        tilts: Vec<Mounted<PointerTilt<HtmlElement>>>,
    }

    thread_local! {
        static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
    }

    /// Config from `<script id="fx-config" type="application/json">`, if any
    fn load_config(document: &Document) -> EffectsConfig {
        let Some(json) = document
            .get_element_by_id("fx-config")
            .and_then(|el| el.text_content())
        else {
            return EffectsConfig::default();
        };
        EffectsConfig::from_json(&json).unwrap_or_else(|e| {
            log::warn!("Invalid fx-config ({}); using defaults", e);
            EffectsConfig::default()
        })
    }

    /// `<body data-fx-quality="low">` overrides the configured preset
    fn apply_quality_override(document: &Document, config: &mut EffectsConfig) {
        let Some(value) = document.body().and_then(|b| b.get_attribute("data-fx-quality")) else {
            return;
        };
        match QualityPreset::parse(&value) {
            Some(quality) => config.quality = quality,
            None => log::warn!("Unknown quality preset {:?}", value),
        }
    }

    fn elements<T: JsCast>(document: &Document, selector: &str) -> Vec<T> {
        let Ok(list) = document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<T>().ok())
            .collect()
    }

    fn canvas_surface(window: &Window, document: &Document, id: &str) -> Option<CanvasSurface> {
        let canvas: HtmlCanvasElement = document.get_element_by_id(id)?.dyn_into().ok()?;
        let w = window.inner_width().ok()?.as_f64()? as f32;
        let h = window.inner_height().ok()?.as_f64()? as f32;
        CanvasSurface::attach(canvas, w, h)
    }

    fn reveal_options(el: &Element) -> RevealOptions {
        match el.get_attribute("data-reveal").filter(|s| !s.trim().is_empty()) {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Invalid data-reveal ({}); using defaults", e);
                RevealOptions::default()
            }),
            None => RevealOptions::default(),
        }
    }

    fn mount_page(window: &Window, document: &Document, config: &EffectsConfig) -> Page {
        let seed = js_sys::Date::now() as u64;
        let mut page = Page::default();

        if let Some(surface) = canvas_surface(window, document, "fx-particles") {
            page.particles = Mounted::mount(ParticleField::new(Some(surface), config, seed));
        }
        if let Some(surface) = canvas_surface(window, document, "fx-glyph-rain") {
            page.rain = Mounted::mount(GlyphRain::new(Some(surface), config, seed ^ 0x5151));
        }

        if let Some(container) = document.get_element_by_id("fx-ambient") {
            let layer = DomAmbient::new(document, container);
            page.ambient = Mounted::mount(AmbientLights::new(layer, config, seed ^ 0xA3B1));
        }

        let primary = config.palette.primary.to_string();
        match DomRings::create(document, &primary, &primary) {
            Some(rings) => page.cursor = Mounted::mount(CursorTracker::new(rings, config)),
            None => log::warn!("Cursor rings unavailable; cursor tracker disabled"),
        }

        for (i, el) in elements::<Element>(document, "[data-glitch]").into_iter().enumerate() {
            if el.get_attribute("data-text").is_none() {
                let text = el.text_content().unwrap_or_default();
                let _ = el.set_attribute("data-text", &text);
            }
            let glitch = GlitchScrambler::attach(el, config, seed.wrapping_add(i as u64));
            page.glitches.extend(Mounted::mount(glitch));
        }

        page.reveals = Mounted::mount(RevealController::new(config));
        if let Some(reveals) = &page.reveals {
            for el in elements::<HtmlElement>(document, "[data-reveal]") {
                let options = reveal_options(&el);
                reveals.with(|c, host| c.register(el, options, host));
            }
        }

        for el in elements::<HtmlElement>(document, "[data-tilt]") {
            page.tilts.extend(Mounted::mount(PointerTilt::new(el, config)));
        }

        log::info!(
            "Mounted {} glitch, {} tilt targets",
            page.glitches.len(),
            page.tilts.len()
        );
        page
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document; effects disabled");
            return;
        };

        let mut config = load_config(&document);
        apply_quality_override(&document, &mut config);
        log::info!("Quality preset: {}", config.quality.as_str());
        let page = mount_page(&window, &document, &config);
        PAGE.with(|p| *p.borrow_mut() = Some(page));
        log::info!("Neon FX running");
    }

    /// Tear down every effect; calling it again does nothing
    #[wasm_bindgen]
    pub fn unmount_effects() {
        let page = PAGE.with(|p| p.borrow_mut().take());
        if page.is_some() {
            drop(page);
            log::info!("Neon FX unmounted");
        }
    }

    /// Observe an element added after load; returns its reveal handle
    #[wasm_bindgen]
    pub fn reveal(el: HtmlElement, options_json: Option<String>) -> Option<u32> {
        let options = match options_json {
            Some(json) => serde_json::from_str(&json).ok()?,
            None => RevealOptions::default(),
        };
        PAGE.with(|p| {
            let page = p.borrow();
            let reveals = page.as_ref()?.reveals.as_ref()?;
            reveals.with(|c, host| c.register(el, options, host).0)
        })
    }

    /// Stop observing a handle returned by `reveal`
    #[wasm_bindgen]
    pub fn unreveal(handle: u32) {
        PAGE.with(|p| {
            if let Some(reveals) = p.borrow().as_ref().and_then(|page| page.reveals.as_ref()) {
                reveals.with(|c, host| c.unregister(RevealHandle(handle), host));
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_page::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Neon FX (native) starting...");
    log::info!("Browser effects need the wasm build - run with `trunk serve` for the page");

    let mut config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| neon_fx::EffectsConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => neon_fx::EffectsConfig::default(),
    };
    if let Ok(value) = std::env::var("NEON_FX_QUALITY") {
        match neon_fx::settings::QualityPreset::parse(&value) {
            Some(quality) => config.quality = quality,
            None => log::warn!("Unknown NEON_FX_QUALITY {:?}", value),
        }
    }
    log::info!("Quality preset: {}", config.quality.as_str());

    headless_demo(&config);
}

#[cfg(not(target_arch = "wasm32"))]
fn headless_demo(config: &neon_fx::EffectsConfig) {
    use neon_fx::Effect;
    use neon_fx::fx::{GlitchScrambler, GlyphRain, ParticleField, TextNode};
    use neon_fx::platform::HeadlessHost;
    use neon_fx::renderer::RecordingSurface;

    /// Plain string standing in for a DOM text node
    struct Line {
        source: String,
        shown: String,
        writes: usize,
    }

    impl TextNode for Line {
        fn source_text(&self) -> Option<String> {
            Some(self.source.clone())
        }

        fn set_text(&mut self, text: &str) {
            self.shown = text.to_string();
            self.writes += 1;
        }
    }

    let (w, h) = (1280.0, 720.0);
    let mut host = HeadlessHost::new(w, h);

    let mut field = ParticleField::new(Some(RecordingSurface::new(w, h)), config, 1);
    field.mount(&mut host);
    host.advance(&mut field, 2000.0);
    let drawn = field.surface_mut().map(|s| s.take().len()).unwrap_or(0);
    field.unmount(&mut host);
    log::info!("Particle field: {} particles, {} draw calls in 2s", field.len(), drawn);

    let mut rain = GlyphRain::new(Some(RecordingSurface::new(w, h)), config, 2);
    rain.mount(&mut host);
    host.advance(&mut rain, 2000.0);
    let drawn = rain.surface_mut().map(|s| s.take().len()).unwrap_or(0);
    rain.unmount(&mut host);
    log::info!("Glyph rain: {} columns, {} draw calls in 2s", rain.columns(), drawn);

    let line = Line {
        source: "SYSTEM_ONLINE".to_string(),
        shown: "SYSTEM_ONLINE".to_string(),
        writes: 0,
    };
    let mut glitch = GlitchScrambler::attach(line, config, 3);
    glitch.mount(&mut host);
    host.advance(&mut glitch, 12_000.0);
    glitch.unmount(&mut host);
    let node = glitch.node();
    log::info!("Glitch: {} writes, resolved to {:?}", node.writes, node.shown);

    if host.live_handles() == 0 && host.stale_releases() == 0 {
        log::info!("Teardown clean");
    } else {
        log::error!(
            "Teardown leaked {} handles ({} stale releases)",
            host.live_handles(),
            host.stale_releases()
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
