//! Glitch scrambler: periodically scrambles a text node, then resolves it
//!
//! Every `interval_ms` a run starts. Each inner tick shows the first
//! `iterations` characters of the source and random alphabet characters for
//! the rest, then bumps `iterations`. Once `iterations > max_iterations` the
//! source text is written back and the inner timer is released.
//!
//! The source is re-read from the node at the start of every run, so text
//! changed by the page between runs is never replaced by a stale copy.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Effect;
use crate::platform::{Event, HandleId, Handles, Host, Wake};
use crate::settings::{EffectsConfig, GlitchConfig};

/// Text the scrambler reads from and writes to
pub trait TextNode {
    /// Canonical text to scramble; `None` once the node is gone
    fn source_text(&self) -> Option<String>;

    /// Replace the displayed text
    fn set_text(&mut self, text: &str);
}

#[derive(Debug, Clone)]
struct Run {
    source: Vec<char>,
    iterations: usize,
}

pub struct GlitchScrambler<N: TextNode> {
    config: GlitchConfig,
    alphabet: Vec<char>,
    node: N,
    rng: Pcg32,
    run: Option<Run>,
    inner: Option<HandleId>,
    handles: Handles,
    mounted: bool,
}

/// One scrambled frame: chars before `revealed` are kept, the rest replaced
pub fn scramble<R: Rng>(source: &[char], revealed: usize, alphabet: &[char], rng: &mut R) -> String {
    source
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if i < revealed || alphabet.is_empty() {
                c
            } else {
                alphabet[rng.random_range(0..alphabet.len())]
            }
        })
        .collect()
}

impl<N: TextNode> GlitchScrambler<N> {
    /// Attach to a node; the first run starts one interval after mount
    pub fn attach(node: N, config: &EffectsConfig, seed: u64) -> Self {
        let config = config.glitch.sanitized();
        Self {
            alphabet: config.alphabet.chars().collect(),
            config,
            node,
            rng: Pcg32::seed_from_u64(seed),
            run: None,
            inner: None,
            handles: Handles::new(),
            mounted: false,
        }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut N {
        &mut self.node
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Current iteration of the active run
    pub fn iterations(&self) -> Option<usize> {
        self.run.as_ref().map(|r| r.iterations)
    }

    /// Stop the effect; the same as unmount
    pub fn stop(&mut self, host: &mut dyn Host) {
        self.unmount(host);
    }

    /// Begin a run now, restarting any run already in progress
    pub fn start_run(&mut self, host: &mut dyn Host) {
        self.cancel_inner(host);
        let Some(source) = self.node.source_text() else {
            log::debug!("Glitch target detached; skipping run");
            self.run = None;
            return;
        };
        self.run = Some(Run {
            source: source.chars().collect(),
            iterations: 0,
        });
        self.inner = self.handles.track(host.set_interval(self.config.tick_ms, Wake::Inner));
    }

    /// Show one frame of the active run
    pub fn step(&mut self, host: &mut dyn Host) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let frame = scramble(&run.source, run.iterations, &self.alphabet, &mut self.rng);
        self.node.set_text(&frame);
        run.iterations += 1;
        if run.iterations > self.config.max_iterations {
            self.finish(host);
        }
    }

    fn finish(&mut self, host: &mut dyn Host) {
        if let Some(run) = self.run.take() {
            let text: String = run.source.iter().collect();
            self.node.set_text(&text);
        }
        self.cancel_inner(host);
    }

    fn cancel_inner(&mut self, host: &mut dyn Host) {
        if let Some(id) = self.inner.take() {
            self.handles.release(id, host);
        }
    }
}

impl<N: TextNode> Effect for GlitchScrambler<N> {
    fn mount(&mut self, host: &mut dyn Host) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.handles.track(host.set_interval(self.config.interval_ms, Wake::Outer));
    }

    fn handle(&mut self, event: &Event, host: &mut dyn Host) {
        if !self.mounted {
            return;
        }
        match event {
            Event::Timer(Wake::Outer) => self.start_run(host),
            Event::Timer(Wake::Inner) => self.step(host),
            _ => {}
        }
    }

    fn unmount(&mut self, host: &mut dyn Host) {
        // Never leave scrambled text behind
        self.finish(host);
        self.handles.release_all(host);
        self.mounted = false;
    }
}
