//! Randomness facade for reproducible runs.
//!
//! - `DrawSite`: a stable identifier for a sampling location, plus a human tag.
//! - `RandomProvider`: the trait server models sample through.
//! - `SeededRandom`: the default provider, a seeded `StdRng`.
//!
//! Routing every draw through a provider keeps admission outcomes reproducible
//! for a fixed seed and lets tests script outcomes exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// A labeled sampling location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawSite {
    pub tag: &'static str,
    pub site_id: u64,
}

impl DrawSite {
    pub const fn new(tag: &'static str, site_id: u64) -> Self {
        Self { tag, site_id }
    }
}

/// Source of uniform draws.
pub trait RandomProvider: Send + std::fmt::Debug {
    /// Uniform sample in `[0, 1)`.
    fn sample_unit(&mut self, site: DrawSite) -> f64;
}

/// Const-friendly 64-bit FNV-1a hash.
pub const fn fnv1a64(s: &str) -> u64 {
    let bytes = s.as_bytes();
    let mut hash: u64 = 0xcbf29ce484222325;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x100000001b3);
        i += 1;
    }
    hash
}

/// Generate a `DrawSite` identified by the macro expansion site.
#[macro_export]
macro_rules! draw_site {
    ($tag:expr) => {{
        const _SITE_ID: u64 = $crate::randomness::fnv1a64(concat!(
            module_path!(),
            "::",
            file!(),
            ":",
            line!(),
            ":",
            $tag,
        ));
        $crate::randomness::DrawSite::new($tag, _SITE_ID)
    }};
}

/// `StdRng`-backed provider.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RandomProvider for SeededRandom {
    fn sample_unit(&mut self, site: DrawSite) -> f64 {
        let value: f64 = self.rng.gen();
        trace!(tag = site.tag, site_id = site.site_id, value, "Random draw");
        value
    }
}

/// Replays a fixed list of draws, cycling when exhausted. Test helper.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }
}

impl RandomProvider for ScriptedRandom {
    fn sample_unit(&mut self, _site: DrawSite) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}
