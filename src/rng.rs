//! Deterministic random number streams
//!
//! Every consumer (land allocation, each species) draws from its own named
//! ChaCha stream whose seed is derived from the master seed and the stream
//! name, so the order in which streams are first requested never changes
//! the values they produce.

use std::collections::HashMap;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    master_seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master_seed: seed,
            streams: HashMap::new(),
        }
    }

    /// Get or create the stream registered under `name`.
    pub fn stream(&mut self, name: &str) -> StreamRng<'_> {
        let seed = derive_seed(self.master_seed, name);
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed));
        StreamRng { inner: entry }
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::new(42)
    }
}

fn derive_seed(master_seed: u64, name: &str) -> u64 {
    // FNV-1a over the stream name
    let mut name_hash: u64 = 0xcbf29ce484222325;
    for byte in name.bytes() {
        name_hash ^= byte as u64;
        name_hash = name_hash.wrapping_mul(0x100000001b3);
    }
    let mut seed = master_seed;
    seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    seed ^= name_hash;
    seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    seed
}

pub struct StreamRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for StreamRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Range helpers that tolerate degenerate `min == max` bounds.
pub trait RngExt {
    /// Uniform float in `[min, max)`, or `min` when the range is empty.
    fn uniform_f64(&mut self, min: f64, max: f64) -> f64;
    /// Uniform integer in `[min, max]`.
    fn uniform_inclusive(&mut self, min: u32, max: u32) -> u32;
}

impl<R: Rng + ?Sized> RngExt for R {
    fn uniform_f64(&mut self, min: f64, max: f64) -> f64 {
        if max > min {
            self.gen_range(min..max)
        } else {
            min
        }
    }

    fn uniform_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max > min {
            self.gen_range(min..=max)
        } else {
            min
        }
    }
}
