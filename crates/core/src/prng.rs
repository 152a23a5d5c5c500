//! Deterministic PRNG used to fill noise lattices.
//!
//! Same seed, same table: the Xorshift64 core is pure integer arithmetic,
//! so a seeded noise table is identical on every platform.

use serde::{Deserialize, Serialize};

/// Xorshift64 deterministic PRNG with shifts (13, 7, 17).
///
/// Seed of 0 is replaced with a non-zero fallback to avoid the all-zeros
/// fixed point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Derives a seed from a host random value in [0, 1), such as
    /// `Math.random()` in a browser.
    pub fn seed_from_unit(unit: f64) -> u64 {
        let clamped = if unit.is_finite() {
            unit.clamp(0.0, 1.0)
        } else {
            0.0
        };
        (clamped * (1u64 << 53) as f64) as u64 ^ Self::FALLBACK_SEED
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f64 in [0, 1) built from the upper
    /// 53 bits of `next_u64()`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Overwrites every slot of `buf` with independent values in [0, 1).
    pub fn fill_unit(&mut self, buf: &mut [f64]) {
        buf.iter_mut().for_each(|slot| *slot = self.next_f64());
    }
}
