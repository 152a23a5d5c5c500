//! Multi-octave value noise over a folded 4096-entry lattice.
//!
//! The lattice is a flat table of random values in [0, 1). A 3D integer
//! coordinate maps to the index `x + (y << 4) + (z << 8)` masked to the
//! table size, so y repeats every 16 cells and z every 256 cells. Within a
//! cell the eight corners are blended with the cosine ease
//! `0.5 * (1 - cos(t * pi))`, which keeps the output continuous across
//! integer boundaries.
//!
//! Negative coordinates are mirrored through their absolute value. This is
//! not a symmetric extension of the field (there is a crease along each
//! axis), and it is kept as is because the rendered style depends on it.

use std::f64::consts::PI;

use noise::NoiseFn;
use topography_core::config::{DEFAULT_FALLOFF, DEFAULT_OCTAVES};
use topography_core::error::EngineError;
use topography_core::prng::Xorshift64;

const Y_WRAP_BITS: u32 = 4;
const Y_WRAP: u64 = 1 << Y_WRAP_BITS;
const Z_WRAP_BITS: u32 = 8;
const Z_WRAP: u64 = 1 << Z_WRAP_BITS;

/// Number of lattice values.
pub const TABLE_SIZE: usize = 4096;
const TABLE_MASK: u64 = TABLE_SIZE as u64 - 1;

/// Amplitude of the first octave; later octaves scale it by the falloff.
const BASE_AMPLITUDE: f64 = 0.5;

/// Stateful coherent-noise sampler.
///
/// The table is filled once at construction and never mutated, so
/// [`sample`](Self::sample) is a pure function for the sampler's lifetime.
/// Cloning shares the visual phase between engines.
#[derive(Debug, Clone)]
pub struct NoiseSampler {
    table: Box<[f64]>,
    octaves: u32,
    falloff: f64,
}

impl NoiseSampler {
    /// Fills a fresh table from `seed` with the default 4 octaves and 0.5 falloff.
    pub fn new(seed: u64) -> Self {
        let mut table = vec![0.0; TABLE_SIZE].into_boxed_slice();
        Xorshift64::new(seed).fill_unit(&mut table);
        Self {
            table,
            octaves: DEFAULT_OCTAVES,
            falloff: DEFAULT_FALLOFF,
        }
    }

    /// Uses an explicit lattice. Every value must be finite and in [0, 1).
    pub fn from_table(table: Vec<f64>) -> Result<Self, EngineError> {
        if table.len() != TABLE_SIZE {
            return Err(EngineError::DimensionMismatch {
                lhs_w: TABLE_SIZE,
                lhs_h: 1,
                rhs_w: table.len(),
                rhs_h: 1,
            });
        }
        if let Some(bad) = table.iter().find(|v| !(0.0..1.0).contains(*v)) {
            return Err(EngineError::InvalidParameter {
                name: "table".into(),
                reason: format!("value {bad} outside [0, 1)"),
            });
        }
        Ok(Self {
            table: table.into_boxed_slice(),
            octaves: DEFAULT_OCTAVES,
            falloff: DEFAULT_FALLOFF,
        })
    }

    /// Sets the octave count and per-octave amplitude falloff.
    pub fn with_detail(mut self, octaves: u32, falloff: f64) -> Self {
        self.octaves = octaves;
        self.falloff = falloff;
        self
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    pub fn falloff(&self) -> f64 {
        self.falloff
    }

    /// Upper bound (exclusive) of [`sample`](Self::sample) for this detail setting.
    pub fn max_amplitude(&self) -> f64 {
        (0..self.octaves)
            .map(|o| BASE_AMPLITUDE * self.falloff.powi(o as i32))
            .sum()
    }

    /// Samples the noise field. Always non-negative.
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let (x, y, z) = (x.abs(), y.abs(), z.abs());

        let mut xi = x.floor() as u64;
        let mut yi = y.floor() as u64;
        let mut zi = z.floor() as u64;
        let mut xf = x - x.floor();
        let mut yf = y - y.floor();
        let mut zf = z - z.floor();

        let mut total = 0.0;
        let mut amplitude = BASE_AMPLITUDE;

        for _ in 0..self.octaves {
            let mut offset = xi
                .wrapping_add(yi << Y_WRAP_BITS)
                .wrapping_add(zi << Z_WRAP_BITS);

            let rxf = scaled_cosine(xf);
            let ryf = scaled_cosine(yf);

            // Near z plane.
            let mut n1 = self.at(offset);
            n1 += rxf * (self.at(offset.wrapping_add(1)) - n1);
            let mut n2 = self.at(offset.wrapping_add(Y_WRAP));
            n2 += rxf * (self.at(offset.wrapping_add(Y_WRAP + 1)) - n2);
            n1 += ryf * (n2 - n1);

            // Far z plane.
            offset = offset.wrapping_add(Z_WRAP);
            n2 = self.at(offset);
            n2 += rxf * (self.at(offset.wrapping_add(1)) - n2);
            let mut n3 = self.at(offset.wrapping_add(Y_WRAP));
            n3 += rxf * (self.at(offset.wrapping_add(Y_WRAP + 1)) - n3);
            n2 += ryf * (n3 - n2);

            n1 += scaled_cosine(zf) * (n2 - n1);

            total += n1 * amplitude;
            amplitude *= self.falloff;

            (xi, xf) = double_coordinate(xi, xf);
            (yi, yf) = double_coordinate(yi, yf);
            (zi, zf) = double_coordinate(zi, zf);
        }
        total
    }

    fn at(&self, offset: u64) -> f64 {
        self.table[(offset & TABLE_MASK) as usize]
    }
}

impl NoiseFn<f64, 3> for NoiseSampler {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.sample(point[0], point[1], point[2])
    }
}

fn scaled_cosine(t: f64) -> f64 {
    0.5 * (1.0 - (t * PI).cos())
}

/// Moves to the next octave: doubles the integer and fractional parts and
/// carries the fractional overflow.
fn double_coordinate(int: u64, frac: f64) -> (u64, f64) {
    let (mut int, mut frac) = (int.wrapping_shl(1), frac * 2.0);
    if frac >= 1.0 {
        int = int.wrapping_add(1);
        frac -= 1.0;
    }
    (int, frac)
}
