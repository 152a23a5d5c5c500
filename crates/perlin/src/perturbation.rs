//! Per-cell bias that pointer interaction adds to the noise time coordinate.
//!
//! A bias is injected with a radial falloff around a cell and then decays
//! geometrically every frame, injected or not, so a disturbance fades out
//! on its own.

use topography_core::error::EngineError;
use topography_core::field::Field;

/// Non-negative bias grid with the same dimensions as the sample lattice.
#[derive(Debug, Clone)]
pub struct PerturbationField {
    bias: Field,
}

impl PerturbationField {
    /// A zeroed field of `cols x rows` lattice points.
    pub fn new(cols: usize, rows: usize) -> Result<Self, EngineError> {
        Ok(Self {
            bias: Field::new(cols, rows)?,
        })
    }

    pub fn cols(&self) -> usize {
        self.bias.width()
    }

    pub fn rows(&self) -> usize {
        self.bias.height()
    }

    /// Bias at `(col, row)`; zero outside the lattice.
    pub fn bias(&self, col: usize, row: usize) -> f64 {
        self.bias.get(col, row).unwrap_or(0.0)
    }

    /// The underlying lattice, row-major.
    pub fn field(&self) -> &Field {
        &self.bias
    }

    /// Adds `strength * (1 - d^2 / r^2)` to every cell within Euclidean cell
    /// distance `radius` of `(col, row)`. Cells off the lattice are skipped.
    ///
    /// A zero radius touches only the center cell, at full strength.
    pub fn inject(&mut self, col: usize, row: usize, radius: usize, strength: f64) {
        if radius == 0 {
            self.bias.add_at(col, row, strength);
            return;
        }
        let (cols, rows) = (self.cols(), self.rows());
        let r2 = (radius as f64).powi(2);
        // Walk only the part of the square that lies on the lattice.
        let x_end = col.saturating_add(radius).min(cols - 1);
        let y_end = row.saturating_add(radius).min(rows - 1);
        for y in row.saturating_sub(radius)..=y_end {
            for x in col.saturating_sub(radius)..=x_end {
                let dx = x.abs_diff(col) as f64;
                let dy = y.abs_diff(row) as f64;
                let d2 = dx * dx + dy * dy;
                if d2 <= r2 {
                    self.bias.add_at(x, y, strength * (1.0 - d2 / r2));
                }
            }
        }
    }

    /// Multiplies every cell by `factor`.
    pub fn decay_all(&mut self, factor: f64) {
        self.bias.scale_assign(factor);
    }

    /// Largest bias currently held.
    pub fn max_bias(&self) -> f64 {
        self.bias.data().iter().copied().fold(0.0, f64::max)
    }
}
