//! Per-frame noise lattice and the contour levels derived from it.

use topography_core::error::EngineError;
use topography_core::field::Field;
use topography_core::surface::SurfaceSize;

use crate::noise::NoiseSampler;
use crate::perturbation::PerturbationField;

/// Noise output in [0, 1) is stretched to roughly [0, 100] before contouring.
pub const NOISE_SCALE: f64 = 100.0;

/// Upper bound on sampled lattice points (both lattices, each frame).
pub const MAX_LATTICE_POINTS: usize = 1 << 24;

/// Cell counts for a surface at a given pitch.
///
/// `cols = floor(width / res) + 1` and `rows = floor(height / res) + 1`. The
/// sampled lattice has one more point on each axis so every cell owns all
/// four of its corners, including along the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub cols: usize,
    pub rows: usize,
}

impl GridDims {
    /// Dimensions for a surface of `size` CSS pixels at pitch `resolution`.
    pub fn for_surface(size: SurfaceSize, resolution: f64) -> Result<Self, EngineError> {
        if !size.is_valid() {
            return Err(EngineError::InvalidDimensions);
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(EngineError::InvalidParameter {
                name: "resolution".into(),
                reason: "must be finite and > 0".into(),
            });
        }
        let dims = Self {
            cols: cell_count(size.width, resolution)?,
            rows: cell_count(size.height, resolution)?,
        };
        dims.lattice_cols()
            .checked_mul(dims.lattice_rows())
            .filter(|&points| points <= MAX_LATTICE_POINTS)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(dims)
    }

    /// Lattice points per row.
    pub fn lattice_cols(&self) -> usize {
        self.cols + 1
    }

    /// Lattice points per column.
    pub fn lattice_rows(&self) -> usize {
        self.rows + 1
    }
}

/// `floor(extent / resolution) + 1`, or `InvalidDimensions` past the lattice cap.
fn cell_count(extent: f64, resolution: f64) -> Result<usize, EngineError> {
    let cells = (extent / resolution).floor();
    if !(cells.is_finite() && cells < MAX_LATTICE_POINTS as f64) {
        return Err(EngineError::InvalidDimensions);
    }
    (cells as usize)
        .checked_add(1)
        .ok_or(EngineError::InvalidDimensions)
}

/// The scalar field for one frame plus its observed range.
///
/// Every reallocation gets a new `generation`; a grid is only drawable once
/// it has been sampled.
#[derive(Debug, Clone)]
pub struct SampleGrid {
    values: Field,
    observed_min: f64,
    observed_max: f64,
    generation: u64,
    sampled: bool,
}

impl SampleGrid {
    pub fn new(dims: GridDims, generation: u64) -> Result<Self, EngineError> {
        Ok(Self {
            values: Field::new(dims.lattice_cols(), dims.lattice_rows())?,
            observed_min: f64::INFINITY,
            observed_max: f64::NEG_INFINITY,
            generation,
            sampled: false,
        })
    }

    /// Builds an already-sampled grid from explicit lattice values.
    pub fn from_field(values: Field, generation: u64) -> Self {
        let (min, max) = values
            .data()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Self {
            values,
            observed_min: min,
            observed_max: max,
            generation,
            sampled: true,
        }
    }

    /// Re-samples every lattice point at
    /// `noise(col * k, row * k, time + bias[row][col]) * NOISE_SCALE`,
    /// resetting and tracking the observed range.
    pub fn resample(
        &mut self,
        noise: &NoiseSampler,
        perturbation: &PerturbationField,
        spatial_frequency: f64,
        time: f64,
    ) -> Result<(), EngineError> {
        let (w, h) = (self.values.width(), self.values.height());
        if perturbation.cols() != w || perturbation.rows() != h {
            return Err(EngineError::DimensionMismatch {
                lhs_w: w,
                lhs_h: h,
                rhs_w: perturbation.cols(),
                rhs_h: perturbation.rows(),
            });
        }

        let bias = perturbation.field().data();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let data = self.values.data_mut();
        for row in 0..h {
            for col in 0..w {
                let idx = row * w + col;
                let v = noise.sample(
                    col as f64 * spatial_frequency,
                    row as f64 * spatial_frequency,
                    time + bias[idx],
                ) * NOISE_SCALE;
                data[idx] = v;
                min = min.min(v);
                max = max.max(v);
            }
        }
        self.observed_min = min;
        self.observed_max = max;
        self.sampled = true;
        Ok(())
    }

    pub fn field(&self) -> &Field {
        &self.values
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_sampled(&self) -> bool {
        self.sampled
    }

    /// Smallest value of the last sampling pass.
    pub fn observed_min(&self) -> Option<f64> {
        self.sampled.then_some(self.observed_min)
    }

    /// Largest value of the last sampling pass.
    pub fn observed_max(&self) -> Option<f64> {
        self.sampled.then_some(self.observed_max)
    }

    /// Contour levels covering this frame's range, ascending.
    ///
    /// Empty for a grid that has not been sampled.
    pub fn thresholds(&self, increment: f64, thick_multiple: u32) -> ThresholdLevels {
        if !self.sampled {
            return ThresholdLevels::empty(increment, thick_multiple);
        }
        ThresholdLevels::spanning(self.observed_min, self.observed_max, increment, thick_multiple)
    }
}

/// One contour level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdLevel {
    /// Position in the global level ladder: `value = index * increment`.
    pub index: i64,
    pub value: f64,
    /// Every `thick_multiple`-th level is drawn with the thick stroke.
    pub thick: bool,
}

/// Ascending iterator over `floor(min/inc)*inc .. ceil(max/inc)*inc`
/// (end exclusive) in steps of `inc`.
#[derive(Debug, Clone)]
pub struct ThresholdLevels {
    next: i64,
    end: i64,
    increment: f64,
    thick_multiple: i64,
}

impl ThresholdLevels {
    pub fn spanning(min: f64, max: f64, increment: f64, thick_multiple: u32) -> Self {
        if !(min.is_finite() && max.is_finite() && increment.is_finite() && increment > 0.0) {
            return Self::empty(increment, thick_multiple);
        }
        Self {
            next: (min / increment).floor() as i64,
            end: (max / increment).ceil() as i64,
            increment,
            thick_multiple: i64::from(thick_multiple.max(1)),
        }
    }

    fn empty(increment: f64, thick_multiple: u32) -> Self {
        Self {
            next: 0,
            end: 0,
            increment,
            thick_multiple: i64::from(thick_multiple.max(1)),
        }
    }
}

impl Iterator for ThresholdLevels {
    type Item = ThresholdLevel;

    fn next(&mut self) -> Option<ThresholdLevel> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(ThresholdLevel {
            index,
            value: index as f64 * self.increment,
            thick: index.rem_euclid(self.thick_multiple) == 0,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end - self.next).max(0) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for ThresholdLevels {}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(cols: usize, rows: usize) -> GridDims {
        GridDims { cols, rows }
    }

    #[test]
    fn dims_follow_floor_plus_one() {
        let d = GridDims::for_surface(SurfaceSize::new(800.0, 600.0), 8.0).unwrap();
        assert_eq!(d, dims(101, 76));
        assert_eq!(d.lattice_cols(), 102);
        assert_eq!(d.lattice_rows(), 77);
        let d = GridDims::for_surface(SurfaceSize::new(7.9, 8.0), 8.0).unwrap();
        assert_eq!(d, dims(1, 2));
    }

    #[test]
    fn halving_width_roughly_halves_cols() {
        let full = GridDims::for_surface(SurfaceSize::new(1000.0, 500.0), 8.0).unwrap();
        let half = GridDims::for_surface(SurfaceSize::new(500.0, 500.0), 8.0).unwrap();
        let expected = (full.cols - 1) / 2 + 1;
        assert!(half.cols.abs_diff(expected) <= 1, "{full:?} -> {half:?}");
    }

    #[test]
    fn dims_reject_invalid_inputs() {
        assert!(GridDims::for_surface(SurfaceSize::new(0.0, 10.0), 8.0).is_err());
        assert!(GridDims::for_surface(SurfaceSize::new(10.0, 10.0), 0.0).is_err());
        assert!(GridDims::for_surface(SurfaceSize::new(f64::NAN, 10.0), 8.0).is_err());
    }

    #[test]
    fn dims_reject_lattices_past_the_cap() {
        assert!(matches!(
            GridDims::for_surface(SurfaceSize::new(800.0, 600.0), 1e-300),
            Err(EngineError::InvalidDimensions)
        ));
        assert!(matches!(
            GridDims::for_surface(SurfaceSize::new(1e12, 8.0), 8.0),
            Err(EngineError::InvalidDimensions)
        ));
        // Each axis fits on its own but the product does not.
        assert!(matches!(
            GridDims::for_surface(SurfaceSize::new(80_000.0, 80_000.0), 8.0),
            Err(EngineError::InvalidDimensions)
        ));
    }

    #[test]
    fn dims_accept_a_lattice_at_the_cap() {
        // 4094 px at pitch 1 is 4095 cells, 4096 points per axis: 2^24 in total.
        let d = GridDims::for_surface(SurfaceSize::new(4094.0, 4094.0), 1.0).unwrap();
        assert_eq!(d.lattice_cols() * d.lattice_rows(), MAX_LATTICE_POINTS);
        assert!(GridDims::for_surface(SurfaceSize::new(4095.0, 4095.0), 1.0).is_err());
    }

    #[test]
    fn new_grid_is_unsampled_and_yields_no_levels() {
        let grid = SampleGrid::new(dims(3, 2), 7).unwrap();
        assert!(!grid.is_sampled());
        assert_eq!(grid.generation(), 7);
        assert_eq!(grid.observed_min(), None);
        assert_eq!(grid.thresholds(5.0, 3).count(), 0);
        assert_eq!(grid.field().width(), 4);
        assert_eq!(grid.field().height(), 3);
    }

    #[test]
    fn resample_tracks_range_and_scales_output() {
        let noise = NoiseSampler::new(3);
        let d = dims(20, 10);
        let pert = PerturbationField::new(d.lattice_cols(), d.lattice_rows()).unwrap();
        let mut grid = SampleGrid::new(d, 0).unwrap();
        grid.resample(&noise, &pert, 0.02, 0.0008).unwrap();

        let data = grid.field().data();
        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(grid.observed_min(), Some(min));
        assert_eq!(grid.observed_max(), Some(max));
        assert!(min >= 0.0 && max < NOISE_SCALE);
        let expected = noise.sample(5.0 * 0.02, 3.0 * 0.02, 0.0008) * NOISE_SCALE;
        assert_eq!(grid.field().get(5, 3), Some(expected));
    }

    #[test]
    fn resample_adds_bias_to_time_coordinate() {
        let noise = NoiseSampler::new(11);
        let d = dims(4, 4);
        let mut pert = PerturbationField::new(d.lattice_cols(), d.lattice_rows()).unwrap();
        pert.inject(2, 2, 0, 0.3);
        let mut grid = SampleGrid::new(d, 0).unwrap();
        grid.resample(&noise, &pert, 0.02, 0.1).unwrap();
        let expected = noise.sample(0.04, 0.04, 0.1 + 0.3) * NOISE_SCALE;
        assert_eq!(grid.field().get(2, 2), Some(expected));
    }

    #[test]
    fn resample_rejects_mismatched_perturbation() {
        let noise = NoiseSampler::new(1);
        let pert = PerturbationField::new(2, 2).unwrap();
        let mut grid = SampleGrid::new(dims(4, 4), 0).unwrap();
        assert!(matches!(
            grid.resample(&noise, &pert, 0.02, 0.0),
            Err(EngineError::DimensionMismatch { .. })
        ));
        assert!(!grid.is_sampled());
    }

    #[test]
    fn from_field_computes_range() {
        let f = Field::from_data(2, 2, vec![3.0, 12.0, 7.0, 40.0]).unwrap();
        let grid = SampleGrid::from_field(f, 0);
        assert_eq!(grid.observed_min(), Some(3.0));
        assert_eq!(grid.observed_max(), Some(40.0));
    }

    #[test]
    fn thresholds_round_outward_to_increment() {
        let levels: Vec<f64> = ThresholdLevels::spanning(12.3, 27.1, 5.0, 3)
            .map(|l| l.value)
            .collect();
        assert_eq!(levels, vec![10.0, 15.0, 20.0, 25.0]);
    }

    #[test]
    fn thresholds_mark_every_third_level_thick() {
        let thick: Vec<(f64, bool)> = ThresholdLevels::spanning(0.0, 35.0, 5.0, 3)
            .map(|l| (l.value, l.thick))
            .collect();
        assert_eq!(
            thick,
            vec![
                (0.0, true),
                (5.0, false),
                (10.0, false),
                (15.0, true),
                (20.0, false),
                (25.0, false),
                (30.0, true),
            ]
        );
    }

    #[test]
    fn thresholds_exact_max_is_exclusive() {
        assert_eq!(ThresholdLevels::spanning(10.0, 10.0, 5.0, 3).count(), 0);
        assert_eq!(ThresholdLevels::spanning(10.0, 15.0, 5.0, 3).len(), 1);
    }

    #[test]
    fn thresholds_with_degenerate_inputs_are_empty() {
        assert_eq!(ThresholdLevels::spanning(f64::INFINITY, 5.0, 5.0, 3).count(), 0);
        assert_eq!(ThresholdLevels::spanning(0.0, 50.0, 0.0, 3).count(), 0);
    }
}
