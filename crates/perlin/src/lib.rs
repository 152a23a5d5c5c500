#![deny(unsafe_code)]
//! Animated value-noise topography.
//!
//! Each frame samples a multi-octave value-noise field on a regular lattice,
//! with the noise z coordinate advancing slowly over time and nudged per cell
//! by a decaying perturbation bias. The field is then traced with marching
//! squares at evenly spaced levels, producing shifting contour lines like a
//! topographic map. Every few levels is stroked thicker.
//!
//! Pointer interaction is handled by [`PerlinTopography::inject_at`], which
//! warps the local time coordinate so nearby contours bend and then settle.

pub mod contour;
pub mod noise;
pub mod perturbation;
pub mod sample_grid;

use serde_json::{json, Value};
use topography_core::color::{resolve_line_color, LineColor, Rgba};
use topography_core::config::{
    TopographyConfig, DEFAULT_DECAY, DEFAULT_FALLOFF, DEFAULT_INJECT_RADIUS,
    DEFAULT_INJECT_STRENGTH, DEFAULT_OCTAVES, DEFAULT_RESOLUTION, DEFAULT_SPATIAL_FREQUENCY,
    DEFAULT_THICK_LINE_MULTIPLE, DEFAULT_THICK_LINE_WIDTH, DEFAULT_THIN_LINE_WIDTH,
    DEFAULT_THRESHOLD_INCREMENT, DEFAULT_TIME_STEP, DECAY_RANGE, FALLOFF_RANGE,
    INJECT_RADIUS_RANGE, INJECT_STRENGTH_RANGE, LINE_WIDTH_RANGE, OCTAVES_RANGE,
    RESOLUTION_RANGE, SPATIAL_FREQUENCY_RANGE, THICK_LINE_MULTIPLE_RANGE,
    THRESHOLD_INCREMENT_RANGE, TIME_STEP_RANGE,
};
use topography_core::error::EngineError;
use topography_core::field::Field;
use topography_core::surface::{Surface, SurfaceSize};
use topography_core::{Engine, InteractiveEngine};

use crate::contour::{level_style, ContourExtractor};
use crate::noise::NoiseSampler;
use crate::perturbation::PerturbationField;
use crate::sample_grid::{GridDims, SampleGrid, ThresholdLevels};

/// Name under which this engine is registered.
pub const ENGINE_NAME: &str = "perlin-topography";

/// The contour-topography engine.
///
/// Owns the noise sampler, the perturbation bias and the per-frame sample
/// grid. Both lattices are reallocated together on [`resize`](Self::resize),
/// which also bumps the grid generation so a stale grid is never drawn.
pub struct PerlinTopography {
    config: TopographyConfig,
    noise: NoiseSampler,
    perturbation: PerturbationField,
    grid: SampleGrid,
    extractor: ContourExtractor,
    line_color: LineColor,
    size: SurfaceSize,
    dims: GridDims,
    generation: u64,
    time: f64,
}

impl PerlinTopography {
    /// Creates an engine for a surface of `size` CSS pixels.
    ///
    /// Returns `EngineError::InvalidParameter` for an invalid config and
    /// `EngineError::InvalidDimensions` for an empty or non-finite size.
    pub fn new(
        size: SurfaceSize,
        seed: u64,
        config: TopographyConfig,
    ) -> Result<Self, EngineError> {
        let noise = NoiseSampler::new(seed);
        Self::with_noise(size, noise, config)
    }

    /// Creates an engine around an existing sampler, sharing its phase.
    pub fn with_noise(
        size: SurfaceSize,
        noise: NoiseSampler,
        config: TopographyConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let dims = GridDims::for_surface(size, config.resolution)?;
        let noise = noise.with_detail(config.octaves, config.falloff);
        let line_color = resolve_line_color(config.line_color.as_deref(), None);
        Ok(Self {
            perturbation: PerturbationField::new(dims.lattice_cols(), dims.lattice_rows())?,
            grid: SampleGrid::new(dims, 0)?,
            extractor: ContourExtractor::new(config.resolution),
            config,
            noise,
            line_color,
            size,
            dims,
            generation: 0,
            time: 0.0,
        })
    }

    /// Creates an engine from a loose JSON params object.
    pub fn from_json(size: SurfaceSize, seed: u64, params: &Value) -> Result<Self, EngineError> {
        Self::new(size, seed, TopographyConfig::from_json(params))
    }

    /// Reallocates both lattices for a new surface size.
    ///
    /// All perturbation is discarded. Time keeps running, so the noise
    /// continues where it was.
    pub fn resize(&mut self, size: SurfaceSize) -> Result<(), EngineError> {
        let dims = GridDims::for_surface(size, self.config.resolution)?;
        let generation = self.generation + 1;
        self.perturbation = PerturbationField::new(dims.lattice_cols(), dims.lattice_rows())?;
        self.grid = SampleGrid::new(dims, generation)?;
        self.generation = generation;
        self.dims = dims;
        self.size = size;
        tracing::debug!(
            cols = dims.cols,
            rows = dims.rows,
            generation,
            "reallocated sample grid"
        );
        Ok(())
    }

    /// Injects a pointer disturbance at surface coordinates `(x, y)`.
    ///
    /// Returns `false` and does nothing when the point falls outside the
    /// lattice.
    pub fn inject_at(&mut self, x: f64, y: f64) -> bool {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return false;
        }
        let res = self.config.resolution;
        let col = (x / res).floor() as usize;
        let row = (y / res).floor() as usize;
        if col >= self.perturbation.cols() || row >= self.perturbation.rows() {
            return false;
        }
        self.perturbation.inject(
            col,
            row,
            self.config.inject_radius,
            self.config.inject_strength,
        );
        true
    }

    /// Overrides the stroke color used for every level.
    pub fn set_line_color(&mut self, color: LineColor) {
        self.line_color = color;
    }

    pub fn line_color(&self) -> &LineColor {
        &self.line_color
    }

    pub fn config(&self) -> &TopographyConfig {
        &self.config
    }

    pub fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    pub fn perturbation(&self) -> &PerturbationField {
        &self.perturbation
    }

    pub fn noise(&self) -> &NoiseSampler {
        &self.noise
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Current noise z coordinate.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Generation of the current lattice allocation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Contour levels for the current frame, ascending.
    pub fn thresholds(&self) -> ThresholdLevels {
        self.grid.thresholds(
            self.config.threshold_increment,
            self.config.thick_line_multiple,
        )
    }

    fn grid_is_current(&self) -> bool {
        self.grid.is_sampled() && self.grid.generation() == self.generation
    }
}

impl Engine for PerlinTopography {
    fn step(&mut self) -> Result<(), EngineError> {
        self.time += self.config.time_step;
        self.grid.resample(
            &self.noise,
            &self.perturbation,
            self.config.spatial_frequency,
            self.time,
        )?;
        self.perturbation.decay_all(self.config.decay);
        tracing::trace!(
            time = self.time,
            min = self.grid.observed_min(),
            max = self.grid.observed_max(),
            levels = self.thresholds().len(),
            "frame sampled"
        );
        Ok(())
    }

    fn field(&self) -> &Field {
        self.grid.field()
    }

    fn render(&self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        if !self.grid_is_current() {
            return Ok(());
        }
        for level in self.thresholds() {
            let style = level_style(
                &level,
                self.line_color.clone(),
                self.config.thin_line_width,
                self.config.thick_line_width,
            );
            self.extractor
                .draw_level(self.grid.field(), &level, &style, surface);
        }
        Ok(())
    }

    fn params(&self) -> Value {
        json!({
            "resolution": self.config.resolution,
            "threshold_increment": self.config.threshold_increment,
            "thick_line_multiple": self.config.thick_line_multiple,
            "time_step": self.config.time_step,
            "spatial_frequency": self.config.spatial_frequency,
            "decay": self.config.decay,
            "inject_radius": self.config.inject_radius,
            "inject_strength": self.config.inject_strength,
            "octaves": self.config.octaves,
            "falloff": self.config.falloff,
            "thin_line_width": self.config.thin_line_width,
            "thick_line_width": self.config.thick_line_width,
            "line_color": self.line_color.to_css(),
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "resolution": {
                "type": "number",
                "default": DEFAULT_RESOLUTION,
                "min": *RESOLUTION_RANGE.start(),
                "max": *RESOLUTION_RANGE.end(),
                "description": "Cell pitch in CSS pixels"
            },
            "threshold_increment": {
                "type": "number",
                "default": DEFAULT_THRESHOLD_INCREMENT,
                "min": *THRESHOLD_INCREMENT_RANGE.start(),
                "max": *THRESHOLD_INCREMENT_RANGE.end(),
                "description": "Spacing between contour levels (noise scaled to 0..100)"
            },
            "thick_line_multiple": {
                "type": "integer",
                "default": DEFAULT_THICK_LINE_MULTIPLE,
                "min": *THICK_LINE_MULTIPLE_RANGE.start(),
                "max": *THICK_LINE_MULTIPLE_RANGE.end(),
                "description": "Every n-th level is stroked thick"
            },
            "time_step": {
                "type": "number",
                "default": DEFAULT_TIME_STEP,
                "min": *TIME_STEP_RANGE.start(),
                "max": *TIME_STEP_RANGE.end(),
                "description": "Per-frame advance of the noise z coordinate"
            },
            "spatial_frequency": {
                "type": "number",
                "default": DEFAULT_SPATIAL_FREQUENCY,
                "min": *SPATIAL_FREQUENCY_RANGE.start(),
                "max": *SPATIAL_FREQUENCY_RANGE.end(),
                "description": "Lattice-to-noise coordinate scale"
            },
            "decay": {
                "type": "number",
                "default": DEFAULT_DECAY,
                "min": *DECAY_RANGE.start(),
                "max": *DECAY_RANGE.end(),
                "description": "Per-frame multiplicative decay of pointer perturbation"
            },
            "inject_radius": {
                "type": "integer",
                "default": DEFAULT_INJECT_RADIUS,
                "min": *INJECT_RADIUS_RANGE.start(),
                "max": *INJECT_RADIUS_RANGE.end(),
                "description": "Pointer injection radius in cells"
            },
            "inject_strength": {
                "type": "number",
                "default": DEFAULT_INJECT_STRENGTH,
                "min": *INJECT_STRENGTH_RANGE.start(),
                "max": *INJECT_STRENGTH_RANGE.end(),
                "description": "Pointer injection strength at the center cell"
            },
            "octaves": {
                "type": "integer",
                "default": DEFAULT_OCTAVES,
                "min": *OCTAVES_RANGE.start(),
                "max": *OCTAVES_RANGE.end(),
                "description": "Noise octaves"
            },
            "falloff": {
                "type": "number",
                "default": DEFAULT_FALLOFF,
                "min": *FALLOFF_RANGE.start(),
                "max": *FALLOFF_RANGE.end(),
                "description": "Per-octave amplitude falloff"
            },
            "thin_line_width": {
                "type": "number",
                "default": DEFAULT_THIN_LINE_WIDTH,
                "min": *LINE_WIDTH_RANGE.start(),
                "max": *LINE_WIDTH_RANGE.end(),
                "description": "Stroke width of regular levels"
            },
            "thick_line_width": {
                "type": "number",
                "default": DEFAULT_THICK_LINE_WIDTH,
                "min": *LINE_WIDTH_RANGE.start(),
                "max": *LINE_WIDTH_RANGE.end(),
                "description": "Stroke width of every thick_line_multiple-th level"
            },
            "line_color": {
                "type": "string",
                "default": Rgba::FALLBACK_LINE.to_css(),
                "description": "CSS stroke color; defaults to the host theme foreground"
            }
        })
    }
}

impl InteractiveEngine for PerlinTopography {
    fn resize(&mut self, size: SurfaceSize) -> Result<(), EngineError> {
        PerlinTopography::resize(self, size)
    }

    fn inject_at(&mut self, x: f64, y: f64) -> bool {
        PerlinTopography::inject_at(self, x, y)
    }

    fn set_line_color(&mut self, color: LineColor) {
        PerlinTopography::set_line_color(self, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topography_core::surface::RecordingSurface;

    fn size(w: f64, h: f64) -> SurfaceSize {
        SurfaceSize::new(w, h)
    }

    fn engine(w: f64, h: f64, seed: u64) -> PerlinTopography {
        PerlinTopography::new(size(w, h), seed, TopographyConfig::default()).unwrap()
    }

    // ---- Construction tests ----

    #[test]
    fn new_allocates_lattice_with_boundary_points() {
        let e = engine(800.0, 600.0, 1);
        assert_eq!(e.dims(), GridDims { cols: 101, rows: 76 });
        assert_eq!(e.field().width(), 102);
        assert_eq!(e.field().height(), 77);
        assert_eq!(e.perturbation().cols(), 102);
        assert_eq!(e.perturbation().rows(), 77);
    }

    #[test]
    fn new_rejects_empty_surface_and_bad_config() {
        assert!(matches!(
            PerlinTopography::new(size(0.0, 10.0), 1, TopographyConfig::default()),
            Err(EngineError::InvalidDimensions)
        ));
        let cfg = TopographyConfig {
            decay: 0.0,
            ..TopographyConfig::default()
        };
        assert!(matches!(
            PerlinTopography::new(size(100.0, 100.0), 1, cfg),
            Err(EngineError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn from_json_rejects_out_of_range_params_instead_of_allocating() {
        for params in [
            json!({"resolution": 1e-300}),
            json!({"inject_radius": 1_000_000_000u64}),
            json!({"threshold_increment": 1e-9}),
        ] {
            assert!(
                matches!(
                    PerlinTopography::from_json(size(800.0, 600.0), 1, &params),
                    Err(EngineError::InvalidParameter { .. })
                ),
                "accepted {params}"
            );
        }
    }

    #[test]
    fn oversized_surface_is_rejected_and_resize_keeps_previous_grid() {
        assert!(matches!(
            PerlinTopography::new(size(1e12, 1e12), 1, TopographyConfig::default()),
            Err(EngineError::InvalidDimensions)
        ));
        let mut e = engine(64.0, 64.0, 1);
        let before = e.dims();
        let generation = e.generation();
        assert!(e.resize(size(1e12, 64.0)).is_err());
        assert_eq!(e.dims(), before);
        assert_eq!(e.generation(), generation);
    }

    #[test]
    fn schema_bounds_match_validation() {
        let e = engine(64.0, 64.0, 1);
        let schema = e.param_schema();
        for (name, spec) in schema.as_object().unwrap() {
            let (Some(min), Some(max)) = (spec["min"].as_f64(), spec["max"].as_f64()) else {
                continue;
            };
            let integer = spec["type"] == "integer";
            for (value, ok) in [(min, true), (max, true), (max * 2.0 + 1.0, false)] {
                let value = if integer {
                    json!(value as u64)
                } else {
                    json!(value)
                };
                let mut params = serde_json::Map::new();
                params.insert(name.clone(), value.clone());
                let cfg = TopographyConfig::from_json(&Value::Object(params));
                assert_eq!(cfg.validate().is_ok(), ok, "{name} = {value}");
            }
        }
    }

    #[test]
    fn from_json_applies_overrides() {
        let e = PerlinTopography::from_json(
            size(160.0, 160.0),
            3,
            &json!({"resolution": 16, "octaves": 2, "line_color": "#ff0000"}),
        )
        .unwrap();
        assert_eq!(e.dims().cols, 11);
        assert_eq!(e.noise().octaves(), 2);
        assert_eq!(*e.line_color(), Rgba::from_rgba8(255, 0, 0, 255));
    }

    #[test]
    fn named_config_color_reaches_the_surface() {
        let cfg = TopographyConfig {
            line_color: Some("red".into()),
            ..TopographyConfig::default()
        };
        let mut e = PerlinTopography::new(size(400.0, 300.0), 9, cfg).unwrap();
        assert_eq!(*e.line_color(), LineColor::Css("red".into()));
        assert_eq!(e.params()["line_color"], "red");

        e.step().unwrap();
        let mut surface = RecordingSurface::default();
        e.render(&mut surface).unwrap();
        assert!(!surface.paths.is_empty());
        for path in &surface.paths {
            assert_eq!(path.style.color, LineColor::Css("red".into()));
        }
    }

    // ---- Frame pipeline tests ----

    #[test]
    fn render_before_first_step_draws_nothing() {
        let e = engine(200.0, 200.0, 5);
        let mut surface = RecordingSurface::default();
        e.render(&mut surface).unwrap();
        assert!(surface.paths.is_empty());
    }

    #[test]
    fn step_advances_time_and_samples_grid() {
        let mut e = engine(200.0, 120.0, 5);
        e.step().unwrap();
        e.step().unwrap();
        assert!((e.time() - 2.0 * DEFAULT_TIME_STEP).abs() < 1e-15);
        assert!(e.grid().is_sampled());
        let max = e.grid().observed_max().unwrap();
        assert!(max < 100.0 && e.grid().observed_min().unwrap() >= 0.0);
    }

    #[test]
    fn render_strokes_one_path_per_level_with_level_widths() {
        let mut e = engine(400.0, 300.0, 9);
        e.step().unwrap();
        let levels: Vec<_> = e.thresholds().collect();
        assert!(!levels.is_empty());

        let mut surface = RecordingSurface::default();
        e.render(&mut surface).unwrap();
        assert_eq!(surface.paths.len(), levels.len());
        for (path, level) in surface.paths.iter().zip(&levels) {
            assert!(path.stroked);
            let want = if level.thick { 2.0 } else { 1.0 };
            assert_eq!(path.style.width, want, "level {}", level.value);
            assert_eq!(path.style.color, Rgba::FALLBACK_LINE);
        }
        assert!(surface.segment_count() > 0);
    }

    #[test]
    fn segments_stay_within_lattice_extent() {
        let mut e = engine(300.0, 200.0, 13);
        e.step().unwrap();
        let mut surface = RecordingSurface::default();
        e.render(&mut surface).unwrap();
        let max_x = e.dims().cols as f64 * DEFAULT_RESOLUTION;
        let max_y = e.dims().rows as f64 * DEFAULT_RESOLUTION;
        for seg in surface.paths.iter().flat_map(|p| &p.segments) {
            for p in [seg.from, seg.to] {
                assert!(p.x >= 0.0 && p.x <= max_x && p.y >= 0.0 && p.y <= max_y);
            }
        }
    }

    #[test]
    fn perturbation_decays_geometrically_without_injection() {
        let mut e = engine(160.0, 160.0, 2);
        assert!(e.inject_at(80.0, 80.0));
        let initial = e.perturbation().bias(10, 10);
        assert!((initial - DEFAULT_INJECT_STRENGTH).abs() < 1e-15);
        for _ in 0..50 {
            e.step().unwrap();
        }
        let expected = initial * DEFAULT_DECAY.powi(50);
        let got = e.perturbation().bias(10, 10);
        assert!((got - expected).abs() <= 1e-12 * expected);
    }

    #[test]
    fn injection_changes_sampled_values_near_pointer() {
        let mut plain = engine(160.0, 160.0, 21);
        let mut poked = engine(160.0, 160.0, 21);
        for _ in 0..200 {
            assert!(poked.inject_at(80.0, 80.0));
            plain.step().unwrap();
            poked.step().unwrap();
        }
        assert_ne!(plain.field().get(10, 10), poked.field().get(10, 10));
        // Far corner is outside the injection radius.
        assert_eq!(plain.field().get(0, 20), poked.field().get(0, 20));
    }

    #[test]
    fn inject_outside_lattice_is_ignored() {
        let mut e = engine(80.0, 80.0, 1);
        assert!(!e.inject_at(-1.0, 10.0));
        assert!(!e.inject_at(10.0, -0.5));
        assert!(!e.inject_at(10_000.0, 10.0));
        assert!(!e.inject_at(f64::NAN, 10.0));
        assert_eq!(e.perturbation().max_bias(), 0.0);
    }

    #[test]
    fn inject_on_boundary_point_is_accepted() {
        let mut e = engine(80.0, 80.0, 1);
        // 80 / 8 = 10 -> cols 11, lattice 12: col 10 and 11 both exist.
        assert!(e.inject_at(80.0, 80.0));
        assert!(e.perturbation().bias(10, 10) > 0.0);
    }

    // ---- Resize tests ----

    #[test]
    fn resize_reallocates_and_resets_perturbation() {
        let mut e = engine(1000.0, 500.0, 4);
        e.inject_at(100.0, 100.0);
        e.step().unwrap();
        let before = e.dims();

        e.resize(size(500.0, 500.0)).unwrap();
        let after = e.dims();
        assert!(after.cols.abs_diff((before.cols - 1) / 2 + 1) <= 1);
        assert_eq!(e.perturbation().max_bias(), 0.0);
        assert_eq!(e.generation(), 1);
        assert_eq!(e.field().width(), after.lattice_cols());
    }

    #[test]
    fn resize_hides_grid_until_resampled() {
        let mut e = engine(200.0, 200.0, 4);
        e.step().unwrap();
        e.resize(size(120.0, 200.0)).unwrap();

        let mut surface = RecordingSurface::default();
        e.render(&mut surface).unwrap();
        assert!(surface.paths.is_empty());

        e.step().unwrap();
        e.render(&mut surface).unwrap();
        assert!(!surface.paths.is_empty());
    }

    #[test]
    fn resize_to_invalid_size_keeps_previous_grid() {
        let mut e = engine(200.0, 200.0, 4);
        assert!(e.resize(size(0.0, 0.0)).is_err());
        assert_eq!(e.generation(), 0);
        assert_eq!(e.size(), size(200.0, 200.0));
    }

    // ---- Determinism tests ----

    #[test]
    fn same_seed_and_inputs_give_identical_frames() {
        let mut a = engine(240.0, 160.0, 77);
        let mut b = engine(240.0, 160.0, 77);
        for i in 0..20 {
            if i % 3 == 0 {
                a.inject_at(50.0, 60.0);
                b.inject_at(50.0, 60.0);
            }
            a.step().unwrap();
            b.step().unwrap();
        }
        assert_eq!(a.field().data(), b.field().data());

        let (mut sa, mut sb) = (RecordingSurface::default(), RecordingSurface::default());
        a.render(&mut sa).unwrap();
        b.render(&mut sb).unwrap();
        assert_eq!(sa.paths, sb.paths);
    }

    #[test]
    fn different_seeds_give_different_fields() {
        let mut a = engine(240.0, 160.0, 1);
        let mut b = engine(240.0, 160.0, 2);
        a.step().unwrap();
        b.step().unwrap();
        assert_ne!(a.field().data(), b.field().data());
    }

    #[test]
    fn shared_sampler_shares_phase() {
        let noise = NoiseSampler::new(31);
        let mut a =
            PerlinTopography::with_noise(size(96.0, 96.0), noise.clone(), TopographyConfig::default())
                .unwrap();
        let mut b =
            PerlinTopography::with_noise(size(96.0, 96.0), noise, TopographyConfig::default())
                .unwrap();
        a.step().unwrap();
        b.step().unwrap();
        assert_eq!(a.field().data(), b.field().data());
    }

    #[test]
    fn interactive_trait_delegates() {
        let mut e = engine(80.0, 80.0, 1);
        let dyn_engine: &mut dyn InteractiveEngine = &mut e;
        assert!(dyn_engine.inject_at(8.0, 8.0));
        dyn_engine.set_line_color(Rgba::BLACK.into());
        dyn_engine.resize(size(40.0, 40.0)).unwrap();
        assert_eq!(*e.line_color(), Rgba::BLACK);
        assert_eq!(e.generation(), 1);
        assert_eq!(e.perturbation().max_bias(), 0.0);
    }

    // ---- Params tests ----

    #[test]
    fn params_reflect_config() {
        let e = engine(64.0, 64.0, 1);
        let p = e.params();
        assert!((p["decay"].as_f64().unwrap() - DEFAULT_DECAY).abs() < f64::EPSILON);
        assert_eq!(p["octaves"], DEFAULT_OCTAVES);
        assert_eq!(p["line_color"], Rgba::FALLBACK_LINE.to_css());
    }

    #[test]
    fn param_schema_describes_every_param() {
        let e = engine(64.0, 64.0, 1);
        let schema = e.param_schema();
        let params = e.params();
        for key in params.as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing parameter: {key}");
            assert!(schema[key].get("type").is_some(), "{key} missing 'type'");
            assert!(schema[key].get("default").is_some(), "{key} missing 'default'");
            assert!(
                schema[key].get("description").is_some(),
                "{key} missing 'description'"
            );
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn any_surface_renders_finite_segments(
                w in 16.0_f64..400.0,
                h in 16.0_f64..400.0,
                seed: u64,
            ) {
                let mut e = engine(w, h, seed);
                e.step().unwrap();
                let mut surface = RecordingSurface::default();
                e.render(&mut surface).unwrap();
                for seg in surface.paths.iter().flat_map(|p| &p.segments) {
                    prop_assert!(seg.from.is_finite() && seg.to.is_finite());
                }
            }

            #[test]
            fn levels_are_ascending_and_span_range(seed: u64) {
                let mut e = engine(200.0, 200.0, seed);
                e.step().unwrap();
                let values: Vec<f64> = e.thresholds().map(|l| l.value).collect();
                prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
                if let (Some(first), Some(last)) = (values.first(), values.last()) {
                    prop_assert!(*first <= e.grid().observed_min().unwrap() + 1e-9);
                    prop_assert!(*last < e.grid().observed_max().unwrap() + DEFAULT_THRESHOLD_INCREMENT);
                }
            }
        }
    }
}
