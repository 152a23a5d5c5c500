//! Tunable constants for a contour-topography run.
//!
//! A [`TopographyConfig`] together with a PRNG seed and a surface size fully
//! determines the frames an engine draws, so it is serializable and can be
//! stored next to a rendered snapshot.

use crate::error::EngineError;
use crate::params::{param_f64, param_str, param_usize};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;

pub const DEFAULT_RESOLUTION: f64 = 8.0;
pub const DEFAULT_THRESHOLD_INCREMENT: f64 = 5.0;
pub const DEFAULT_THICK_LINE_MULTIPLE: u32 = 3;
pub const DEFAULT_TIME_STEP: f64 = 0.0008;
pub const DEFAULT_SPATIAL_FREQUENCY: f64 = 0.02;
pub const DEFAULT_DECAY: f64 = 0.99;
pub const DEFAULT_INJECT_RADIUS: usize = 5;
pub const DEFAULT_INJECT_STRENGTH: f64 = 0.0025;
pub const DEFAULT_OCTAVES: u32 = 4;
pub const DEFAULT_FALLOFF: f64 = 0.5;
pub const DEFAULT_THIN_LINE_WIDTH: f64 = 1.0;
pub const DEFAULT_THICK_LINE_WIDTH: f64 = 2.0;

pub const RESOLUTION_RANGE: RangeInclusive<f64> = 2.0..=64.0;
pub const THRESHOLD_INCREMENT_RANGE: RangeInclusive<f64> = 0.5..=50.0;
pub const THICK_LINE_MULTIPLE_RANGE: RangeInclusive<u32> = 1..=20;
pub const TIME_STEP_RANGE: RangeInclusive<f64> = 0.0..=0.05;
pub const SPATIAL_FREQUENCY_RANGE: RangeInclusive<f64> = 0.001..=0.5;
pub const DECAY_RANGE: RangeInclusive<f64> = 0.5..=1.0;
pub const INJECT_RADIUS_RANGE: RangeInclusive<usize> = 0..=50;
pub const INJECT_STRENGTH_RANGE: RangeInclusive<f64> = 0.0..=0.1;
pub const OCTAVES_RANGE: RangeInclusive<u32> = 1..=8;
pub const FALLOFF_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const LINE_WIDTH_RANGE: RangeInclusive<f64> = 0.25..=8.0;

/// Engine configuration. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopographyConfig {
    /// Cell pitch in CSS pixels.
    pub resolution: f64,
    /// Spacing between contour levels, in noise units (0..100).
    pub threshold_increment: f64,
    /// Every `threshold_increment * thick_line_multiple` level is drawn thick.
    pub thick_line_multiple: u32,
    /// Advance of the noise z coordinate per frame.
    pub time_step: f64,
    /// Lattice-to-noise coordinate scale.
    pub spatial_frequency: f64,
    /// Multiplicative perturbation decay applied every frame.
    pub decay: f64,
    /// Pointer injection radius in cells.
    pub inject_radius: usize,
    /// Pointer injection strength at the center cell.
    pub inject_strength: f64,
    /// Noise octaves.
    pub octaves: u32,
    /// Per-octave amplitude falloff.
    pub falloff: f64,
    pub thin_line_width: f64,
    pub thick_line_width: f64,
    /// Explicit CSS stroke color; `None` defers to the host theme.
    pub line_color: Option<String>,
}

impl Default for TopographyConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            threshold_increment: DEFAULT_THRESHOLD_INCREMENT,
            thick_line_multiple: DEFAULT_THICK_LINE_MULTIPLE,
            time_step: DEFAULT_TIME_STEP,
            spatial_frequency: DEFAULT_SPATIAL_FREQUENCY,
            decay: DEFAULT_DECAY,
            inject_radius: DEFAULT_INJECT_RADIUS,
            inject_strength: DEFAULT_INJECT_STRENGTH,
            octaves: DEFAULT_OCTAVES,
            falloff: DEFAULT_FALLOFF,
            thin_line_width: DEFAULT_THIN_LINE_WIDTH,
            thick_line_width: DEFAULT_THICK_LINE_WIDTH,
            line_color: None,
        }
    }
}

impl TopographyConfig {
    /// Extracts a config from a loose JSON object, falling back to defaults
    /// for missing or mistyped keys. Call [`validate`](Self::validate) after.
    pub fn from_json(params: &Value) -> Self {
        let u32_param = |name: &str, default: u32| {
            u32::try_from(param_usize(params, name, default as usize)).unwrap_or(default)
        };
        Self {
            resolution: param_f64(params, "resolution", DEFAULT_RESOLUTION),
            threshold_increment: param_f64(
                params,
                "threshold_increment",
                DEFAULT_THRESHOLD_INCREMENT,
            ),
            thick_line_multiple: u32_param("thick_line_multiple", DEFAULT_THICK_LINE_MULTIPLE),
            time_step: param_f64(params, "time_step", DEFAULT_TIME_STEP),
            spatial_frequency: param_f64(params, "spatial_frequency", DEFAULT_SPATIAL_FREQUENCY),
            decay: param_f64(params, "decay", DEFAULT_DECAY),
            inject_radius: param_usize(params, "inject_radius", DEFAULT_INJECT_RADIUS),
            inject_strength: param_f64(params, "inject_strength", DEFAULT_INJECT_STRENGTH),
            octaves: u32_param("octaves", DEFAULT_OCTAVES),
            falloff: param_f64(params, "falloff", DEFAULT_FALLOFF),
            thin_line_width: param_f64(params, "thin_line_width", DEFAULT_THIN_LINE_WIDTH),
            thick_line_width: param_f64(params, "thick_line_width", DEFAULT_THICK_LINE_WIDTH),
            line_color: param_str(params, "line_color").map(String::from),
        }
    }

    /// Rejects values outside the published parameter ranges.
    ///
    /// The ranges bound the lattice size, the injection footprint and the
    /// number of contour levels per frame.
    pub fn validate(&self) -> Result<(), EngineError> {
        within("resolution", self.resolution, RESOLUTION_RANGE)?;
        within(
            "threshold_increment",
            self.threshold_increment,
            THRESHOLD_INCREMENT_RANGE,
        )?;
        within(
            "thick_line_multiple",
            self.thick_line_multiple,
            THICK_LINE_MULTIPLE_RANGE,
        )?;
        within("time_step", self.time_step, TIME_STEP_RANGE)?;
        within(
            "spatial_frequency",
            self.spatial_frequency,
            SPATIAL_FREQUENCY_RANGE,
        )?;
        within("decay", self.decay, DECAY_RANGE)?;
        within("inject_radius", self.inject_radius, INJECT_RADIUS_RANGE)?;
        within("inject_strength", self.inject_strength, INJECT_STRENGTH_RANGE)?;
        within("octaves", self.octaves, OCTAVES_RANGE)?;
        within("falloff", self.falloff, FALLOFF_RANGE)?;
        within("thin_line_width", self.thin_line_width, LINE_WIDTH_RANGE)?;
        within("thick_line_width", self.thick_line_width, LINE_WIDTH_RANGE)?;
        Ok(())
    }
}

/// NaN is never contained in a range, so it is rejected here too.
fn within<T>(name: &str, value: T, range: RangeInclusive<T>) -> Result<(), EngineError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(EngineError::InvalidParameter {
            name: name.to_string(),
            reason: format!(
                "{value} is outside [{}, {}]",
                range.start(),
                range.end()
            ),
        })
    }
}
