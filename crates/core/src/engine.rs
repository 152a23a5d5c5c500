//! The core `Engine` trait that every contour engine implements.
//!
//! The trait is object-safe so hosts can hold a `Box<dyn Engine>` and switch
//! engines at runtime.

use crate::color::LineColor;
use crate::error::EngineError;
use crate::field::Field;
use crate::surface::{Surface, SurfaceSize};
use serde_json::Value;

/// A frame-stepped scalar-field generator that can draw itself as contours.
///
/// `step` advances the simulation by one frame and recomputes the field;
/// `render` strokes the current field onto a [`Surface`]. Hosts call them in
/// that order once per scheduled frame.
pub trait Engine {
    /// Advance by one frame.
    fn step(&mut self) -> Result<(), EngineError>;

    /// The sampled scalar field of the current frame.
    fn field(&self) -> &Field;

    /// Draw the current frame. Does not clear the surface.
    fn render(&self, surface: &mut dyn Surface) -> Result<(), EngineError>;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}

/// An engine that a host drives interactively: it follows surface resizes,
/// takes pointer disturbances and can be recolored.
pub trait InteractiveEngine: Engine {
    /// Reallocates for a new surface size in CSS pixels.
    fn resize(&mut self, size: SurfaceSize) -> Result<(), EngineError>;

    /// Applies a pointer disturbance at surface coordinates. Returns `false`
    /// when the point is outside the engine's lattice.
    fn inject_at(&mut self, x: f64, y: f64) -> bool;

    /// Sets the stroke color for subsequent frames.
    fn set_line_color(&mut self, color: LineColor);
}
