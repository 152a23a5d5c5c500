#![deny(unsafe_code)]
//! Engine registry: maps engine names to implementations and provides a CPU
//! rasterizer for snapshots.
//!
//! This crate sits between `topography-core` (which defines the `Engine`
//! traits) and the individual engine crates (`topography-perlin`). The CLI
//! depends on it to avoid duplicating dispatch logic.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use serde_json::Value;
use topography_core::color::LineColor;
use topography_core::error::EngineError;
use topography_core::field::Field;
use topography_core::surface::{Surface, SurfaceSize};
use topography_core::{Engine, InteractiveEngine};
use topography_perlin::PerlinTopography;

/// All available engine names.
const ENGINE_NAMES: &[&str] = &[topography_perlin::ENGINE_NAME];

/// Enumeration of all available contour engines.
///
/// Wraps each engine implementation and delegates the engine traits.
/// Use [`EngineKind::from_name`] for string-based construction.
pub enum EngineKind {
    /// Value-noise topography.
    PerlinTopography(PerlinTopography),
}

impl EngineKind {
    /// Constructs an engine by name for a surface of `size` CSS pixels.
    ///
    /// Returns `EngineError::UnknownEngine` if the name is not recognized.
    pub fn from_name(
        name: &str,
        size: SurfaceSize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, EngineError> {
        match name {
            topography_perlin::ENGINE_NAME => Ok(EngineKind::PerlinTopography(
                PerlinTopography::from_json(size, seed, params)?,
            )),
            _ => Err(EngineError::UnknownEngine(name.to_string())),
        }
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }

    /// Parameter schema of the named engine, with default parameters.
    pub fn schema_for(name: &str) -> Result<Value, EngineError> {
        let engine = Self::from_name(name, SurfaceSize::new(1.0, 1.0), 0, &Value::Null)?;
        Ok(engine.param_schema())
    }

    /// The wrapped engine. Trait impls below dispatch through this, so a new
    /// variant needs one arm here and in [`inner_mut`](Self::inner_mut).
    pub fn inner(&self) -> &dyn InteractiveEngine {
        match self {
            EngineKind::PerlinTopography(e) => e,
        }
    }

    pub fn inner_mut(&mut self) -> &mut dyn InteractiveEngine {
        match self {
            EngineKind::PerlinTopography(e) => e,
        }
    }
}

impl Engine for EngineKind {
    fn step(&mut self) -> Result<(), EngineError> {
        self.inner_mut().step()
    }

    fn field(&self) -> &Field {
        self.inner().field()
    }

    fn render(&self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        self.inner().render(surface)
    }

    fn params(&self) -> Value {
        self.inner().params()
    }

    fn param_schema(&self) -> Value {
        self.inner().param_schema()
    }
}

impl InteractiveEngine for EngineKind {
    fn resize(&mut self, size: SurfaceSize) -> Result<(), EngineError> {
        self.inner_mut().resize(size)
    }

    fn inject_at(&mut self, x: f64, y: f64) -> bool {
        self.inner_mut().inject_at(x, y)
    }

    fn set_line_color(&mut self, color: LineColor) {
        self.inner_mut().set_line_color(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use topography_core::color::Rgba;
    use topography_core::surface::RecordingSurface;

    fn size() -> SurfaceSize {
        SurfaceSize::new(128.0, 96.0)
    }

    #[test]
    fn from_name_perlin_topography_succeeds() {
        let engine = EngineKind::from_name("perlin-topography", size(), 42, &json!({}));
        assert!(engine.is_ok());
    }

    #[test]
    fn from_name_unknown_returns_error() {
        let result = EngineKind::from_name("nonexistent", size(), 42, &json!({}));
        assert!(matches!(result, Err(EngineError::UnknownEngine(_))));
    }

    #[test]
    fn from_name_propagates_invalid_params() {
        let result = EngineKind::from_name("perlin-topography", size(), 42, &json!({"decay": 2.0}));
        assert!(matches!(result, Err(EngineError::InvalidParameter { .. })));
    }

    #[test]
    fn list_engines_includes_perlin_topography() {
        assert!(EngineKind::list_engines().contains(&"perlin-topography"));
    }

    #[test]
    fn schema_for_known_and_unknown_names() {
        let schema = EngineKind::schema_for("perlin-topography").unwrap();
        assert!(schema.get("threshold_increment").is_some());
        assert!(EngineKind::schema_for("nope").is_err());
    }

    #[test]
    fn trait_delegation_step_render_and_field() {
        let mut engine = EngineKind::from_name("perlin-topography", size(), 42, &json!({})).unwrap();
        // 128 / 8 + 1 cells, plus the boundary point.
        assert_eq!(engine.field().width(), 18);
        engine.step().unwrap();
        let mut surface = RecordingSurface::default();
        engine.render(&mut surface).unwrap();
        assert!(!surface.paths.is_empty());
    }

    #[test]
    fn trait_delegation_interactive() {
        let mut engine = EngineKind::from_name("perlin-topography", size(), 42, &json!({})).unwrap();
        assert!(engine.inject_at(10.0, 10.0));
        assert!(!engine.inject_at(-10.0, 10.0));
        engine.set_line_color(Rgba::BLACK.into());
        assert_eq!(engine.params()["line_color"], Rgba::BLACK.to_css());
        engine.resize(SurfaceSize::new(64.0, 64.0)).unwrap();
        assert_eq!(engine.field().width(), 10);
    }

    #[test]
    fn inner_is_the_wrapped_engine() {
        let mut engine =
            EngineKind::from_name("perlin-topography", size(), 42, &json!({"octaves": 2})).unwrap();
        assert_eq!(engine.inner().params(), engine.params());
        engine.inner_mut().set_line_color(Rgba::BLACK.into());
        let EngineKind::PerlinTopography(perlin) = &engine;
        assert_eq!(*perlin.line_color(), Rgba::BLACK);
        assert_eq!(perlin.noise().octaves(), 2);
    }

    #[test]
    fn determinism_same_seed() {
        let mut a = EngineKind::from_name("perlin-topography", size(), 99, &json!({})).unwrap();
        let mut b = EngineKind::from_name("perlin-topography", size(), 99, &json!({})).unwrap();
        for _ in 0..10 {
            a.step().unwrap();
            b.step().unwrap();
        }
        assert!(a
            .field()
            .data()
            .iter()
            .zip(b.field().data().iter())
            .all(|(va, vb)| va.to_bits() == vb.to_bits()));
    }

    #[test]
    fn object_safety() {
        let engine = EngineKind::from_name("perlin-topography", size(), 42, &json!({})).unwrap();
        let boxed: Box<dyn InteractiveEngine> = Box::new(engine);
        assert_eq!(boxed.field().height(), 14);
    }
}
