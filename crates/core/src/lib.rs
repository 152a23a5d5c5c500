#![deny(unsafe_code)]
//! Core types and traits for the topography contour engine.
//!
//! Provides the `Engine` and `InteractiveEngine` traits, the bounded `Field`
//! lattice, the `Surface` drawing abstraction (`LineSegment`, `StrokeStyle`, `RecordingSurface`),
//! `Rgba`/`LineColor` stroke colors, the `Xorshift64` PRNG, `TopographyConfig`, and
//! JSON parameter helpers.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod params;
pub mod prng;
pub mod surface;

pub use color::{resolve_line_color, LineColor, Rgba};
pub use config::TopographyConfig;
pub use engine::{Engine, InteractiveEngine};
pub use error::EngineError;
pub use field::Field;
pub use prng::Xorshift64;
pub use surface::{LineSegment, RecordingSurface, StrokeStyle, Surface, SurfaceSize};
