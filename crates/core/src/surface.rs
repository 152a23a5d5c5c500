//! Drawing-surface abstraction.
//!
//! Engines never touch a concrete canvas. They stroke paths made of
//! [`LineSegment`]s onto a [`Surface`]: a browser canvas in the WASM crate,
//! an RGBA raster for PNG snapshots, or a [`RecordingSurface`] in tests.
//! Coordinates are surface-local CSS pixels; implementations apply the device
//! pixel ratio themselves.

use glam::DVec2;

use crate::color::LineColor;

/// Logical drawing-area size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A straight contour piece between two crossing points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub from: DVec2,
    pub to: DVec2,
}

impl LineSegment {
    pub fn new(from: DVec2, to: DVec2) -> Self {
        Self { from, to }
    }

    pub fn length(&self) -> f64 {
        self.from.distance(self.to)
    }
}

/// Stroke parameters shared by every segment of one path.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: LineColor,
    pub width: f64,
}

/// A 2D target that contour paths are stroked onto.
///
/// A frame is `clear`, then any number of `begin_path` / `line`* / `stroke`
/// sequences.
pub trait Surface {
    /// The surface's own measured size, if it is attached to a layout.
    fn measured_size(&self) -> Option<SurfaceSize> {
        None
    }

    /// Resizes the backing store to `size * device_pixel_ratio` while keeping
    /// drawing coordinates in CSS pixels.
    fn set_backing_size(&mut self, _size: SurfaceSize, _device_pixel_ratio: f64) {}

    /// Erases the whole drawing area.
    fn clear(&mut self);

    /// Starts a new path stroked with `style`.
    fn begin_path(&mut self, style: &StrokeStyle);

    /// Appends a disjoint segment to the current path.
    fn line(&mut self, segment: &LineSegment);

    /// Strokes the current path.
    fn stroke(&mut self);
}

/// One stroked path captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPath {
    pub style: StrokeStyle,
    pub segments: Vec<LineSegment>,
    pub stroked: bool,
}

/// In-memory [`Surface`] that records every call.
///
/// Used by tests and headless hosts to inspect what a frame drew.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub measured: Option<SurfaceSize>,
    pub backing: Option<(SurfaceSize, f64)>,
    pub clears: usize,
    pub paths: Vec<RecordedPath>,
}

impl RecordingSurface {
    /// A recording surface that reports `size` as its measured layout size.
    pub fn with_measured_size(size: SurfaceSize) -> Self {
        Self {
            measured: Some(size),
            ..Self::default()
        }
    }

    /// Total number of segments across all recorded paths.
    pub fn segment_count(&self) -> usize {
        self.paths.iter().map(|p| p.segments.len()).sum()
    }
}

impl Surface for RecordingSurface {
    fn measured_size(&self) -> Option<SurfaceSize> {
        self.measured
    }

    fn set_backing_size(&mut self, size: SurfaceSize, device_pixel_ratio: f64) {
        self.backing = Some((size, device_pixel_ratio));
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.paths.clear();
    }

    fn begin_path(&mut self, style: &StrokeStyle) {
        self.paths.push(RecordedPath {
            style: style.clone(),
            segments: Vec::new(),
            stroked: false,
        });
    }

    fn line(&mut self, segment: &LineSegment) {
        if let Some(path) = self.paths.last_mut() {
            path.segments.push(*segment);
        }
    }

    fn stroke(&mut self) {
        if let Some(path) = self.paths.last_mut() {
            path.stroked = true;
        }
    }
}
