//! CPU line rasterizer implementing [`Surface`].
//!
//! Segments are stroked with analytic anti-aliasing: a pixel's coverage is
//! how far its center lies inside the stroke's half-width, clamped to [0, 1].
//! Coverage is accumulated per path (max, not sum) and composited once on
//! [`stroke`](Surface::stroke), so joints between segments of the same level
//! are not blended twice. This module has no feature gate so headless hosts
//! can draw without pulling in the `image` crate.

use glam::DVec2;
use topography_core::color::Rgba;
use topography_core::surface::{LineSegment, StrokeStyle, Surface, SurfaceSize};
use tracing::debug;

/// An RGBA8 drawing surface with a device pixel ratio.
///
/// Drawing coordinates are CSS pixels; the backing buffer is
/// `ceil(size * dpr)` physical pixels.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    size: SurfaceSize,
    dpr: f64,
    width: usize,
    height: usize,
    background: Rgba,
    pixels: Vec<u8>,
    coverage: Vec<f32>,
    dirty: Option<[usize; 4]>,
    /// Resolved color and CSS width of the open path.
    pen: Option<(Rgba, f64)>,
    path: Vec<LineSegment>,
}

impl RasterSurface {
    /// Allocates a surface filled with `background`.
    pub fn new(size: SurfaceSize, device_pixel_ratio: f64, background: Rgba) -> Self {
        let mut surface = Self {
            size,
            dpr: 1.0,
            width: 0,
            height: 0,
            background,
            pixels: Vec::new(),
            coverage: Vec::new(),
            dirty: None,
            pen: None,
            path: Vec::new(),
        };
        surface.set_backing_size(size, device_pixel_ratio);
        surface
    }

    /// Backing width in physical pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Backing height in physical pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    /// Row-major RGBA8 pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        let p = &self.pixels[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    fn stamp(&mut self, segment: &LineSegment, half_width: f64) {
        let a = segment.from * self.dpr;
        let b = segment.to * self.dpr;
        let reach = half_width + 1.0;
        let lo = a.min(b) - DVec2::splat(reach);
        let hi = a.max(b) + DVec2::splat(reach);
        if hi.x < 0.0 || hi.y < 0.0 || lo.x >= self.width as f64 || lo.y >= self.height as f64 {
            return;
        }
        let x0 = lo.x.max(0.0).floor() as usize;
        let y0 = lo.y.max(0.0).floor() as usize;
        let x1 = (hi.x.ceil() as usize).min(self.width);
        let y1 = (hi.y.ceil() as usize).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let cov = (half_width + 0.5 - distance_to_segment(center, a, b)).clamp(0.0, 1.0);
                if cov > 0.0 {
                    let slot = &mut self.coverage[y * self.width + x];
                    *slot = slot.max(cov as f32);
                }
            }
        }
        self.dirty = Some(match self.dirty {
            Some([dx0, dy0, dx1, dy1]) => [dx0.min(x0), dy0.min(y0), dx1.max(x1), dy1.max(y1)],
            None => [x0, y0, x1, y1],
        });
    }

    fn composite(&mut self, color: Rgba) {
        let Some([x0, y0, x1, y1]) = self.dirty.take() else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = y * self.width + x;
                let cov = std::mem::take(&mut self.coverage[idx]);
                if cov > 0.0 {
                    let i = idx * 4;
                    let dst = [
                        self.pixels[i],
                        self.pixels[i + 1],
                        self.pixels[i + 2],
                        self.pixels[i + 3],
                    ];
                    let out = blend_over(dst, color, f64::from(cov));
                    self.pixels[i..i + 4].copy_from_slice(&out);
                }
            }
        }
    }
}

impl Surface for RasterSurface {
    fn measured_size(&self) -> Option<SurfaceSize> {
        Some(self.size)
    }

    fn set_backing_size(&mut self, size: SurfaceSize, device_pixel_ratio: f64) {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let physical = |v: f64| if v.is_finite() { (v * dpr).ceil().max(0.0) as usize } else { 0 };
        self.size = size;
        self.dpr = dpr;
        self.width = physical(size.width);
        self.height = physical(size.height);
        self.pixels = vec![0; self.width * self.height * 4];
        self.coverage = vec![0.0; self.width * self.height];
        self.dirty = None;
        self.path.clear();
        self.clear();
    }

    fn clear(&mut self) {
        let bg = self.background.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bg);
        }
    }

    fn begin_path(&mut self, style: &StrokeStyle) {
        let color = style.color.rgba().unwrap_or_else(|| {
            debug!(color = %style.color.to_css(), "raster cannot parse line color; using fallback");
            Rgba::FALLBACK_LINE
        });
        self.pen = Some((color, style.width));
        self.path.clear();
    }

    fn line(&mut self, segment: &LineSegment) {
        self.path.push(*segment);
    }

    fn stroke(&mut self) {
        let Some((color, width)) = self.pen else {
            return;
        };
        let half_width = (width * self.dpr) / 2.0;
        let path = std::mem::take(&mut self.path);
        for segment in &path {
            self.stamp(segment, half_width);
        }
        self.path = path;
        self.composite(color);
    }
}

fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    let t = if len2 > 0.0 {
        ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance(a + ab * t)
}

/// Source-over compositing of `color` at `coverage` onto a straight-alpha
/// RGBA8 pixel.
fn blend_over(dst: [u8; 4], color: Rgba, coverage: f64) -> [u8; 4] {
    let sa = color.a * coverage;
    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let channel = |s: f64, d: u8| {
        let d = f64::from(d) / 255.0;
        let c = (s * sa + d * da * (1.0 - sa)) / out_a;
        (c.clamp(0.0, 1.0) * 255.0).round() as u8
    };
    [
        channel(color.r, dst[0]),
        channel(color.g, dst[1]),
        channel(color.b, dst[2]),
        (out_a.clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}
