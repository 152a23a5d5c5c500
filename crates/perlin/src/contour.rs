//! Marching-squares contour extraction.
//!
//! Each cell of the lattice is classified by which of its corners lie above
//! the threshold. Corner bits are packed NW, NE, SE, SW from most to least
//! significant, giving one of 16 cases. Cases 0 and 15 have no crossing and
//! are skipped before any interpolation, so the work per level scales with
//! the number of boundary cells.
//!
//! The two saddle cases (5 and 10) always produce two disjoint segments;
//! the ambiguity is not resolved by sampling the cell center.

use glam::DVec2;
use topography_core::color::LineColor;
use topography_core::field::Field;
use topography_core::surface::{LineSegment, StrokeStyle, Surface};

use crate::sample_grid::ThresholdLevel;

/// A cell edge, named by compass side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    North,
    East,
    South,
    West,
}

use Edge::{East as E, North as N, South as S, West as W};

/// Edge pairs crossed by the contour for each corner case.
pub const CASE_TABLE: [&[(Edge, Edge)]; 16] = [
    &[],               // 0
    &[(W, S)],         // 1
    &[(E, S)],         // 2
    &[(W, E)],         // 3
    &[(N, E)],         // 4
    &[(W, N), (S, E)], // 5
    &[(S, N)],         // 6
    &[(W, N)],         // 7
    &[(W, N)],         // 8
    &[(S, N)],         // 9
    &[(N, E), (S, W)], // 10
    &[(N, E)],         // 11
    &[(W, E)],         // 12
    &[(E, S)],         // 13
    &[(W, S)],         // 14
    &[],               // 15
];

/// Packs corner classifications into a case index (NW is the high bit).
/// A corner is "above" when strictly greater than the threshold.
pub fn cell_case(nw: f64, ne: f64, se: f64, sw: f64, threshold: f64) -> u8 {
    [nw, ne, se, sw]
        .iter()
        .fold(0u8, |acc, &v| (acc << 1) | u8::from(v > threshold))
}

/// Fraction along an edge from `v0` to `v1` where the threshold is crossed.
/// Flat edges resolve to the midpoint.
fn crossing(v0: f64, v1: f64, threshold: f64) -> f64 {
    if v0 == v1 {
        0.5
    } else {
        (threshold - v0) / (v1 - v0)
    }
}

/// Walks a lattice and emits the segments of one threshold level.
#[derive(Debug, Clone, Copy)]
pub struct ContourExtractor {
    resolution: f64,
}

impl ContourExtractor {
    /// `resolution` is the pixel distance between lattice points.
    pub fn new(resolution: f64) -> Self {
        Self { resolution }
    }

    /// Calls `emit` once per segment for `threshold` and returns the count.
    /// Segments are produced in row-major cell order and not retained.
    pub fn extract<F>(&self, grid: &Field, threshold: f64, mut emit: F) -> usize
    where
        F: FnMut(LineSegment),
    {
        let (w, h) = (grid.width(), grid.height());
        if w < 2 || h < 2 {
            return 0;
        }
        let data = grid.data();
        let res = self.resolution;
        let mut emitted = 0;

        for y in 0..h - 1 {
            for x in 0..w - 1 {
                let nw = data[y * w + x];
                let ne = data[y * w + x + 1];
                let se = data[(y + 1) * w + x + 1];
                let sw = data[(y + 1) * w + x];

                let case = cell_case(nw, ne, se, sw, threshold);
                if case == 0 || case == 15 {
                    continue;
                }

                let origin = DVec2::new(x as f64 * res, y as f64 * res);
                let point = |edge: Edge| match edge {
                    Edge::North => origin + DVec2::new(res * crossing(nw, ne, threshold), 0.0),
                    Edge::East => origin + DVec2::new(res, res * crossing(ne, se, threshold)),
                    Edge::South => origin + DVec2::new(res * crossing(sw, se, threshold), res),
                    Edge::West => origin + DVec2::new(0.0, res * crossing(nw, sw, threshold)),
                };
                for &(a, b) in CASE_TABLE[case as usize] {
                    emit(LineSegment::new(point(a), point(b)));
                    emitted += 1;
                }
            }
        }
        emitted
    }

    /// Strokes one level onto `surface` as a single path.
    pub fn draw_level(
        &self,
        grid: &Field,
        level: &ThresholdLevel,
        style: &StrokeStyle,
        surface: &mut dyn Surface,
    ) -> usize {
        surface.begin_path(style);
        let count = self.extract(grid, level.value, |segment| surface.line(&segment));
        surface.stroke();
        count
    }
}

/// Stroke style for a level: thick levels use `thick_width`.
pub fn level_style(
    level: &ThresholdLevel,
    color: LineColor,
    thin_width: f64,
    thick_width: f64,
) -> StrokeStyle {
    StrokeStyle {
        color,
        width: if level.thick { thick_width } else { thin_width },
    }
}
