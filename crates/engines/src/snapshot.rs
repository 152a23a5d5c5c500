//! PNG output of a [`RasterSurface`].
//!
//! This module is feature-gated behind `png` (default on) so that builds
//! without file output do not pull in the `image` crate.

use std::path::Path;

use topography_core::error::EngineError;

use crate::pixel::RasterSurface;

/// Writes the surface's physical-pixel buffer as a PNG image.
///
/// Returns `EngineError::InvalidDimensions` if the surface is empty or its
/// dimensions overflow `u32`, or `EngineError::Io` on write failure.
pub fn write_png(surface: &RasterSurface, path: &Path) -> Result<(), EngineError> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    let w = u32::try_from(surface.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, surface.pixels().to_vec())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}
