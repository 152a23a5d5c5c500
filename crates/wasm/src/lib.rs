#![deny(unsafe_code)]
//! Browser front end for the topography engine.
//!
//! Exposes `startTopography(canvas, { lineColor, getSize, observeElement })`,
//! which runs a [`PerlinTopography`](topography_perlin::PerlinTopography)
//! on a 2D canvas and returns a function that tears it down. `tracing`
//! output goes to the browser console.
//!
//! Everything here is browser glue. Frame logic lives in
//! `topography-runtime`; this crate only supplies the canvas surface, the
//! DOM host and the `requestAnimationFrame` scheduler.

#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod start;

#[cfg(target_arch = "wasm32")]
pub use start::{start, start_topography, BrowserOptions, StopHandle};

/// CSS custom property holding the page's theme foreground color.
pub const THEME_FOREGROUND_PROPERTY: &str = "--foreground";

/// Trims a computed CSS property value, treating an empty value as unset.
pub fn css_property_value(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Converts a backing-store dimension from CSS pixels to whole device pixels.
pub fn device_pixels(css: f64, device_pixel_ratio: f64) -> u32 {
    let px = (css * device_pixel_ratio).round();
    if px.is_finite() && px > 0.0 {
        px.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_property_value_trims_and_rejects_empty() {
        assert_eq!(css_property_value("  #ededed "), Some("#ededed".into()));
        assert_eq!(css_property_value("   "), None);
        assert_eq!(css_property_value(""), None);
    }

    #[test]
    fn device_pixels_rounds_scaled_size() {
        assert_eq!(device_pixels(100.0, 2.0), 200);
        assert_eq!(device_pixels(100.5, 1.0), 101);
        assert_eq!(device_pixels(33.0, 1.5), 50);
    }

    #[test]
    fn device_pixels_clamps_degenerate_input() {
        assert_eq!(device_pixels(-4.0, 2.0), 0);
        assert_eq!(device_pixels(f64::NAN, 1.0), 0);
        assert_eq!(device_pixels(f64::INFINITY, 1.0), 0);
    }
}
