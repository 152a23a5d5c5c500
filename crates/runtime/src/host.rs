//! The environment an animation runs in.
//!
//! A [`Host`] answers layout questions (viewport size, device pixel ratio,
//! theme foreground) and owns the event wiring. Listeners it attaches feed
//! [`HostEvent`](crate::HostEvent)s back to the controller; how that happens
//! is up to the host.

use topography_core::surface::SurfaceSize;

pub trait Host {
    /// Element type whose size changes can be observed.
    type Element;

    /// Physical pixels per CSS pixel.
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Size of the whole viewport, the last resort when sizing a surface.
    fn viewport_size(&self) -> Option<SurfaceSize>;

    /// Raw value of the theme foreground color, if the host has a theme.
    fn theme_foreground(&self) -> Option<String> {
        None
    }

    /// Starts forwarding pointer and window-resize events.
    fn attach_listeners(&mut self);

    /// Stops forwarding events. Must be safe to call when nothing is attached.
    fn detach_listeners(&mut self);

    /// Starts observing `element` for size changes. Returns `false` when the
    /// host has no way to observe elements.
    fn observe_resize(&mut self, element: &Self::Element) -> bool;

    /// Stops observing element size changes.
    fn unobserve_resize(&mut self) {}
}

/// A host with no windowing system.
///
/// Reports a fixed viewport and never produces events. Used for offline
/// rendering.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    viewport: SurfaceSize,
    device_pixel_ratio: f64,
    theme_foreground: Option<String>,
}

impl HeadlessHost {
    pub fn new(viewport: SurfaceSize, device_pixel_ratio: f64) -> Self {
        Self {
            viewport,
            device_pixel_ratio,
            theme_foreground: None,
        }
    }

    /// Sets the value reported as the theme foreground color.
    pub fn with_theme_foreground(mut self, value: impl Into<String>) -> Self {
        self.theme_foreground = Some(value.into());
        self
    }
}

impl Host for HeadlessHost {
    type Element = ();

    fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    fn viewport_size(&self) -> Option<SurfaceSize> {
        Some(self.viewport)
    }

    fn theme_foreground(&self) -> Option<String> {
        self.theme_foreground.clone()
    }

    fn attach_listeners(&mut self) {}

    fn detach_listeners(&mut self) {}

    fn observe_resize(&mut self, _element: &()) -> bool {
        false
    }
}
