//! DOM implementations of the runtime's [`Host`] and [`FrameScheduler`].
//!
//! Both hold pre-built JS closures. The closures themselves decide what to
//! do with an event; this module only wires them to the page.

use topography_core::surface::SurfaceSize;
use topography_runtime::{FrameId, FrameScheduler, Host};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlCanvasElement, MouseEvent, ResizeObserver, Window};

use crate::{css_property_value, THEME_FOREGROUND_PROPERTY};

pub type PointerListener = Closure<dyn FnMut(MouseEvent)>;

/// Closures the host registers with the page.
pub struct Listeners {
    /// Canvas mouse listeners keyed by DOM event name.
    pub pointer: Vec<(&'static str, PointerListener)>,
    /// Shared by the window `resize` event and the element observer.
    pub resize: Closure<dyn FnMut()>,
}

pub struct BrowserHost {
    window: Window,
    canvas: HtmlCanvasElement,
    listeners: Listeners,
    observer: Option<ResizeObserver>,
    attached: bool,
}

impl BrowserHost {
    pub fn new(window: Window, canvas: HtmlCanvasElement, listeners: Listeners) -> Self {
        Self {
            window,
            canvas,
            listeners,
            observer: None,
            attached: false,
        }
    }
}

impl Host for BrowserHost {
    type Element = Element;

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn viewport_size(&self) -> Option<SurfaceSize> {
        let width = self.window.inner_width().ok()?.as_f64()?;
        let height = self.window.inner_height().ok()?.as_f64()?;
        Some(SurfaceSize::new(width, height))
    }

    fn theme_foreground(&self) -> Option<String> {
        let root = self.window.document()?.document_element()?;
        let style = self.window.get_computed_style(&root).ok().flatten()?;
        let raw = style
            .get_property_value(THEME_FOREGROUND_PROPERTY)
            .ok()?;
        css_property_value(&raw)
    }

    fn attach_listeners(&mut self) {
        if self.attached {
            return;
        }
        for (name, listener) in &self.listeners.pointer {
            if self
                .canvas
                .add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
                .is_err()
            {
                warn!(event = *name, "could not attach canvas listener");
            }
        }
        if self
            .window
            .add_event_listener_with_callback("resize", self.listeners.resize.as_ref().unchecked_ref())
            .is_err()
        {
            warn!("could not attach window resize listener");
        }
        self.attached = true;
    }

    fn detach_listeners(&mut self) {
        if !self.attached {
            return;
        }
        for (name, listener) in &self.listeners.pointer {
            let _ = self
                .canvas
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
        let _ = self.window.remove_event_listener_with_callback(
            "resize",
            self.listeners.resize.as_ref().unchecked_ref(),
        );
        self.attached = false;
    }

    fn observe_resize(&mut self, element: &Element) -> bool {
        self.unobserve_resize();
        match ResizeObserver::new(self.listeners.resize.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(element);
                self.observer = Some(observer);
                true
            }
            Err(e) => {
                debug!(error = ?e, "ResizeObserver unavailable");
                false
            }
        }
    }

    fn unobserve_resize(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

/// Schedules frames with `requestAnimationFrame`.
///
/// Every request reuses the same callback; the callback looks up the
/// controller's pending frame itself.
pub struct AnimationFrameScheduler {
    window: Window,
    callback: Closure<dyn FnMut(f64)>,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window, callback: Closure<dyn FnMut(f64)>) -> Self {
        Self { window, callback }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&mut self) -> Option<FrameId> {
        let handle = self
            .window
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
            .ok()?;
        u64::try_from(handle).ok().map(FrameId)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if let Ok(handle) = i32::try_from(id.0) {
            let _ = self.window.cancel_animation_frame(handle);
        }
    }
}
