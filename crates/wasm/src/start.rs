//! `wasm-bindgen` entry point.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Reflect;
use topography_core::config::TopographyConfig;
use topography_core::error::EngineError;
use topography_core::prng::Xorshift64;
use topography_core::surface::SurfaceSize;
use topography_perlin::PerlinTopography;
use topography_runtime::{
    AnimationController, HostEvent, PointerButton, SizeCallback, StartOptions,
};
use tracing::{debug, trace, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlCanvasElement, MouseEvent};

use crate::canvas::CanvasSurface;
use crate::dom::{AnimationFrameScheduler, BrowserHost, Listeners, PointerListener};

type BrowserController =
    AnimationController<PerlinTopography, CanvasSurface, BrowserHost, AnimationFrameScheduler>;
type Slot = Rc<RefCell<Option<BrowserController>>>;

fn install_hooks() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        crate::console::init();
        std::panic::set_hook(Box::new(|info| {
            let global = js_sys::global();
            if let Ok(console) = Reflect::get(&global, &"console".into()) {
                if let Ok(error) = Reflect::get(&console, &"error".into()) {
                    if let Ok(f) = error.dyn_into::<js_sys::Function>() {
                        let _ = f.call1(&console, &JsValue::from_str(&format!("{info}")));
                    }
                }
            }
        }));
    });
}

/// Runs `f` on the controller unless it is gone or already borrowed.
fn with_controller(
    slot: &Weak<RefCell<Option<BrowserController>>>,
    f: impl FnOnce(&mut BrowserController),
) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    let Ok(mut guard) = slot.try_borrow_mut() else {
        trace!("controller busy; dropping callback");
        return;
    };
    if let Some(controller) = guard.as_mut() {
        f(controller);
    }
}

fn pointer_listener(
    slot: Weak<RefCell<Option<BrowserController>>>,
    canvas: HtmlCanvasElement,
    to_event: fn(f64, f64, &MouseEvent) -> HostEvent,
) -> PointerListener {
    Closure::wrap(Box::new(move |e: MouseEvent| {
        let rect = canvas.get_bounding_client_rect();
        let x = f64::from(e.client_x()) - rect.left();
        let y = f64::from(e.client_y()) - rect.top();
        let event = to_event(x, y, &e);
        with_controller(&slot, |c| c.handle_event(event));
    }) as Box<dyn FnMut(MouseEvent)>)
}

fn listeners(
    slot: &Weak<RefCell<Option<BrowserController>>>,
    canvas: &HtmlCanvasElement,
) -> Listeners {
    let pointer = |to_event: fn(f64, f64, &MouseEvent) -> HostEvent| {
        pointer_listener(slot.clone(), canvas.clone(), to_event)
    };
    let resize_slot = slot.clone();
    Listeners {
        pointer: vec![
            (
                "mousedown",
                pointer(|x, y, e| HostEvent::PointerDown {
                    x,
                    y,
                    button: PointerButton::from_dom(e.button()),
                }),
            ),
            ("mousemove", pointer(|x, y, _| HostEvent::PointerMove { x, y })),
            ("mouseup", pointer(|_, _, _| HostEvent::PointerUp)),
            ("mouseleave", pointer(|_, _, _| HostEvent::PointerLeave)),
        ],
        resize: Closure::wrap(Box::new(move || {
            with_controller(&resize_slot, |c| c.handle_event(HostEvent::Resize));
        }) as Box<dyn FnMut()>),
    }
}

/// Wraps a JS `getSize()` that returns `{ width, height }` in CSS pixels.
fn size_callback(get_size: js_sys::Function) -> SizeCallback {
    Box::new(move || {
        let value = get_size
            .call0(&JsValue::NULL)
            .map_err(|e| EngineError::SizeUnavailable(format!("getSize() threw: {e:?}")))?;
        let dim = |key: &str| {
            Reflect::get(&value, &JsValue::from_str(key))
                .ok()
                .and_then(|v| v.as_f64())
        };
        match (dim("width"), dim("height")) {
            (Some(width), Some(height)) => Ok(SurfaceSize::new(width, height)),
            _ => Err(EngineError::SizeUnavailable(
                "getSize() must return { width, height }".into(),
            )),
        }
    })
}

/// Options read from the object passed to `startTopography`.
///
/// Missing, `null` or mistyped keys are ignored.
#[derive(Debug, Default)]
pub struct BrowserOptions {
    pub line_color: Option<String>,
    pub get_size: Option<js_sys::Function>,
    pub observe_element: Option<Element>,
}

impl BrowserOptions {
    /// Reads `lineColor`, `getSize` and `observeElement` from `options`.
    pub fn from_js(options: &JsValue) -> Self {
        if !options.is_object() {
            return Self::default();
        }
        Self {
            line_color: option(options, "lineColor", |v| v.as_string()),
            get_size: option(options, "getSize", |v| v.dyn_into().ok()),
            observe_element: option(options, "observeElement", |v| v.dyn_into().ok()),
        }
    }
}

fn option<T>(options: &JsValue, key: &str, cast: impl FnOnce(JsValue) -> Option<T>) -> Option<T> {
    let value = Reflect::get(options, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())?;
    let cast = cast(value);
    if cast.is_none() {
        debug!(key, "ignoring option of the wrong type");
    }
    cast
}

/// Owns a running animation until [`stop`](Self::stop).
pub struct StopHandle {
    slot: Option<Slot>,
}

impl StopHandle {
    fn inert() -> Self {
        Self { slot: None }
    }

    /// Cancels the animation and removes every listener. Idempotent.
    pub fn stop(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        let taken = match slot.try_borrow_mut() {
            Ok(mut guard) => Some(guard.take()),
            Err(_) => None,
        };
        match taken {
            Some(Some(mut controller)) => controller.stop(),
            Some(None) => {}
            None => {
                warn!("stop() called during a frame; retry later");
                self.slot = Some(slot);
            }
        }
    }

    /// Whether the animation is still running.
    pub fn is_running(&self) -> bool {
        self.slot
            .as_ref()
            .and_then(|slot| {
                slot.try_borrow()
                    .ok()
                    .map(|guard| guard.as_ref().is_some_and(BrowserController::is_running))
            })
            .unwrap_or(false)
    }

    /// Moves the handle into a JS function that stops it when called.
    pub fn into_js_function(mut self) -> js_sys::Function {
        Closure::wrap(Box::new(move || self.stop()) as Box<dyn FnMut()>)
            .into_js_value()
            .unchecked_into()
    }
}

/// Starts the contour animation on `canvas`.
///
/// With no window, no canvas, or no 2D context, the returned handle is
/// inert. The line color defaults to the page's `--foreground` at half
/// opacity.
pub fn start(canvas: Option<HtmlCanvasElement>, options: BrowserOptions) -> StopHandle {
    install_hooks();
    let Some(window) = web_sys::window() else {
        debug!("no window; animation not started");
        return StopHandle::inert();
    };
    let Some(surface) = canvas.and_then(CanvasSurface::new) else {
        debug!("no drawable canvas; animation not started");
        return StopHandle::inert();
    };

    let slot: Slot = Rc::new(RefCell::new(None));
    let weak = Rc::downgrade(&slot);
    let host = BrowserHost::new(
        window.clone(),
        surface.canvas().clone(),
        listeners(&weak, surface.canvas()),
    );
    let frame_slot = weak.clone();
    let scheduler = AnimationFrameScheduler::new(
        window,
        Closure::wrap(Box::new(move |_timestamp: f64| {
            with_controller(&frame_slot, |c| {
                if let Some(id) = c.pending_frame() {
                    c.on_frame(id);
                }
            });
        }) as Box<dyn FnMut(f64)>),
    );

    let seed = Xorshift64::seed_from_unit(js_sys::Math::random());
    let options = StartOptions {
        line_color: options.line_color,
        get_size: options.get_size.map(size_callback),
        observe_element: options.observe_element,
    };
    let controller = AnimationController::start(Some(surface), host, scheduler, options, |size| {
        PerlinTopography::new(size, seed, TopographyConfig::default())
    });
    *slot.borrow_mut() = Some(controller);
    StopHandle { slot: Some(slot) }
}

/// `startTopography(canvas, { lineColor, getSize, observeElement }) -> stop`.
///
/// Calling the returned function tears the animation down; later calls do
/// nothing. Without a usable canvas it is a no-op from the start.
#[wasm_bindgen(js_name = startTopography)]
pub fn start_topography(canvas: Option<HtmlCanvasElement>, options: JsValue) -> js_sys::Function {
    start(canvas, BrowserOptions::from_js(&options)).into_js_function()
}
