//! Lifecycle and frame loop of one running animation.
//!
//! ```text
//! start ──► Running ──stop──► Stopped
//!   │                           ▲
//!   └── no surface / no size ───┘   (inert: nothing attached, nothing drawn)
//! ```
//!
//! Events only mutate state: the pointer position and held flag, or the
//! engine's lattice on resize. Drawing happens exclusively in
//! [`AnimationController::on_frame`], which is the sole writer to the
//! surface and re-requests itself through the [`FrameScheduler`], so at most
//! one frame is ever pending.

use topography_core::color::resolve_line_color;
use topography_core::error::EngineError;
use topography_core::surface::{Surface, SurfaceSize};
use topography_core::InteractiveEngine;
use tracing::{debug, trace, warn};

use crate::event::{HostEvent, PointerState};
use crate::host::Host;
use crate::scheduler::{FrameId, FrameScheduler, ManualScheduler};

/// Caller-supplied query for the logical drawing-area size.
pub type SizeCallback = Box<dyn Fn() -> Result<SurfaceSize, EngineError>>;

/// Optional start-up configuration.
pub struct StartOptions<El> {
    /// CSS stroke color; overrides the host theme.
    pub line_color: Option<String>,
    /// Preferred source of the drawing-area size.
    pub get_size: Option<SizeCallback>,
    /// Element whose size changes trigger a reallocation.
    pub observe_element: Option<El>,
}

impl<El> Default for StartOptions<El> {
    fn default() -> Self {
        Self {
            line_color: None,
            get_size: None,
            observe_element: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Stopped,
    Running,
}

struct Attached<E, S> {
    engine: E,
    surface: S,
}

/// Drives an [`InteractiveEngine`] on a [`Surface`] inside a [`Host`].
pub struct AnimationController<E, S, H, F>
where
    E: InteractiveEngine,
    S: Surface,
    H: Host,
    F: FrameScheduler,
{
    attached: Option<Attached<E, S>>,
    host: H,
    scheduler: F,
    get_size: Option<SizeCallback>,
    size: Option<SurfaceSize>,
    pointer: PointerState,
    pending: Option<FrameId>,
    observing: bool,
    state: ControllerState,
    frames: u64,
}

impl<E, S, H, F> AnimationController<E, S, H, F>
where
    E: InteractiveEngine,
    S: Surface,
    H: Host,
    F: FrameScheduler,
{
    /// Starts an animation on `surface`.
    ///
    /// Each surface dimension is resolved from `options.get_size`, then the
    /// surface's measured size, then the host viewport. `build` creates the
    /// engine for that size. If there is no surface, no usable size, or the
    /// engine cannot be built, the returned controller is inert: it attaches
    /// nothing, never draws, and `stop` is a no-op.
    pub fn start<B>(
        surface: Option<S>,
        mut host: H,
        mut scheduler: F,
        options: StartOptions<H::Element>,
        build: B,
    ) -> Self
    where
        B: FnOnce(SurfaceSize) -> Result<E, EngineError>,
    {
        let get_size = options.get_size;
        let Some(mut surface) = surface else {
            debug!("no drawing surface; animation not started");
            return Self::inert(host, scheduler, get_size);
        };
        let Some(size) = resolve_size(get_size.as_ref(), &surface, &host) else {
            warn!("could not determine surface size; animation not started");
            return Self::inert(host, scheduler, get_size);
        };
        let mut engine = match build(size) {
            Ok(engine) => engine,
            Err(e) => {
                warn!(error = %e, "engine construction failed; animation not started");
                return Self::inert(host, scheduler, get_size);
            }
        };

        let dpr = sanitize_dpr(host.device_pixel_ratio());
        surface.set_backing_size(size, dpr);
        let theme = host.theme_foreground();
        engine.set_line_color(resolve_line_color(
            options.line_color.as_deref(),
            theme.as_deref(),
        ));

        host.attach_listeners();
        let observing = match options.observe_element.as_ref() {
            Some(element) => {
                let observing = host.observe_resize(element);
                if !observing {
                    debug!("element resize observation unavailable; relying on window resize");
                }
                observing
            }
            None => false,
        };
        let pending = scheduler.request_frame();

        debug!(
            width = size.width,
            height = size.height,
            dpr,
            "animation started"
        );
        Self {
            attached: Some(Attached { engine, surface }),
            host,
            scheduler,
            get_size,
            size: Some(size),
            pointer: PointerState::default(),
            pending,
            observing,
            state: ControllerState::Running,
            frames: 0,
        }
    }

    fn inert(host: H, scheduler: F, get_size: Option<SizeCallback>) -> Self {
        Self {
            attached: None,
            host,
            scheduler,
            get_size,
            size: None,
            pointer: PointerState::default(),
            pending: None,
            observing: false,
            state: ControllerState::Stopped,
            frames: 0,
        }
    }

    /// Runs one frame if `id` is the pending frame.
    ///
    /// Applies the held pointer, clears the surface, advances and draws the
    /// engine, then requests the next frame. Returns `false` for a stale or
    /// unknown id and when stopped.
    pub fn on_frame(&mut self, id: FrameId) -> bool {
        if self.state != ControllerState::Running || self.pending != Some(id) {
            trace!(?id, "ignoring stale frame");
            return false;
        }
        self.pending = None;
        let Some(attached) = self.attached.as_mut() else {
            return false;
        };

        if self.pointer.held {
            attached.engine.inject_at(self.pointer.x, self.pointer.y);
        }
        attached.surface.clear();
        let drawn = attached
            .engine
            .step()
            .and_then(|()| attached.engine.render(&mut attached.surface));
        if let Err(e) = drawn {
            warn!(error = %e, "frame failed");
        }
        self.frames += 1;

        self.pending = self.scheduler.request_frame();
        if self.pending.is_none() {
            warn!(frames = self.frames, "host refused to schedule a frame; animation halted");
        }
        true
    }

    /// Applies a host event. Ignored unless running.
    pub fn handle_event(&mut self, event: HostEvent) {
        if self.state != ControllerState::Running {
            return;
        }
        if !self.pointer.apply(&event) {
            self.resize();
        }
    }

    /// Re-resolves the surface size and reallocates the engine lattice.
    ///
    /// Keeps the previous size when none of the size sources is usable.
    fn resize(&mut self) {
        let Some(attached) = self.attached.as_mut() else {
            return;
        };
        let Some(size) = resolve_size(self.get_size.as_ref(), &attached.surface, &self.host) else {
            warn!("could not determine surface size; keeping previous grid");
            return;
        };
        let dpr = sanitize_dpr(self.host.device_pixel_ratio());
        attached.surface.set_backing_size(size, dpr);
        match attached.engine.resize(size) {
            Ok(()) => {
                self.size = Some(size);
                debug!(width = size.width, height = size.height, dpr, "surface resized");
            }
            Err(e) => warn!(error = %e, "resize rejected; keeping previous grid"),
        }
    }

    /// Cancels the pending frame and detaches every listener.
    ///
    /// Calling it again, or on an inert controller, does nothing.
    pub fn stop(&mut self) {
        if self.state != ControllerState::Running {
            return;
        }
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
        self.host.detach_listeners();
        if self.observing {
            self.host.unobserve_resize();
            self.observing = false;
        }
        self.state = ControllerState::Stopped;
        debug!(frames = self.frames, "animation stopped");
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ControllerState::Running
    }

    /// The engine, unless the controller is inert.
    pub fn engine(&self) -> Option<&E> {
        self.attached.as_ref().map(|a| &a.engine)
    }

    pub fn surface(&self) -> Option<&S> {
        self.attached.as_ref().map(|a| &a.surface)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    /// Current logical surface size.
    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Stops the animation and hands back the surface.
    pub fn into_surface(mut self) -> Option<S> {
        self.stop();
        self.attached.take().map(|a| a.surface)
    }
}

impl<E, S, H> AnimationController<E, S, H, ManualScheduler>
where
    E: InteractiveEngine,
    S: Surface,
    H: Host,
{
    /// Fires the pending frame, if any. Returns whether a frame was drawn.
    pub fn tick(&mut self) -> bool {
        match self.scheduler.fire() {
            Some(id) => self.on_frame(id),
            None => false,
        }
    }
}

impl<E, S, H, F> Drop for AnimationController<E, S, H, F>
where
    E: InteractiveEngine,
    S: Surface,
    H: Host,
    F: FrameScheduler,
{
    fn drop(&mut self) {
        self.stop();
    }
}

/// Resolves each dimension independently: the first finite, positive value
/// from `get_size`, then the surface's measured size, then the viewport.
fn resolve_size<S: Surface, H: Host>(
    get_size: Option<&SizeCallback>,
    surface: &S,
    host: &H,
) -> Option<SurfaceSize> {
    let requested = get_size.and_then(|get_size| match get_size() {
        Ok(size) => {
            if !size.is_valid() {
                warn!(
                    width = size.width,
                    height = size.height,
                    "size callback returned invalid dimensions"
                );
            }
            Some(size)
        }
        Err(e) => {
            warn!(error = %e, "size callback failed");
            None
        }
    });
    let sources = [requested, surface.measured_size(), host.viewport_size()];
    let pick = |dim: fn(&SurfaceSize) -> f64| {
        sources
            .iter()
            .flatten()
            .map(dim)
            .find(|v| v.is_finite() && *v > 0.0)
    };
    Some(SurfaceSize::new(pick(|s| s.width)?, pick(|s| s.height)?))
}

fn sanitize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr
    } else {
        1.0
    }
}
