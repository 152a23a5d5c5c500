//! [`Surface`] backed by a `<canvas>` 2D context.

use topography_core::surface::{LineSegment, StrokeStyle, Surface, SurfaceSize};
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::device_pixels;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    size: SurfaceSize,
}

impl CanvasSurface {
    /// Wraps `canvas`. Returns `None` when no 2D context is available.
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let size = SurfaceSize::new(f64::from(canvas.width()), f64::from(canvas.height()));
        Some(Self { canvas, ctx, size })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn measured_size(&self) -> Option<SurfaceSize> {
        Some(SurfaceSize::new(
            f64::from(self.canvas.client_width()),
            f64::from(self.canvas.client_height()),
        ))
    }

    fn set_backing_size(&mut self, size: SurfaceSize, device_pixel_ratio: f64) {
        self.canvas
            .set_width(device_pixels(size.width, device_pixel_ratio));
        self.canvas
            .set_height(device_pixels(size.height, device_pixel_ratio));
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", size.width));
        let _ = style.set_property("height", &format!("{}px", size.height));
        // Resizing the backing store resets the context; the scale is
        // reapplied from identity so it never compounds.
        let scaled = self
            .ctx
            .set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
            .and_then(|()| self.ctx.scale(device_pixel_ratio, device_pixel_ratio));
        if scaled.is_err() {
            warn!(device_pixel_ratio, "could not scale canvas context");
        }
        self.size = size;
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.size.width, self.size.height);
    }

    fn begin_path(&mut self, style: &StrokeStyle) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(&style.color.to_css());
        self.ctx.set_line_width(style.width);
    }

    fn line(&mut self, segment: &LineSegment) {
        self.ctx.move_to(segment.from.x, segment.from.y);
        self.ctx.line_to(segment.to.x, segment.to.y);
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }
}
