//! Next-frame scheduling.
//!
//! The controller never loops on its own. It asks a [`FrameScheduler`] for
//! one callback at a time and the host calls
//! [`AnimationController::on_frame`](crate::AnimationController::on_frame)
//! with the id it was given. In a browser the scheduler wraps
//! `requestAnimationFrame`; in tests and headless runs [`ManualScheduler`]
//! lets the caller decide when frames happen.

/// Opaque handle of one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

pub trait FrameScheduler {
    /// Requests a single callback for the next frame. `None` when the host
    /// cannot schedule frames.
    fn request_frame(&mut self) -> Option<FrameId>;

    /// Cancels a previously requested callback. Unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);
}

/// A scheduler driven by hand.
///
/// Keeps at most the most recent request pending and records every request
/// and cancellation.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameId>,
    requested: usize,
    cancelled: Vec<FrameId>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The callback that would fire next, if any.
    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    /// Marks the pending callback as fired and returns its id.
    pub fn fire(&mut self) -> Option<FrameId> {
        self.pending.take()
    }

    /// Total number of requests made.
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> &[FrameId] {
        &self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameId> {
        self.next_id += 1;
        self.requested += 1;
        let id = FrameId(self.next_id);
        self.pending = Some(id);
        Some(id)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
        self.cancelled.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_get_fresh_ids() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame().unwrap();
        let b = s.request_frame().unwrap();
        assert_ne!(a, b);
        assert_eq!(s.pending(), Some(b));
        assert_eq!(s.requested(), 2);
    }

    #[test]
    fn fire_consumes_pending() {
        let mut s = ManualScheduler::new();
        let id = s.request_frame().unwrap();
        assert_eq!(s.fire(), Some(id));
        assert_eq!(s.fire(), None);
    }

    #[test]
    fn cancel_clears_matching_pending_only() {
        let mut s = ManualScheduler::new();
        let id = s.request_frame().unwrap();
        s.cancel_frame(FrameId(999));
        assert_eq!(s.pending(), Some(id));
        s.cancel_frame(id);
        assert_eq!(s.pending(), None);
        assert_eq!(s.cancelled(), &[FrameId(999), id]);
    }
}
