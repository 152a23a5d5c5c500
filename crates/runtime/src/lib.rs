#![deny(unsafe_code)]
//! Host-agnostic animation loop.
//!
//! [`AnimationController`] owns one engine and one surface and runs the
//! per-frame pipeline: apply held pointer, clear, step, draw, reschedule.
//! Everything host-specific is behind two traits: a [`FrameScheduler`] that
//! delivers frame callbacks and a [`Host`] that supplies layout information
//! and event listeners. Tests and offline renders use [`ManualScheduler`]
//! and [`HeadlessHost`].

pub mod controller;
pub mod event;
pub mod host;
pub mod scheduler;

pub use controller::{AnimationController, ControllerState, SizeCallback, StartOptions};
pub use event::{HostEvent, PointerButton, PointerState};
pub use host::{HeadlessHost, Host};
pub use scheduler::{FrameId, FrameScheduler, ManualScheduler};
