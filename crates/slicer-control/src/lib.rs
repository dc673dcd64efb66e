#![forbid(unsafe_code)]

//! Synchronization between slice expression text and slot selections.
//!
//! A [`SliceControl`] is created from a [`Shape`](slicer_model::Shape) and owns the state behind
//! an interactive slicing control: whether slicing is enabled, the text the user is editing, the
//! expression the host last applied, and one [`AxisSelection`](slicer_model::AxisSelection) per
//! selector slot. Hosts drive it with the `on_*`/`toggle` entry points and receive
//! [`SliceRequest`]s through a [`SliceRequestHandler`] whenever the effective slice changes.
//!
//! Everything runs synchronously on the caller's thread. Each entry point updates one
//! representation and then settles the other before returning, so a notification always reflects
//! a consistent state and derivations never feed back into each other.
//!
//! Rendering is left to the host; [`SliceControl::axis_options`], [`SliceControl::index_options`]
//! and friends expose the plain data a UI needs.

mod control;
mod error;
mod request;
mod settings;
mod view;

pub use control::{IgnoreReason, Outcome, SessionState, SliceControl};
pub use error::ControlError;
pub use request::{RequestLog, SliceRequest, SliceRequestHandler};
pub use settings::SliceControlSettings;
pub use view::{AxisOption, IndexOption};
