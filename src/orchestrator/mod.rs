//! Application-level orchestration.
//!
//! This module owns the request lifecycle for the terminal UI: it receives submit
//! commands from the UI thread, dispatches them through the transport on the Tokio
//! runtime, and reports the resolution back as events.

mod controller;

pub(crate) use controller::{run_controller, UiCommand, UiEvent};
