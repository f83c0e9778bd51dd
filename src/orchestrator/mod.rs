//! Download lifecycle orchestration.
//!
//! `lifecycle` holds the transition table; `controller` owns the model and
//! dispatches each transition's side effect to the supervisor and workspace
//! guard. The render loop is the only caller.

mod controller;
mod lifecycle;

pub(crate) use controller::{Controller, Flow, Ports, UiCommand};
