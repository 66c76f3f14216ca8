//! Scene graphs: the declarative transition tables that drive the controller.
//!
//! One generic controller runs every application variant; what differs
//! between variants is only the [`SceneGraph`] it is given.

mod builtin;
mod error;
mod graph;
mod types;

pub use builtin::{BuiltinGraph, TAP_REVEAL_THRESHOLD};
pub use error::SceneGraphError;
pub use graph::SceneGraph;
pub use types::{
    Choice, OverlayCue, Scene, SceneId, TapReveal, TransitionRule, Trigger, TriggerKind,
};
