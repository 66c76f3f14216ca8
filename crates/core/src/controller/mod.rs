//! Scene controller.
//!
//! The controller walks a [`SceneGraph`](crate::scene::SceneGraph) one scene
//! at a time. It owns at most one [`PlaybackUnit`](crate::playback::PlaybackUnit),
//! reacts to its completion, to dwell timers and to user choices, and commits
//! exactly one transition per scene instance.
//!
//! All state lives on the task that drives [`SceneController::run`]. Timers,
//! surfaces and [`ControllerHandle`]s only post [`ControllerEvent`]s, each
//! stamped with the [`SceneToken`] of the instance it was meant for; events
//! for an instance that has already exited are dropped.
//!
//! # Example
//!
//! ```ignore
//! let mut controller = SceneController::new(graph, resolver, surface, presenter, config);
//! let handle = controller.handle();
//! tokio::spawn(async move { controller.run().await });
//!
//! handle.choose(Choice::A);
//! handle.shutdown();
//! ```

mod config;
mod events;
mod handle;
mod presenter;
mod runner;
mod trigger;
mod types;

pub use config::ControllerConfig;
pub use events::{ControllerEvent, NoticeEnvelope, OverlayCause, SceneNotice, SceneSignal};
pub use handle::ControllerHandle;
pub use presenter::ScenePresenter;
pub use runner::SceneController;
pub use trigger::{InputGate, Latch, TapCounter, TapOutcome};
pub use types::{
    ControllerError, ControllerStatus, DegradeReason, Dispatch, IgnoreReason, SceneToken,
};
