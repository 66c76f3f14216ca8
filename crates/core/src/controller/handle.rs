use std::sync::Arc;

use tokio::sync::mpsc;

use super::events::{ControllerEvent, SceneSignal};
use super::trigger::InputGate;
use crate::scene::Choice;

/// Handle for feeding user input into a running controller.
///
/// This is cheaply cloneable and can be shared across tasks. Input is posted
/// to the controller's queue; the handle never touches controller state.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<ControllerEvent>,
    gate: Arc<InputGate>,
}

impl ControllerHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ControllerEvent>, gate: Arc<InputGate>) -> Self {
        Self { tx, gate }
    }

    /// Deliver a choice to the scene currently offering one.
    ///
    /// Returns false if the current scene does not offer `choice`, which
    /// includes every call after the first one for the same scene instance.
    pub fn choose(&self, choice: Choice) -> bool {
        let Some(instance) = self.gate.take_choice(choice) else {
            tracing::debug!(?choice, "Choice dropped, not offered");
            return false;
        };
        self.send(ControllerEvent::scene(instance, SceneSignal::Choice(choice)))
    }

    /// Deliver a tap to the current scene instance.
    pub fn tap(&self) -> bool {
        let Some(instance) = self.gate.active() else {
            return false;
        };
        self.send(ControllerEvent::scene(instance, SceneSignal::Tap))
    }

    /// Ask the controller to tear down the session.
    pub fn shutdown(&self) -> bool {
        self.send(ControllerEvent::Shutdown)
    }

    /// Whether any choice would currently be accepted.
    pub fn choices_open(&self) -> bool {
        self.gate.choices_open()
    }

    pub fn choice_open(&self, choice: Choice) -> bool {
        self.gate.choice_open(choice)
    }

    fn send(&self, event: ControllerEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to post controller event: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for ControllerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("active", &self.gate.active())
            .field("choices_open", &self.gate.choices_open())
            .finish()
    }
}
