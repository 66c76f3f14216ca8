//! Mock scene presenter for testing.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::controller::ScenePresenter;
use crate::scene::SceneId;

/// A recorded presenter call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    Transition(SceneId),
    Overlay(String),
    ChoicesVisible(bool),
}

/// Mock implementation of the ScenePresenter trait. Records every call.
#[derive(Debug, Default)]
pub struct MockPresenter {
    calls: Mutex<Vec<PresenterCall>>,
}

impl MockPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PresenterCall> {
        self.lock().clone()
    }

    /// Targets of every presented transition, in order.
    pub fn transitions(&self) -> Vec<SceneId> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                PresenterCall::Transition(target) => Some(target.clone()),
                _ => None,
            })
            .collect()
    }

    /// Overlays revealed, in order.
    pub fn overlays(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                PresenterCall::Overlay(overlay) => Some(overlay.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether choice buttons are currently shown.
    pub fn choices_visible(&self) -> bool {
        self.lock()
            .iter()
            .rev()
            .find_map(|call| match call {
                PresenterCall::ChoicesVisible(visible) => Some(*visible),
                _ => None,
            })
            .unwrap_or(false)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PresenterCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: PresenterCall) {
        self.lock().push(call);
    }
}

#[async_trait]
impl ScenePresenter for MockPresenter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn perform_transition(&self, target: &SceneId) {
        self.record(PresenterCall::Transition(target.clone()));
    }

    async fn reveal_overlay(&self, overlay: &str) {
        self.record(PresenterCall::Overlay(overlay.to_string()));
    }

    async fn set_choices_visible(&self, visible: bool) {
        self.record(PresenterCall::ChoicesVisible(visible));
    }
}
