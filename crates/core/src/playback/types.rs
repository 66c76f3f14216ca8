//! Types shared between playback units and renderer surfaces.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::clip::{ClipDescriptor, PlaybackMode};

/// Process-unique playback unit identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(u64);

impl UnitId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// Lifecycle state of a playback unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Detached,
    Attached,
    Playing,
    Finished,
}

impl UnitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitState::Detached => "detached",
            UnitState::Attached => "attached",
            UnitState::Playing => "playing",
            UnitState::Finished => "finished",
        }
    }
}

impl std::fmt::Display for UnitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback run when a unit's final frame has been presented.
///
/// Receives the id of the finished unit and nothing else.
pub type CompletionHook = Arc<dyn Fn(UnitId) + Send + Sync>;

/// Completion state shared between a unit and the signal it hands out.
pub(crate) struct CompletionShared {
    cancelled: AtomicBool,
    fired: AtomicBool,
    hook: Mutex<Option<CompletionHook>>,
}

impl CompletionShared {
    pub(crate) fn new(hook: Option<CompletionHook>) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            fired: AtomicBool::new(false),
            hook: Mutex::new(hook),
        }
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn set_hook(&self, hook: CompletionHook) -> bool {
        let mut slot = self.hook.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return false;
        }
        *slot = Some(hook);
        true
    }

    pub(crate) fn hook(&self) -> Option<CompletionHook> {
        self.hook
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Single-use completion notifier handed to the surface on attach.
///
/// Only `OnceSequential` units hand one out. `notify` consumes the signal, and
/// the shared fired flag keeps the notification single-fire even if a surface
/// somehow obtains two signals for the same unit. Once the unit has been
/// detached the signal is inert.
pub struct CompletionSignal {
    unit: UnitId,
    shared: Arc<CompletionShared>,
}

impl CompletionSignal {
    pub(crate) fn new(unit: UnitId, shared: Arc<CompletionShared>) -> Self {
        Self { unit, shared }
    }

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// Whether the owning unit has been detached since this signal was issued.
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// Report that the last frame of the last clip has been presented.
    ///
    /// Returns true if the completion hook was run.
    pub fn notify(self) -> bool {
        if self.is_cancelled() {
            tracing::debug!(unit = %self.unit, "Completion dropped, unit was detached");
            return false;
        }
        if self.shared.fired.swap(true, Ordering::SeqCst) {
            tracing::warn!(unit = %self.unit, "Completion already delivered for unit");
            return false;
        }
        match self.shared.hook() {
            Some(hook) => {
                hook(self.unit);
                true
            }
            None => {
                tracing::debug!(unit = %self.unit, "Unit finished with no completion hook");
                false
            }
        }
    }
}

impl std::fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSignal")
            .field("unit", &self.unit)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Everything a renderer surface gets when a unit is attached to it.
#[derive(Debug)]
pub struct UnitBinding {
    pub unit: UnitId,
    pub clips: Arc<[ClipDescriptor]>,
    pub mode: PlaybackMode,
    /// Opaque decode hint passed through from the scene (e.g. "bt709_apple").
    pub decode_gamma: Option<String>,
    /// Present for `OnceSequential` units only.
    pub completion: Option<CompletionSignal>,
}
