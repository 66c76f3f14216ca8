//! Types for the scene controller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clip::ClipError;
use crate::playback::{UnitId, UnitState};
use crate::scene::SceneId;

/// Identifies one entry into a scene.
///
/// Entering the same scene twice yields two tokens; deferred events carry the
/// token they were issued for and are dropped once it is no longer current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneToken(u64);

impl SceneToken {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SceneToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors from the controller's own API. Playback problems never surface
/// here; they degrade the scene instead.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("controller already started")]
    AlreadyStarted,

    #[error("scene not found: {0}")]
    UnknownScene(SceneId),
}

/// Why a scene is running without video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradeReason {
    AssetNotFound { name: String },
    IncompletePair { missing: Vec<String> },
    AssetUnreadable { name: String },
    DeviceUnsupported,
    PlaybackDisabled,
    AttachFailure,
    InvalidUnit { message: String },
}

impl DegradeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradeReason::AssetNotFound { .. } => "asset_not_found",
            DegradeReason::IncompletePair { .. } => "incomplete_pair",
            DegradeReason::AssetUnreadable { .. } => "asset_unreadable",
            DegradeReason::DeviceUnsupported => "device_unsupported",
            DegradeReason::PlaybackDisabled => "playback_disabled",
            DegradeReason::AttachFailure => "attach_failure",
            DegradeReason::InvalidUnit { .. } => "invalid_unit",
        }
    }
}

impl From<&ClipError> for DegradeReason {
    fn from(err: &ClipError) -> Self {
        match err {
            ClipError::AssetNotFound { name } => DegradeReason::AssetNotFound { name: name.clone() },
            ClipError::IncompletePair { missing, .. } => DegradeReason::IncompletePair {
                missing: missing.clone(),
            },
            ClipError::Open { name, .. } => DegradeReason::AssetUnreadable { name: name.clone() },
        }
    }
}

/// Why an event was dropped without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// No scene has been entered yet, or the session is over.
    NoActiveScene,
    /// The event was issued for a scene instance that has since exited.
    StaleInstance,
    /// Completion from a unit that is not the active one.
    StaleUnit,
    /// Completion delivered twice for the same unit.
    DuplicateCompletion,
    /// The scene already committed its transition.
    TransitionGuardSet,
    /// The scene has no rule for this trigger.
    NoMatchingRule,
    /// The tap reveal has already been shown in this scene instance.
    RevealAlreadyShown,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::NoActiveScene => "no_active_scene",
            IgnoreReason::StaleInstance => "stale_instance",
            IgnoreReason::StaleUnit => "stale_unit",
            IgnoreReason::DuplicateCompletion => "duplicate_completion",
            IgnoreReason::TransitionGuardSet => "transition_guard_set",
            IgnoreReason::NoMatchingRule => "no_matching_rule",
            IgnoreReason::RevealAlreadyShown => "reveal_already_shown",
        }
    }
}

/// What dispatching one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Transitioned { from: SceneId, to: SceneId },
    OverlayRevealed { overlay: String },
    TapCounted { count: u32 },
    Ignored(IgnoreReason),
    Shutdown,
}

/// Snapshot of the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerStatus {
    pub session: String,
    pub started: bool,
    pub video_enabled: bool,
    pub scene: Option<SceneId>,
    pub instance: Option<SceneToken>,
    pub unit: Option<UnitId>,
    pub unit_state: Option<UnitState>,
    pub transition_committed: bool,
    pub taps: u32,
}
