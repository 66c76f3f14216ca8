//! Controller queue events and outbound notices.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{DegradeReason, IgnoreReason, SceneToken};
use crate::clip::PlaybackMode;
use crate::playback::UnitId;
use crate::scene::{Choice, SceneId, TriggerKind};

/// Something that happened to one scene instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneSignal {
    /// The unit's completion signal was delivered.
    PlaybackFinished(UnitId),
    /// The scene's dwell timer ran out.
    DwellElapsed(Duration),
    /// A choice input fired.
    Choice(Choice),
    /// The overlay cue at this index is due.
    Cue(usize),
    /// A discrete tap.
    Tap,
}

/// An item on the controller's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Scene {
        instance: SceneToken,
        signal: SceneSignal,
    },
    Shutdown,
}

impl ControllerEvent {
    pub fn scene(instance: SceneToken, signal: SceneSignal) -> Self {
        Self::Scene { instance, signal }
    }
}

/// What revealed an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayCause {
    Cue,
    TapThreshold,
}

impl OverlayCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayCause::Cue => "cue",
            OverlayCause::TapThreshold => "tap_threshold",
        }
    }
}

/// Notices broadcast to observers of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneNotice {
    SessionStarted {
        session: String,
        initial: SceneId,
        video_enabled: bool,
    },
    SceneEntered {
        scene: SceneId,
        instance: SceneToken,
    },
    PlaybackStarted {
        scene: SceneId,
        unit: UnitId,
        clips: usize,
        mode: PlaybackMode,
    },
    Degraded {
        scene: Option<SceneId>,
        reason: DegradeReason,
    },
    TransitionCommitted {
        from: SceneId,
        to: SceneId,
        trigger: TriggerKind,
    },
    OverlayRevealed {
        scene: SceneId,
        overlay: String,
        cause: OverlayCause,
    },
    EventIgnored {
        scene: Option<SceneId>,
        reason: IgnoreReason,
    },
    SessionEnded {
        last_scene: Option<SceneId>,
    },
}

impl SceneNotice {
    /// Stable name of the notice type.
    pub fn notice_type(&self) -> &'static str {
        match self {
            SceneNotice::SessionStarted { .. } => "session_started",
            SceneNotice::SceneEntered { .. } => "scene_entered",
            SceneNotice::PlaybackStarted { .. } => "playback_started",
            SceneNotice::Degraded { .. } => "degraded",
            SceneNotice::TransitionCommitted { .. } => "transition_committed",
            SceneNotice::OverlayRevealed { .. } => "overlay_revealed",
            SceneNotice::EventIgnored { .. } => "event_ignored",
            SceneNotice::SessionEnded { .. } => "session_ended",
        }
    }
}

/// Envelope wrapping a notice with the time it was emitted.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeEnvelope {
    pub timestamp: DateTime<Utc>,
    pub notice: SceneNotice,
}

impl NoticeEnvelope {
    pub fn new(notice: SceneNotice) -> Self {
        Self {
            timestamp: Utc::now(),
            notice,
        }
    }
}
