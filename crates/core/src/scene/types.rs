//! Scene graph data types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clip::{ClipSource, PlaybackMode};

// ============================================================================
// Identifiers
// ============================================================================

/// Scene identifier, unique within a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Triggers
// ============================================================================

/// One of the two mutually exclusive user choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    A,
    B,
}

impl Choice {
    pub fn trigger_kind(self) -> TriggerKind {
        match self {
            Choice::A => TriggerKind::ChoiceA,
            Choice::B => TriggerKind::ChoiceB,
        }
    }
}

/// Event that can fire a transition rule.
///
/// ```toml
/// transitions = [
///     { when = "completed", to = "choice" },
///     { when = { dwell_elapsed = 4.0 }, to = "intro" },
/// ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The scene's `OnceSequential` unit played its last frame.
    Completed,
    ChoiceA,
    ChoiceB,
    /// Seconds since the scene was entered, independent of input.
    DwellElapsed(f64),
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Completed => TriggerKind::Completed,
            Trigger::ChoiceA => TriggerKind::ChoiceA,
            Trigger::ChoiceB => TriggerKind::ChoiceB,
            Trigger::DwellElapsed(_) => TriggerKind::DwellElapsed,
        }
    }
}

/// Trigger without its payload, used for matching and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Completed,
    ChoiceA,
    ChoiceB,
    DwellElapsed,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Completed => "completed",
            TriggerKind::ChoiceA => "choice_a",
            TriggerKind::ChoiceB => "choice_b",
            TriggerKind::DwellElapsed => "dwell_elapsed",
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, TriggerKind::ChoiceA | TriggerKind::ChoiceB)
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Scene
// ============================================================================

/// `when` fires a transition into `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub when: Trigger,
    pub to: SceneId,
}

/// Overlay shown a fixed time after the scene is entered. Does not transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayCue {
    pub after_secs: f64,
    pub overlay: String,
}

impl OverlayCue {
    /// The cue's delay, or `None` if `after_secs` is negative, not finite, or
    /// too large for a `Duration`.
    pub fn delay(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.after_secs).ok()
    }
}

/// Overlay revealed once the scene has counted `threshold` taps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapReveal {
    pub threshold: u32,
    pub overlay: String,
}

/// A narrative state: its clips and the rules that leave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,

    /// Entry clips, played as one unit. Empty for scenes without video.
    #[serde(default)]
    pub clips: Vec<ClipSource>,

    #[serde(default)]
    pub playback: PlaybackMode,

    /// Opaque decode hint passed to the surface untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decode_gamma: Option<String>,

    /// Outgoing rules. A scene without rules is terminal.
    #[serde(default)]
    pub transitions: Vec<TransitionRule>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cues: Vec<OverlayCue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_reveal: Option<TapReveal>,
}

impl Scene {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: SceneId::new(id),
            clips: Vec::new(),
            playback: PlaybackMode::default(),
            decode_gamma: None,
            transitions: Vec::new(),
            cues: Vec::new(),
            tap_reveal: None,
        }
    }

    pub fn with_clips(mut self, playback: PlaybackMode, clips: Vec<ClipSource>) -> Self {
        self.playback = playback;
        self.clips = clips;
        self
    }

    pub fn with_decode_gamma(mut self, decode_gamma: impl Into<String>) -> Self {
        self.decode_gamma = Some(decode_gamma.into());
        self
    }

    pub fn on(mut self, when: Trigger, to: impl Into<String>) -> Self {
        self.transitions.push(TransitionRule {
            when,
            to: SceneId::new(to),
        });
        self
    }

    pub fn with_cue(mut self, after_secs: f64, overlay: impl Into<String>) -> Self {
        self.cues.push(OverlayCue {
            after_secs,
            overlay: overlay.into(),
        });
        self
    }

    pub fn with_tap_reveal(mut self, threshold: u32, overlay: impl Into<String>) -> Self {
        self.tap_reveal = Some(TapReveal {
            threshold,
            overlay: overlay.into(),
        });
        self
    }

    pub fn rule_for(&self, kind: TriggerKind) -> Option<&TransitionRule> {
        self.transitions.iter().find(|rule| rule.when.kind() == kind)
    }

    /// The dwell rule's delay, if the scene has one.
    pub fn dwell(&self) -> Option<Duration> {
        self.transitions.iter().find_map(|rule| match rule.when {
            Trigger::DwellElapsed(seconds) => Duration::try_from_secs_f64(seconds).ok(),
            _ => None,
        })
    }

    pub fn accepts_choices(&self) -> bool {
        self.transitions.iter().any(|rule| rule.when.kind().is_choice())
    }

    /// Choices this scene has a rule for.
    pub fn offered_choices(&self) -> Vec<Choice> {
        [Choice::A, Choice::B]
            .into_iter()
            .filter(|choice| self.rule_for(choice.trigger_kind()).is_some())
            .collect()
    }

    pub fn is_terminal(&self) -> bool {
        self.transitions.is_empty()
    }
}
