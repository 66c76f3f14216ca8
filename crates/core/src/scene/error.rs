//! Error types for scene graph loading and validation.

use std::path::PathBuf;

use thiserror::Error;

use super::types::{SceneId, TriggerKind};

#[derive(Debug, Error)]
pub enum SceneGraphError {
    #[error("Failed to read scene graph {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scene graph: {0}")]
    Parse(String),

    #[error("Scene graph has no scenes")]
    Empty,

    #[error("Duplicate scene id: {0}")]
    DuplicateScene(SceneId),

    #[error("Initial scene {0} is not defined")]
    UnknownInitial(SceneId),

    #[error("Scene {scene} transitions to undefined scene {target}")]
    UnknownTarget { scene: SceneId, target: SceneId },

    #[error("Scene {scene} has more than one {trigger} rule")]
    DuplicateTrigger { scene: SceneId, trigger: TriggerKind },

    #[error("Scene {scene} has an invalid dwell time: {seconds}")]
    InvalidDwell { scene: SceneId, seconds: f64 },

    #[error("Scene {scene} loops its clips, so its completed rule can never fire")]
    CompletedOnLoop { scene: SceneId },

    #[error("Scene {scene} has a completed rule but no clips")]
    CompletedWithoutClips { scene: SceneId },

    #[error("Scene {scene} has a tap reveal with a zero threshold")]
    InvalidTapThreshold { scene: SceneId },

    #[error("Scene {scene} has an invalid cue delay: {after_secs}")]
    InvalidCue { scene: SceneId, after_secs: f64 },
}
