//! The declarative scene graph that parameterizes the controller.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::SceneGraphError;
use super::types::{Scene, SceneId, Trigger, TriggerKind};
use crate::clip::PlaybackMode;

/// All scenes of one application plus the scene the session starts in.
///
/// ```toml
/// initial = "splash"
///
/// [[scenes]]
/// id = "splash"
/// transitions = [{ when = { dwell_elapsed = 4.0 }, to = "intro" }]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    pub initial: SceneId,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl SceneGraph {
    /// Build and validate a graph.
    pub fn new(initial: impl Into<String>, scenes: Vec<Scene>) -> Result<Self, SceneGraphError> {
        let graph = Self {
            initial: SceneId::new(initial),
            scenes,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Parse and validate a graph from TOML.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SceneGraphError> {
        let graph: SceneGraph =
            toml::from_str(toml_str).map_err(|e| SceneGraphError::Parse(e.to_string()))?;
        graph.validate()?;
        Ok(graph)
    }

    /// Read, parse and validate a graph file.
    pub fn load(path: &Path) -> Result<Self, SceneGraphError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SceneGraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn get(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|scene| &scene.id == id)
    }

    pub fn initial_scene(&self) -> Option<&Scene> {
        self.get(&self.initial)
    }

    pub fn scene_ids(&self) -> impl Iterator<Item = &SceneId> {
        self.scenes.iter().map(|scene| &scene.id)
    }

    /// Check the graph is well formed.
    ///
    /// Validates:
    /// - Scene ids are unique and the initial scene exists
    /// - Every transition target exists
    /// - At most one rule per trigger kind in a scene
    /// - Dwell times and cue delays fit a `Duration` (dwell strictly positive)
    /// - Completed rules only on scenes with `OnceSequential` clips
    /// - Tap thresholds are non-zero
    pub fn validate(&self) -> Result<(), SceneGraphError> {
        if self.scenes.is_empty() {
            return Err(SceneGraphError::Empty);
        }

        let mut ids = HashSet::new();
        for scene in &self.scenes {
            if !ids.insert(&scene.id) {
                return Err(SceneGraphError::DuplicateScene(scene.id.clone()));
            }
        }

        if !ids.contains(&self.initial) {
            return Err(SceneGraphError::UnknownInitial(self.initial.clone()));
        }

        for scene in &self.scenes {
            let mut seen: HashSet<TriggerKind> = HashSet::new();
            for rule in &scene.transitions {
                if !ids.contains(&rule.to) {
                    return Err(SceneGraphError::UnknownTarget {
                        scene: scene.id.clone(),
                        target: rule.to.clone(),
                    });
                }

                let kind = rule.when.kind();
                if !seen.insert(kind) {
                    return Err(SceneGraphError::DuplicateTrigger {
                        scene: scene.id.clone(),
                        trigger: kind,
                    });
                }

                match rule.when {
                    Trigger::DwellElapsed(seconds)
                        if !(seconds > 0.0 && Duration::try_from_secs_f64(seconds).is_ok()) =>
                    {
                        return Err(SceneGraphError::InvalidDwell {
                            scene: scene.id.clone(),
                            seconds,
                        });
                    }
                    Trigger::Completed if scene.clips.is_empty() => {
                        return Err(SceneGraphError::CompletedWithoutClips {
                            scene: scene.id.clone(),
                        });
                    }
                    Trigger::Completed if scene.playback == PlaybackMode::Looped => {
                        return Err(SceneGraphError::CompletedOnLoop {
                            scene: scene.id.clone(),
                        });
                    }
                    _ => {}
                }
            }

            if let Some(cue) = scene
                .cues
                .iter()
                .find(|cue| cue.delay().is_none())
            {
                return Err(SceneGraphError::InvalidCue {
                    scene: scene.id.clone(),
                    after_secs: cue.after_secs,
                });
            }

            if scene.tap_reveal.as_ref().is_some_and(|tap| tap.threshold == 0) {
                return Err(SceneGraphError::InvalidTapThreshold {
                    scene: scene.id.clone(),
                });
            }
        }

        Ok(())
    }
}
