use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::controller::ControllerConfig;
use crate::playback::PlaybackConfig;
use crate::scene::{BuiltinGraph, SceneGraph, SceneGraphError};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub narrative: NarrativeConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
}

/// Which scene graph to run.
///
/// At most one of `builtin` and `graph_path` may be set; with neither, the
/// branching narrative runs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NarrativeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<BuiltinGraph>,
    /// TOML scene graph file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_path: Option<PathBuf>,
}

/// Where a session's scene graph comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeSource {
    Builtin(BuiltinGraph),
    File(PathBuf),
}

impl NarrativeConfig {
    pub fn source(&self) -> NarrativeSource {
        match (&self.graph_path, self.builtin) {
            (Some(path), _) => NarrativeSource::File(path.clone()),
            (None, Some(builtin)) => NarrativeSource::Builtin(builtin),
            (None, None) => NarrativeSource::Builtin(BuiltinGraph::BranchingNarrative),
        }
    }

    /// Build (or read) the configured graph.
    pub fn load_graph(&self) -> Result<SceneGraph, SceneGraphError> {
        match self.source() {
            NarrativeSource::Builtin(builtin) => Ok(builtin.graph()),
            NarrativeSource::File(path) => SceneGraph::load(&path),
        }
    }
}

/// Asset directory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetsConfig {
    #[serde(default = "default_assets_root")]
    pub root: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: default_assets_root(),
        }
    }
}

fn default_assets_root() -> PathBuf {
    PathBuf::from("assets")
}
