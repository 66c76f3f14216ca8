//! Playback configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration for the playback subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Enable/disable video playback.
    /// When disabled, scenes run with timers, overlays and choices only.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Presentation rate of the headless surface (frames per second).
    #[serde(default = "default_fps")]
    pub fps: f32,

    /// Frame count assumed for clips not listed in `clip_frames`.
    #[serde(default = "default_clip_frames")]
    pub default_clip_frames: u32,

    /// Per-asset frame counts, keyed by color stream name.
    #[serde(default)]
    pub clip_frames: HashMap<String, u32>,
}

fn default_enabled() -> bool {
    true
}

fn default_fps() -> f32 {
    30.0
}

fn default_clip_frames() -> u32 {
    90 // 3 seconds at 30 fps
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            fps: default_fps(),
            default_clip_frames: default_clip_frames(),
            clip_frames: HashMap::new(),
        }
    }
}

impl PlaybackConfig {
    /// Frame count for a clip, by color stream name.
    pub fn frames_for(&self, asset: &str) -> u32 {
        self.clip_frames
            .get(asset)
            .copied()
            .unwrap_or(self.default_clip_frames)
    }
}
