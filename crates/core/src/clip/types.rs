//! Clip descriptor types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Whether a clip is a single color stream or a color stream plus alpha mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipKind {
    Opaque,
    AlphaMattePair,
}

impl ClipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipKind::Opaque => "opaque",
            ClipKind::AlphaMattePair => "alpha_matte_pair",
        }
    }
}

impl std::fmt::Display for ClipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a playback unit walks its clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Play every clip once, in order, then finish.
    #[default]
    OnceSequential,
    /// Restart at the first frame of the first clip after the last frame, forever.
    Looped,
}

impl PlaybackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackMode::OnceSequential => "once_sequential",
            PlaybackMode::Looped => "looped",
        }
    }
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an asset lives once the store has found it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetLocation {
    /// Asset name as referenced by scene configuration.
    pub name: String,
    /// Resolved location on disk (or a store-specific path for in-memory stores).
    pub path: PathBuf,
}

impl AssetLocation {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The resolved streams backing a clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipStreams {
    Opaque(AssetLocation),
    AlphaMattePair {
        color: AssetLocation,
        alpha: AssetLocation,
    },
}

/// A resolved, playable clip.
///
/// Only the resolver builds descriptors, so every descriptor refers to
/// streams that existed at resolution time. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipDescriptor {
    streams: ClipStreams,
    mode: PlaybackMode,
}

impl ClipDescriptor {
    pub(crate) fn new(streams: ClipStreams, mode: PlaybackMode) -> Self {
        Self { streams, mode }
    }

    pub fn kind(&self) -> ClipKind {
        match self.streams {
            ClipStreams::Opaque(_) => ClipKind::Opaque,
            ClipStreams::AlphaMattePair { .. } => ClipKind::AlphaMattePair,
        }
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn streams(&self) -> &ClipStreams {
        &self.streams
    }

    /// The color stream. For opaque clips this is the only stream.
    pub fn color(&self) -> &AssetLocation {
        match &self.streams {
            ClipStreams::Opaque(location) => location,
            ClipStreams::AlphaMattePair { color, .. } => color,
        }
    }

    /// The alpha mask stream, if this is a matte pair.
    pub fn alpha(&self) -> Option<&AssetLocation> {
        match &self.streams {
            ClipStreams::Opaque(_) => None,
            ClipStreams::AlphaMattePair { alpha, .. } => Some(alpha),
        }
    }

    /// Asset names in stream order (color first).
    pub fn asset_names(&self) -> Vec<&str> {
        let mut names = vec![self.color().name.as_str()];
        if let Some(alpha) = self.alpha() {
            names.push(alpha.name.as_str());
        }
        names
    }
}

/// A clip reference as written in scene configuration, before resolution.
///
/// ```toml
/// clips = [
///     { asset = "Intro.m4v" },
///     { color = "CarSpin.m4v", alpha = "CarSpin_alpha.m4v" },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClipSource {
    MattePair { color: String, alpha: String },
    Opaque { asset: String },
}

impl ClipSource {
    pub fn opaque(asset: impl Into<String>) -> Self {
        Self::Opaque {
            asset: asset.into(),
        }
    }

    pub fn matte_pair(color: impl Into<String>, alpha: impl Into<String>) -> Self {
        Self::MattePair {
            color: color.into(),
            alpha: alpha.into(),
        }
    }

    pub fn kind(&self) -> ClipKind {
        match self {
            ClipSource::Opaque { .. } => ClipKind::Opaque,
            ClipSource::MattePair { .. } => ClipKind::AlphaMattePair,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Clips {
        clips: Vec<ClipSource>,
    }

    #[test]
    fn test_clip_source_from_toml() {
        let toml = r#"
            clips = [
                { asset = "Intro.m4v" },
                { color = "CarSpin.m4v", alpha = "CarSpin_alpha.m4v" },
            ]
        "#;
        let parsed: Clips = toml::from_str(toml).unwrap();
        assert_eq!(parsed.clips[0], ClipSource::opaque("Intro.m4v"));
        assert_eq!(
            parsed.clips[1],
            ClipSource::matte_pair("CarSpin.m4v", "CarSpin_alpha.m4v")
        );
        assert_eq!(parsed.clips[1].kind(), ClipKind::AlphaMattePair);
    }

    #[test]
    fn test_playback_mode_default_and_serde() {
        assert_eq!(PlaybackMode::default(), PlaybackMode::OnceSequential);
        let json = serde_json::to_string(&PlaybackMode::Looped).unwrap();
        assert_eq!(json, "\"looped\"");
    }

    #[test]
    fn test_descriptor_accessors() {
        let desc = ClipDescriptor::new(
            ClipStreams::AlphaMattePair {
                color: AssetLocation::new("a.m4v", "/assets/a.m4v"),
                alpha: AssetLocation::new("a_alpha.m4v", "/assets/a_alpha.m4v"),
            },
            PlaybackMode::Looped,
        );
        assert_eq!(desc.kind(), ClipKind::AlphaMattePair);
        assert_eq!(desc.mode(), PlaybackMode::Looped);
        assert_eq!(desc.asset_names(), vec!["a.m4v", "a_alpha.m4v"]);
        assert_eq!(desc.alpha().unwrap().name, "a_alpha.m4v");
    }
}
