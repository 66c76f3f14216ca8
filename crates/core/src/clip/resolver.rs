//! Maps asset names from scene configuration to playable descriptors.

use std::sync::Arc;

use super::error::ClipError;
use super::store::AssetStore;
use super::types::{ClipDescriptor, ClipSource, ClipStreams, PlaybackMode};

/// Resolves clip references against an asset store.
///
/// Resolution is synchronous and side-effect free. Missing streams are
/// reported here so that playback never starts with half a matte pair.
#[derive(Clone)]
pub struct ClipResolver {
    store: Arc<dyn AssetStore>,
}

impl ClipResolver {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Resolve a single opaque clip.
    pub fn resolve(&self, name: &str, mode: PlaybackMode) -> Result<ClipDescriptor, ClipError> {
        let location = self
            .store
            .locate(name)
            .ok_or_else(|| ClipError::AssetNotFound {
                name: name.to_string(),
            })?;
        Ok(ClipDescriptor::new(ClipStreams::Opaque(location), mode))
    }

    /// Resolve a color stream plus its alpha mask.
    pub fn resolve_pair(
        &self,
        color: &str,
        alpha: &str,
        mode: PlaybackMode,
    ) -> Result<ClipDescriptor, ClipError> {
        let color_location = self.store.locate(color);
        let alpha_location = self.store.locate(alpha);

        match (color_location, alpha_location) {
            (Some(color), Some(alpha)) => Ok(ClipDescriptor::new(
                ClipStreams::AlphaMattePair { color, alpha },
                mode,
            )),
            (color_location, alpha_location) => {
                let mut missing = Vec::new();
                if color_location.is_none() {
                    missing.push(color.to_string());
                }
                if alpha_location.is_none() {
                    missing.push(alpha.to_string());
                }
                Err(ClipError::IncompletePair {
                    color: color.to_string(),
                    alpha: alpha.to_string(),
                    missing,
                })
            }
        }
    }

    pub fn resolve_source(
        &self,
        source: &ClipSource,
        mode: PlaybackMode,
    ) -> Result<ClipDescriptor, ClipError> {
        match source {
            ClipSource::Opaque { asset } => self.resolve(asset, mode),
            ClipSource::MattePair { color, alpha } => self.resolve_pair(color, alpha, mode),
        }
    }

    /// Resolve a whole clip sequence, failing on the first unresolvable entry.
    pub fn resolve_all(
        &self,
        sources: &[ClipSource],
        mode: PlaybackMode,
    ) -> Result<Vec<ClipDescriptor>, ClipError> {
        sources
            .iter()
            .map(|source| self.resolve_source(source, mode))
            .collect()
    }
}

impl std::fmt::Debug for ClipResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipResolver")
            .field("store", &self.store.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipKind;
    use crate::testing::MockAssetStore;

    fn resolver(assets: &[&str]) -> ClipResolver {
        ClipResolver::new(Arc::new(MockAssetStore::with_assets(assets)))
    }

    #[test]
    fn test_resolve_opaque() {
        let resolver = resolver(&["Intro.m4v"]);
        let desc = resolver
            .resolve("Intro.m4v", PlaybackMode::OnceSequential)
            .unwrap();
        assert_eq!(desc.kind(), ClipKind::Opaque);
        assert_eq!(desc.color().name, "Intro.m4v");
        assert!(desc.alpha().is_none());
    }

    #[test]
    fn test_resolve_missing_asset() {
        let resolver = resolver(&[]);
        let err = resolver
            .resolve("Intro.m4v", PlaybackMode::OnceSequential)
            .unwrap_err();
        assert!(matches!(err, ClipError::AssetNotFound { ref name } if name == "Intro.m4v"));
    }

    #[test]
    fn test_resolve_pair() {
        let resolver = resolver(&["CarSpin.m4v", "CarSpin_alpha.m4v"]);
        let desc = resolver
            .resolve_pair("CarSpin.m4v", "CarSpin_alpha.m4v", PlaybackMode::Looped)
            .unwrap();
        assert_eq!(desc.kind(), ClipKind::AlphaMattePair);
        assert_eq!(desc.mode(), PlaybackMode::Looped);
        assert_eq!(desc.alpha().unwrap().name, "CarSpin_alpha.m4v");
    }

    #[test]
    fn test_resolve_pair_missing_alpha() {
        let resolver = resolver(&["CarSpin.m4v"]);
        let err = resolver
            .resolve_pair("CarSpin.m4v", "CarSpin_alpha.m4v", PlaybackMode::Looped)
            .unwrap_err();
        match err {
            ClipError::IncompletePair { missing, .. } => {
                assert_eq!(missing, vec!["CarSpin_alpha.m4v".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_pair_missing_both() {
        let resolver = resolver(&[]);
        let err = resolver
            .resolve_pair("c.m4v", "a.m4v", PlaybackMode::Looped)
            .unwrap_err();
        assert_eq!(err.missing_assets(), vec!["c.m4v", "a.m4v"]);
    }

    #[test]
    fn test_resolve_all_stops_at_first_failure() {
        let resolver = resolver(&["Intro.m4v"]);
        let sources = vec![
            ClipSource::opaque("Intro.m4v"),
            ClipSource::opaque("Missing.m4v"),
        ];
        let err = resolver
            .resolve_all(&sources, PlaybackMode::OnceSequential)
            .unwrap_err();
        assert_eq!(err.missing_assets(), vec!["Missing.m4v"]);

        let ok = resolver
            .resolve_all(&sources[..1], PlaybackMode::OnceSequential)
            .unwrap();
        assert_eq!(ok.len(), 1);
    }
}
