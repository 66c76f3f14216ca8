//! Asset store trait and the filesystem implementation.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use super::error::ClipError;
use super::types::AssetLocation;

/// Where clip bytes come from.
///
/// Lookups are synchronous and must not have side effects beyond reading
/// metadata; the resolver calls `locate` while a scene is being entered.
pub trait AssetStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Finds an asset by name.
    fn locate(&self, name: &str) -> Option<AssetLocation>;

    /// Opens the byte stream of an asset.
    fn open(&self, name: &str) -> Result<Box<dyn Read + Send>, ClipError> {
        let location = self.locate(name).ok_or_else(|| ClipError::AssetNotFound {
            name: name.to_string(),
        })?;
        let file = File::open(&location.path).map_err(|source| ClipError::Open {
            name: name.to_string(),
            source,
        })?;
        Ok(Box::new(file))
    }
}

/// Asset store backed by a flat directory of clip files.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Asset names are plain file names; anything with separators or parent
/// references never resolves.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl AssetStore for FsAssetStore {
    fn name(&self) -> &str {
        "fs"
    }

    fn locate(&self, name: &str) -> Option<AssetLocation> {
        if !is_plain_file_name(name) {
            tracing::debug!(asset = name, "Rejected asset name that is not a plain file name");
            return None;
        }
        let path = self.root.join(name);
        path.is_file().then(|| AssetLocation::new(name, path))
    }
}
