//! Mock asset store for testing.

use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use crate::clip::{AssetLocation, AssetStore, ClipError};

/// In-memory asset store. Assets exist by name only; opening one yields the
/// name's bytes.
#[derive(Debug, Default)]
pub struct MockAssetStore {
    assets: RwLock<HashSet<String>>,
    lookups: Mutex<Vec<String>>,
}

impl MockAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assets(names: &[&str]) -> Self {
        let store = Self::new();
        for name in names {
            store.insert(name);
        }
        store
    }

    pub fn insert(&self, name: &str) {
        self.assets
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string());
    }

    pub fn remove(&self, name: &str) -> bool {
        self.assets
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name)
    }

    /// Every name passed to `locate`, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl AssetStore for MockAssetStore {
    fn name(&self) -> &str {
        "mock"
    }

    fn locate(&self, name: &str) -> Option<AssetLocation> {
        self.lookups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(name.to_string());

        let assets = self.assets.read().unwrap_or_else(|e| e.into_inner());
        assets
            .contains(name)
            .then(|| AssetLocation::new(name, PathBuf::from("/mock-assets").join(name)))
    }

    fn open(&self, name: &str) -> Result<Box<dyn Read + Send>, ClipError> {
        self.locate(name).ok_or_else(|| ClipError::AssetNotFound {
            name: name.to_string(),
        })?;
        Ok(Box::new(Cursor::new(name.as_bytes().to_vec())))
    }
}
