//! Clip resolution.
//!
//! Turns the asset names written in a scene graph into [`ClipDescriptor`]s
//! the playback layer can use. A matte pair only resolves when both its color
//! and alpha streams exist, so a half-present pair is caught before playback
//! starts rather than while frames are being composited.

mod error;
mod resolver;
mod store;
mod types;

pub use error::ClipError;
pub use resolver::ClipResolver;
pub use store::{AssetStore, FsAssetStore};
pub use types::{AssetLocation, ClipDescriptor, ClipKind, ClipSource, ClipStreams, PlaybackMode};
