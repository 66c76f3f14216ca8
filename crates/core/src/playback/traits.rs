//! Trait definitions for the playback module.

use super::types::{UnitBinding, UnitId};

/// The renderer a playback unit is shown on.
///
/// A surface decodes and composites frames on its own thread or queue and
/// reports back only through the completion signal in the binding. It holds
/// zero or one units at a time.
pub trait RendererSurface: Send + Sync {
    /// Returns the name of this surface implementation.
    fn name(&self) -> &str;

    /// Whether a capable rendering device exists.
    fn is_supported(&self) -> bool;

    /// Takes a unit. Returns false if the unit cannot be shown (no device,
    /// unsupported clips, or another unit still attached).
    fn attach(&self, binding: UnitBinding) -> bool;

    /// Begins presenting frames of an attached unit.
    fn start(&self, unit: UnitId);

    /// Drops a unit. Unknown ids are ignored.
    fn detach(&self, unit: UnitId);
}
