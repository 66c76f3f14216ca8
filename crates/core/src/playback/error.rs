//! Error types for the playback module.

use thiserror::Error;

use super::types::UnitState;
use crate::clip::PlaybackMode;

/// Errors raised when building or driving a playback unit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// A unit needs at least one clip.
    #[error("Playback unit needs at least one clip")]
    EmptySequence,

    /// A clip was resolved for a different playback mode than the unit.
    #[error("Clip {asset} was resolved as {found} but the unit plays {expected}")]
    ModeMismatch {
        asset: String,
        expected: PlaybackMode,
        found: PlaybackMode,
    },

    /// Looped units must cycle clips of a single kind.
    #[error("Looped playback requires clips of a single kind")]
    NonUniformLoop,

    /// Operation not legal in the unit's current state.
    #[error("Cannot {operation} a unit in state {state}")]
    InvalidState {
        operation: &'static str,
        state: UnitState,
    },

    /// A completion hook is already registered on this unit.
    #[error("Completion hook already registered")]
    CompletionAlreadyRegistered,

    /// A clip reported zero frames.
    #[error("Clip {asset} has no frames")]
    EmptyClip { asset: String },
}
