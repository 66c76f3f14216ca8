//! Playback units and the renderer surface they attach to.
//!
//! A [`PlaybackUnit`] owns one queued clip sequence. It is handed to a
//! [`RendererSurface`] on attach as a [`UnitBinding`]; the surface reports back
//! only through the single-use [`CompletionSignal`] in that binding, and only
//! for `OnceSequential` units.
//!
//! # Example
//!
//! ```ignore
//! use loopstage_core::playback::{HeadlessSurface, PlaybackConfig, PlaybackUnit};
//!
//! let surface: Arc<dyn RendererSurface> = Arc::new(HeadlessSurface::new(PlaybackConfig::default()));
//! let mut unit = PlaybackUnit::new(clips, PlaybackMode::OnceSequential)?;
//! unit.on_completion(Arc::new(|id| println!("{id} finished")))?;
//! if unit.attach(&surface) {
//!     unit.play()?;
//! }
//! ```

mod config;
mod cursor;
mod error;
mod headless;
mod traits;
mod types;
mod unit;

pub use config::PlaybackConfig;
pub use cursor::{FrameCursor, FrameStep};
pub use error::PlaybackError;
pub use headless::HeadlessSurface;
pub use traits::RendererSurface;
pub use types::{CompletionHook, CompletionSignal, UnitBinding, UnitId, UnitState};
pub use unit::PlaybackUnit;
