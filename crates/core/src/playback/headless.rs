//! A renderer surface that presents frames on a timer without drawing them.
//!
//! Used by the player binary when no GPU compositor is wired in, and by tests
//! that want real frame timing. Frames are stepped on a tokio interval at the
//! configured rate; the completion signal fires after the final frame.

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::config::PlaybackConfig;
use super::cursor::{FrameCursor, FrameStep};
use super::traits::RendererSurface;
use super::types::{CompletionSignal, UnitBinding, UnitId};

struct Slot {
    unit: UnitId,
    pending: Option<(FrameCursor, Option<CompletionSignal>)>,
    task: Option<JoinHandle<()>>,
}

/// Timer-driven surface holding at most one unit.
pub struct HeadlessSurface {
    config: PlaybackConfig,
    device_available: bool,
    slot: Mutex<Option<Slot>>,
}

impl HeadlessSurface {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            device_available: true,
            slot: Mutex::new(None),
        }
    }

    /// A surface that reports no usable rendering device.
    pub fn without_device(config: PlaybackConfig) -> Self {
        let mut surface = Self::new(config);
        surface.device_available = false;
        surface
    }

    /// The currently attached unit, if any.
    pub fn attached(&self) -> Option<UnitId> {
        self.lock().as_ref().map(|slot| slot.unit)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Slot>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn frame_period(&self) -> Duration {
        let fps = if self.config.fps.is_finite() && self.config.fps > 0.0 {
            self.config.fps
        } else {
            30.0
        };
        Duration::from_secs_f64(1.0 / f64::from(fps))
    }
}

impl RendererSurface for HeadlessSurface {
    fn name(&self) -> &str {
        "headless"
    }

    fn is_supported(&self) -> bool {
        self.device_available
    }

    fn attach(&self, binding: UnitBinding) -> bool {
        if !self.device_available {
            return false;
        }

        let mut slot = self.lock();
        if let Some(existing) = slot.as_ref() {
            warn!(
                attached = %existing.unit,
                requested = %binding.unit,
                "Surface already has an attached unit"
            );
            return false;
        }

        let cursor = match FrameCursor::new(&binding.clips, binding.mode, |clip| {
            self.config.frames_for(&clip.color().name)
        }) {
            Ok(cursor) => cursor,
            Err(e) => {
                warn!(unit = %binding.unit, "Cannot present unit: {}", e);
                return false;
            }
        };

        debug!(
            unit = %binding.unit,
            mode = %binding.mode,
            frames = cursor.frames_per_pass(),
            decode_gamma = binding.decode_gamma.as_deref().unwrap_or("default"),
            "Headless surface took unit"
        );

        *slot = Some(Slot {
            unit: binding.unit,
            pending: Some((cursor, binding.completion)),
            task: None,
        });
        true
    }

    fn start(&self, unit: UnitId) {
        let period = self.frame_period();
        let mut slot = self.lock();
        let Some(active) = slot.as_mut().filter(|active| active.unit == unit) else {
            warn!(unit = %unit, "Start for a unit that is not attached");
            return;
        };
        let Some((mut cursor, mut completion)) = active.pending.take() else {
            debug!(unit = %unit, "Unit already started");
            return;
        };
        if tokio::runtime::Handle::try_current().is_err() {
            warn!(unit = %unit, "No async runtime, frames will not be presented");
            return;
        }

        active.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match cursor.advance() {
                    Some(FrameStep::Frame { clip, frame, alpha }) => {
                        trace!(unit = %unit, clip, frame, alpha, "Frame presented");
                    }
                    Some(FrameStep::Finished) => {
                        if let Some(signal) = completion.take() {
                            signal.notify();
                        }
                        debug!(unit = %unit, "Headless playback reached the end");
                        break;
                    }
                    None => break,
                }
            }
        }));
    }

    fn detach(&self, unit: UnitId) {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|active| active.unit == unit) {
            if let Some(task) = slot.take().and_then(|active| active.task) {
                task.abort();
            }
        }
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        if let Some(task) = self.lock().take().and_then(|active| active.task) {
            task.abort();
        }
    }
}
