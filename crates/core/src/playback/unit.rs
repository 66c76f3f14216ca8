//! The playback unit: one queued clip sequence and its attach lifecycle.

use std::sync::{Arc, Weak};

use tracing::{debug, info, warn};

use super::error::PlaybackError;
use super::traits::RendererSurface;
use super::types::{
    CompletionHook, CompletionShared, CompletionSignal, UnitBinding, UnitId, UnitState,
};
use crate::clip::{ClipDescriptor, ClipKind, PlaybackMode};

/// An ordered sequence of clips shown on at most one surface.
///
/// State machine: `Detached → Attached → Playing → Finished`, where
/// `Finished` is only reachable for `OnceSequential` units. `Looped` units
/// stay in `Playing` until detached. Dropping an attached unit detaches it.
pub struct PlaybackUnit {
    id: UnitId,
    clips: Arc<[ClipDescriptor]>,
    mode: PlaybackMode,
    decode_gamma: Option<String>,
    state: UnitState,
    completion: Arc<CompletionShared>,
    // Non-owning: the surface outlives any unit shown on it.
    surface: Option<Weak<dyn RendererSurface>>,
}

impl PlaybackUnit {
    /// Build a unit from resolved clips.
    pub fn new(clips: Vec<ClipDescriptor>, mode: PlaybackMode) -> Result<Self, PlaybackError> {
        let Some(first) = clips.first() else {
            return Err(PlaybackError::EmptySequence);
        };

        if let Some(clip) = clips.iter().find(|clip| clip.mode() != mode) {
            return Err(PlaybackError::ModeMismatch {
                asset: clip.color().name.clone(),
                expected: mode,
                found: clip.mode(),
            });
        }

        if mode == PlaybackMode::Looped {
            let kind: ClipKind = first.kind();
            if clips.iter().any(|clip| clip.kind() != kind) {
                return Err(PlaybackError::NonUniformLoop);
            }
        }

        Ok(Self {
            id: UnitId::next(),
            clips: clips.into(),
            mode,
            decode_gamma: None,
            state: UnitState::Detached,
            completion: Arc::new(CompletionShared::new(None)),
            surface: None,
        })
    }

    /// Attach an opaque decode hint for the surface.
    pub fn with_decode_gamma(mut self, decode_gamma: Option<String>) -> Self {
        self.decode_gamma = decode_gamma;
        self
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn clips(&self) -> &[ClipDescriptor] {
        &self.clips
    }

    /// Register the completion hook. At most one registration per unit.
    pub fn on_completion(&mut self, hook: CompletionHook) -> Result<(), PlaybackError> {
        if self.mode == PlaybackMode::Looped {
            debug!(unit = %self.id, "Completion hook on a looped unit will never run");
        }
        if self.completion.set_hook(hook) {
            Ok(())
        } else {
            Err(PlaybackError::CompletionAlreadyRegistered)
        }
    }

    /// Hand the unit to a surface.
    ///
    /// Returns false, leaving the unit `Detached`, if the surface refuses it
    /// or the unit is not currently detached. Never fatal.
    pub fn attach(&mut self, surface: &Arc<dyn RendererSurface>) -> bool {
        if self.state != UnitState::Detached {
            warn!(unit = %self.id, state = %self.state, "Attach ignored, unit is not detached");
            return false;
        }

        let completion = (self.mode == PlaybackMode::OnceSequential)
            .then(|| CompletionSignal::new(self.id, Arc::clone(&self.completion)));

        let binding = UnitBinding {
            unit: self.id,
            clips: Arc::clone(&self.clips),
            mode: self.mode,
            decode_gamma: self.decode_gamma.clone(),
            completion,
        };

        if !surface.attach(binding) {
            warn!(
                unit = %self.id,
                surface = surface.name(),
                "Attach failed, surface refused the unit"
            );
            return false;
        }

        self.surface = Some(Arc::downgrade(surface));
        self.state = UnitState::Attached;
        debug!(unit = %self.id, surface = surface.name(), clips = self.clips.len(), "Unit attached");
        true
    }

    /// Start presenting frames.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.state != UnitState::Attached {
            return Err(PlaybackError::InvalidState {
                operation: "play",
                state: self.state,
            });
        }

        let Some(surface) = self.surface.as_ref().and_then(Weak::upgrade) else {
            warn!(unit = %self.id, "Surface went away before play");
            self.surface = None;
            self.state = UnitState::Detached;
            return Err(PlaybackError::InvalidState {
                operation: "play",
                state: UnitState::Detached,
            });
        };

        surface.start(self.id);
        self.state = UnitState::Playing;
        info!(unit = %self.id, mode = %self.mode, clips = self.clips.len(), "Playback started");
        Ok(())
    }

    /// Record delivery of the completion signal.
    ///
    /// Returns true exactly once, for a playing `OnceSequential` unit.
    pub fn finish(&mut self) -> bool {
        if self.mode != PlaybackMode::OnceSequential || self.state != UnitState::Playing {
            return false;
        }
        self.state = UnitState::Finished;
        debug!(unit = %self.id, "Playback finished");
        true
    }

    /// Take the unit off its surface. Legal from any state.
    ///
    /// Cancels any completion notification that has not been delivered yet.
    pub fn detach(&mut self) {
        self.completion.cancel();
        // A fresh completion slot for any later attach, keeping the hook.
        self.completion = Arc::new(CompletionShared::new(self.completion.hook()));

        if let Some(surface) = self.surface.take().and_then(|weak| weak.upgrade()) {
            surface.detach(self.id);
            debug!(unit = %self.id, surface = surface.name(), "Unit detached");
        }
        self.state = UnitState::Detached;
    }
}

impl Drop for PlaybackUnit {
    fn drop(&mut self) {
        if self.state != UnitState::Detached {
            self.detach();
        }
    }
}

impl std::fmt::Debug for PlaybackUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackUnit")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("clips", &self.clips.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{ClipResolver, ClipSource};
    use crate::testing::{MockAssetStore, MockSurface, SurfaceEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn clips(sources: &[ClipSource], mode: PlaybackMode) -> Vec<ClipDescriptor> {
        let store = MockAssetStore::with_assets(&[
            "Intro.m4v",
            "ClipA.m4v",
            "CarSpin.m4v",
            "CarSpin_alpha.m4v",
        ]);
        ClipResolver::new(Arc::new(store))
            .resolve_all(sources, mode)
            .unwrap()
    }

    fn intro_clips() -> Vec<ClipDescriptor> {
        clips(
            &[ClipSource::opaque("Intro.m4v"), ClipSource::opaque("ClipA.m4v")],
            PlaybackMode::OnceSequential,
        )
    }

    fn counting_hook() -> (CompletionHook, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (
            Arc::new(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
            count,
        )
    }

    #[test]
    fn test_new_rejects_empty_sequence() {
        let err = PlaybackUnit::new(vec![], PlaybackMode::OnceSequential).unwrap_err();
        assert_eq!(err, PlaybackError::EmptySequence);
    }

    #[test]
    fn test_new_rejects_mode_mismatch() {
        let err = PlaybackUnit::new(intro_clips(), PlaybackMode::Looped).unwrap_err();
        assert!(matches!(err, PlaybackError::ModeMismatch { .. }));
    }

    #[test]
    fn test_new_rejects_mixed_loop() {
        let mixed = clips(
            &[
                ClipSource::opaque("Intro.m4v"),
                ClipSource::matte_pair("CarSpin.m4v", "CarSpin_alpha.m4v"),
            ],
            PlaybackMode::Looped,
        );
        let err = PlaybackUnit::new(mixed, PlaybackMode::Looped).unwrap_err();
        assert_eq!(err, PlaybackError::NonUniformLoop);
    }

    #[test]
    fn test_mixed_kinds_allowed_when_sequential() {
        let mixed = clips(
            &[
                ClipSource::opaque("Intro.m4v"),
                ClipSource::matte_pair("CarSpin.m4v", "CarSpin_alpha.m4v"),
            ],
            PlaybackMode::OnceSequential,
        );
        assert!(PlaybackUnit::new(mixed, PlaybackMode::OnceSequential).is_ok());
    }

    #[test]
    fn test_lifecycle_once_sequential() {
        let mock = Arc::new(MockSurface::new());
        let surface: Arc<dyn RendererSurface> = mock.clone();
        let (hook, count) = counting_hook();

        let mut unit = PlaybackUnit::new(intro_clips(), PlaybackMode::OnceSequential).unwrap();
        unit.on_completion(hook).unwrap();
        assert_eq!(unit.state(), UnitState::Detached);

        assert!(unit.attach(&surface));
        assert_eq!(unit.state(), UnitState::Attached);

        unit.play().unwrap();
        assert_eq!(unit.state(), UnitState::Playing);

        assert!(mock.complete(unit.id()));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(unit.finish());
        assert_eq!(unit.state(), UnitState::Finished);
        assert!(!unit.finish());

        unit.detach();
        assert_eq!(unit.state(), UnitState::Detached);
        assert_eq!(
            mock.events(),
            vec![
                SurfaceEvent::Attached(unit.id()),
                SurfaceEvent::Started(unit.id()),
                SurfaceEvent::Detached(unit.id()),
            ]
        );
    }

    #[test]
    fn test_attach_failure_stays_detached() {
        let mock = Arc::new(MockSurface::new());
        mock.refuse_attach(true);
        let surface: Arc<dyn RendererSurface> = mock.clone();

        let mut unit = PlaybackUnit::new(intro_clips(), PlaybackMode::OnceSequential).unwrap();
        assert!(!unit.attach(&surface));
        assert_eq!(unit.state(), UnitState::Detached);
        assert!(unit.play().is_err());
    }

    #[test]
    fn test_attach_twice_is_rejected() {
        let mock = Arc::new(MockSurface::new());
        let surface: Arc<dyn RendererSurface> = mock.clone();
        let mut unit = PlaybackUnit::new(intro_clips(), PlaybackMode::OnceSequential).unwrap();

        assert!(unit.attach(&surface));
        assert!(!unit.attach(&surface));
        assert_eq!(mock.attach_count(), 1);
    }

    #[test]
    fn test_detach_cancels_pending_completion() {
        let mock = Arc::new(MockSurface::new());
        let surface: Arc<dyn RendererSurface> = mock.clone();
        let (hook, count) = counting_hook();

        let mut unit = PlaybackUnit::new(intro_clips(), PlaybackMode::OnceSequential).unwrap();
        unit.on_completion(hook).unwrap();
        unit.attach(&surface);
        unit.play().unwrap();

        let signal = mock.take_signal(unit.id()).unwrap();
        unit.detach();

        assert!(!signal.notify());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_looped_unit_gets_no_completion_signal() {
        let mock = Arc::new(MockSurface::new());
        let surface: Arc<dyn RendererSurface> = mock.clone();
        let looped = clips(
            &[ClipSource::matte_pair("CarSpin.m4v", "CarSpin_alpha.m4v")],
            PlaybackMode::Looped,
        );

        let mut unit = PlaybackUnit::new(looped, PlaybackMode::Looped).unwrap();
        assert!(unit.attach(&surface));
        unit.play().unwrap();

        assert!(mock.take_signal(unit.id()).is_none());
        assert!(!mock.complete(unit.id()));
        assert!(!unit.finish());
        assert_eq!(unit.state(), UnitState::Playing);
    }

    #[test]
    fn test_second_hook_rejected() {
        let (hook, _) = counting_hook();
        let mut unit = PlaybackUnit::new(intro_clips(), PlaybackMode::OnceSequential).unwrap();
        unit.on_completion(Arc::clone(&hook)).unwrap();
        assert_eq!(
            unit.on_completion(hook).unwrap_err(),
            PlaybackError::CompletionAlreadyRegistered
        );
    }

    #[test]
    fn test_drop_detaches() {
        let mock = Arc::new(MockSurface::new());
        let surface: Arc<dyn RendererSurface> = mock.clone();

        let mut unit = PlaybackUnit::new(intro_clips(), PlaybackMode::OnceSequential).unwrap();
        let id = unit.id();
        unit.attach(&surface);
        drop(unit);

        assert!(mock.attached().is_none());
        assert_eq!(mock.events().last(), Some(&SurfaceEvent::Detached(id)));
    }
}
