//! Scene controller implementation.
//!
//! Drives a session through its scene graph:
//! - Entry: resolve clips, attach and play the unit, arm triggers
//! - Events: completion, dwell, choice, cue and tap signals arrive on one queue
//! - Exit: close triggers, detach the unit, present the transition, enter next

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clip::{ClipResolver, PlaybackMode};
use crate::metrics;
use crate::playback::{CompletionHook, PlaybackUnit, RendererSurface};
use crate::scene::{Scene, SceneGraph, SceneId, TriggerKind};

use super::config::ControllerConfig;
use super::events::{ControllerEvent, NoticeEnvelope, OverlayCause, SceneNotice, SceneSignal};
use super::handle::ControllerHandle;
use super::presenter::ScenePresenter;
use super::trigger::{InputGate, Latch, TapCounter, TapOutcome};
use super::types::{
    ControllerError, ControllerStatus, DegradeReason, Dispatch, IgnoreReason, SceneToken,
};

/// One entry into a scene.
struct ActiveScene {
    token: SceneToken,
    scene: Scene,
    unit: Option<PlaybackUnit>,
    guard: Latch,
    taps: TapCounter,
    entered_at: Instant,
}

/// The scene controller: owns the active scene and its playback unit.
///
/// Every state change happens inside [`dispatch`](Self::dispatch), on the task
/// that owns the controller. Timers, the surface and user input only post
/// [`ControllerEvent`]s into the queue.
pub struct SceneController {
    session: Uuid,
    config: ControllerConfig,
    graph: Arc<SceneGraph>,
    resolver: ClipResolver,
    surface: Arc<dyn RendererSurface>,
    presenter: Arc<dyn ScenePresenter>,

    tx: mpsc::UnboundedSender<ControllerEvent>,
    rx: mpsc::UnboundedReceiver<ControllerEvent>,
    gate: Arc<InputGate>,
    notices: broadcast::Sender<NoticeEnvelope>,

    // Runtime state
    playback_enabled: bool,
    video_enabled: bool,
    started: bool,
    ended: bool,
    next_token: u64,
    current: Option<ActiveScene>,
}

impl SceneController {
    /// Create a new controller. Nothing happens until [`start`](Self::start).
    pub fn new(
        graph: Arc<SceneGraph>,
        resolver: ClipResolver,
        surface: Arc<dyn RendererSurface>,
        presenter: Arc<dyn ScenePresenter>,
        config: ControllerConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (notices, _) = broadcast::channel(config.notice_capacity.max(1));

        Self {
            session: Uuid::new_v4(),
            config,
            graph,
            resolver,
            surface,
            presenter,
            tx,
            rx,
            gate: Arc::new(InputGate::new()),
            notices,
            playback_enabled: true,
            video_enabled: true,
            started: false,
            ended: false,
            next_token: 0,
            current: None,
        }
    }

    /// Turn video off for the whole session, as if no device were available.
    pub fn with_playback_enabled(mut self, enabled: bool) -> Self {
        self.playback_enabled = enabled;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session
    }

    /// A handle for posting user input.
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle::new(self.tx.clone(), Arc::clone(&self.gate))
    }

    /// Subscribe to session notices.
    pub fn subscribe(&self) -> broadcast::Receiver<NoticeEnvelope> {
        self.notices.subscribe()
    }

    pub fn status(&self) -> ControllerStatus {
        let current = self.current.as_ref();
        let unit = current.and_then(|active| active.unit.as_ref());
        ControllerStatus {
            session: self.session.to_string(),
            started: self.started,
            video_enabled: self.video_enabled,
            scene: current.map(|active| active.scene.id.clone()),
            instance: current.map(|active| active.token),
            unit: unit.map(PlaybackUnit::id),
            unit_state: unit.map(PlaybackUnit::state),
            transition_committed: current.is_some_and(|active| active.guard.is_fired()),
            taps: current.map_or(0, |active| active.taps.count()),
        }
    }

    /// Check the device and enter the initial scene.
    pub async fn start(&mut self) -> Result<(), ControllerError> {
        if self.started {
            return Err(ControllerError::AlreadyStarted);
        }
        let initial = self.graph.initial.clone();
        if self.graph.get(&initial).is_none() {
            return Err(ControllerError::UnknownScene(initial));
        }
        self.started = true;

        if !self.playback_enabled {
            self.video_enabled = false;
            self.degrade(None, DegradeReason::PlaybackDisabled);
        } else if !self.surface.is_supported() {
            self.video_enabled = false;
            self.degrade(None, DegradeReason::DeviceUnsupported);
        }

        info!(
            session = %self.session,
            initial = %initial,
            scenes = self.graph.scenes.len(),
            video = self.video_enabled,
            surface = self.surface.name(),
            presenter = self.presenter.name(),
            "Starting scene controller"
        );
        self.emit(SceneNotice::SessionStarted {
            session: self.session.to_string(),
            initial: initial.clone(),
            video_enabled: self.video_enabled,
        });

        self.enter(&initial).await
    }

    /// Start if needed, then process events until shutdown.
    pub async fn run(&mut self) -> Result<(), ControllerError> {
        if !self.started {
            self.start().await?;
        }
        while !self.ended {
            if self.step().await.is_none() {
                break;
            }
        }
        info!(session = %self.session, "Scene controller stopped");
        Ok(())
    }

    /// Wait for the next event and dispatch it.
    pub async fn step(&mut self) -> Option<Dispatch> {
        let event = self.rx.recv().await?;
        Some(self.dispatch(event).await)
    }

    /// Dispatch the next event if one is already queued.
    pub async fn try_step(&mut self) -> Option<Dispatch> {
        let event = self.rx.try_recv().ok()?;
        Some(self.dispatch(event).await)
    }

    /// Process one event.
    pub async fn dispatch(&mut self, event: ControllerEvent) -> Dispatch {
        let (instance, signal) = match event {
            ControllerEvent::Shutdown => {
                self.shutdown().await;
                return Dispatch::Shutdown;
            }
            ControllerEvent::Scene { instance, signal } => (instance, signal),
        };

        let Some(active) = self.current.as_mut() else {
            return self.ignore(None, IgnoreReason::NoActiveScene);
        };
        if active.token != instance {
            let scene = active.scene.id.clone();
            debug!(scene = %scene, current = %active.token, stale = %instance, ?signal, "Stale event");
            return self.ignore(Some(scene), IgnoreReason::StaleInstance);
        }

        match signal {
            SceneSignal::PlaybackFinished(unit_id) => {
                let scene = active.scene.id.clone();
                let Some(unit) = active.unit.as_mut().filter(|unit| unit.id() == unit_id) else {
                    return self.ignore(Some(scene), IgnoreReason::StaleUnit);
                };
                if !unit.finish() {
                    return self.ignore(Some(scene), IgnoreReason::DuplicateCompletion);
                }
                self.try_transition(TriggerKind::Completed).await
            }
            SceneSignal::DwellElapsed(_) => self.try_transition(TriggerKind::DwellElapsed).await,
            SceneSignal::Choice(choice) => self.try_transition(choice.trigger_kind()).await,
            SceneSignal::Cue(index) => {
                let scene = active.scene.id.clone();
                if active.guard.is_fired() {
                    return self.ignore(Some(scene), IgnoreReason::TransitionGuardSet);
                }
                let Some(cue) = active.scene.cues.get(index) else {
                    return self.ignore(Some(scene), IgnoreReason::NoMatchingRule);
                };
                let overlay = cue.overlay.clone();
                self.reveal(scene, overlay, OverlayCause::Cue).await
            }
            SceneSignal::Tap => {
                let scene = active.scene.id.clone();
                match active.taps.record() {
                    TapOutcome::Counted(count) => {
                        metrics::TAPS_TOTAL.inc();
                        debug!(scene = %scene, count, "Tap counted");
                        Dispatch::TapCounted { count }
                    }
                    TapOutcome::Reveal(count) => {
                        metrics::TAPS_TOTAL.inc();
                        let Some(reveal) = active.scene.tap_reveal.as_ref() else {
                            return Dispatch::TapCounted { count };
                        };
                        let overlay = reveal.overlay.clone();
                        info!(scene = %scene, count, "Tap threshold reached");
                        self.reveal(scene, overlay, OverlayCause::TapThreshold).await
                    }
                    TapOutcome::AlreadyRevealed => {
                        self.ignore(Some(scene), IgnoreReason::RevealAlreadyShown)
                    }
                }
            }
        }
    }

    /// Commit the current scene's rule for `kind`, if it has one and has not
    /// transitioned yet.
    async fn try_transition(&mut self, kind: TriggerKind) -> Dispatch {
        let Some(active) = self.current.as_mut() else {
            return self.ignore(None, IgnoreReason::NoActiveScene);
        };
        let from = active.scene.id.clone();
        if active.guard.is_fired() {
            return self.ignore(Some(from), IgnoreReason::TransitionGuardSet);
        }
        let Some(rule) = active.scene.rule_for(kind) else {
            return self.ignore(Some(from), IgnoreReason::NoMatchingRule);
        };
        let to = rule.to.clone();
        active.guard.fire();

        // Exit: triggers off, unit off the surface, then the next scene.
        self.gate.close_choices();
        if self.config.hide_choices_on_transition && active.scene.accepts_choices() {
            self.presenter.set_choices_visible(false).await;
        }
        if let Some(mut exited) = self.current.take() {
            if let Some(unit) = exited.unit.as_mut() {
                unit.detach();
            }
            metrics::SCENE_DURATION
                .with_label_values(&[from.as_str()])
                .observe(exited.entered_at.elapsed().as_secs_f64());
        }

        info!(from = %from, to = %to, trigger = %kind, "Transition committed");
        metrics::TRANSITIONS_TOTAL
            .with_label_values(&[kind.as_str()])
            .inc();
        self.emit(SceneNotice::TransitionCommitted {
            from: from.clone(),
            to: to.clone(),
            trigger: kind,
        });

        self.presenter.perform_transition(&to).await;

        if let Err(e) = self.enter(&to).await {
            error!(scene = %to, "Failed to enter scene: {}", e);
        }
        Dispatch::Transitioned { from, to }
    }

    /// Enter a scene: new instance, unit, triggers.
    async fn enter(&mut self, id: &SceneId) -> Result<(), ControllerError> {
        let scene = self
            .graph
            .get(id)
            .cloned()
            .ok_or_else(|| ControllerError::UnknownScene(id.clone()))?;

        self.next_token += 1;
        let token = SceneToken::new(self.next_token);
        self.gate.enter(token);

        info!(scene = %scene.id, instance = %token, "Entering scene");
        metrics::SCENES_ENTERED
            .with_label_values(&[scene.id.as_str()])
            .inc();
        self.emit(SceneNotice::SceneEntered {
            scene: scene.id.clone(),
            instance: token,
        });

        let unit = self.build_unit(&scene, token);

        if let Some(dwell) = scene.dwell() {
            self.spawn_timer(token, dwell, SceneSignal::DwellElapsed(dwell));
        }
        for (index, cue) in scene.cues.iter().enumerate() {
            let Some(delay) = cue.delay() else {
                warn!(scene = %scene.id, after_secs = cue.after_secs, "Skipping cue with invalid delay");
                continue;
            };
            self.spawn_timer(token, delay, SceneSignal::Cue(index));
        }
        if scene.accepts_choices() {
            self.gate.open_choices(token, &scene.offered_choices());
            self.presenter.set_choices_visible(true).await;
        }

        let taps = TapCounter::new(scene.tap_reveal.as_ref().map(|reveal| reveal.threshold));
        self.current = Some(ActiveScene {
            token,
            scene,
            unit,
            guard: Latch::default(),
            taps,
            entered_at: Instant::now(),
        });
        Ok(())
    }

    /// Resolve, attach and start the scene's unit. Every failure degrades the
    /// scene to running without video.
    fn build_unit(&self, scene: &Scene, token: SceneToken) -> Option<PlaybackUnit> {
        if scene.clips.is_empty() {
            return None;
        }
        if !self.video_enabled {
            debug!(scene = %scene.id, "Video disabled for session, skipping clips");
            return None;
        }

        let clips = match self.resolver.resolve_all(&scene.clips, scene.playback) {
            Ok(clips) => clips,
            Err(e) => {
                warn!(scene = %scene.id, store = self.resolver.store_name(), "Clip resolution failed: {}", e);
                self.degrade(Some(scene.id.clone()), DegradeReason::from(&e));
                return None;
            }
        };

        let mut unit = match PlaybackUnit::new(clips, scene.playback) {
            Ok(unit) => unit.with_decode_gamma(scene.decode_gamma.clone()),
            Err(e) => {
                self.degrade(
                    Some(scene.id.clone()),
                    DegradeReason::InvalidUnit {
                        message: e.to_string(),
                    },
                );
                return None;
            }
        };

        if scene.playback == PlaybackMode::OnceSequential {
            let tx = self.tx.clone();
            let hook: CompletionHook = Arc::new(move |unit_id| {
                let event = ControllerEvent::scene(token, SceneSignal::PlaybackFinished(unit_id));
                if tx.send(event).is_err() {
                    debug!(unit = %unit_id, "Completion after controller shut down");
                }
            });
            if let Err(e) = unit.on_completion(hook) {
                warn!(unit = %unit.id(), "Failed to register completion hook: {}", e);
            }
        }

        if !unit.attach(&self.surface) {
            self.degrade(Some(scene.id.clone()), DegradeReason::AttachFailure);
            return None;
        }
        if let Err(e) = unit.play() {
            unit.detach();
            self.degrade(
                Some(scene.id.clone()),
                DegradeReason::InvalidUnit {
                    message: e.to_string(),
                },
            );
            return None;
        }

        metrics::UNITS_STARTED
            .with_label_values(&[unit.mode().as_str()])
            .inc();
        self.emit(SceneNotice::PlaybackStarted {
            scene: scene.id.clone(),
            unit: unit.id(),
            clips: unit.clips().len(),
            mode: unit.mode(),
        });
        Some(unit)
    }

    /// One-shot timer posting `signal` for `token`. Never cancelled; a late
    /// firing is dropped by the instance check in `dispatch`.
    fn spawn_timer(&self, token: SceneToken, delay: Duration, signal: SceneSignal) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(ControllerEvent::scene(token, signal));
        });
    }

    async fn reveal(&mut self, scene: SceneId, overlay: String, cause: OverlayCause) -> Dispatch {
        info!(scene = %scene, overlay = %overlay, cause = cause.as_str(), "Revealing overlay");
        self.presenter.reveal_overlay(&overlay).await;
        metrics::OVERLAYS_REVEALED
            .with_label_values(&[cause.as_str()])
            .inc();
        self.emit(SceneNotice::OverlayRevealed {
            scene,
            overlay: overlay.clone(),
            cause,
        });
        Dispatch::OverlayRevealed { overlay }
    }

    async fn shutdown(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.gate.close();

        let last_scene = match self.current.take() {
            Some(mut active) => {
                if let Some(unit) = active.unit.as_mut() {
                    unit.detach();
                }
                Some(active.scene.id)
            }
            None => None,
        };

        info!(session = %self.session, last_scene = ?last_scene, "Session ended");
        self.emit(SceneNotice::SessionEnded { last_scene });
    }

    fn degrade(&self, scene: Option<SceneId>, reason: DegradeReason) {
        warn!(scene = ?scene, reason = reason.as_str(), "Continuing without video");
        metrics::DEGRADATIONS_TOTAL
            .with_label_values(&[reason.as_str()])
            .inc();
        self.emit(SceneNotice::Degraded { scene, reason });
    }

    fn ignore(&self, scene: Option<SceneId>, reason: IgnoreReason) -> Dispatch {
        debug!(scene = ?scene, reason = reason.as_str(), "Event ignored");
        metrics::EVENTS_IGNORED
            .with_label_values(&[reason.as_str()])
            .inc();
        self.emit(SceneNotice::EventIgnored { scene, reason });
        Dispatch::Ignored(reason)
    }

    fn emit(&self, notice: SceneNotice) {
        // No subscribers is fine.
        let _ = self.notices.send(NoticeEnvelope::new(notice));
    }
}

impl std::fmt::Debug for SceneController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneController")
            .field("session", &self.session)
            .field("started", &self.started)
            .field("video_enabled", &self.video_enabled)
            .field("scene", &self.current.as_ref().map(|active| &active.scene.id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Choice, Trigger};
    use crate::testing::fixtures;
    use crate::testing::{MockPresenter, MockSurface, PresenterCall};

    fn controller(graph: SceneGraph, surface: Arc<MockSurface>) -> (SceneController, Arc<MockPresenter>) {
        let presenter = Arc::new(MockPresenter::new());
        let ctl = SceneController::new(
            Arc::new(graph),
            fixtures::full_resolver(),
            surface,
            presenter.clone(),
            ControllerConfig::default(),
        );
        (ctl, presenter)
    }

    #[tokio::test]
    async fn test_start_twice() {
        let (mut ctl, _) = controller(SceneGraph::branching_narrative(), Arc::new(MockSurface::new()));
        ctl.start().await.unwrap();
        assert!(matches!(ctl.start().await, Err(ControllerError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn test_start_enters_initial_scene() {
        let (mut ctl, _) = controller(SceneGraph::branching_narrative(), Arc::new(MockSurface::new()));
        let mut notices = ctl.subscribe();
        ctl.start().await.unwrap();

        let status = ctl.status();
        assert!(status.started);
        assert_eq!(status.scene, Some(SceneId::from("splash")));
        assert!(status.unit.is_none());

        let first = notices.recv().await.unwrap();
        assert_eq!(first.notice.notice_type(), "session_started");
        let second = notices.recv().await.unwrap();
        assert_eq!(second.notice.notice_type(), "scene_entered");
    }

    #[tokio::test]
    async fn test_completion_transitions_once() {
        let graph = SceneGraph::new(
            "intro",
            vec![
                Scene::new("intro")
                    .with_clips(PlaybackMode::OnceSequential, fixtures::intro_sources())
                    .on(Trigger::Completed, "end"),
                Scene::new("end"),
            ],
        )
        .unwrap();
        let surface = Arc::new(MockSurface::new());
        let (mut ctl, presenter) = controller(graph, surface.clone());
        ctl.start().await.unwrap();

        let unit = ctl.status().unit.unwrap();
        assert!(surface.complete(unit));
        assert!(!surface.complete(unit));

        assert_eq!(
            ctl.try_step().await,
            Some(Dispatch::Transitioned {
                from: SceneId::from("intro"),
                to: SceneId::from("end"),
            })
        );
        assert!(ctl.try_step().await.is_none());
        assert_eq!(
            presenter.calls(),
            vec![PresenterCall::Transition(SceneId::from("end"))]
        );
        assert!(surface.attached().is_none());
    }

    #[tokio::test]
    async fn test_event_for_old_instance_is_ignored() {
        let graph = SceneGraph::new(
            "choose",
            vec![
                Scene::new("choose")
                    .on(Trigger::ChoiceA, "end")
                    .on(Trigger::ChoiceB, "end"),
                Scene::new("end"),
            ],
        )
        .unwrap();
        let (mut ctl, _) = controller(graph, Arc::new(MockSurface::new()));
        ctl.start().await.unwrap();
        let old = ctl.status().instance.unwrap();

        assert!(ctl.handle().choose(Choice::A));
        ctl.try_step().await.unwrap();

        let late = ControllerEvent::scene(old, SceneSignal::Choice(Choice::B));
        assert_eq!(
            ctl.dispatch(late).await,
            Dispatch::Ignored(IgnoreReason::StaleInstance)
        );
    }

    #[tokio::test]
    async fn test_completion_from_other_unit_ignored() {
        let graph = SceneGraph::new(
            "intro",
            vec![
                Scene::new("intro")
                    .with_clips(PlaybackMode::OnceSequential, fixtures::intro_sources())
                    .on(Trigger::Completed, "end"),
                Scene::new("end"),
            ],
        )
        .unwrap();
        let (mut ctl, _) = controller(graph, Arc::new(MockSurface::new()));
        ctl.start().await.unwrap();
        let instance = ctl.status().instance.unwrap();

        let bogus = ControllerEvent::scene(
            instance,
            SceneSignal::PlaybackFinished(crate::playback::UnitId::next()),
        );
        assert_eq!(
            ctl.dispatch(bogus).await,
            Dispatch::Ignored(IgnoreReason::StaleUnit)
        );
    }

    #[tokio::test]
    async fn test_no_rule_for_trigger() {
        let (mut ctl, _) = controller(SceneGraph::tap_reveal_loop(), Arc::new(MockSurface::new()));
        ctl.start().await.unwrap();
        let instance = ctl.status().instance.unwrap();

        let dwell = ControllerEvent::scene(
            instance,
            SceneSignal::DwellElapsed(Duration::from_secs(1)),
        );
        assert_eq!(
            ctl.dispatch(dwell).await,
            Dispatch::Ignored(IgnoreReason::NoMatchingRule)
        );
    }

    #[tokio::test]
    async fn test_device_unsupported_disables_video() {
        let surface = Arc::new(MockSurface::new());
        surface.set_supported(false);
        let (mut ctl, _) = controller(SceneGraph::tap_reveal_loop(), surface.clone());
        ctl.start().await.unwrap();

        let status = ctl.status();
        assert!(!status.video_enabled);
        assert!(status.unit.is_none());
        assert_eq!(surface.attach_count(), 0);
    }

    #[tokio::test]
    async fn test_playback_disabled() {
        let surface = Arc::new(MockSurface::new());
        let presenter = Arc::new(MockPresenter::new());
        let mut ctl = SceneController::new(
            Arc::new(SceneGraph::tap_reveal_loop()),
            fixtures::full_resolver(),
            surface.clone(),
            presenter,
            ControllerConfig::default(),
        )
        .with_playback_enabled(false);
        let mut notices = ctl.subscribe();
        ctl.start().await.unwrap();

        assert_eq!(surface.attach_count(), 0);
        let first = notices.recv().await.unwrap();
        assert!(matches!(
            first.notice,
            SceneNotice::Degraded {
                scene: None,
                reason: DegradeReason::PlaybackDisabled
            }
        ));
    }

    #[tokio::test]
    async fn test_shutdown_detaches_and_closes_input() {
        let surface = Arc::new(MockSurface::new());
        let (mut ctl, _) = controller(SceneGraph::tap_reveal_loop(), surface.clone());
        ctl.start().await.unwrap();
        assert!(surface.attached().is_some());

        let handle = ctl.handle();
        assert!(handle.shutdown());
        assert_eq!(ctl.try_step().await, Some(Dispatch::Shutdown));

        assert!(surface.attached().is_none());
        assert!(!handle.tap());
        assert!(ctl.status().scene.is_none());
    }
}
