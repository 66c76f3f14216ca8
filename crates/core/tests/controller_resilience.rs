//! Controller resilience integration tests.
//!
//! Playback problems never stop a session: missing assets, refused attaches
//! and missing devices all degrade to running the scene without video while
//! timers, overlays and choices keep working. Late and duplicate events are
//! dropped without effect.

use std::sync::Arc;

use tokio::sync::broadcast;

use loopstage_core::{
    clip::PlaybackMode,
    controller::{ControllerEvent, SceneSignal},
    testing::{fixtures, MockPresenter, MockSurface},
    Choice, ClipResolver, ControllerConfig, DegradeReason, Dispatch, HeadlessSurface,
    IgnoreReason, NoticeEnvelope, PlaybackConfig, RendererSurface, Scene, SceneController,
    SceneGraph, SceneId, SceneNotice, Trigger,
};

fn controller(
    graph: SceneGraph,
    resolver: ClipResolver,
    surface: Arc<dyn RendererSurface>,
) -> (SceneController, Arc<MockPresenter>) {
    let presenter = Arc::new(MockPresenter::new());
    let controller = SceneController::new(
        Arc::new(graph),
        resolver,
        surface,
        presenter.clone(),
        ControllerConfig::default(),
    );
    (controller, presenter)
}

/// Degraded notices emitted so far.
fn degradations(
    notices: &mut broadcast::Receiver<NoticeEnvelope>,
) -> Vec<(Option<SceneId>, DegradeReason)> {
    let mut found = Vec::new();
    while let Ok(envelope) = notices.try_recv() {
        if let SceneNotice::Degraded { scene, reason } = envelope.notice {
            found.push((scene, reason));
        }
    }
    found
}

fn transitioned(from: &str, to: &str) -> Dispatch {
    Dispatch::Transitioned {
        from: SceneId::from(from),
        to: SceneId::from(to),
    }
}

#[tokio::test(start_paused = true)]
async fn test_attach_failure_keeps_narrative_running() {
    let surface = Arc::new(MockSurface::new());
    surface.refuse_attach(true);
    let (mut ctl, presenter) = controller(
        fixtures::intro_then_choice(5.0),
        fixtures::full_resolver(),
        surface.clone(),
    );
    let mut notices = ctl.subscribe();
    let handle = ctl.handle();

    ctl.start().await.unwrap();
    assert!(ctl.status().unit.is_none());

    // No unit means no completion; the dwell fallback still fires.
    assert_eq!(ctl.step().await, Some(transitioned("intro", "choice")));
    assert!(handle.choose(Choice::A));
    assert_eq!(ctl.step().await, Some(transitioned("choice", "end")));

    assert_eq!(
        degradations(&mut notices),
        vec![
            (Some(SceneId::from("intro")), DegradeReason::AttachFailure),
            (Some(SceneId::from("choice")), DegradeReason::AttachFailure),
        ]
    );
    assert_eq!(surface.attach_count(), 0);
    assert_eq!(presenter.transitions().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_incomplete_matte_pair_degrades() {
    let surface = Arc::new(MockSurface::new());
    let (mut ctl, presenter) = controller(
        SceneGraph::tap_reveal_loop(),
        fixtures::resolver_without(&["CarSpin_alpha.m4v"]),
        surface.clone(),
    );
    let mut notices = ctl.subscribe();
    let handle = ctl.handle();
    ctl.start().await.unwrap();

    assert_eq!(
        degradations(&mut notices),
        vec![(
            Some(SceneId::from("loop")),
            DegradeReason::IncompletePair {
                missing: vec!["CarSpin_alpha.m4v".to_string()]
            }
        )]
    );
    assert_eq!(surface.attach_count(), 0);

    // Taps still count toward the reveal without video.
    for _ in 0..10 {
        assert!(handle.tap());
    }
    let mut last = None;
    while let Some(dispatch) = ctl.try_step().await {
        last = Some(dispatch);
    }
    assert_eq!(
        last,
        Some(Dispatch::OverlayRevealed {
            overlay: "reveal".to_string()
        })
    );
    assert_eq!(presenter.overlays(), vec!["reveal".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_missing_asset_degrades_scene() {
    let (mut ctl, _) = controller(
        fixtures::intro_then_choice(5.0),
        fixtures::resolver_without(&["Intro.m4v"]),
        Arc::new(MockSurface::new()),
    );
    let mut notices = ctl.subscribe();
    ctl.start().await.unwrap();

    assert_eq!(
        degradations(&mut notices),
        vec![(
            Some(SceneId::from("intro")),
            DegradeReason::AssetNotFound {
                name: "Intro.m4v".to_string()
            }
        )]
    );
    assert_eq!(ctl.step().await, Some(transitioned("intro", "choice")));
    // The next scene's assets exist, so it gets video again.
    assert!(ctl.status().unit.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_device_unsupported_disables_video_for_session() {
    let surface = Arc::new(HeadlessSurface::without_device(PlaybackConfig::default()));
    let (mut ctl, _) = controller(
        fixtures::intro_then_choice(5.0),
        fixtures::full_resolver(),
        surface,
    );
    let mut notices = ctl.subscribe();
    let handle = ctl.handle();
    ctl.start().await.unwrap();

    assert!(!ctl.status().video_enabled);
    assert_eq!(ctl.step().await, Some(transitioned("intro", "choice")));
    assert!(ctl.status().unit.is_none());
    assert!(handle.choose(Choice::B));
    assert_eq!(ctl.step().await, Some(transitioned("choice", "end")));

    // Reported once for the session, not per scene.
    assert_eq!(
        degradations(&mut notices),
        vec![(None, DegradeReason::DeviceUnsupported)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_timer_after_exit_is_ignored() {
    let surface = Arc::new(MockSurface::new());
    let (mut ctl, _) = controller(
        fixtures::intro_then_choice(5.0),
        fixtures::full_resolver(),
        surface.clone(),
    );
    let handle = ctl.handle();
    ctl.start().await.unwrap();

    surface.complete(surface.attached().unwrap());
    assert_eq!(ctl.step().await, Some(transitioned("intro", "choice")));

    // The intro's fallback timer was never cancelled; it fires into nothing.
    assert_eq!(
        ctl.step().await,
        Some(Dispatch::Ignored(IgnoreReason::StaleInstance))
    );
    assert_eq!(ctl.status().scene, Some(SceneId::from("choice")));
    assert!(handle.choices_open());
}

#[tokio::test]
async fn test_unruled_choice_does_not_lock_scene() {
    let graph = SceneGraph::new(
        "choose",
        vec![
            Scene::new("choose").on(Trigger::ChoiceA, "end"),
            Scene::new("end"),
        ],
    )
    .unwrap();
    let (mut ctl, _) = controller(graph, fixtures::full_resolver(), Arc::new(MockSurface::new()));
    let handle = ctl.handle();
    ctl.start().await.unwrap();

    assert!(!handle.choose(Choice::B));
    assert_eq!(ctl.try_step().await, None);
    assert!(handle.choice_open(Choice::A));

    assert!(handle.choose(Choice::A));
    assert_eq!(ctl.step().await, Some(transitioned("choose", "end")));
    assert_eq!(ctl.status().scene, Some(SceneId::from("end")));
}

#[tokio::test]
async fn test_duplicate_completion_is_ignored() {
    // A once-through scene that leaves on a timer only.
    let graph = SceneGraph::new(
        "intro",
        vec![
            Scene::new("intro")
                .with_clips(PlaybackMode::OnceSequential, fixtures::intro_sources())
                .on(Trigger::DwellElapsed(30.0), "end"),
            Scene::new("end"),
        ],
    )
    .unwrap();
    let (mut ctl, _) = controller(graph, fixtures::full_resolver(), Arc::new(MockSurface::new()));
    ctl.start().await.unwrap();

    let status = ctl.status();
    let finished = ControllerEvent::scene(
        status.instance.unwrap(),
        SceneSignal::PlaybackFinished(status.unit.unwrap()),
    );

    assert_eq!(
        ctl.dispatch(finished.clone()).await,
        Dispatch::Ignored(IgnoreReason::NoMatchingRule)
    );
    assert_eq!(
        ctl.dispatch(finished).await,
        Dispatch::Ignored(IgnoreReason::DuplicateCompletion)
    );
    assert!(!ctl.status().transition_committed);
}

#[tokio::test]
async fn test_looped_unit_cannot_complete() {
    let surface = Arc::new(MockSurface::new());
    let (mut ctl, _) = controller(
        SceneGraph::tap_reveal_loop(),
        fixtures::full_resolver(),
        surface.clone(),
    );
    ctl.start().await.unwrap();

    let unit = surface.attached().unwrap();
    assert!(!surface.complete(unit));

    let mut step = tokio_test::task::spawn(ctl.step());
    tokio_test::assert_pending!(step.poll());
}

#[tokio::test]
async fn test_input_outside_session_is_rejected() {
    let (mut ctl, _) = controller(
        SceneGraph::tap_reveal_loop(),
        fixtures::full_resolver(),
        Arc::new(MockSurface::new()),
    );
    let handle = ctl.handle();
    assert!(!handle.tap());

    ctl.start().await.unwrap();
    assert!(handle.tap());
    assert_eq!(ctl.try_step().await, Some(Dispatch::TapCounted { count: 1 }));

    handle.shutdown();
    handle.shutdown();
    assert_eq!(ctl.try_step().await, Some(Dispatch::Shutdown));
    assert_eq!(ctl.try_step().await, Some(Dispatch::Shutdown));
    assert!(!handle.tap());
    assert!(ctl.status().scene.is_none());
}
