//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Scene controller (scenes entered, transitions, ignored events)
//! - Playback (units started, degradations)
//! - Overlays and taps

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Controller Metrics
// =============================================================================

/// Scene entries by scene id.
pub static SCENES_ENTERED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("loopstage_scenes_entered_total", "Total scene entries"),
        &["scene"],
    )
    .unwrap()
});

/// Committed transitions by trigger.
pub static TRANSITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "loopstage_transitions_total",
            "Total committed scene transitions",
        ),
        &["trigger"], // "completed", "choice_a", "choice_b", "dwell_elapsed"
    )
    .unwrap()
});

/// Time spent in a scene instance before it was exited.
pub static SCENE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "loopstage_scene_duration_seconds",
            "Time spent in a scene before transitioning out",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["scene"],
    )
    .unwrap()
});

/// Events dropped without effect, by reason.
pub static EVENTS_IGNORED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "loopstage_events_ignored_total",
            "Controller events ignored as stale or redundant",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Playback Metrics
// =============================================================================

/// Playback units that reached `Playing`, by mode.
pub static UNITS_STARTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("loopstage_units_started_total", "Total playback units started"),
        &["mode"],
    )
    .unwrap()
});

/// Scenes (or sessions) running without video, by reason.
pub static DEGRADATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "loopstage_degradations_total",
            "Times playback was skipped and the narrative continued without video",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Input & Overlay Metrics
// =============================================================================

/// Overlays revealed, by cause.
pub static OVERLAYS_REVEALED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("loopstage_overlays_revealed_total", "Total overlays revealed"),
        &["cause"], // "cue", "tap_threshold"
    )
    .unwrap()
});

/// Taps counted by a scene.
pub static TAPS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("loopstage_taps_total", "Total taps counted by scenes").unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SCENES_ENTERED.clone()),
        Box::new(TRANSITIONS_TOTAL.clone()),
        Box::new(SCENE_DURATION.clone()),
        Box::new(EVENTS_IGNORED.clone()),
        Box::new(UNITS_STARTED.clone()),
        Box::new(DEGRADATIONS_TOTAL.clone()),
        Box::new(OVERLAYS_REVEALED.clone()),
        Box::new(TAPS_TOTAL.clone()),
    ]
}
