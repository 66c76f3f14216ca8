//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the collaborator traits
//! (surface, presenter, asset store), so controller behavior can be tested
//! without a renderer or real clip files.
//!
//! # Example
//!
//! ```rust,ignore
//! use loopstage_core::testing::{fixtures, MockPresenter, MockSurface};
//!
//! let surface = Arc::new(MockSurface::new());
//! let presenter = Arc::new(MockPresenter::new());
//! let mut controller = SceneController::new(
//!     Arc::new(SceneGraph::branching_narrative()),
//!     fixtures::full_resolver(),
//!     surface.clone(),
//!     presenter.clone(),
//!     ControllerConfig::default(),
//! );
//! ```

mod mock_asset_store;
mod mock_presenter;
mod mock_surface;

pub use mock_asset_store::MockAssetStore;
pub use mock_presenter::{MockPresenter, PresenterCall};
pub use mock_surface::{BindingInfo, MockSurface, SurfaceEvent};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use super::MockAssetStore;
    use crate::clip::{ClipResolver, ClipSource, PlaybackMode};
    use crate::scene::{Scene, SceneGraph, Trigger};

    /// Every clip the built-in graphs reference.
    pub const BUILTIN_ASSETS: &[&str] = &[
        "Intro.m4v",
        "ClipAChoiceFrostiesOrPuffs.m4v",
        "ClipBChoiceFrostiesOrPuffs.m4v",
        "ClipYouBuryDad.m4v",
        "CarSpin.m4v",
        "CarSpin_alpha.m4v",
    ];

    /// A store holding every built-in asset.
    pub fn full_store() -> MockAssetStore {
        MockAssetStore::with_assets(BUILTIN_ASSETS)
    }

    pub fn full_resolver() -> ClipResolver {
        ClipResolver::new(Arc::new(full_store()))
    }

    /// A resolver whose store lacks the given assets.
    pub fn resolver_without(missing: &[&str]) -> ClipResolver {
        let store = full_store();
        for name in missing {
            store.remove(name);
        }
        ClipResolver::new(Arc::new(store))
    }

    /// The two opaque clips of the branching narrative's intro.
    pub fn intro_sources() -> Vec<ClipSource> {
        vec![
            ClipSource::opaque("Intro.m4v"),
            ClipSource::opaque("ClipAChoiceFrostiesOrPuffs.m4v"),
        ]
    }

    pub fn matte_sources() -> Vec<ClipSource> {
        vec![ClipSource::matte_pair("CarSpin.m4v", "CarSpin_alpha.m4v")]
    }

    /// `intro --completed--> choice --{a|b}--> end`, with a dwell fallback
    /// out of `intro` after `fallback_secs`.
    pub fn intro_then_choice(fallback_secs: f64) -> SceneGraph {
        let graph = SceneGraph {
            initial: "intro".into(),
            scenes: vec![
                Scene::new("intro")
                    .with_clips(PlaybackMode::OnceSequential, intro_sources())
                    .on(Trigger::Completed, "choice")
                    .on(Trigger::DwellElapsed(fallback_secs), "choice"),
                Scene::new("choice")
                    .with_clips(
                        PlaybackMode::Looped,
                        vec![ClipSource::opaque("ClipBChoiceFrostiesOrPuffs.m4v")],
                    )
                    .on(Trigger::ChoiceA, "end")
                    .on(Trigger::ChoiceB, "end"),
                Scene::new("end"),
            ],
        };
        debug_assert!(graph.validate().is_ok());
        graph
    }
}
