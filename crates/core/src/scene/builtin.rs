//! Scene graphs for the bundled application variants.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::graph::SceneGraph;
use super::types::{Scene, SceneId, TapReveal, Trigger};
use crate::clip::{ClipSource, PlaybackMode};

/// Decode hint the branching narrative's clips were encoded for.
const BT709_APPLE: &str = "bt709_apple";

/// Taps needed before the looped variant reveals its overlay.
pub const TAP_REVEAL_THRESHOLD: u32 = 10;

/// Named built-in graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinGraph {
    BranchingNarrative,
    TapRevealLoop,
}

impl BuiltinGraph {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinGraph::BranchingNarrative => "branching_narrative",
            BuiltinGraph::TapRevealLoop => "tap_reveal_loop",
        }
    }

    pub fn graph(&self) -> SceneGraph {
        match self {
            BuiltinGraph::BranchingNarrative => SceneGraph::branching_narrative(),
            BuiltinGraph::TapRevealLoop => SceneGraph::tap_reveal_loop(),
        }
    }
}

impl FromStr for BuiltinGraph {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "branching_narrative" => Ok(BuiltinGraph::BranchingNarrative),
            "tap_reveal_loop" => Ok(BuiltinGraph::TapRevealLoop),
            other => Err(format!("unknown built-in graph: {}", other)),
        }
    }
}

impl SceneGraph {
    /// `splash --dwell(4s)--> intro --completed--> choice --{a|b}--> outro`.
    ///
    /// `splash` has no video. `intro` plays two opaque clips once, `choice`
    /// loops while waiting for input and `outro` loops forever under three
    /// timed captions.
    pub fn branching_narrative() -> Self {
        Self {
            initial: SceneId::new("splash"),
            scenes: vec![
                Scene::new("splash").on(Trigger::DwellElapsed(4.0), "intro"),
                Scene::new("intro")
                    .with_clips(
                        PlaybackMode::OnceSequential,
                        vec![
                            ClipSource::opaque("Intro.m4v"),
                            ClipSource::opaque("ClipAChoiceFrostiesOrPuffs.m4v"),
                        ],
                    )
                    .with_decode_gamma(BT709_APPLE)
                    .on(Trigger::Completed, "choice"),
                Scene::new("choice")
                    .with_clips(
                        PlaybackMode::Looped,
                        vec![ClipSource::opaque("ClipBChoiceFrostiesOrPuffs.m4v")],
                    )
                    .with_decode_gamma(BT709_APPLE)
                    .on(Trigger::ChoiceA, "outro")
                    .on(Trigger::ChoiceB, "outro"),
                Scene::new("outro")
                    .with_clips(
                        PlaybackMode::Looped,
                        vec![ClipSource::opaque("ClipYouBuryDad.m4v")],
                    )
                    .with_decode_gamma(BT709_APPLE)
                    .with_cue(0.0, "outro_caption_1")
                    .with_cue(3.0, "outro_caption_2")
                    .with_cue(6.0, "outro_caption_3"),
            ],
        }
    }

    /// One looped alpha-matte scene with no transitions; ten taps reveal an
    /// overlay on top of the running loop.
    pub fn tap_reveal_loop() -> Self {
        let mut scene = Scene::new("loop").with_clips(
            PlaybackMode::Looped,
            vec![ClipSource::matte_pair("CarSpin.m4v", "CarSpin_alpha.m4v")],
        );
        scene.tap_reveal = Some(TapReveal {
            threshold: TAP_REVEAL_THRESHOLD,
            overlay: "reveal".to_string(),
        });

        Self {
            initial: SceneId::new("loop"),
            scenes: vec![scene],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::TriggerKind;
    use std::time::Duration;

    #[test]
    fn test_builtin_graphs_validate() {
        for builtin in [BuiltinGraph::BranchingNarrative, BuiltinGraph::TapRevealLoop] {
            builtin.graph().validate().unwrap();
        }
    }

    #[test]
    fn test_branching_narrative_shape() {
        let graph = SceneGraph::branching_narrative();
        let splash = graph.initial_scene().unwrap();
        assert!(splash.clips.is_empty());
        assert_eq!(splash.dwell(), Some(Duration::from_secs(4)));

        let intro = graph.get(&"intro".into()).unwrap();
        assert_eq!(intro.clips.len(), 2);
        assert_eq!(intro.playback, PlaybackMode::OnceSequential);
        assert_eq!(
            intro.rule_for(TriggerKind::Completed).unwrap().to.as_str(),
            "choice"
        );

        let choice = graph.get(&"choice".into()).unwrap();
        assert!(choice.accepts_choices());

        let outro = graph.get(&"outro".into()).unwrap();
        assert!(outro.is_terminal());
        assert_eq!(outro.cues.len(), 3);
    }

    #[test]
    fn test_tap_reveal_shape() {
        let graph = SceneGraph::tap_reveal_loop();
        assert_eq!(graph.scenes.len(), 1);
        let scene = graph.initial_scene().unwrap();
        assert!(scene.is_terminal());
        assert_eq!(scene.playback, PlaybackMode::Looped);
        assert_eq!(scene.tap_reveal.as_ref().unwrap().threshold, 10);
    }

    #[test]
    fn test_builtin_from_str() {
        assert_eq!(
            "tap_reveal_loop".parse::<BuiltinGraph>().unwrap(),
            BuiltinGraph::TapRevealLoop
        );
        assert!("bandersnatch".parse::<BuiltinGraph>().is_err());
        assert_eq!(BuiltinGraph::BranchingNarrative.as_str(), "branching_narrative");
    }
}
