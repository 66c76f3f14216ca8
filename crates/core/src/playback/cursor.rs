//! Frame stepping model for a clip sequence.
//!
//! Surfaces drive a [`FrameCursor`] once per presented frame. A matte pair
//! yields its color and alpha frame indices together, so the two streams can
//! never drift apart.

use crate::clip::{ClipDescriptor, ClipKind, PlaybackMode};

use super::error::PlaybackError;

/// One step of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    /// Present this frame. `alpha` is the mask frame index for matte pairs.
    Frame {
        clip: usize,
        frame: u32,
        alpha: Option<u32>,
    },
    /// The last frame of the last clip has been presented.
    Finished,
}

#[derive(Debug, Clone)]
struct ClipFrames {
    frames: u32,
    has_alpha: bool,
}

/// Position within a clip sequence.
#[derive(Debug, Clone)]
pub struct FrameCursor {
    clips: Vec<ClipFrames>,
    mode: PlaybackMode,
    clip: usize,
    frame: u32,
    loops: u32,
    end_reached: bool,
    finished: bool,
}

impl FrameCursor {
    /// Build a cursor, asking `frames_for` how many frames each clip has.
    pub fn new<F>(
        clips: &[ClipDescriptor],
        mode: PlaybackMode,
        frames_for: F,
    ) -> Result<Self, PlaybackError>
    where
        F: Fn(&ClipDescriptor) -> u32,
    {
        if clips.is_empty() {
            return Err(PlaybackError::EmptySequence);
        }

        let clips = clips
            .iter()
            .map(|clip| {
                let frames = frames_for(clip);
                if frames == 0 {
                    return Err(PlaybackError::EmptyClip {
                        asset: clip.color().name.clone(),
                    });
                }
                Ok(ClipFrames {
                    frames,
                    has_alpha: clip.kind() == ClipKind::AlphaMattePair,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            clips,
            mode,
            clip: 0,
            frame: 0,
            loops: 0,
            end_reached: false,
            finished: false,
        })
    }

    /// Number of times a looped sequence has wrapped back to its start.
    pub fn loops(&self) -> u32 {
        self.loops
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total frames in one pass over the sequence.
    pub fn frames_per_pass(&self) -> u64 {
        self.clips.iter().map(|clip| u64::from(clip.frames)).sum()
    }

    /// Advance by one frame.
    ///
    /// `OnceSequential` cursors yield `Finished` exactly once, right after the
    /// final frame, and `None` from then on. `Looped` cursors never finish.
    pub fn advance(&mut self) -> Option<FrameStep> {
        if self.finished {
            return None;
        }
        if self.end_reached {
            self.finished = true;
            return Some(FrameStep::Finished);
        }

        let current = &self.clips[self.clip];
        let step = FrameStep::Frame {
            clip: self.clip,
            frame: self.frame,
            alpha: current.has_alpha.then_some(self.frame),
        };

        self.frame += 1;
        if self.frame == current.frames {
            self.frame = 0;
            self.clip += 1;
            if self.clip == self.clips.len() {
                match self.mode {
                    PlaybackMode::Looped => {
                        self.clip = 0;
                        self.loops += 1;
                    }
                    PlaybackMode::OnceSequential => {
                        self.clip -= 1;
                        self.end_reached = true;
                    }
                }
            }
        }

        Some(step)
    }
}
