//! Single-fire trigger primitives.

use std::sync::atomic::{AtomicU64, Ordering};

use super::types::SceneToken;
use crate::scene::Choice;

const CLOSED: u64 = 0;

/// A latch that fires at most once.
#[derive(Debug, Default)]
pub struct Latch {
    fired: bool,
}

impl Latch {
    /// Returns true only on the first call.
    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    pub fn is_fired(&self) -> bool {
        self.fired
    }
}

/// Gates external input to the scene instance currently accepting it.
///
/// Shared between the controller and every [`ControllerHandle`]. Tokens are
/// never zero, so zero marks a closed gate. The choice slot packs the
/// instance token above a two-bit mask of the choices that instance offers.
///
/// [`ControllerHandle`]: super::ControllerHandle
#[derive(Debug, Default)]
pub struct InputGate {
    active: AtomicU64,
    choices: AtomicU64,
}

const CHOICE_BITS: u32 = 2;

fn choice_bit(choice: Choice) -> u64 {
    match choice {
        Choice::A => 0b01,
        Choice::B => 0b10,
    }
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point taps at a new scene instance and close choices.
    pub(crate) fn enter(&self, token: SceneToken) {
        self.choices.store(CLOSED, Ordering::SeqCst);
        self.active.store(token.get(), Ordering::SeqCst);
    }

    /// Accept the given choices for `token`. An empty set leaves the gate closed.
    pub(crate) fn open_choices(&self, token: SceneToken, offered: &[Choice]) {
        let mask = offered.iter().fold(0, |mask, &choice| mask | choice_bit(choice));
        let slot = if mask == 0 {
            CLOSED
        } else {
            (token.get() << CHOICE_BITS) | mask
        };
        self.choices.store(slot, Ordering::SeqCst);
    }

    pub(crate) fn close_choices(&self) {
        self.choices.store(CLOSED, Ordering::SeqCst);
    }

    /// Close the gate entirely (session over).
    pub(crate) fn close(&self) {
        self.choices.store(CLOSED, Ordering::SeqCst);
        self.active.store(CLOSED, Ordering::SeqCst);
    }

    /// The instance taps go to.
    pub fn active(&self) -> Option<SceneToken> {
        match self.active.load(Ordering::SeqCst) {
            CLOSED => None,
            raw => Some(SceneToken::new(raw)),
        }
    }

    /// Whether any choice would currently be accepted.
    pub fn choices_open(&self) -> bool {
        self.choices.load(Ordering::SeqCst) != CLOSED
    }

    pub fn choice_open(&self, choice: Choice) -> bool {
        self.choices.load(Ordering::SeqCst) & choice_bit(choice) != 0
    }

    /// Claim `choice` if the current instance offers it. Only one caller per
    /// opening succeeds, and the winner closes both choices.
    pub fn take_choice(&self, choice: Choice) -> Option<SceneToken> {
        let bit = choice_bit(choice);
        self.choices
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |slot| {
                (slot & bit != 0).then_some(CLOSED)
            })
            .ok()
            .map(|slot| SceneToken::new(slot >> CHOICE_BITS))
    }
}

/// Outcome of counting a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Counted, threshold not reached (or no reveal configured).
    Counted(u32),
    /// This tap reached the threshold.
    Reveal(u32),
    /// The reveal already happened; the tap changes nothing.
    AlreadyRevealed,
}

/// Per-instance tap counter with a one-shot reveal at a threshold.
#[derive(Debug)]
pub struct TapCounter {
    count: u32,
    threshold: Option<u32>,
    revealed: Latch,
}

impl TapCounter {
    pub fn new(threshold: Option<u32>) -> Self {
        Self {
            count: 0,
            threshold,
            revealed: Latch::default(),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn record(&mut self) -> TapOutcome {
        if self.revealed.is_fired() {
            return TapOutcome::AlreadyRevealed;
        }
        self.count = self.count.saturating_add(1);
        match self.threshold {
            Some(threshold) if self.count >= threshold && self.revealed.fire() => {
                TapOutcome::Reveal(self.count)
            }
            _ => TapOutcome::Counted(self.count),
        }
    }
}
