//! Controller configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the scene controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Capacity of the notice broadcast channel.
    /// Slow subscribers lag and skip notices beyond this many.
    #[serde(default = "default_notice_capacity")]
    pub notice_capacity: usize,

    /// Whether to hide choice buttons again as soon as a choice fires.
    #[serde(default = "default_hide_choices")]
    pub hide_choices_on_transition: bool,
}

fn default_notice_capacity() -> usize {
    64
}

fn default_hide_choices() -> bool {
    true
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            notice_capacity: default_notice_capacity(),
            hide_choices_on_transition: default_hide_choices(),
        }
    }
}
