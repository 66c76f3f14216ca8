//! Presenter that writes scene changes to the terminal.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use loopstage_core::{SceneId, ScenePresenter};

/// Prints one line per presentation call.
pub struct TerminalPresenter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn line(&self, text: std::fmt::Arguments<'_>) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl<W: Write + Send> ScenePresenter for TerminalPresenter<W> {
    fn name(&self) -> &str {
        "terminal"
    }

    async fn perform_transition(&self, target: &SceneId) {
        self.line(format_args!("==> {}", target));
    }

    async fn reveal_overlay(&self, overlay: &str) {
        self.line(format_args!("  [{}]", overlay));
    }

    async fn set_choices_visible(&self, visible: bool) {
        if visible {
            self.line(format_args!("  choose: (a) or (b)"));
        }
    }
}
