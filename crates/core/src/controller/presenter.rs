//! The screen-side collaborator of the controller.

use async_trait::async_trait;

use crate::scene::SceneId;

/// Presents scene changes and overlays.
///
/// Everything here is cosmetic; the controller has already committed its
/// state change before calling in.
#[async_trait]
pub trait ScenePresenter: Send + Sync {
    /// Name of this presenter, for logs.
    fn name(&self) -> &str;

    /// Move the screen to the target scene.
    async fn perform_transition(&self, target: &SceneId);

    /// Layer an overlay over the current scene.
    async fn reveal_overlay(&self, overlay: &str);

    /// Show or hide the choice buttons.
    async fn set_choices_visible(&self, visible: bool);
}
