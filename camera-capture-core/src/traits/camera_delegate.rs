use crate::models::state::SessionState;

/// Event delegate for host UI control notifications.
///
/// Methods are called from the coordinator's calling thread (state changes,
/// capture results), not from the frame delivery thread. Implementations
/// should marshal to the UI thread if needed.
pub trait CameraDelegate: Send + Sync {
    /// Called on every session state transition.
    fn on_state_changed(&self, state: SessionState);

    /// Called once the preview is bound and running ("loaded").
    fn on_loaded(&self);

    /// Called with the encoded image bytes of a successful still capture.
    fn on_media_captured(&self, image: Vec<u8>);

    /// Called when a still capture or recording finalize fails. The preview
    /// session is unaffected and stays in its last good state.
    fn on_media_captured_failed(&self, reason: &str);
}
