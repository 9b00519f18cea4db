use crate::models::camera_models::CameraDescriptor;
use crate::models::error::CameraError;
use crate::sync::CancellationToken;

/// Device enumeration collaborator.
///
/// Produces immutable `CameraDescriptor` snapshots, refreshed on demand.
/// The coordinator refreshes lazily: only when its camera list is empty at
/// connect time.
pub trait CameraProvider: Send {
    /// Re-enumerate physical cameras, replacing the available list.
    fn refresh_available_cameras(&mut self, token: &CancellationToken)
        -> Result<(), CameraError>;

    /// The most recent enumeration snapshot. Empty until the first refresh.
    fn available_cameras(&self) -> &[CameraDescriptor];
}
