use serde::{Deserialize, Serialize};

/// Metadata describing a completed video recording.
///
/// Returned by `stop_video_recording` after the temporary container file has
/// been copied into the caller-supplied destination stream. Serializable for
/// JSON export to a hosting application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingInfo {
    pub id: String,
    pub created_at: String,
    /// Bytes copied into the destination stream.
    pub byte_count: u64,
    /// Container format of the relayed file (e.g. "mp4").
    pub container: String,
}

impl RecordingInfo {
    pub fn new(byte_count: u64, container: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            byte_count,
            container: container.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
