use serde::{Deserialize, Serialize};

/// What the tracker needs to know about the video being watched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    /// Nominal duration in seconds, used until the media layer reports metadata.
    /// Zero when unknown.
    #[serde(default)]
    pub duration: f64,
}

impl VideoInfo {
    pub fn new(id: impl Into<String>, title: impl Into<String>, duration: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration,
        }
    }
}
