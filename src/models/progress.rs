use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Interval;

/// Persisted snapshot of one user's progress through one video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub intervals: Vec<Interval>,
    pub last_position: f64,
    pub progress: f64,
    pub updated_at: DateTime<Utc>,
}

/// Identifies a progress record: one per (user, video).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressKey {
    pub user_id: String,
    pub video_id: String,
}

pub const KEY_PREFIX: &str = "videoProgress_";

impl ProgressKey {
    pub fn new(user_id: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            video_id: video_id.into(),
        }
    }

    /// Storage key, `videoProgress_{userId}_{videoId}`.
    pub fn storage_key(&self) -> String {
        format!("{KEY_PREFIX}{}_{}", self.user_id, self.video_id)
    }

    /// Prefix shared by every record of `user_id`.
    pub fn user_prefix(user_id: &str) -> String {
        format!("{KEY_PREFIX}{user_id}_")
    }

    /// Keys join the ids with `_`, so a user id containing `_` shares its
    /// prefix with another user's records (`a` + `b_v` vs `a_b` + `v`).
    pub fn is_valid_user_id(user_id: &str) -> bool {
        !user_id.is_empty() && !user_id.contains('_')
    }
}

impl std::fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.video_id)
    }
}
