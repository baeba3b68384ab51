use std::sync::{Arc, Mutex};

use log::{info, warn};
use serde::Serialize;

/// User-facing events the tracker raises; rendering them is the host's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notification {
    #[serde(rename_all = "camelCase")]
    ProgressRestored { last_position: f64 },
    ProgressDiscarded { reason: String },
    VideoFinished { title: String },
    TrackingUnavailable { reason: String },
    FullscreenError { message: String },
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. Used when nothing renders them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::ProgressRestored { last_position } => {
                info!("Resumed from your last watched position ({last_position:.1}s)")
            }
            Notification::ProgressDiscarded { reason } => {
                warn!("Could not load saved progress: {reason}")
            }
            Notification::VideoFinished { title } => info!("Video finished: {title}"),
            Notification::TrackingUnavailable { reason } => {
                warn!("Progress tracking temporarily unavailable: {reason}")
            }
            Notification::FullscreenError { message } => warn!("Fullscreen error: {message}"),
        }
    }
}

/// Keeps every notification in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        match self.seen.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        match self.seen.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
