use serde::{Deserialize, Serialize};

use crate::intervals::{is_merged, merge_intervals, progress_percent, watched_duration};
use crate::models::Interval;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Restoring,
    Playing,
    Paused,
    Terminated,
}

impl SessionStatus {
    /// Video bound and clock available.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Playing | SessionStatus::Paused)
    }
}

/// Read-only view handed to player controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub status: SessionStatus,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub is_muted: bool,
    pub is_fullscreen: bool,
    pub total_watched_duration: f64,
    pub progress_percent: f64,
    pub finished: bool,
}

/// Transient per-session state. Raw spans accumulate here between flushes
/// and may overlap or sit out of order until [`SessionState::compact`].
#[derive(Debug, Clone)]
pub struct SessionState {
    pub status: SessionStatus,
    pub current_time: f64,
    /// Zero while unknown.
    pub duration: f64,
    pub volume: f64,
    pub muted: bool,
    pub fullscreen: bool,
    pub finished: bool,
    pub total_watched: f64,
    pub progress_percent: f64,
    closed: Vec<Interval>,
    /// Span currently being extended by continuous playback.
    open: Option<Interval>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            fullscreen: false,
            finished: false,
            total_watched: 0.0,
            progress_percent: 0.0,
            closed: Vec::new(),
            open: None,
        }
    }
}

impl SessionState {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            ..Self::default()
        }
    }

    /// Replaces the accumulation with previously persisted spans.
    pub fn seed(&mut self, intervals: &[Interval]) {
        let duration = self.duration;
        let clamped: Vec<Interval> = intervals
            .iter()
            .filter_map(Interval::normalized)
            .map(|interval| interval.clamped_to(duration))
            .collect();
        self.closed = merge_intervals(&clamped);
        self.open = None;
    }

    /// Folds a position sample taken during playback into the accumulation.
    ///
    /// A sample within `tolerance` of the open span's end (and past its start)
    /// extends it. Otherwise the open span is closed, and the sample either
    /// reopens a closed span it continues or starts a new `fresh_span` wide one.
    pub fn record_position(&mut self, position: f64, tolerance: f64, fresh_span: f64) {
        if let Some(open) = self.open.as_mut() {
            if continues(open, position, tolerance) {
                open.end = open.end.max(position);
                return;
            }
        }

        if let Some(open) = self.open.take() {
            self.closed.push(open);
        }

        let resumed = self
            .closed
            .iter()
            .enumerate()
            .filter(|(_, interval)| continues(interval, position, tolerance))
            .max_by(|(_, a), (_, b)| a.end.total_cmp(&b.end))
            .map(|(index, _)| index);

        self.open = Some(match resumed {
            Some(index) => {
                let mut interval = self.closed.remove(index);
                interval.end = interval.end.max(position);
                interval
            }
            None => Interval::at(position, fresh_span).clamped_to(self.duration),
        });
    }

    /// Closes the open span and seeds a new one at `target`, so playback that
    /// follows a jump extends from there.
    pub fn open_bridge(&mut self, target: f64, width: f64) {
        if let Some(open) = self.open.take() {
            self.closed.push(open);
        }
        self.open = Some(Interval::at(target, width).clamped_to(self.duration));
    }

    /// Merges the closed spans in place. The open span is left untouched so
    /// it can keep growing.
    pub fn compact(&mut self) {
        self.closed = merge_intervals(&self.closed);
        debug_assert!(is_merged(&self.closed));
    }

    /// Merged cover of everything accumulated so far, open span included.
    pub fn merged(&self) -> Vec<Interval> {
        let mut all = self.raw_intervals();
        if self.duration > 0.0 {
            all = all
                .into_iter()
                .map(|interval| interval.clamped_to(self.duration))
                .collect();
        }
        merge_intervals(&all)
    }

    pub fn raw_intervals(&self) -> Vec<Interval> {
        let mut all = self.closed.clone();
        all.extend(self.open);
        all
    }

    /// Recomputes watched seconds and percent; returns the merged spans used.
    pub fn refresh_metrics(&mut self) -> Vec<Interval> {
        let merged = self.merged();
        self.total_watched = watched_duration(&merged);
        self.progress_percent = progress_percent(self.total_watched, self.duration);
        merged
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            status: self.status,
            is_playing: self.status == SessionStatus::Playing,
            current_time: self.current_time,
            duration: self.duration,
            volume: self.volume,
            is_muted: self.muted,
            is_fullscreen: self.fullscreen,
            total_watched_duration: self.total_watched,
            progress_percent: self.progress_percent,
            finished: self.finished,
        }
    }
}

fn continues(interval: &Interval, position: f64, tolerance: f64) -> bool {
    (position - interval.end).abs() < tolerance && position > interval.start
}
