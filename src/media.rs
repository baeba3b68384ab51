//! The media collaborator: whatever owns decoding and the playback clock.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{bail, Result};

use crate::session::PlaybackSignal;

/// Commands and clock reads the tracker needs from the media layer.
///
/// Implementations report state changes back as [`PlaybackSignal`]s through
/// whatever event channel the host wires up; commands here never deliver
/// signals synchronously.
pub trait MediaElement: Send {
    fn current_position(&self) -> f64;

    /// Reported duration, `None` until metadata has loaded.
    fn duration(&self) -> Option<f64>;

    fn seek_to(&mut self, time: f64);

    fn play(&mut self);

    fn pause(&mut self);

    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()>;
}

#[derive(Debug, Default)]
struct SimulatedInner {
    position: f64,
    duration: Option<f64>,
    playing: bool,
    ended: bool,
    volume: f64,
    muted: bool,
    fullscreen: bool,
    fullscreen_supported: bool,
    pending: VecDeque<PlaybackSignal>,
}

/// Deterministic stand-in for a real player.
///
/// Time only moves when [`SimulatedMedia::advance`] is called, which emits
/// position updates at a fixed cadence the way a browser `timeupdate` feed
/// would. Clones share state, so the driver keeps one handle while the
/// session owns another.
#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    inner: Arc<Mutex<SimulatedInner>>,
}

impl SimulatedMedia {
    /// A clip whose metadata is already known.
    pub fn new(duration: f64) -> Self {
        let media = Self::unloaded();
        media.lock().duration = Some(duration);
        media
    }

    /// A clip whose duration arrives later via [`SimulatedMedia::load_metadata`].
    pub fn unloaded() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimulatedInner {
                volume: 1.0,
                fullscreen_supported: true,
                ..SimulatedInner::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimulatedInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn load_metadata(&self, duration: f64) {
        let mut inner = self.lock();
        inner.duration = Some(duration);
        inner
            .pending
            .push_back(PlaybackSignal::MetadataLoaded { duration });
    }

    pub fn set_fullscreen_supported(&self, supported: bool) {
        self.lock().fullscreen_supported = supported;
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    pub fn is_fullscreen(&self) -> bool {
        self.lock().fullscreen
    }

    /// Plays for `seconds` of media time, emitting a position update every
    /// `step` seconds. Stops at the end of the clip and emits `Ended`.
    pub fn advance(&self, seconds: f64, step: f64) {
        let mut inner = self.lock();
        if !inner.playing || step <= 0.0 {
            return;
        }

        let limit = inner.duration.unwrap_or(f64::INFINITY);
        let mut remaining = seconds;
        while remaining > 0.0 {
            let delta = remaining.min(step);
            remaining -= delta;
            inner.position = (inner.position + delta).min(limit);
            let position = inner.position;
            inner
                .pending
                .push_back(PlaybackSignal::PositionUpdate { position });

            if position >= limit {
                inner.playing = false;
                inner.ended = true;
                inner.pending.push_back(PlaybackSignal::Ended);
                break;
            }
        }
    }

    /// Signals produced since the last drain, oldest first.
    pub fn drain_signals(&self) -> Vec<PlaybackSignal> {
        self.lock().pending.drain(..).collect()
    }
}

impl MediaElement for SimulatedMedia {
    fn current_position(&self) -> f64 {
        self.lock().position
    }

    fn duration(&self) -> Option<f64> {
        self.lock().duration
    }

    fn seek_to(&mut self, time: f64) {
        let mut inner = self.lock();
        let limit = inner.duration.unwrap_or(f64::INFINITY);
        inner.position = time.clamp(0.0, limit);
        inner.ended = false;
        let position = inner.position;
        inner
            .pending
            .push_back(PlaybackSignal::PositionUpdate { position });
    }

    fn play(&mut self) {
        let mut inner = self.lock();
        if inner.playing {
            return;
        }
        if inner.ended {
            inner.position = 0.0;
            inner.ended = false;
        }
        inner.playing = true;
        inner.pending.push_back(PlaybackSignal::Play);
    }

    fn pause(&mut self) {
        let mut inner = self.lock();
        if !inner.playing {
            return;
        }
        inner.playing = false;
        inner.pending.push_back(PlaybackSignal::Pause);
    }

    fn set_volume(&mut self, volume: f64) {
        let mut inner = self.lock();
        inner.volume = volume;
        let muted = inner.muted;
        inner
            .pending
            .push_back(PlaybackSignal::VolumeChanged { volume, muted });
    }

    fn set_muted(&mut self, muted: bool) {
        let mut inner = self.lock();
        inner.muted = muted;
        let volume = inner.volume;
        inner
            .pending
            .push_back(PlaybackSignal::VolumeChanged { volume, muted });
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()> {
        let mut inner = self.lock();
        if !inner.fullscreen_supported {
            bail!("fullscreen is not available for this surface");
        }
        inner.fullscreen = fullscreen;
        Ok(())
    }
}
