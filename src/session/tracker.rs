use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    media::MediaElement,
    models::{ProgressKey, ProgressRecord, VideoInfo},
    notify::{Notification, Notifier},
    store::{ProgressError, ProgressStore},
};

use super::{PlaybackSignal, PlayerCommand, PlayerSnapshot, SessionState, SessionStatus, TrackingConfig};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Watched-interval tracking for one (user, video) pair.
///
/// Every method runs to completion synchronously; callers deliver signals one
/// at a time. Once [`TrackingSession::teardown`] has run, the session ignores
/// all further input.
pub struct TrackingSession {
    id: String,
    key: ProgressKey,
    video: VideoInfo,
    config: TrackingConfig,
    store: ProgressStore,
    media: Box<dyn MediaElement>,
    notifier: Arc<dyn Notifier>,
    state: SessionState,
    /// Set after the first failed write; the session then tracks in memory only.
    memory_only: bool,
}

impl TrackingSession {
    pub fn new(
        user_id: impl Into<String>,
        video: VideoInfo,
        config: TrackingConfig,
        store: ProgressStore,
        media: Box<dyn MediaElement>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let key = ProgressKey::new(user_id, video.id.clone());
        let state = SessionState::new(video.duration);

        Self {
            id: Uuid::new_v4().to_string(),
            key,
            video,
            config,
            store,
            media,
            notifier,
            state,
            memory_only: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> &ProgressKey {
        &self.key
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn is_playing(&self) -> bool {
        self.state.status == SessionStatus::Playing
    }

    pub fn is_memory_only(&self) -> bool {
        self.memory_only
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.state.snapshot()
    }

    /// Merged cover of everything watched so far, including unflushed spans.
    pub fn watched_intervals(&self) -> Vec<crate::models::Interval> {
        self.state.merged()
    }

    /// Binds the session: restores any saved record, repositions the clock,
    /// and becomes active once the media duration is known.
    pub fn start(&mut self) {
        if self.state.status != SessionStatus::Idle {
            log_warn!("session {} already started", self.id);
            return;
        }

        self.state.status = SessionStatus::Restoring;
        if let Some(duration) = self.media.duration().filter(|d| d.is_finite() && *d > 0.0) {
            self.state.duration = duration;
        }

        match self.store.load(&self.key) {
            Ok(Some(record)) => self.restore(record),
            Ok(None) => {
                log_info!("session {}: no saved progress for {}", self.id, self.key);
            }
            Err(err @ ProgressError::MalformedRecord { .. }) => {
                log_warn!("session {}: discarding saved progress: {err}", self.id);
                if let Err(discard_err) = self.store.discard(&self.key) {
                    log_error!("session {}: failed to discard record: {discard_err}", self.id);
                }
                self.notifier.notify(Notification::ProgressDiscarded {
                    reason: err.to_string(),
                });
            }
            Err(err) => {
                log_warn!("session {}: starting fresh, restore failed: {err}", self.id);
            }
        }

        self.state.refresh_metrics();

        if self.media.duration().is_some_and(|d| d.is_finite() && d > 0.0) {
            self.finish_restore();
        }
    }

    fn restore(&mut self, record: ProgressRecord) {
        self.state.seed(&record.intervals);

        let last_position = record.last_position;
        if last_position.is_finite() && last_position > 0.0 {
            let target = self.clamp_to_duration(last_position);
            self.media.seek_to(target);
            self.state.current_time = target;
        }

        log_info!(
            "session {}: restored {} spans for {}, resuming at {:.1}s",
            self.id,
            record.intervals.len(),
            self.key,
            self.state.current_time
        );
        self.notifier.notify(Notification::ProgressRestored {
            last_position: self.state.current_time,
        });
    }

    fn finish_restore(&mut self) {
        if self.state.status == SessionStatus::Restoring {
            self.state.status = SessionStatus::Paused;
            log_debug!("session {}: active", self.id);
        }
    }

    pub fn handle_signal(&mut self, signal: PlaybackSignal) {
        if matches!(self.state.status, SessionStatus::Idle | SessionStatus::Terminated) {
            log_debug!(
                "session {}: ignoring {:?} while {:?}",
                self.id,
                signal,
                self.state.status
            );
            return;
        }

        match signal {
            PlaybackSignal::MetadataLoaded { duration } => self.on_metadata_loaded(duration),
            PlaybackSignal::PositionUpdate { position } => self.on_position_update(position),
            PlaybackSignal::Play => self.on_play(),
            PlaybackSignal::Pause => self.on_pause(),
            PlaybackSignal::Ended => self.on_ended(),
            PlaybackSignal::VolumeChanged { volume, muted } => {
                self.state.volume = volume.clamp(0.0, 1.0);
                self.state.muted = muted;
            }
        }
    }

    pub fn apply_command(&mut self, command: PlayerCommand) {
        if matches!(self.state.status, SessionStatus::Idle | SessionStatus::Terminated) {
            log_debug!(
                "session {}: ignoring {:?} while {:?}",
                self.id,
                command,
                self.state.status
            );
            return;
        }

        match command {
            PlayerCommand::TogglePlayPause => self.toggle_play_pause(),
            PlayerCommand::Seek { time } => self.seek(time),
            PlayerCommand::SetVolume { volume } => self.set_volume(volume),
            PlayerCommand::ToggleMute => self.toggle_mute(),
            PlayerCommand::SkipBy { seconds } => self.skip_by(seconds),
            PlayerCommand::ToggleFullscreen => self.toggle_fullscreen(),
        }
    }

    fn on_metadata_loaded(&mut self, duration: f64) {
        if !(duration.is_finite() && duration > 0.0) {
            return;
        }
        self.state.duration = duration;
        self.state.refresh_metrics();
        self.finish_restore();
    }

    fn on_position_update(&mut self, position: f64) {
        if !position.is_finite() {
            return;
        }
        let position = self.clamp_to_duration(position);
        self.state.current_time = position;

        if self.state.status == SessionStatus::Playing {
            self.state.record_position(
                position,
                self.config.continuity_tolerance_secs,
                self.config.fresh_span_secs,
            );
        }
    }

    fn on_play(&mut self) {
        self.finish_restore();
        if self.state.status == SessionStatus::Paused {
            self.state.status = SessionStatus::Playing;
            self.state.finished = false;
        }
    }

    fn on_pause(&mut self) {
        if self.state.status == SessionStatus::Playing {
            self.state.status = SessionStatus::Paused;
            self.flush();
        }
    }

    fn on_ended(&mut self) {
        if !self.state.status.is_active() {
            return;
        }
        self.state.status = SessionStatus::Paused;
        self.flush();
        self.state.finished = true;

        log_info!("session {}: finished {}", self.id, self.video.title);
        self.notifier.notify(Notification::VideoFinished {
            title: self.video.title.clone(),
        });
    }

    fn toggle_play_pause(&mut self) {
        if self.is_playing() {
            self.media.pause();
        } else {
            self.media.play();
        }
    }

    /// Jumps the clock to `time` (clamped to the clip) and flushes.
    pub fn seek(&mut self, time: f64) {
        if matches!(self.state.status, SessionStatus::Idle | SessionStatus::Terminated) {
            log_debug!("session {}: ignoring seek while {:?}", self.id, self.state.status);
            return;
        }
        if !time.is_finite() {
            return;
        }
        let target = self.clamp_to_duration(time);
        self.media.seek_to(target);
        self.state.current_time = target;
        self.state.open_bridge(target, self.config.seek_bridge_secs);
        self.flush_at(target);
    }

    pub fn skip_by(&mut self, seconds: f64) {
        let base = self.clock_position();
        self.seek(base + seconds);
    }

    fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        let muted = volume == 0.0;
        self.media.set_volume(volume);
        self.media.set_muted(muted);
        self.state.volume = volume;
        self.state.muted = muted;
    }

    fn toggle_mute(&mut self) {
        let muted = !self.state.muted;
        self.media.set_muted(muted);
        self.state.muted = muted;

        if !muted && self.state.volume == 0.0 {
            let volume = self.config.unmute_volume.clamp(0.0, 1.0);
            self.media.set_volume(volume);
            self.state.volume = volume;
        }
    }

    fn toggle_fullscreen(&mut self) {
        let target = !self.state.fullscreen;
        match self.media.set_fullscreen(target) {
            Ok(()) => self.state.fullscreen = target,
            Err(err) => {
                log_warn!("session {}: fullscreen toggle failed: {err:#}", self.id);
                self.notifier.notify(Notification::FullscreenError {
                    message: err.to_string(),
                });
            }
        }
    }

    /// Periodic durability flush; a no-op unless playing.
    pub fn periodic_flush(&mut self) -> Option<ProgressRecord> {
        if self.is_playing() {
            self.flush()
        } else {
            None
        }
    }

    /// Merges, recomputes metrics and persists. Returns the record written
    /// (or the one that would have been written in memory-only mode).
    pub fn flush(&mut self) -> Option<ProgressRecord> {
        let position = self.clock_position();
        self.flush_at(position)
    }

    fn flush_at(&mut self, last_position: f64) -> Option<ProgressRecord> {
        if matches!(self.state.status, SessionStatus::Idle | SessionStatus::Terminated) {
            return None;
        }

        self.state.compact();
        let merged = self.state.refresh_metrics();
        let record = ProgressRecord {
            intervals: merged,
            last_position,
            progress: self.state.progress_percent,
            updated_at: Utc::now(),
        };

        if self.memory_only {
            log_debug!("session {}: memory-only, skipping write", self.id);
            return Some(record);
        }

        match self.store.save(&self.key, &record) {
            Ok(()) => {
                log_debug!(
                    "session {}: flushed {} spans, {:.1}s watched ({:.1}%)",
                    self.id,
                    record.intervals.len(),
                    self.state.total_watched,
                    record.progress
                );
            }
            Err(err) => {
                log_error!("session {}: {err}; continuing in memory", self.id);
                self.memory_only = true;
                self.notifier.notify(Notification::TrackingUnavailable {
                    reason: err.to_string(),
                });
            }
        }

        Some(record)
    }

    /// Final flush, then stops accepting input. Safe to call more than once.
    pub fn teardown(&mut self) -> PlayerSnapshot {
        if self.state.status != SessionStatus::Terminated {
            self.flush();
            self.state.status = SessionStatus::Terminated;
            log_info!(
                "session {}: terminated with {:.1}s watched ({:.1}%)",
                self.id,
                self.state.total_watched,
                self.state.progress_percent
            );
        }
        self.state.snapshot()
    }

    fn clock_position(&self) -> f64 {
        let position = self.media.current_position();
        if position.is_finite() {
            self.clamp_to_duration(position)
        } else {
            self.state.current_time
        }
    }

    fn clamp_to_duration(&self, time: f64) -> f64 {
        if self.state.duration > 0.0 {
            time.clamp(0.0, self.state.duration)
        } else {
            time.max(0.0)
        }
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        // Covers sessions discarded without an explicit teardown, including a
        // controller task dropped by runtime shutdown.
        if self.state.status != SessionStatus::Terminated {
            log_debug!("session {}: dropped without teardown", self.id);
            self.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::SimulatedMedia;
    use crate::models::Interval;
    use crate::notify::RecordingNotifier;
    use crate::store::{KeyValueStore, MemoryStore};
    use anyhow::{bail, Result};

    const DURATION: f64 = 596.0;

    struct Harness {
        session: TrackingSession,
        media: SimulatedMedia,
        backend: MemoryStore,
        notifier: RecordingNotifier,
    }

    impl Harness {
        fn new(media: SimulatedMedia) -> Self {
            Self::with_backend(media, MemoryStore::new())
        }

        fn with_backend(media: SimulatedMedia, backend: MemoryStore) -> Self {
            let notifier = RecordingNotifier::new();
            let session = TrackingSession::new(
                "user-1",
                VideoInfo::new("video1", "Introduction to Modern Web Development", DURATION),
                TrackingConfig::default(),
                ProgressStore::new(Arc::new(backend.clone())),
                Box::new(media.clone()),
                Arc::new(notifier.clone()),
            );
            Self {
                session,
                media,
                backend,
                notifier,
            }
        }

        /// Delivers whatever the simulated player emitted.
        fn pump(&mut self) {
            for signal in self.media.drain_signals() {
                self.session.handle_signal(signal);
            }
        }

        fn stored(&self) -> Option<ProgressRecord> {
            ProgressStore::new(Arc::new(self.backend.clone()))
                .load(self.session.key())
                .unwrap()
        }
    }

    fn seed_record(backend: &MemoryStore, intervals: Vec<Interval>, last_position: f64) {
        ProgressStore::new(Arc::new(backend.clone()))
            .save(
                &ProgressKey::new("user-1", "video1"),
                &ProgressRecord {
                    intervals,
                    last_position,
                    progress: 0.0,
                    updated_at: Utc::now(),
                },
            )
            .unwrap();
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            bail!("quota exceeded")
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn fresh_start_begins_at_zero() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();

        let snapshot = harness.session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Paused);
        assert_eq!(snapshot.current_time, 0.0);
        assert_eq!(snapshot.total_watched_duration, 0.0);
        assert_eq!(snapshot.progress_percent, 0.0);
        assert!(harness.notifier.notifications().is_empty());
    }

    #[test]
    fn restore_seeds_intervals_and_seeks() {
        let backend = MemoryStore::new();
        seed_record(
            &backend,
            vec![Interval::new(0.0, 10.0), Interval::new(5.0, 15.0), Interval::new(20.0, 25.0)],
            25.0,
        );
        let mut harness = Harness::with_backend(SimulatedMedia::new(DURATION), backend);
        harness.session.start();

        let snapshot = harness.session.snapshot();
        assert_eq!(snapshot.current_time, 25.0);
        assert_eq!(harness.media.current_position(), 25.0);
        assert_eq!(snapshot.total_watched_duration, 20.0);
        assert!((snapshot.progress_percent - 20.0 / DURATION * 100.0).abs() < 1e-9);
        assert_eq!(
            harness.notifier.notifications(),
            vec![Notification::ProgressRestored { last_position: 25.0 }]
        );
    }

    #[test]
    fn malformed_record_is_discarded_and_session_starts_fresh() {
        let backend = MemoryStore::new();
        backend
            .set("videoProgress_user-1_video1", "{\"intervals\": 7")
            .unwrap();
        let mut harness = Harness::with_backend(SimulatedMedia::new(DURATION), backend);
        harness.session.start();

        assert_eq!(harness.session.status(), SessionStatus::Paused);
        assert_eq!(harness.session.snapshot().total_watched_duration, 0.0);
        assert!(harness.backend.get("videoProgress_user-1_video1").unwrap().is_none());
        assert!(matches!(
            harness.notifier.notifications().as_slice(),
            [Notification::ProgressDiscarded { .. }]
        ));
    }

    #[test]
    fn waits_for_metadata_before_becoming_active() {
        let media = SimulatedMedia::unloaded();
        let mut harness = Harness::new(media);
        harness.session.start();
        assert_eq!(harness.session.status(), SessionStatus::Restoring);

        harness.media.load_metadata(120.0);
        harness.pump();

        let snapshot = harness.session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Paused);
        assert_eq!(snapshot.duration, 120.0);
    }

    #[test]
    fn playback_with_a_jump_produces_two_spans() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();
        harness.session.handle_signal(PlaybackSignal::Play);
        for position in [1.0, 2.0, 3.0, 3.2, 10.0, 11.0, 12.0] {
            harness
                .session
                .handle_signal(PlaybackSignal::PositionUpdate { position });
        }
        harness.session.handle_signal(PlaybackSignal::Pause);

        let stored = harness.stored().unwrap();
        assert_eq!(
            stored.intervals,
            vec![Interval::new(1.0, 3.2), Interval::new(10.0, 12.0)]
        );
    }

    #[test]
    fn position_updates_while_paused_do_not_count() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();
        for position in [1.0, 2.0, 3.0] {
            harness
                .session
                .handle_signal(PlaybackSignal::PositionUpdate { position });
        }

        assert!(harness.session.watched_intervals().is_empty());
        assert_eq!(harness.session.snapshot().current_time, 3.0);
    }

    #[test]
    fn pause_flushes_with_clock_position() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();
        harness.session.apply_command(PlayerCommand::TogglePlayPause);
        harness.pump();
        assert!(harness.session.is_playing());

        harness.media.advance(10.0, 0.25);
        harness.pump();
        harness.session.apply_command(PlayerCommand::TogglePlayPause);
        harness.pump();

        let stored = harness.stored().unwrap();
        assert_eq!(stored.last_position, 10.0);
        assert_eq!(stored.intervals.len(), 1);
        assert!((stored.intervals[0].end - 10.0).abs() < 1e-9);
        assert!((stored.progress - (stored.intervals[0].len() / DURATION * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn seek_adds_bridge_and_persists_target() {
        let backend = MemoryStore::new();
        seed_record(&backend, vec![Interval::new(0.0, 50.0)], 50.0);
        let mut harness = Harness::with_backend(SimulatedMedia::new(DURATION), backend);
        harness.session.start();

        harness.session.apply_command(PlayerCommand::Seek { time: 200.0 });

        let stored = harness.stored().unwrap();
        assert_eq!(stored.last_position, 200.0);
        assert_eq!(
            stored.intervals,
            vec![Interval::new(0.0, 50.0), Interval::new(200.0, 200.1)]
        );
        let snapshot = harness.session.snapshot();
        assert!((snapshot.total_watched_duration - 50.1).abs() < 1e-9);
        assert!((snapshot.progress_percent - 50.1 / DURATION * 100.0).abs() < 1e-9);
    }

    #[test]
    fn seek_and_skip_are_clamped() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();

        harness.session.apply_command(PlayerCommand::Seek { time: 10_000.0 });
        assert_eq!(harness.stored().unwrap().last_position, DURATION);

        harness.session.apply_command(PlayerCommand::Seek { time: 30.0 });
        harness.session.apply_command(PlayerCommand::SkipBy { seconds: -45.0 });
        assert_eq!(harness.stored().unwrap().last_position, 0.0);
        assert_eq!(harness.media.current_position(), 0.0);

        harness.session.apply_command(PlayerCommand::SkipBy { seconds: 10.0 });
        assert_eq!(harness.stored().unwrap().last_position, 10.0);
    }

    #[test]
    fn playing_after_seek_extends_the_bridge() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();
        harness.session.apply_command(PlayerCommand::Seek { time: 100.0 });
        harness.pump();
        harness.session.apply_command(PlayerCommand::TogglePlayPause);
        harness.media.advance(5.0, 0.25);
        harness.pump();

        assert_eq!(
            harness.session.watched_intervals(),
            vec![Interval::new(100.0, 105.0)]
        );
    }

    #[test]
    fn ended_flushes_and_notifies_once() {
        let mut harness = Harness::new(SimulatedMedia::new(4.0));
        harness.session.start();
        harness.session.apply_command(PlayerCommand::TogglePlayPause);
        harness.media.advance(10.0, 0.25);
        harness.pump();

        let snapshot = harness.session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Paused);
        assert!(snapshot.finished);
        assert_eq!(harness.stored().unwrap().last_position, 4.0);
        assert_eq!(
            harness.notifier.notifications(),
            vec![Notification::VideoFinished {
                title: "Introduction to Modern Web Development".into()
            }]
        );
    }

    #[test]
    fn periodic_flush_only_while_playing() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();
        assert!(harness.session.periodic_flush().is_none());
        assert!(harness.stored().is_none());

        harness.session.handle_signal(PlaybackSignal::Play);
        assert!(harness.session.periodic_flush().is_some());
        assert!(harness.stored().is_some());
    }

    #[test]
    fn flush_is_idempotent_apart_from_timestamp() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();
        harness.session.apply_command(PlayerCommand::TogglePlayPause);
        harness.media.advance(3.0, 0.25);
        harness.pump();

        let first = harness.session.flush().unwrap();
        let second = harness.session.flush().unwrap();
        assert_eq!(first.intervals, second.intervals);
        assert_eq!(first.last_position, second.last_position);
        assert_eq!(first.progress, second.progress);
    }

    #[test]
    fn write_failure_switches_to_memory_only_and_reports_once() {
        let notifier = RecordingNotifier::new();
        let mut session = TrackingSession::new(
            "user-1",
            VideoInfo::new("video1", "Clip", DURATION),
            TrackingConfig::default(),
            ProgressStore::new(Arc::new(BrokenStore)),
            Box::new(SimulatedMedia::new(DURATION)),
            Arc::new(notifier.clone()),
        );
        session.start();
        session.handle_signal(PlaybackSignal::Play);
        session.handle_signal(PlaybackSignal::PositionUpdate { position: 1.0 });

        assert!(session.flush().is_some());
        assert!(session.flush().is_some());
        assert!(session.is_memory_only());
        assert_eq!(
            notifier
                .notifications()
                .iter()
                .filter(|n| matches!(n, Notification::TrackingUnavailable { .. }))
                .count(),
            1
        );
        assert!(session.snapshot().total_watched_duration > 0.0);
    }

    #[test]
    fn teardown_flushes_and_ignores_later_signals() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();
        harness.session.handle_signal(PlaybackSignal::Play);
        for position in [1.0, 2.0] {
            harness
                .session
                .handle_signal(PlaybackSignal::PositionUpdate { position });
        }

        let snapshot = harness.session.teardown();
        assert_eq!(snapshot.status, SessionStatus::Terminated);
        let stored = harness.stored().unwrap();
        assert_eq!(stored.intervals, vec![Interval::new(1.0, 2.0)]);

        harness
            .session
            .handle_signal(PlaybackSignal::PositionUpdate { position: 50.0 });
        harness.session.apply_command(PlayerCommand::Seek { time: 300.0 });
        assert!(harness.session.flush().is_none());
        assert_eq!(harness.stored().unwrap(), stored);
        assert_eq!(harness.session.snapshot().current_time, 2.0);
    }

    #[test]
    fn direct_seek_and_skip_after_teardown_change_nothing() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();
        harness.session.teardown();

        harness.session.seek(300.0);
        harness.session.skip_by(10.0);

        assert_eq!(harness.session.snapshot().current_time, 0.0);
        assert_eq!(harness.media.current_position(), 0.0);
        assert!(harness.session.watched_intervals().is_empty());
        assert_eq!(harness.stored().unwrap().last_position, 0.0);
    }

    #[test]
    fn seek_before_start_is_ignored() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.seek(42.0);

        assert_eq!(harness.session.status(), SessionStatus::Idle);
        assert_eq!(harness.media.current_position(), 0.0);
        assert!(harness.stored().is_none());
    }

    #[test]
    fn dropping_an_active_session_flushes() {
        let backend = MemoryStore::new();
        let mut harness = Harness::with_backend(SimulatedMedia::new(DURATION), backend.clone());
        harness.session.start();
        harness.session.handle_signal(PlaybackSignal::Play);
        for position in [1.0, 2.0, 3.0] {
            harness
                .session
                .handle_signal(PlaybackSignal::PositionUpdate { position });
        }
        assert!(harness.stored().is_none());

        drop(harness);

        let stored = ProgressStore::new(Arc::new(backend))
            .load(&ProgressKey::new("user-1", "video1"))
            .unwrap()
            .unwrap();
        assert_eq!(stored.intervals, vec![Interval::new(1.0, 3.0)]);
    }

    #[test]
    fn volume_and_mute_rules() {
        let mut harness = Harness::new(SimulatedMedia::new(DURATION));
        harness.session.start();

        harness.session.apply_command(PlayerCommand::SetVolume { volume: 0.0 });
        assert!(harness.session.snapshot().is_muted);

        harness.session.apply_command(PlayerCommand::ToggleMute);
        let snapshot = harness.session.snapshot();
        assert!(!snapshot.is_muted);
        assert_eq!(snapshot.volume, 0.5);

        harness.session.apply_command(PlayerCommand::SetVolume { volume: 3.0 });
        assert_eq!(harness.session.snapshot().volume, 1.0);

        harness.session.apply_command(PlayerCommand::ToggleMute);
        let snapshot = harness.session.snapshot();
        assert!(snapshot.is_muted);
        assert_eq!(snapshot.volume, 1.0);
    }

    #[test]
    fn fullscreen_failure_is_reported() {
        let media = SimulatedMedia::new(DURATION);
        media.set_fullscreen_supported(false);
        let mut harness = Harness::new(media);
        harness.session.start();

        harness.session.apply_command(PlayerCommand::ToggleFullscreen);
        assert!(!harness.session.snapshot().is_fullscreen);
        assert!(matches!(
            harness.notifier.notifications().as_slice(),
            [Notification::FullscreenError { .. }]
        ));

        harness.media.set_fullscreen_supported(true);
        harness.session.apply_command(PlayerCommand::ToggleFullscreen);
        assert!(harness.session.snapshot().is_fullscreen);
    }
}
