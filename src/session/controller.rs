use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use tokio::{
    sync::{mpsc, oneshot, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::models::ProgressRecord;

use super::{PlaybackSignal, PlayerCommand, PlayerSnapshot, TrackingSession};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

enum SessionMessage {
    Signal(PlaybackSignal),
    Command(PlayerCommand),
    Snapshot(oneshot::Sender<PlayerSnapshot>),
    Flush(oneshot::Sender<Option<ProgressRecord>>),
    Teardown,
}

/// Runs a [`TrackingSession`] on its own task.
///
/// Signals and commands are queued and applied one at a time, so the session
/// itself needs no locking. While playing, a ticker flushes every
/// `flush_interval`. Teardown stops the ticker and always issues a final
/// flush, whether it is requested, cancelled, triggered by dropping every
/// handle, or forced by the runtime dropping the task.
#[derive(Clone)]
pub struct SessionController {
    sender: mpsc::UnboundedSender<SessionMessage>,
    cancel_token: CancellationToken,
    handle: Arc<Mutex<Option<JoinHandle<PlayerSnapshot>>>>,
}

impl SessionController {
    /// Starts the session and its event loop. Must be called inside a Tokio
    /// runtime.
    pub fn spawn(session: TrackingSession) -> Self {
        let flush_interval = session.config().flush_interval();
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();

        let handle = tokio::spawn(session_loop(
            session,
            receiver,
            cancel_token.clone(),
            flush_interval,
        ));

        Self {
            sender,
            cancel_token,
            handle: Arc::new(Mutex::new(Some(handle))),
        }
    }

    pub fn signal(&self, signal: PlaybackSignal) -> Result<()> {
        self.send(SessionMessage::Signal(signal))
    }

    pub fn command(&self, command: PlayerCommand) -> Result<()> {
        self.send(SessionMessage::Command(command))
    }

    /// Derived state after every message queued before this call.
    pub async fn snapshot(&self) -> Result<PlayerSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionMessage::Snapshot(reply_tx))?;
        reply_rx
            .await
            .map_err(|_| anyhow!("tracking session terminated"))
    }

    pub async fn flush(&self) -> Result<Option<ProgressRecord>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionMessage::Flush(reply_tx))?;
        reply_rx
            .await
            .map_err(|_| anyhow!("tracking session terminated"))
    }

    /// Applies everything already queued, then tears the session down and
    /// waits for the final flush.
    pub async fn shutdown(&self) -> Result<PlayerSnapshot> {
        if self.sender.send(SessionMessage::Teardown).is_err() {
            self.cancel_token.cancel();
        }
        self.join().await
    }

    /// Tears down without applying queued messages.
    pub async fn cancel(&self) -> Result<PlayerSnapshot> {
        self.cancel_token.cancel();
        self.join().await
    }

    async fn join(&self) -> Result<PlayerSnapshot> {
        let handle = self
            .handle
            .lock()
            .await
            .take()
            .ok_or_else(|| anyhow!("tracking session already shut down"))?;
        handle.await.context("tracking session task failed to join")
    }

    fn send(&self, message: SessionMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| anyhow!("tracking session terminated"))
    }
}

async fn session_loop(
    mut session: TrackingSession,
    mut receiver: mpsc::UnboundedReceiver<SessionMessage>,
    cancel_token: CancellationToken,
    flush_interval: Duration,
) -> PlayerSnapshot {
    session.start();
    log_info!("session {} started for {}", session.id(), session.key());

    let mut ticker = time::interval_at(Instant::now() + flush_interval, flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut was_playing = session.is_playing();

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_debug!("session {} cancelled", session.id());
                break;
            }
            message = receiver.recv() => {
                match message {
                    Some(SessionMessage::Signal(signal)) => session.handle_signal(signal),
                    Some(SessionMessage::Command(command)) => session.apply_command(command),
                    Some(SessionMessage::Snapshot(reply)) => {
                        let _ = reply.send(session.snapshot());
                    }
                    Some(SessionMessage::Flush(reply)) => {
                        let _ = reply.send(session.flush());
                    }
                    Some(SessionMessage::Teardown) | None => break,
                }
            }
            _ = ticker.tick(), if was_playing => {
                log_debug!("session {} periodic flush", session.id());
                session.periodic_flush();
            }
        }

        let playing = session.is_playing();
        if playing && !was_playing {
            ticker.reset();
        }
        was_playing = playing;
    }

    receiver.close();
    session.teardown()
}
