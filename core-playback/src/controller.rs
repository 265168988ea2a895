//! # Playback Session Controller
//!
//! Owns the decoded [`AudioBuffer`] and at most one sounding engine session.
//!
//! ## State machine
//!
//! ```text
//!            load                decode ok
//!   Idle ──────────▶ Preparing ───────────▶ Idle (ready)
//!    ▲  ▲              │  ▲                    │
//!    │  │   decode err │  └── load (supersede) │ play / toggle
//!    │  └──────────────┘                       ▼
//!    └───────────── stop / toggle / end ──── Playing
//! ```
//!
//! Loads are identified by a monotonically increasing request token. A decode
//! result is only applied when its token is still the latest one, so
//! overlapping loads resolve last-write-wins regardless of completion order.
//!
//! Mutations are serialized by one async mutex. Decoding never holds it:
//! [`PlaybackController::begin_load`] takes the token under the lock,
//! [`PendingLoad::decode`] runs on the blocking pool, and
//! [`PlaybackController::finish_load`] re-acquires the lock to apply.
//!
//! Every started session gets its own end-of-stream channel and a watcher
//! task, so natural completion returns the controller to `Idle` whether or
//! not [`PlaybackController::run`] is driving it.

use std::sync::Arc;

use bridge_traits::playback::{AudioEngine, PlaybackRequest, PlaybackSessionId, SessionEnded};
use core_runtime::config::AudioSettings;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::buffer::AudioBuffer;
use crate::codec;
use crate::commands::{command_channel, PlaybackCommand, PlaybackCommandSender};
use crate::error::{PlaybackError, Result};
use crate::export::AudioExport;
use crate::pcm;
use crate::wav::WavEncoder;

/// Coarse controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Preparing,
    Playing,
}

/// Snapshot returned by [`PlaybackController::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStatus {
    pub state: PlayerState,
    /// A decoded buffer is present.
    pub ready: bool,
    /// Message of the most recent load or start failure.
    pub last_error: Option<String>,
    /// Token of the most recent load request (0 before the first load).
    pub request: u64,
}

/// Result of applying a finished decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The buffer replaced the previous one.
    Applied,
    /// A newer load started meanwhile; the result was dropped.
    Superseded,
}

/// A load that has claimed a request token but not decoded yet.
#[derive(Debug)]
pub struct PendingLoad {
    request: u64,
    payload: String,
    sample_rate: u32,
    channels: u16,
}

impl PendingLoad {
    pub fn request(&self) -> u64 {
        self.request
    }

    /// Decode the payload off the async runtime.
    pub async fn decode(self) -> DecodedLoad {
        let PendingLoad {
            request,
            payload,
            sample_rate,
            channels,
        } = self;

        let result = tokio::task::spawn_blocking(move || {
            let bytes = codec::decode(&payload)?;
            pcm::interpret(&bytes, sample_rate, channels)
        })
        .await
        .unwrap_or_else(|e| Err(PlaybackError::Internal(format!("decode task failed: {}", e))));

        DecodedLoad { request, result }
    }
}

/// Decode result waiting to be applied by [`PlaybackController::finish_load`].
#[derive(Debug)]
pub struct DecodedLoad {
    pub request: u64,
    pub result: Result<AudioBuffer>,
}

struct ControllerInner {
    state: PlayerState,
    buffer: Option<Arc<AudioBuffer>>,
    session: Option<PlaybackSessionId>,
    latest_request: u64,
    last_error: Option<String>,
}

/// Drives one [`AudioEngine`] from transport payloads.
///
/// Can be used directly through its async methods, or through
/// [`PlaybackCommand`]s consumed by [`run`](Self::run).
pub struct PlaybackController {
    engine: Arc<dyn AudioEngine>,
    settings: AudioSettings,
    encoder: WavEncoder,
    events: Option<EventBus>,
    inner: Arc<Mutex<ControllerInner>>,
}

impl PlaybackController {
    pub fn new(engine: Arc<dyn AudioEngine>, settings: AudioSettings) -> Self {
        let encoder = WavEncoder::with_quantization(settings.wav_quantization);

        Self {
            engine,
            settings,
            encoder,
            events: None,
            inner: Arc::new(Mutex::new(ControllerInner {
                state: PlayerState::Idle,
                buffer: None,
                session: None,
                latest_request: 0,
                last_error: None,
            })),
        }
    }

    /// Publish [`PlaybackEvent`]s on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    fn emit(&self, event: PlaybackEvent) {
        publish(self.events.as_ref(), event);
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Claim a new request token for `payload` and enter `Preparing`.
    ///
    /// A sounding session is stopped and the current buffer dropped.
    pub async fn begin_load(&self, payload: impl Into<String>) -> PendingLoad {
        let mut inner = self.inner.lock().await;
        self.stop_session(&mut inner).await;

        inner.latest_request += 1;
        inner.state = PlayerState::Preparing;
        inner.buffer = None;
        inner.last_error = None;
        let request = inner.latest_request;
        drop(inner);

        debug!(request, "Preparing audio");
        self.emit(PlaybackEvent::Preparing { request });

        PendingLoad {
            request,
            payload: payload.into(),
            sample_rate: self.settings.sample_rate,
            channels: self.settings.channels,
        }
    }

    /// Apply a decode result if it belongs to the latest request.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the latest request failed. Stale
    /// results never fail.
    pub async fn finish_load(&self, decoded: DecodedLoad) -> Result<LoadOutcome> {
        let mut inner = self.inner.lock().await;

        if decoded.request != inner.latest_request {
            debug!(
                request = decoded.request,
                latest = inner.latest_request,
                "Discarding superseded decode"
            );
            drop(inner);
            self.emit(PlaybackEvent::Superseded {
                request: decoded.request,
            });
            return Ok(LoadOutcome::Superseded);
        }

        inner.state = PlayerState::Idle;
        match decoded.result {
            Ok(buffer) => {
                let frame_count = buffer.frame_count() as u64;
                let duration_ms = buffer.duration().as_millis() as u64;
                inner.buffer = Some(Arc::new(buffer));
                inner.last_error = None;
                drop(inner);

                info!(
                    request = decoded.request,
                    frame_count, duration_ms, "Audio ready"
                );
                self.emit(PlaybackEvent::Ready {
                    request: decoded.request,
                    frame_count,
                    duration_ms,
                });
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                inner.buffer = None;
                inner.last_error = Some(e.to_string());
                drop(inner);

                warn!(request = decoded.request, error = %e, "Failed to prepare audio");
                self.emit(PlaybackEvent::Error {
                    message: e.to_string(),
                    recoverable: e.is_transient(),
                });
                Err(e)
            }
        }
    }

    /// Replace the current audio with `payload` and wait until it is decoded.
    pub async fn load(&self, payload: impl Into<String>) -> Result<LoadOutcome> {
        let pending = self.begin_load(payload).await;
        let decoded = pending.decode().await;
        self.finish_load(decoded).await
    }

    /// Stop any session, drop the buffer and invalidate in-flight loads.
    ///
    /// Leaves the controller `Idle` with nothing to play. Returns `true` if
    /// there was anything to discard.
    pub async fn unload(&self) -> bool {
        let mut inner = self.inner.lock().await;
        let stopped = self.stop_session(&mut inner).await;
        let discarded = inner.buffer.take().is_some() || inner.state == PlayerState::Preparing;

        // A decode still in flight now resolves as superseded.
        inner.latest_request += 1;
        inner.state = PlayerState::Idle;
        inner.last_error = None;
        let request = inner.latest_request;
        drop(inner);

        debug!(request, "Audio unloaded");
        stopped || discarded
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Start playback from the beginning of the buffer.
    ///
    /// Does nothing while already playing.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::NoAudioLoaded`] while preparing or without a buffer
    /// - [`PlaybackError::PlaybackResource`] when the engine refuses
    pub async fn play(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        self.play_locked(&mut inner).await
    }

    async fn play_locked(&self, inner: &mut ControllerInner) -> Result<()> {
        match inner.state {
            PlayerState::Playing => return Ok(()),
            PlayerState::Preparing => return Err(PlaybackError::NoAudioLoaded),
            PlayerState::Idle => {}
        }
        let buffer = inner.buffer.clone().ok_or(PlaybackError::NoAudioLoaded)?;

        let (on_ended, ended_rx) = mpsc::unbounded_channel();
        let request = PlaybackRequest::new(buffer.to_pcm_frames(), on_ended);
        let started = match self.engine.resume().await {
            Ok(()) => self.engine.start(request).await,
            Err(e) => Err(e),
        };

        match started {
            Ok(session) => {
                inner.session = Some(session);
                inner.state = PlayerState::Playing;
                inner.last_error = None;
                self.watch_session(session, ended_rx);

                info!(session = %session, "Playback started");
                self.emit(PlaybackEvent::Started {
                    session_id: session.to_string(),
                });
                Ok(())
            }
            Err(e) => {
                let err = PlaybackError::PlaybackResource(e.to_string());
                inner.session = None;
                inner.state = PlayerState::Idle;
                inner.last_error = Some(err.to_string());

                error!(error = %e, "Failed to start playback");
                self.emit(PlaybackEvent::Error {
                    message: err.to_string(),
                    recoverable: err.is_transient(),
                });
                Err(err)
            }
        }
    }

    /// Wait for `session` to end on its own and return to `Idle`.
    ///
    /// The task exits without effect when the engine drops the channel,
    /// which it does for stopped sessions.
    fn watch_session(
        &self,
        session: PlaybackSessionId,
        mut ended_rx: mpsc::UnboundedReceiver<SessionEnded>,
    ) {
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(ended) = ended_rx.recv().await {
                if ended.session == session {
                    complete_session(&inner, events.as_ref(), session).await;
                    break;
                }
            }
        });
    }

    /// Stop the sounding session.
    ///
    /// Returns `true` only when a session was actually stopped; repeated
    /// calls are no-ops.
    pub async fn stop(&self) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        Ok(self.stop_session(&mut inner).await)
    }

    /// Start when idle, stop when playing. Returns the resulting state.
    pub async fn toggle(&self) -> Result<PlayerState> {
        let mut inner = self.inner.lock().await;
        if inner.state == PlayerState::Playing {
            self.stop_session(&mut inner).await;
            Ok(PlayerState::Idle)
        } else {
            self.play_locked(&mut inner).await?;
            Ok(PlayerState::Playing)
        }
    }

    /// Handle an engine end-of-stream notification.
    ///
    /// Only the current session moves the controller back to `Idle`; late
    /// notifications for replaced sessions are ignored.
    pub async fn on_session_ended(&self, session: PlaybackSessionId) -> bool {
        complete_session(&self.inner, self.events.as_ref(), session).await
    }

    /// Stop playback and release the engine.
    pub async fn shutdown(&self) -> Result<()> {
        self.stop().await?;
        self.engine
            .close()
            .await
            .map_err(|e| PlaybackError::PlaybackResource(e.to_string()))?;
        info!("Playback controller shut down");
        Ok(())
    }

    async fn stop_session(&self, inner: &mut ControllerInner) -> bool {
        if inner.state != PlayerState::Playing {
            return false;
        }

        inner.state = PlayerState::Idle;
        let Some(session) = inner.session.take() else {
            return true;
        };

        if let Err(e) = self.engine.stop(session).await {
            warn!(session = %session, error = %e, "Engine failed to stop session");
        }

        debug!(session = %session, "Playback stopped");
        self.emit(PlaybackEvent::Stopped {
            session_id: session.to_string(),
        });
        true
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn status(&self) -> PlayerStatus {
        let inner = self.inner.lock().await;
        PlayerStatus {
            state: inner.state,
            ready: inner.buffer.is_some(),
            last_error: inner.last_error.clone(),
            request: inner.latest_request,
        }
    }

    pub async fn state(&self) -> PlayerState {
        self.inner.lock().await.state
    }

    /// The decoded buffer, if any.
    pub async fn buffer(&self) -> Option<Arc<AudioBuffer>> {
        self.inner.lock().await.buffer.clone()
    }

    /// Encode the current buffer as a downloadable WAV file.
    pub async fn export(&self) -> Result<AudioExport> {
        let buffer = self.buffer().await.ok_or(PlaybackError::NoAudioLoaded)?;
        let data = self.encoder.encode(&buffer);
        debug!(size = data.len(), "Encoded audio export");
        Ok(AudioExport::wav(self.settings.export_file_name.clone(), data))
    }

    // ========================================================================
    // Event loop
    // ========================================================================

    async fn handle(&self, command: PlaybackCommand) -> Result<()> {
        match command {
            PlaybackCommand::TogglePlayback => self.toggle().await.map(|_| ()),
            PlaybackCommand::Play => self.play().await,
            PlaybackCommand::Stop => self.stop().await.map(|_| ()),
            PlaybackCommand::Load(_) | PlaybackCommand::Shutdown => Ok(()),
        }
    }

    /// Consume commands until `Shutdown` or until every sender is dropped,
    /// then shut down.
    ///
    /// Decodes run as spawned tasks whose results are fed back into this
    /// loop, so loads never block toggles.
    ///
    /// # Errors
    ///
    /// Reports engine close failures on exit.
    pub async fn run(self: Arc<Self>, mut commands: mpsc::Receiver<PlaybackCommand>) -> Result<()> {
        let (decoded_tx, mut decoded_rx) = mpsc::unbounded_channel::<DecodedLoad>();

        debug!("Playback loop started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(PlaybackCommand::Shutdown) => break,
                    Some(PlaybackCommand::Load(payload)) => {
                        let pending = self.begin_load(payload).await;
                        let tx = decoded_tx.clone();
                        tokio::spawn(async move {
                            let _ = tx.send(pending.decode().await);
                        });
                    }
                    Some(command) => {
                        if let Err(e) = self.handle(command.clone()).await {
                            warn!(?command, error = %e, "Playback command failed");
                        }
                    }
                },
                Some(decoded) = decoded_rx.recv() => {
                    // Failures were already logged and published.
                    let _ = self.finish_load(decoded).await;
                }
            }
        }

        debug!("Playback loop exiting");
        self.shutdown().await
    }

    /// Spawn [`run`](Self::run) and return a sender for it.
    pub fn spawn(self: &Arc<Self>, capacity: usize) -> (PlaybackCommandSender, JoinHandle<Result<()>>) {
        let (sender, commands) = command_channel(capacity);
        let handle = tokio::spawn(Arc::clone(self).run(commands));
        (sender, handle)
    }
}

fn publish(events: Option<&EventBus>, event: PlaybackEvent) {
    if let Some(bus) = events {
        // No subscribers is not an error.
        let _ = bus.emit(CoreEvent::Playback(event));
    }
}

/// Natural end of `session`. Late notifications for replaced sessions are
/// ignored.
async fn complete_session(
    inner: &Mutex<ControllerInner>,
    events: Option<&EventBus>,
    session: PlaybackSessionId,
) -> bool {
    let mut inner = inner.lock().await;
    if inner.state != PlayerState::Playing || inner.session != Some(session) {
        debug!(session = %session, "Ignoring end of inactive session");
        return false;
    }

    inner.session = None;
    inner.state = PlayerState::Idle;
    drop(inner);

    info!(session = %session, "Playback completed");
    publish(events, PlaybackEvent::Completed {
        session_id: session.to_string(),
    });
    true
}
