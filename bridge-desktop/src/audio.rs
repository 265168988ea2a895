//! Headless Audio Engine
//!
//! Desktop builds run without touching an output device: each session is
//! timed against the tokio clock for the duration of its buffer and then
//! reported as ended. Hosts that want real sound inject their own
//! [`AudioEngine`] instead.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    playback::{AudioEngine, EngineState, PlaybackRequest, PlaybackSessionId, SessionEnded},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, warn};

struct EngineInner {
    state: EngineState,
    sessions: HashMap<PlaybackSessionId, oneshot::Sender<()>>,
}

/// Clock-driven [`AudioEngine`] for desktop and headless hosts.
pub struct ClockedAudioEngine {
    inner: Arc<Mutex<EngineInner>>,
}

impl ClockedAudioEngine {
    /// Create a suspended engine. It becomes usable after [`AudioEngine::resume`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineInner {
                state: EngineState::Suspended,
                sessions: HashMap::new(),
            })),
        }
    }

    /// Number of sessions currently playing.
    pub fn active_sessions(&self) -> usize {
        self.inner.lock().sessions.len()
    }
}

impl Default for ClockedAudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioEngine for ClockedAudioEngine {
    async fn resume(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        match inner.state {
            EngineState::Closed => Err(BridgeError::NotAvailable(
                "Audio engine has been closed".to_string(),
            )),
            EngineState::Running => Ok(()),
            EngineState::Suspended => {
                inner.state = EngineState::Running;
                debug!("Audio engine resumed");
                Ok(())
            }
        }
    }

    async fn start(&self, request: PlaybackRequest) -> Result<PlaybackSessionId> {
        let PlaybackRequest {
            frames,
            volume,
            on_ended,
        } = request;

        let session = PlaybackSessionId::new();
        let (cancel_tx, cancel_rx) = oneshot::channel();

        {
            let mut inner = self.inner.lock();
            match inner.state {
                EngineState::Closed => {
                    return Err(BridgeError::NotAvailable(
                        "Audio engine has been closed".to_string(),
                    ))
                }
                EngineState::Suspended => {
                    debug!("Starting session on suspended engine; resuming");
                    inner.state = EngineState::Running;
                }
                EngineState::Running => {}
            }
            inner.sessions.insert(session, cancel_tx);
        }

        let duration = frames.duration();
        debug!(
            session = %session,
            frames = frames.frame_count(),
            sample_rate = frames.sample_rate,
            channels = frames.channels,
            volume,
            duration_ms = duration.as_millis() as u64,
            "Started playback session"
        );

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = sleep(duration) => {
                    // Only a session still registered may report its end; stop()
                    // removes it under the same lock.
                    let finished = inner.lock().sessions.remove(&session).is_some();
                    if finished {
                        if on_ended.send(SessionEnded { session }).is_err() {
                            warn!(session = %session, "Session ended with no listener");
                        } else {
                            debug!(session = %session, "Playback session ended");
                        }
                    }
                }
                _ = cancel_rx => {
                    debug!(session = %session, "Playback session cancelled");
                }
            }
        });

        Ok(session)
    }

    async fn stop(&self, session: PlaybackSessionId) -> Result<()> {
        if let Some(cancel) = self.inner.lock().sessions.remove(&session) {
            let _ = cancel.send(());
            debug!(session = %session, "Stopped playback session");
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        for (_, cancel) in inner.sessions.drain() {
            let _ = cancel.send(());
        }
        inner.state = EngineState::Closed;
        debug!("Audio engine closed");
        Ok(())
    }

    fn state(&self) -> EngineState {
        self.inner.lock().state
    }
}
