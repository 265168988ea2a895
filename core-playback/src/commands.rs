//! Message interface to a running [`PlaybackController`](crate::PlaybackController).

use tokio::sync::mpsc;

use crate::error::{PlaybackError, Result};

/// Default capacity of the command channel.
pub const DEFAULT_COMMAND_CAPACITY: usize = 32;

/// Requests consumed by the controller loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackCommand {
    /// Start when idle and ready, stop when playing.
    TogglePlayback,
    /// Start if idle and ready.
    Play,
    /// Stop the sounding session, if any.
    Stop,
    /// Replace the current audio with a new transport payload.
    Load(String),
    /// Stop, release the engine and end the loop.
    Shutdown,
}

/// Cloneable handle for sending [`PlaybackCommand`]s.
#[derive(Debug, Clone)]
pub struct PlaybackCommandSender {
    tx: mpsc::Sender<PlaybackCommand>,
}

impl PlaybackCommandSender {
    pub async fn send(&self, command: PlaybackCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| PlaybackError::ControllerClosed)
    }

    pub async fn toggle(&self) -> Result<()> {
        self.send(PlaybackCommand::TogglePlayback).await
    }

    pub async fn play(&self) -> Result<()> {
        self.send(PlaybackCommand::Play).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(PlaybackCommand::Stop).await
    }

    pub async fn load(&self, payload: impl Into<String>) -> Result<()> {
        self.send(PlaybackCommand::Load(payload.into())).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(PlaybackCommand::Shutdown).await
    }

    /// `true` once the controller loop has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a bounded command channel.
pub fn command_channel(capacity: usize) -> (PlaybackCommandSender, mpsc::Receiver<PlaybackCommand>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (PlaybackCommandSender { tx }, rx)
}
