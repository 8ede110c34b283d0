//! Dictation/send/playback state machine
//!
//! ```text
//!   Idle ──listen──▶ Listening ──dictation ends──▶ Idle
//!   Idle ──send────▶ Sending ───reply played─────▶ Idle
//! ```
//!
//! Every transition out of `Listening` or `Sending` lands back in `Idle`,
//! whether the operation finished, failed, or was aborted.

use async_trait::async_trait;
use tokio::sync::watch;

use super::{AbortSignal, Uplink};
use crate::Result;
use crate::speech::SpeechAudio;

/// Client-visible session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Listening,
    Sending,
}

impl SessionState {
    /// Status line for the display
    #[must_use]
    pub const fn status_text(self) -> &'static str {
        match self {
            Self::Sending => "UPLINK: SENDING…",
            Self::Listening => "DICTATION: ACTIVE",
            Self::Idle => "READY",
        }
    }
}

/// How replies are played back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    /// Hand the reply text to the speaker
    #[default]
    Text,
    /// Fetch synthesized audio from the proxy and play the bytes
    Audio,
}

/// Source of dictated speech
#[async_trait]
pub trait Dictation: Send {
    /// Next running transcript, or `None` once dictation has stopped
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer fails
    async fn next_partial(&mut self) -> Result<Option<String>>;
}

/// Sink for replies
#[async_trait]
pub trait Speaker: Send {
    /// Speak reply text
    ///
    /// # Errors
    ///
    /// Returns error if the text cannot be spoken
    async fn speak(&mut self, text: &str) -> Result<()>;

    /// Play synthesized audio
    ///
    /// # Errors
    ///
    /// Returns error if the audio cannot be played
    async fn play(&mut self, audio: &SpeechAudio) -> Result<()>;
}

/// A single-user voice session
pub struct Session<U, D, S> {
    uplink: U,
    dictation: D,
    speaker: S,
    playback: Playback,
    state: watch::Sender<SessionState>,
    transcript: String,
    response: String,
    last_error: Option<String>,
}

impl<U, D, S> Session<U, D, S>
where
    U: Uplink,
    D: Dictation,
    S: Speaker,
{
    /// Create an idle session
    #[must_use]
    pub fn new(uplink: U, dictation: D, speaker: S, playback: Playback) -> Self {
        Self {
            uplink,
            dictation,
            speaker,
            playback,
            state: watch::Sender::new(SessionState::Idle),
            transcript: String::new(),
            response: String::new(),
            last_error: None,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Follow state changes while `listen` or `send` holds the session
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Latest transcript
    #[must_use]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Latest reply
    #[must_use]
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Message of the last failure, cleared when a new action starts
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Status line for the display
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        self.state().status_text()
    }

    /// Replace the transcript, as if dictated
    pub fn set_transcript(&mut self, transcript: impl Into<String>) {
        self.transcript = transcript.into();
    }

    /// Run dictation until it stops, updating the transcript as it goes
    ///
    /// No-op unless idle.
    pub async fn listen(&mut self, abort: &AbortSignal) {
        if self.state() != SessionState::Idle {
            return;
        }

        self.last_error = None;
        self.state.send_replace(SessionState::Listening);
        tracing::debug!("dictation started");

        loop {
            let partial = tokio::select! {
                () = abort.aborted() => {
                    tracing::debug!("dictation aborted");
                    break;
                }
                partial = self.dictation.next_partial() => partial,
            };

            match partial {
                Ok(Some(text)) => self.transcript = text,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "dictation failed");
                    self.last_error = Some(e.to_string());
                    break;
                }
            }
        }

        self.state.send_replace(SessionState::Idle);
    }

    /// Send the transcript and play back the reply
    ///
    /// No-op unless idle with a non-empty transcript. An abort leaves no
    /// reply behind, even if the proxy already answered.
    pub async fn send(&mut self, abort: &AbortSignal) {
        let prompt = self.transcript.trim().to_string();
        if self.state() != SessionState::Idle || prompt.is_empty() {
            return;
        }

        self.last_error = None;
        self.state.send_replace(SessionState::Sending);

        let outcome = tokio::select! {
            () = abort.aborted() => None,
            result = Self::exchange(
                &self.uplink,
                &mut self.speaker,
                self.playback,
                &prompt,
                &mut self.response,
            ) => Some(result),
        };

        match outcome {
            None => {
                tracing::debug!("send aborted");
                self.response.clear();
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "send failed");
                self.last_error = Some(e.to_string());
            }
            Some(Ok(())) => {}
        }

        self.state.send_replace(SessionState::Idle);
    }

    async fn exchange(
        uplink: &U,
        speaker: &mut S,
        playback: Playback,
        prompt: &str,
        response: &mut String,
    ) -> Result<()> {
        let reply = uplink.send(prompt).await?;
        response.clone_from(&reply);

        match playback {
            Playback::Text => speaker.speak(&reply).await,
            Playback::Audio => {
                let audio = uplink.synthesize(&reply).await?;
                speaker.play(&audio).await
            }
        }
    }
}
