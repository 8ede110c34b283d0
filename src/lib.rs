//! PitBoy Gateway - voice assistant proxy for a watch dictation client
//!
//! The watch sends dictated text to this service, which relays it to one
//! configured chat provider and optionally synthesizes the reply as speech.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │        Watch client          │
//! │  Dictation │ Session │ Play  │
//! └──────────────┬───────────────┘
//!                │ x-api-key
//! ┌──────────────▼───────────────┐
//! │        PitBoy Gateway        │
//! │  /api/watch-chat  /watch-tts │
//! └──────┬──────────────┬────────┘
//!        │              │
//! ┌──────▼──────┐ ┌─────▼───────┐
//! │ Chat        │ │ Speech      │
//! │ echo │ API  │ │ speech API  │
//! │ gateway     │ │             │
//! └─────────────┘ └─────────────┘
//! ```

pub mod api;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod speech;

pub use api::{ApiServer, ApiServerBuilder, ApiState};
pub use chat::ChatProvider;
pub use client::{ProxyClient, Session, SessionState, Uplink};
pub use config::Config;
pub use error::{Error, Result};
pub use speech::{SpeechAudio, SpeechProvider};
