//! Gemini Live and REST integration.
//!
//! The relay speaks to Gemini in two ways:
//! - a Live WebSocket, opened once per client connection and initialised with
//!   a setup frame carrying the system prompt and tool manifest
//!   ([`connect_upstream`]);
//! - the REST `generateContent` call behind the text endpoint
//!   ([`generate_reply`]).

mod client;
mod config;
mod messages;
mod rest;

pub use client::{UpstreamSocket, build_setup_message, connect_upstream};
pub use config::{
    AUDIO_MODALITY, DEFAULT_LIVE_MODEL, DEFAULT_TEXT_MODEL, GEMINI_LIVE_URL, GEMINI_REST_URL,
    GeminiLiveConfig,
};
pub use messages::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    PrebuiltVoiceConfig, Setup, SetupMessage, SpeechConfig, Tool, VoiceConfig,
};
pub use rest::generate_reply;
