//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check and the `/voice` text endpoint
//! - `relay` - Browser ⇄ Gemini Live WebSocket relay

pub mod api;
pub mod relay;

pub use relay::relay_handler;
