//! chat-relay: streaming chat proxy for a local Ollama inference server.
//!
//! Serves a static single-page chat UI and relays chat requests to the
//! backend's /api/chat endpoint, forwarding the streamed response body to
//! the browser chunk by chunk without buffering the payload at any hop.

pub mod config;
pub mod ollama;
pub mod pool;
pub mod server;
