//! HTTP front end.
//!
//! - [`chat_api`]: Router, request validation, and the streaming chat endpoint
//! - [`static_files`]: Static asset routes for the chat UI
//! - [`streaming`]: Relay of backend chunks into the response body

pub mod chat_api;
pub mod static_files;
pub mod streaming;
