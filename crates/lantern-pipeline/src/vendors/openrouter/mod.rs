//! OpenRouter completion integration.
//!
//! Wire-format handling for the chat-completions streaming protocol lives in
//! `transport`; the public surface is the client and its configuration.
mod adapter;
mod config;
pub(crate) mod transport;

pub use adapter::OpenRouterClient;
pub use config::OpenRouterConfig;
