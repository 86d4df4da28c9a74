//! Vendor-specific completion integrations.
//!
//! Vendor configuration and wire-format handling live here so the root
//! pipeline API can remain provider-agnostic.
pub mod openrouter;
