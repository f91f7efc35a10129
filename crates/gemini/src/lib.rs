//! Client for a Gemini-compatible `generateContent` API.
//!
//! Provides typed request/response messages, the REST client used for
//! slide-image generation and outline synthesis, and the
//! [`deckgen_pipeline::PageGenerator`] implementation the orchestrator
//! consumes.

pub mod api;
pub mod generator;
pub mod messages;

pub use api::{GeminiApi, GeminiApiError, GeminiConfig, ImageOptions};
