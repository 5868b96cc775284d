//! Gemini upstream integration.
//!
//! This module provides the narrow upstream trait used by the relay and the
//! reqwest-backed client that talks to the `generateContent` endpoint.

pub mod client;
pub mod payload;

pub use client::{GeminiClient, RawUpstreamResponse, UpstreamClient};
