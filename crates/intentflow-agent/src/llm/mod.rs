//! LLM client and wire types.

pub mod client;
pub mod types;

pub use client::{LlmClient, LlmClientConfig};
pub use types::{ChatRequest, LlmResponse, Message, Role};
