//! LLM access for intentflow.
//!
//! The classification collaborator needs one thing from a model: a single
//! non-streaming chat completion.  [`LlmClient`] provides that against the
//! OpenAI Chat Completions API and any OpenAI-compatible endpoint.

pub mod error;
pub mod llm;

pub use error::{AgentError, Result};
pub use llm::{ChatRequest, LlmClient, LlmClientConfig, LlmResponse, Message, Role};
