//! Kernel error types.
//!
//! Directory and catalog lookups surface errors through [`KernelError`].
//! A missing mapping or template is an ordinary outcome for callers (the
//! router turns it into provisioning or an unroutable result), so the
//! variants carry the intent label rather than opaque strings.

/// Unified error type for the intentflow kernel.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// No live workflow definition is recorded for the intent.
    #[error("no workflow mapped for intent: {intent}")]
    MappingNotFound { intent: String },

    /// The static catalog has no template for the intent.
    #[error("no workflow template for intent: {intent}")]
    TemplateNotFound { intent: String },

    /// A definition was recorded before the remote service assigned it an id.
    #[error("workflow `{name}` has no remote id")]
    MissingWorkflowId { name: String },
}

/// Convenience alias used throughout the kernel crate.
pub type Result<T> = std::result::Result<T, KernelError>;
