//! Intent classification, routing and turn coordination for intentflow.
//!
//! This crate provides:
//!
//! - **Classification**: two-tier message classification (keyword fast path
//!   plus LLM fallback) via [`classifier::IntentClassifier`].
//! - **Routing**: intent → workflow resolution with on-demand provisioning
//!   and a single retry for stale ids via [`router::IntentRouter`].
//! - **Coordination**: one user turn end to end, with every failure mapped to
//!   a fallback reply, via [`coordinator::Coordinator`].

pub mod classifier;
pub mod coordinator;
pub mod error;
pub mod reply;
pub mod router;

pub use classifier::{
    Classification, ClassificationSource, Classifier, ConversationContext, IntentClassifier,
    DEFAULT_CONFIDENCE_THRESHOLD,
};
pub use coordinator::{Coordinator, CoordinatorConfig};
pub use error::{IntentError, Result, RouteError};
pub use reply::{FallbackReason, Reply, ReplyKind};
pub use router::{IntentRouter, RouteOutcome, RouteRequest, prepare_execution};
