//! Intent identifiers.
//!
//! [`IntentType`] is a closed set of intents the platform knows how to
//! automate, plus [`IntentType::Other`] for labels produced by the
//! classifier that this build does not recognise.  Keeping unknown labels
//! instead of rejecting them lets the directory answer "no template"
//! exhaustively while still logging what the classifier asked for.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The classified purpose of a user message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntentType {
    DataAnalysis,
    DocumentProcessing,
    TaskManagement,
    ApprovalRequest,
    Notification,
    ReportGeneration,
    /// Plain conversation; never routed to a workflow.
    GeneralChat,
    /// Any label outside the known set, kept verbatim.
    Other(String),
}

impl IntentType {
    /// Every intent that ships with a catalog template.
    pub const CATALOGUED: [IntentType; 6] = [
        IntentType::DataAnalysis,
        IntentType::DocumentProcessing,
        IntentType::TaskManagement,
        IntentType::ApprovalRequest,
        IntentType::Notification,
        IntentType::ReportGeneration,
    ];

    /// Parse a classifier label.
    ///
    /// Matching ignores case and surrounding whitespace, and treats `-` and
    /// spaces as `_`.  Unrecognised labels become [`IntentType::Other`].
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "data_analysis" => Self::DataAnalysis,
            "document_processing" => Self::DocumentProcessing,
            "task_management" => Self::TaskManagement,
            "approval_request" => Self::ApprovalRequest,
            "notification" => Self::Notification,
            "report_generation" => Self::ReportGeneration,
            "general_chat" => Self::GeneralChat,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    /// The canonical snake_case label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::DataAnalysis => "data_analysis",
            Self::DocumentProcessing => "document_processing",
            Self::TaskManagement => "task_management",
            Self::ApprovalRequest => "approval_request",
            Self::Notification => "notification",
            Self::ReportGeneration => "report_generation",
            Self::GeneralChat => "general_chat",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for IntentType {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<IntentType> for String {
    fn from(intent: IntentType) -> Self {
        intent.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
