//! Generative-text collaborator contract for goal breakdown.
//!
//! # Responsibility
//! - Define the one seam between the journal and the external
//!   text-generation API.
//! - Keep provider failures recoverable and scoped to the breakdown
//!   operation.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod http;

pub use http::{HttpTaskSuggester, SuggesterConfig};

pub type SuggestResult = Result<Vec<String>, SuggestError>;

/// Proposes subtask titles for a goal.
///
/// Implementations must return short, non-empty task strings; the caller
/// appends one subtask per string. Tests substitute scripted
/// implementations for the HTTP one.
pub trait TaskSuggester {
    fn suggest_subtasks(&self, title: &str, description: &str) -> SuggestResult;
}

/// Failures of the generative-text collaborator.
///
/// All variants are recoverable: the breakdown operation reports them to
/// the caller and leaves the store untouched.
#[derive(Debug)]
pub enum SuggestError {
    /// Transport-level failure (connect, timeout, TLS).
    Http(String),
    /// The provider answered with a non-success status.
    Api { status: u16, message: String },
    /// The provider answered, but not with a JSON array of task strings.
    MalformedResponse(String),
}

impl Display for SuggestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(message) => write!(f, "suggestion request failed: {message}"),
            Self::Api { status, message } => {
                write!(f, "suggestion API returned status {status}: {message}")
            }
            Self::MalformedResponse(message) => {
                write!(f, "malformed suggestion response: {message}")
            }
        }
    }
}

impl Error for SuggestError {}

impl From<reqwest::Error> for SuggestError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}
