//! Job category classification
//!
//! The [`ClassificationSubsystem`] resolves free text to a minor category
//! label by walking a fixed chain:
//!
//! 1. blank text resolves to an empty label and is never cached
//! 2. the run-scoped [`ClassificationCache`]
//! 3. the strong-signal [`heuristic::pre_filter`]
//! 4. the [`ClassificationOracle`], constrained to the taxonomy options
//! 5. the configured [`FallbackPolicy`] whenever the oracle is absent,
//!    fails, times out or answers with something unusable
//!
//! Oracle failures never surface as errors; they show up as
//! [`ClassificationOutcome::Fallback`].

pub mod cache;
pub mod heuristic;
pub mod openai;
pub mod oracle;
pub mod prompt;
mod subsystem;

pub use cache::{CacheLookup, ClassificationCache};
pub use openai::{OpenAiOracle, OracleConfig};
pub use oracle::{parse_answer, ClassificationOracle};
pub use subsystem::{ClassificationSettings, ClassificationStats, ClassificationSubsystem};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when the oracle cannot provide a label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Run the full keyword classifier
    #[default]
    Heuristic,
    /// Always use [`heuristic::DEFAULT_LABEL`]
    DefaultLabel,
}

impl FallbackPolicy {
    pub fn label_for(&self, text: &str) -> &'static str {
        match self {
            FallbackPolicy::Heuristic => heuristic::classify_minor(text),
            FallbackPolicy::DefaultLabel => heuristic::DEFAULT_LABEL,
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(FallbackPolicy::Heuristic),
            "default-label" | "default_label" | "default" => Ok(FallbackPolicy::DefaultLabel),
            other => Err(crate::Error::configuration(format!(
                "unknown fallback policy '{}', expected 'heuristic' or 'default-label'",
                other
            ))),
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackPolicy::Heuristic => write!(f, "heuristic"),
            FallbackPolicy::DefaultLabel => write!(f, "default-label"),
        }
    }
}

/// Where a successfully resolved label came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionSource {
    /// Blank input; the label is empty
    EmptyInput,
    Cache,
    PreFilter,
    Oracle,
}

/// Why the fallback policy was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "kebab-case")]
pub enum FallbackReason {
    /// No oracle is configured
    OracleUnavailable,
    OracleError(String),
    Timeout,
    UnparseableResponse,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::OracleUnavailable => write!(f, "oracle unavailable"),
            FallbackReason::OracleError(message) => write!(f, "oracle error: {}", message),
            FallbackReason::Timeout => write!(f, "oracle timed out"),
            FallbackReason::UnparseableResponse => write!(f, "unparseable oracle response"),
        }
    }
}

/// Result of classifying one text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ClassificationOutcome {
    Resolved {
        label: String,
        source: ResolutionSource,
    },
    Fallback {
        label: String,
        reason: FallbackReason,
    },
}

impl ClassificationOutcome {
    pub fn label(&self) -> &str {
        match self {
            ClassificationOutcome::Resolved { label, .. }
            | ClassificationOutcome::Fallback { label, .. } => label,
        }
    }

    pub fn into_label(self) -> String {
        match self {
            ClassificationOutcome::Resolved { label, .. }
            | ClassificationOutcome::Fallback { label, .. } => label,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ClassificationOutcome::Fallback { .. })
    }
}
