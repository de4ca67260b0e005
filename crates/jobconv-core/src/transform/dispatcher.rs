//! Applies one compiled rule to one field value

use super::built_in;
use super::rule::{ClassifyTarget, Normalization, Rule};
use crate::classify::{heuristic, ClassificationOutcome, ClassificationSubsystem};
use crate::record::FieldValue;
use std::sync::Arc;

/// Rule dispatcher. Total: every rule yields a string, nothing fails.
#[derive(Debug, Clone)]
pub struct RuleDispatcher {
    classifier: Arc<ClassificationSubsystem>,
}

impl RuleDispatcher {
    pub fn new(classifier: Arc<ClassificationSubsystem>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &ClassificationSubsystem {
        &self.classifier
    }

    pub async fn apply(&self, value: FieldValue<'_>, rule: &Rule) -> String {
        match rule {
            Rule::Classify(ClassifyTarget::JobCategory) => {
                self.classify_job_category(value).await.into_label()
            }
            other => apply_static(value, other),
        }
    }

    /// Minor job category with the full outcome, for callers that report it
    pub async fn classify_job_category(&self, value: FieldValue<'_>) -> ClassificationOutcome {
        self.classifier.classify(value.as_str()).await
    }
}

/// Every rule that needs no classification subsystem.
///
/// Job category classification and the major category lookup depend on
/// state outside the field value and resolve to an empty string here.
pub fn apply_static(value: FieldValue<'_>, rule: &Rule) -> String {
    match rule {
        Rule::PassThrough | Rule::Unknown(_) => built_in::pass_through(value),
        Rule::Literal(literal) => literal.clone(),
        Rule::Classify(ClassifyTarget::Attribute(attribute)) => {
            heuristic::match_attribute(*attribute, value.as_str()).to_string()
        }
        Rule::Classify(ClassifyTarget::Unrecognized) => String::new(),
        Rule::Classify(ClassifyTarget::JobCategory) | Rule::MajorCategoryLookup => String::new(),
        Rule::HiringCount => built_in::hiring_count(value),
        Rule::ConditionalDefault { fallback } => {
            built_in::conditional_default(value, fallback.as_deref())
        }
        Rule::Normalize(Normalization::Prefecture) => built_in::normalize_prefecture(value),
    }
}
