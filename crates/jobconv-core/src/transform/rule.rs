//! Compiled transformation rules
//!
//! Mapping documents carry rules as Japanese directive text. The text is
//! parsed exactly once into [`Rule`] when the mapping loads; per-record
//! evaluation never looks at the directive text again.

use serde::Serialize;
use std::fmt;

pub(crate) const PASS_THROUGH: &str = "そのまま";
pub(crate) const LITERAL_PREFIX: &str = "固定：";
pub(crate) const BLANK_SENTINEL: &str = "空白";

/// A transformation directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Rule {
    /// Copy the source value
    PassThrough,
    /// Emit a fixed value, ignoring the source
    Literal(String),
    /// Resolve through the classification subsystem or an attribute matcher
    Classify(ClassifyTarget),
    /// Major category derived from the record's minor category
    MajorCategoryLookup,
    /// Extract a head count such as `3名`
    HiringCount,
    /// Source value when present, otherwise the embedded default
    ConditionalDefault { fallback: Option<String> },
    /// Normalize a list-valued cell to one value
    Normalize(Normalization),
    /// Directive text that matches no known rule
    Unknown(String),
}

/// What a classification rule resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyTarget {
    /// Minor job category from the taxonomy
    JobCategory,
    /// A small categorical attribute
    Attribute(Attribute),
    /// Classification directive naming no known attribute
    Unrecognized,
}

/// Attributes handled by the keyword matchers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// 土日休み / シフト制 / その他
    Holiday,
    /// 転勤 あり / なし
    Transfer,
    /// 試用期間 あり / なし
    Probation,
    /// 賞与 あり / なし
    Bonus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Single prefecture, preferring 東京都
    Prefecture,
}

impl Rule {
    /// Compile directive text. Never fails: unmatched text becomes [`Rule::Unknown`].
    ///
    /// Checks run in a fixed precedence order, so a directive that mentions
    /// both `GPT` and `採用人数` is a classification rule.
    pub fn parse(text: &str) -> Self {
        if text == PASS_THROUGH {
            return Rule::PassThrough;
        }

        if text.starts_with(LITERAL_PREFIX) {
            return Rule::Literal(parse_literal(&text.replace(LITERAL_PREFIX, "")));
        }

        if text.contains("GPT") {
            let target = if text.contains("職種分類") {
                ClassifyTarget::JobCategory
            } else {
                Attribute::from_directive(text)
                    .map(ClassifyTarget::Attribute)
                    .unwrap_or(ClassifyTarget::Unrecognized)
            };
            return Rule::Classify(target);
        }

        if text.contains("分類元のテーブル") {
            return Rule::MajorCategoryLookup;
        }

        if text.contains("採用人数") {
            return Rule::HiringCount;
        }

        if text.contains("年齢") && text.contains("記載がない場合") {
            let fallback = ["35", "25"]
                .into_iter()
                .find(|candidate| text.contains(candidate))
                .map(str::to_string);
            return Rule::ConditionalDefault { fallback };
        }

        if text.contains("都道府県正規化") {
            return Rule::Normalize(Normalization::Prefecture);
        }

        Rule::Unknown(text.to_string())
    }

    pub fn is_job_category(&self) -> bool {
        matches!(self, Rule::Classify(ClassifyTarget::JobCategory))
    }
}

impl Attribute {
    fn from_directive(text: &str) -> Option<Self> {
        let binary = text.contains("あり") || text.contains("なし");

        if text.contains("土日休み") || text.contains("シフト制") {
            Some(Attribute::Holiday)
        } else if text.contains("転勤") && binary {
            Some(Attribute::Transfer)
        } else if text.contains("試用期間") && binary {
            Some(Attribute::Probation)
        } else if text.contains("賞与") && binary {
            Some(Attribute::Bonus)
        } else {
            None
        }
    }
}

/// Strip one pair of surrounding double quotes, then map the blank sentinel
fn parse_literal(rest: &str) -> String {
    let trimmed = rest.trim();
    let unquoted = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    if unquoted == BLANK_SENTINEL {
        String::new()
    } else {
        unquoted.to_string()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::PassThrough => write!(f, "pass-through"),
            Rule::Literal(value) if value.is_empty() => write!(f, "literal (blank)"),
            Rule::Literal(value) => write!(f, "literal \"{}\"", value),
            Rule::Classify(ClassifyTarget::JobCategory) => write!(f, "classify job category"),
            Rule::Classify(ClassifyTarget::Attribute(attribute)) => {
                write!(f, "classify {:?}", attribute)
            }
            Rule::Classify(ClassifyTarget::Unrecognized) => write!(f, "classify (unrecognized)"),
            Rule::MajorCategoryLookup => write!(f, "major category lookup"),
            Rule::HiringCount => write!(f, "hiring count"),
            Rule::ConditionalDefault { fallback: Some(value) } => {
                write!(f, "default to {} when blank", value)
            }
            Rule::ConditionalDefault { fallback: None } => write!(f, "blank when blank"),
            Rule::Normalize(Normalization::Prefecture) => write!(f, "prefecture normalization"),
            Rule::Unknown(text) => write!(f, "unknown ({})", text),
        }
    }
}
