//! Mapping document: field mappings plus row filter rules
//!
//! ```yaml
//! mapping_spec:
//!   field_mapping:
//!     - source_field: 求人タイトル
//!       target_column: 職種分類（中分類）
//!       transform: GPTで職種分類を判定
//!     - source_field: null
//!       target_column: 雇用形態
//!       transform: 固定："正社員"
//! processing_rules:
//!   filter:
//!     include_if:
//!       公開状況: 公開
//!     exclude_if:
//!       求人タイトル: '"" or null'
//! ```

use crate::error::{Error, Result};
use crate::transform::Rule;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Column holding the minor job category in the default target schema
pub const DEFAULT_MINOR_COLUMN: &str = "職種分類（中分類）";
/// Column holding the major job category in the default target schema
pub const DEFAULT_MAJOR_COLUMN: &str = "職種（大分類）";

/// Where a mapping entry reads its value from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SourceField {
    Column(String),
    /// No source column; the rule sees a missing value
    None,
}

impl SourceField {
    /// YAML null, empty text, `null` and `none` all mean "no column"
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None => SourceField::None,
            Some(name)
                if name.is_empty()
                    || name.eq_ignore_ascii_case("null")
                    || name.eq_ignore_ascii_case("none") =>
            {
                SourceField::None
            }
            Some(name) => SourceField::Column(name.to_string()),
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            SourceField::Column(name) => Some(name),
            SourceField::None => None,
        }
    }
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceField::Column(name) => write!(f, "{}", name),
            SourceField::None => write!(f, "(none)"),
        }
    }
}

/// One output column and how to compute it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    pub source_field: SourceField,
    pub target_column: String,
    /// Directive text as written in the document
    pub transform: String,
    /// Compiled form of `transform`
    pub rule: Rule,
}

impl FieldMapping {
    pub fn new(
        source_field: SourceField,
        target_column: impl Into<String>,
        transform: impl Into<String>,
    ) -> Self {
        let transform = transform.into();
        Self {
            rule: Rule::parse(&transform),
            source_field,
            target_column: target_column.into(),
            transform,
        }
    }
}

/// Exclusion predicate for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExcludeCondition {
    /// Blank, a literal `""`, or `null` in any case
    EmptyOrNull,
    /// Tag this tool does not understand; never excludes anything
    Unsupported(String),
}

impl ExcludeCondition {
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "\"\" or null" | "empty-or-null" => ExcludeCondition::EmptyOrNull,
            other => ExcludeCondition::Unsupported(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterRules {
    /// Column to required cell text
    pub include_if: IndexMap<String, String>,
    pub exclude_if: IndexMap<String, ExcludeCondition>,
}

impl FilterRules {
    pub fn is_empty(&self) -> bool {
        self.include_if.is_empty() && self.exclude_if.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingRules {
    pub filter: FilterRules,
}

/// A validated mapping document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingSpec {
    fields: Vec<FieldMapping>,
    processing_rules: ProcessingRules,
}

impl MappingSpec {
    /// Validate and build. At least one entry is required and target
    /// columns must be non-empty and unique.
    pub fn new(fields: Vec<FieldMapping>, processing_rules: ProcessingRules) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::configuration(
                "mapping_spec.field_mapping must contain at least one entry",
            ));
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            if field.target_column.trim().is_empty() {
                return Err(Error::configuration(format!(
                    "field_mapping[{}] has an empty target_column",
                    index
                )));
            }
            if !seen.insert(field.target_column.as_str()) {
                return Err(Error::configuration(format!(
                    "duplicate target_column '{}' in field_mapping",
                    field.target_column
                )));
            }
        }

        for (column, condition) in &processing_rules.filter.exclude_if {
            if let ExcludeCondition::Unsupported(tag) = condition {
                warn!(column = %column, tag = %tag, "unsupported exclude_if condition is ignored");
            }
        }

        Ok(Self {
            fields,
            processing_rules,
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let document: RawDocument = serde_yaml::from_str(yaml).map_err(|e| Error::Configuration {
            message: format!("malformed mapping document: {}", e),
            source: Some(e.into()),
        })?;
        document.into_spec()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Io {
            message: format!("cannot read mapping file {}", path.display()),
            source: e,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    pub fn processing_rules(&self) -> &ProcessingRules {
        &self.processing_rules
    }

    pub fn filter(&self) -> &FilterRules {
        &self.processing_rules.filter
    }

    /// Output header in declared order
    pub fn target_columns(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.target_column.as_str()).collect()
    }

    pub fn position_of(&self, target_column: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.target_column == target_column)
    }
}

#[derive(Deserialize)]
struct RawDocument {
    mapping_spec: RawMappingSpec,
    #[serde(default)]
    processing_rules: RawProcessingRules,
}

#[derive(Deserialize)]
struct RawMappingSpec {
    field_mapping: Vec<RawFieldMapping>,
}

#[derive(Deserialize)]
struct RawFieldMapping {
    #[serde(default)]
    source_field: Option<String>,
    target_column: String,
    transform: String,
}

#[derive(Deserialize, Default)]
struct RawProcessingRules {
    #[serde(default)]
    filter: RawFilter,
}

#[derive(Deserialize, Default)]
struct RawFilter {
    #[serde(default)]
    include_if: IndexMap<String, serde_yaml::Value>,
    #[serde(default)]
    exclude_if: IndexMap<String, String>,
}

impl RawDocument {
    fn into_spec(self) -> Result<MappingSpec> {
        let fields = self
            .mapping_spec
            .field_mapping
            .into_iter()
            .map(|raw| {
                FieldMapping::new(
                    SourceField::from_raw(raw.source_field.as_deref()),
                    raw.target_column,
                    raw.transform,
                )
            })
            .collect();

        let filter = self.processing_rules.filter;
        let include_if = filter
            .include_if
            .into_iter()
            .map(|(column, value)| {
                let text = stringify_scalar(&column, &value)?;
                Ok((column, text))
            })
            .collect::<Result<IndexMap<_, _>>>()?;
        let exclude_if = filter
            .exclude_if
            .into_iter()
            .map(|(column, tag)| (column, ExcludeCondition::parse(&tag)))
            .collect();

        MappingSpec::new(
            fields,
            ProcessingRules {
                filter: FilterRules {
                    include_if,
                    exclude_if,
                },
            },
        )
    }
}

/// Include values compare against cell text, so scalars are stringified
fn stringify_scalar(column: &str, value: &serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(Error::configuration(format!(
            "include_if value for '{}' must be a scalar",
            column
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Attribute, ClassifyTarget};

    const DOCUMENT: &str = r#"
mapping_spec:
  field_mapping:
    - source_field: 求人タイトル
      target_column: 職種分類（中分類）
      transform: GPTで職種分類を判定
    - source_field: null
      target_column: 職種（大分類）
      transform: 分類元のテーブルから職種（大分類）を取得
    - source_field: "null"
      target_column: 雇用形態
      transform: 固定："正社員"
    - source_field: 休日
      target_column: 休日区分
      transform: GPTで土日休み/シフト制/その他を判定
processing_rules:
  filter:
    include_if:
      公開状況: 公開
      掲載フラグ: 1
      確認済み: true
    exclude_if:
      求人タイトル: '"" or null'
      備考: something-else
"#;

    #[test]
    fn test_parse_document() {
        let spec = MappingSpec::from_yaml_str(DOCUMENT).unwrap();
        let fields = spec.fields();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].rule, Rule::Classify(ClassifyTarget::JobCategory));
        assert_eq!(fields[1].source_field, SourceField::None);
        assert_eq!(fields[1].rule, Rule::MajorCategoryLookup);
        assert_eq!(fields[2].source_field, SourceField::None);
        assert_eq!(fields[2].rule, Rule::Literal("正社員".to_string()));
        assert_eq!(
            fields[3].rule,
            Rule::Classify(ClassifyTarget::Attribute(Attribute::Holiday))
        );
        assert_eq!(
            spec.target_columns(),
            vec!["職種分類（中分類）", "職種（大分類）", "雇用形態", "休日区分"]
        );
    }

    #[test]
    fn test_filter_values_are_stringified() {
        let spec = MappingSpec::from_yaml_str(DOCUMENT).unwrap();
        let filter = spec.filter();
        assert_eq!(filter.include_if["公開状況"], "公開");
        assert_eq!(filter.include_if["掲載フラグ"], "1");
        assert_eq!(filter.include_if["確認済み"], "true");
        assert_eq!(filter.exclude_if["求人タイトル"], ExcludeCondition::EmptyOrNull);
        assert_eq!(
            filter.exclude_if["備考"],
            ExcludeCondition::Unsupported("something-else".to_string())
        );
    }

    #[test]
    fn test_duplicate_target_is_configuration_error() {
        let yaml = r#"
mapping_spec:
  field_mapping:
    - { source_field: a, target_column: X, transform: そのまま }
    - { source_field: b, target_column: X, transform: そのまま }
"#;
        let err = MappingSpec::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("duplicate target_column 'X'"));
    }

    #[test]
    fn test_missing_sections_are_configuration_errors() {
        assert!(matches!(
            MappingSpec::from_yaml_str("processing_rules: {}").unwrap_err(),
            Error::Configuration { .. }
        ));
        assert!(matches!(
            MappingSpec::from_yaml_str("mapping_spec:\n  field_mapping: []\n").unwrap_err(),
            Error::Configuration { .. }
        ));
    }

    #[test]
    fn test_processing_rules_are_optional() {
        let yaml = "mapping_spec:\n  field_mapping:\n    - { source_field: a, target_column: A, transform: そのまま }\n";
        let spec = MappingSpec::from_yaml_str(yaml).unwrap();
        assert!(spec.filter().is_empty());
    }

    #[test]
    fn test_source_field_sentinels() {
        assert_eq!(SourceField::from_raw(None), SourceField::None);
        assert_eq!(SourceField::from_raw(Some("NULL")), SourceField::None);
        assert_eq!(SourceField::from_raw(Some("none")), SourceField::None);
        assert_eq!(SourceField::from_raw(Some(" ")), SourceField::None);
        assert_eq!(
            SourceField::from_raw(Some(" 勤務地 ")),
            SourceField::Column("勤務地".to_string())
        );
    }
}
