//! Row inclusion / exclusion predicate

use crate::mapping::{ExcludeCondition, FilterRules};
use crate::record::SourceRecord;

/// Whether `record` passes the filter.
///
/// Conditions on columns missing from the header, or past the end of a
/// short row, are skipped. Pure: no logging, no state.
pub fn should_include(record: &SourceRecord, rules: &FilterRules) -> bool {
    let included = rules
        .include_if
        .iter()
        .all(|(column, required)| match cell(record, column) {
            Some(value) => value == required,
            None => true,
        });

    included
        && rules
            .exclude_if
            .iter()
            .all(|(column, condition)| match (cell(record, column), condition) {
                (Some(value), ExcludeCondition::EmptyOrNull) => !is_empty_or_null(value),
                _ => true,
            })
}

fn cell<'a>(record: &'a SourceRecord, column: &str) -> Option<&'a str> {
    record
        .header()
        .position(column)
        .and_then(|index| record.cells().get(index))
        .map(String::as_str)
}

/// Blank, the two-character `""`, or `null` in any case
pub fn is_empty_or_null(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == "\"\"" || value.eq_ignore_ascii_case("null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Header;
    use std::sync::Arc;

    fn rules() -> FilterRules {
        let mut rules = FilterRules::default();
        rules.include_if.insert("status".to_string(), "公開".to_string());
        rules
            .exclude_if
            .insert("title".to_string(), ExcludeCondition::EmptyOrNull);
        rules
    }

    fn record(header: &[&str], cells: &[&str]) -> SourceRecord {
        SourceRecord::new(
            Arc::new(Header::new(header.iter().copied())),
            cells.iter().map(|c| c.to_string()).collect(),
        )
    }

    #[test]
    fn test_include_requires_exact_value() {
        let header = ["status", "title"];
        assert!(should_include(&record(&header, &["公開", "経理"]), &rules()));
        assert!(!should_include(&record(&header, &["非公開", "経理"]), &rules()));
        assert!(!should_include(&record(&header, &[" 公開", "経理"]), &rules()));
    }

    #[test]
    fn test_exclude_empty_or_null() {
        let header = ["status", "title"];
        for blank in ["", "   ", "\"\"", "null", "NULL", " Null "] {
            assert!(
                !should_include(&record(&header, &["公開", blank]), &rules()),
                "{:?} should be excluded",
                blank
            );
        }
        assert!(should_include(&record(&header, &["公開", "nullable"]), &rules()));
    }

    #[test]
    fn test_missing_columns_are_ignored() {
        assert!(should_include(&record(&["other"], &["x"]), &rules()));
    }

    #[test]
    fn test_conditions_past_short_row_end_are_skipped() {
        let header = ["title", "other", "status"];
        assert!(should_include(&record(&header, &["経理"]), &rules()));
        assert!(should_include(&record(&["status", "title"], &["公開"]), &rules()));
        assert!(!should_include(&record(&header, &["", "x"]), &rules()));
    }

    #[test]
    fn test_unsupported_condition_never_excludes() {
        let mut rules = FilterRules::default();
        rules.exclude_if.insert(
            "title".to_string(),
            ExcludeCondition::Unsupported("weird".to_string()),
        );
        assert!(should_include(&record(&["title"], &[""]), &rules));
    }
}
