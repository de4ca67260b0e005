//! Property-based tests for rule evaluation and row filtering
//!
//! These check invariants that should hold for arbitrary cell contents.

use indexmap::IndexMap;
use jobconv_core::filter::{is_empty_or_null, should_include};
use jobconv_core::transform::apply_static;
use jobconv_core::{ExcludeCondition, FieldValue, FilterRules, Header, Rule, SourceRecord};
use proptest::prelude::*;
use std::sync::Arc;

// Strategy functions for property testing

/// Literal text that survives directive parsing unchanged
fn literal_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9ぁ-んァ-ン一-龥]{1,20}".prop_filter("blank sentinel", |s| s != "空白")
}

/// Arbitrary cell content, including blanks and the null spellings
fn cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("  ".to_string()),
        Just("\"\"".to_string()),
        Just("NULL".to_string()),
        "[a-zA-Z0-9 ]{0,20}",
        "[ぁ-ん一-龥]{1,10}",
    ]
}

fn record(columns: &[&str], cells: Vec<String>) -> SourceRecord {
    SourceRecord::new(Arc::new(Header::new(columns.iter().copied())), cells)
}

proptest! {
    #[test]
    fn prop_literal_ignores_source(literal in literal_strategy(), cell in cell_strategy()) {
        let rule = Rule::parse(&format!("固定：{}", literal));
        prop_assert_eq!(apply_static(FieldValue::Present(&cell), &rule), literal.clone());
        prop_assert_eq!(apply_static(FieldValue::Missing, &rule), literal);
    }

    #[test]
    fn prop_quoted_literal_is_unquoted(literal in literal_strategy()) {
        let rule = Rule::parse(&format!("固定：\"{}\"", literal));
        prop_assert_eq!(rule, Rule::Literal(literal));
    }

    #[test]
    fn prop_pass_through_is_identity(cell in cell_strategy()) {
        prop_assert_eq!(apply_static(FieldValue::Present(&cell), &Rule::PassThrough), cell);
    }

    #[test]
    fn prop_hiring_count_is_never_empty(cell in cell_strategy()) {
        let value = apply_static(FieldValue::Present(&cell), &Rule::HiringCount);
        prop_assert!(value.ends_with('名'));
    }

    #[test]
    fn prop_exclude_matches_empty_or_null(cell in cell_strategy()) {
        let mut exclude_if = IndexMap::new();
        exclude_if.insert("title".to_string(), ExcludeCondition::EmptyOrNull);
        let rules = FilterRules { include_if: IndexMap::new(), exclude_if };

        let included = should_include(&record(&["title"], vec![cell.clone()]), &rules);
        prop_assert_eq!(included, !is_empty_or_null(&cell));
    }

    #[test]
    fn prop_include_requires_exact_match(cell in cell_strategy(), required in "[a-z]{1,5}") {
        let mut include_if = IndexMap::new();
        include_if.insert("status".to_string(), required.clone());
        let rules = FilterRules { include_if, exclude_if: IndexMap::new() };

        let included = should_include(&record(&["status"], vec![cell.clone()]), &rules);
        prop_assert_eq!(included, cell == required);
    }

    #[test]
    fn prop_absent_filter_columns_are_ignored(cell in cell_strategy()) {
        let mut include_if = IndexMap::new();
        include_if.insert("status".to_string(), "公開".to_string());
        let mut exclude_if = IndexMap::new();
        exclude_if.insert("title".to_string(), ExcludeCondition::EmptyOrNull);
        let rules = FilterRules { include_if, exclude_if };

        prop_assert!(should_include(&record(&["other"], vec![cell]), &rules));
    }
}
