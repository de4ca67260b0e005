//! Built-in value rules that need nothing beyond the cell text

use crate::record::FieldValue;
use regex::Regex;
use std::sync::OnceLock;

/// Fallback for hiring counts with no explicit number
pub const FEW_PEOPLE: &str = "若干名";

/// Prefecture preferred by [`normalize_prefecture`]
pub const CAPITAL_PREFECTURE: &str = "東京都";

fn head_count_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)(?:名|人)").expect("valid head count pattern"))
}

/// Cell text or the empty string
pub fn pass_through(value: FieldValue<'_>) -> String {
    value.as_str().to_string()
}

/// `3名急募` becomes `3名`; anything without a count becomes `若干名`
pub fn hiring_count(value: FieldValue<'_>) -> String {
    head_count_pattern()
        .captures(value.as_str())
        .and_then(|captures| captures.get(1))
        .map(|digits| format!("{}名", digits.as_str()))
        .unwrap_or_else(|| FEW_PEOPLE.to_string())
}

/// Source value when non-blank, else the fallback, else empty
pub fn conditional_default(value: FieldValue<'_>, fallback: Option<&str>) -> String {
    if value.is_blank() {
        fallback.unwrap_or_default().to_string()
    } else {
        value.as_str().to_string()
    }
}

/// Collapse a comma separated prefecture list to one prefecture
pub fn normalize_prefecture(value: FieldValue<'_>) -> String {
    let text = value.as_str().trim();
    if text.is_empty() {
        return String::new();
    }

    let mut parts = text.split(',').map(str::trim);
    if parts.clone().any(|part| part.contains(CAPITAL_PREFECTURE)) {
        return CAPITAL_PREFECTURE.to_string();
    }
    parts.next().unwrap_or(text).to_string()
}
