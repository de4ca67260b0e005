//! Tests for rule compilation and dispatch

#[cfg(test)]
mod tests {
    use super::super::{apply_static, Attribute, ClassifyTarget, Normalization, Rule, RuleDispatcher};
    use crate::classify::{ClassificationSettings, ClassificationSubsystem};
    use crate::record::FieldValue;
    use crate::taxonomy::Taxonomy;
    use std::sync::Arc;

    fn present(value: &str) -> FieldValue<'_> {
        FieldValue::Present(value)
    }

    #[test]
    fn test_parse_precedence() {
        assert_eq!(Rule::parse("そのまま"), Rule::PassThrough);
        assert_eq!(Rule::parse("そのまま（補足）"), Rule::Unknown("そのまま（補足）".to_string()));
        assert_eq!(
            Rule::parse("固定：GPTで判定"),
            Rule::Literal("GPTで判定".to_string())
        );
        assert_eq!(
            Rule::parse("GPTで採用人数を判定"),
            Rule::Classify(ClassifyTarget::Unrecognized)
        );
        assert_eq!(
            Rule::parse("GPTで職種分類（中分類）を判定"),
            Rule::Classify(ClassifyTarget::JobCategory)
        );
        assert_eq!(Rule::parse("採用人数を抽出"), Rule::HiringCount);
        assert_eq!(
            Rule::parse("都道府県正規化"),
            Rule::Normalize(Normalization::Prefecture)
        );
    }

    #[test]
    fn test_parse_attributes() {
        assert_eq!(
            Rule::parse("GPTでシフト制か判定"),
            Rule::Classify(ClassifyTarget::Attribute(Attribute::Holiday))
        );
        assert_eq!(
            Rule::parse("GPTで転勤あり/なし"),
            Rule::Classify(ClassifyTarget::Attribute(Attribute::Transfer))
        );
        assert_eq!(
            Rule::parse("GPTで転勤を判定"),
            Rule::Classify(ClassifyTarget::Unrecognized)
        );
        assert_eq!(
            Rule::parse("GPTで試用期間あり/なし"),
            Rule::Classify(ClassifyTarget::Attribute(Attribute::Probation))
        );
        assert_eq!(
            Rule::parse("GPTで賞与あり/なし"),
            Rule::Classify(ClassifyTarget::Attribute(Attribute::Bonus))
        );
    }

    #[test]
    fn test_literal_quotes_and_blank() {
        assert_eq!(Rule::parse("固定：\"正社員\""), Rule::Literal("正社員".to_string()));
        assert_eq!(Rule::parse("固定： 正社員 "), Rule::Literal("正社員".to_string()));
        assert_eq!(Rule::parse("固定：空白"), Rule::Literal(String::new()));
        assert_eq!(Rule::parse("固定：\"空白\""), Rule::Literal(String::new()));
        assert_eq!(Rule::parse("固定：\""), Rule::Literal("\"".to_string()));
        assert_eq!(Rule::parse("固定：A固定：B"), Rule::Literal("AB".to_string()));
    }

    #[test]
    fn test_literal_ignores_source() {
        let rule = Rule::parse("固定：月給");
        assert_eq!(apply_static(present("時給"), &rule), "月給");
        assert_eq!(apply_static(FieldValue::Missing, &rule), "月給");
    }

    #[test]
    fn test_pass_through_and_unknown() {
        assert_eq!(apply_static(present("東京"), &Rule::PassThrough), "東京");
        assert_eq!(apply_static(FieldValue::Missing, &Rule::PassThrough), "");
        let unknown = Rule::parse("自由記述");
        assert_eq!(apply_static(present("  原文  "), &unknown), "  原文  ");
        assert_eq!(apply_static(FieldValue::Missing, &unknown), "");
    }

    #[test]
    fn test_hiring_count() {
        let rule = Rule::HiringCount;
        assert_eq!(apply_static(present("3名急募"), &rule), "3名");
        assert_eq!(apply_static(present("10人程度"), &rule), "10名");
        assert_eq!(apply_static(present("若干"), &rule), "若干名");
        assert_eq!(apply_static(present("未定"), &rule), "若干名");
        assert_eq!(apply_static(present(""), &rule), "若干名");
        assert_eq!(apply_static(FieldValue::Missing, &rule), "若干名");
    }

    #[test]
    fn test_conditional_default() {
        let rule = Rule::parse("年齢制限、記載がない場合は35");
        assert_eq!(rule, Rule::ConditionalDefault { fallback: Some("35".to_string()) });
        assert_eq!(apply_static(present("40"), &rule), "40");
        assert_eq!(apply_static(present("  "), &rule), "35");
        assert_eq!(apply_static(FieldValue::Missing, &rule), "35");

        let both = Rule::parse("年齢：記載がない場合は25、管理職は35");
        assert_eq!(both, Rule::ConditionalDefault { fallback: Some("35".to_string()) });

        let young = Rule::parse("年齢：記載がない場合は25");
        assert_eq!(apply_static(present(""), &young), "25");

        let neither = Rule::parse("年齢：記載がない場合は空欄");
        assert_eq!(apply_static(present(""), &neither), "");
    }

    #[test]
    fn test_prefecture_normalization() {
        let rule = Rule::Normalize(Normalization::Prefecture);
        assert_eq!(apply_static(present("大阪府, 東京都, 愛知県"), &rule), "東京都");
        assert_eq!(apply_static(present("愛知県, 大阪府"), &rule), "愛知県");
        assert_eq!(apply_static(present("東京都港区"), &rule), "東京都");
        assert_eq!(apply_static(present(" "), &rule), "");
        assert_eq!(apply_static(FieldValue::Missing, &rule), "");
    }

    #[test]
    fn test_attribute_rules() {
        let holiday = Rule::parse("GPTで土日休み/シフト制/その他");
        assert_eq!(apply_static(present("土日祝休み"), &holiday), "土日休み");
        assert_eq!(apply_static(present(""), &holiday), "");

        let bonus = Rule::parse("GPTで賞与あり/なし");
        assert_eq!(apply_static(present("ボーナス年2回"), &bonus), "あり");
        assert_eq!(apply_static(present("なし"), &bonus), "なし");

        let unknown = Rule::parse("GPTで雰囲気を判定");
        assert_eq!(apply_static(present("明るい職場"), &unknown), "");
    }

    #[test]
    fn test_major_lookup_is_not_dispatched() {
        assert_eq!(apply_static(present("経理"), &Rule::MajorCategoryLookup), "");
    }

    #[test]
    fn test_display() {
        assert_eq!(Rule::parse("固定：空白").to_string(), "literal (blank)");
        assert_eq!(Rule::HiringCount.to_string(), "hiring count");
    }

    #[tokio::test]
    async fn test_dispatcher_routes_job_category_to_subsystem() {
        let subsystem = Arc::new(ClassificationSubsystem::heuristic_only(
            Arc::new(Taxonomy::embedded()),
            ClassificationSettings::default(),
        ));
        let dispatcher = RuleDispatcher::new(Arc::clone(&subsystem));
        let rule = Rule::parse("GPTで職種分類を判定");

        let label = dispatcher.apply(present("UI/UXデザイナー"), &rule).await;
        assert_eq!(label, "情報アーキテクト、UI/UXデザイナー");

        let again = dispatcher.apply(present("UI/UXデザイナー"), &rule).await;
        assert_eq!(again, label);
        assert_eq!(subsystem.stats().cache_hits, 1);

        assert_eq!(dispatcher.apply(FieldValue::Missing, &rule).await, "");
        assert_eq!(dispatcher.apply(present("3名"), &Rule::HiringCount).await, "3名");
    }
}
