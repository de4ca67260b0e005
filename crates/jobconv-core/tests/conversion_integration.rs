//! End-to-end conversion tests
//!
//! These drive the transformation engine through in-memory and CSV
//! sources and check the emitted rows.


use jobconv_core::io::UTF8_BOM;
use jobconv_core::{
    ClassificationSettings, CsvRecordSink, CsvRecordSource, EngineSettings, NoopObserver,
    RecordSink, Taxonomy, TransformationEngine, VecRecordSink, VecRecordSource,
};
use pretty_assertions::assert_eq;
use std::io::Write;
use test_support::*;

const IT_MAJOR: &str = "ITエンジニア【システム開発・SE・インフラ】";
const PG_MINOR: &str = "Web・オープン系 プログラマ【PG】";

fn three_row_source() -> VecRecordSource {
    VecRecordSource::new(
        SAMPLE_HEADER,
        vec![
            row(&["Javaエンジニア", "3名", "大阪府, 東京都", "完全週休2日制（土日祝）", "公開"]),
            row(&["経理スタッフ", "2名", "愛知県", "シフト制", "非公開"]),
            row(&["  ", "1名", "福岡県", "土日休み", "公開"]),
        ],
    )
}

#[tokio::test]
async fn test_three_row_scenario_emits_only_accepted_row() {
    let engine = engine_with(heuristic_subsystem());
    let mut source = three_row_source();
    let mut sink = VecRecordSink::new();

    let summary = engine
        .run(&mut source, &mut sink, &NoopObserver, Some(3))
        .await
        .unwrap();

    assert_eq!(
        sink.header,
        vec![
            "職種（大分類）",
            "職種分類（中分類）",
            "求人名",
            "雇用形態",
            "採用人数",
            "勤務地",
            "休日区分",
        ]
    );
    assert_eq!(sink.records.len(), 1);
    assert_eq!(
        sink.records[0].values(),
        &[
            IT_MAJOR.to_string(),
            PG_MINOR.to_string(),
            "Javaエンジニア".to_string(),
            "正社員".to_string(),
            "3名".to_string(),
            "東京都".to_string(),
            "土日休み".to_string(),
        ]
    );

    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.rows_filtered, 2);
    assert_eq!(summary.rows_emitted, 1);
    assert_eq!(summary.oracle_calls, 0);
    assert_eq!(sink.flushes, 1);
}

#[tokio::test]
async fn test_oracle_label_drives_major_category() {
    let oracle = ScriptedOracle::answering("回答\n12: 経理");
    let classifier = oracle_subsystem(
        oracle.clone(),
        Taxonomy::embedded(),
        ClassificationSettings::default(),
    );
    let engine = engine_with(classifier);

    let mut source = VecRecordSource::new(
        SAMPLE_HEADER,
        vec![
            row(&["経理スタッフ", "", "", "", "公開"]),
            row(&["経理スタッフ ", "若干名", "", "", "公開"]),
        ],
    );
    let mut sink = VecRecordSink::new();

    let summary = engine
        .run(&mut source, &mut sink, &NoopObserver, None)
        .await
        .unwrap();

    assert_eq!(sink.records.len(), 2);
    for record in &sink.records {
        assert_eq!(record.get(0), Some("事務・管理"));
        assert_eq!(record.get(1), Some("経理"));
        assert_eq!(record.get(4), Some("若干名"));
        assert_eq!(record.get(6), Some(""));
    }
    // the second row differs only by whitespace and is served from the cache
    assert_eq!(oracle.calls(), 1);
    assert_eq!(summary.oracle_calls, 1);
    assert_eq!(summary.cache_hits, 1);
}

#[tokio::test]
async fn test_unknown_minor_category_gives_empty_major() {
    let oracle = ScriptedOracle::answering("1: 存在しない職種");
    let taxonomy = Taxonomy::new(vec![jobconv_core::TaxonomyEntry::new("事務・管理", "経理")]);
    let classifier = oracle_subsystem(
        oracle,
        taxonomy,
        ClassificationSettings {
            fallback: jobconv_core::FallbackPolicy::DefaultLabel,
            ..ClassificationSettings::default()
        },
    );
    let engine = engine_with(classifier);

    let mut source = VecRecordSource::new(SAMPLE_HEADER, vec![row(&["総務", "", "", "", "公開"])]);
    let mut sink = VecRecordSink::new();
    engine
        .run(&mut source, &mut sink, &NoopObserver, None)
        .await
        .unwrap();

    // fallback label is not in this taxonomy, so no major category
    assert_eq!(sink.records[0].get(1), Some("その他営業関連職"));
    assert_eq!(sink.records[0].get(0), Some(""));
}

#[tokio::test]
async fn test_concurrent_conversion_preserves_order() {
    let oracle = std::sync::Arc::new(
        ScriptedOracle::new(Script::Answer("1: 経理".to_string()))
            .with_delay(std::time::Duration::from_millis(20)),
    );
    let classifier = oracle_subsystem(
        oracle,
        Taxonomy::embedded(),
        ClassificationSettings::default(),
    );
    let engine = TransformationEngine::new(
        sample_spec(),
        classifier,
        EngineSettings {
            concurrency: 4,
            ..EngineSettings::default()
        },
    );

    let titles: Vec<String> = (0..12).map(|i| format!("総務スタッフ{}", i)).collect();
    let rows = titles
        .iter()
        .map(|title| row(&[title.as_str(), "", "", "", "公開"]))
        .collect();
    let mut source = VecRecordSource::new(SAMPLE_HEADER, rows);
    let mut sink = VecRecordSink::new();

    let summary = engine
        .run(&mut source, &mut sink, &NoopObserver, None)
        .await
        .unwrap();

    let emitted: Vec<&str> = sink
        .records
        .iter()
        .map(|record| record.get(2).unwrap_or_default())
        .collect();
    assert_eq!(emitted, titles.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(summary.rows_emitted, 12);
    assert_eq!(summary.oracle_calls, 12);
}

#[tokio::test]
async fn test_missing_columns_are_reported_and_rules_still_apply() {
    let engine = engine_with(heuristic_subsystem());
    let mut source = VecRecordSource::new(
        ["求人タイトル", "公開状態"],
        vec![row(&["Pythonエンジニア", "公開"])],
    );
    let mut sink = VecRecordSink::new();
    let observer = RecordingObserver::default();

    engine
        .run(&mut source, &mut sink, &observer, None)
        .await
        .unwrap();

    let warnings = observer.warnings();
    assert_eq!(warnings.len(), 3);
    assert!(warnings.iter().any(|w| w.contains("募集人数")));

    let record = &sink.records[0];
    assert_eq!(record.get(1), Some(PG_MINOR));
    assert_eq!(record.get(3), Some("正社員"));
    assert_eq!(record.get(4), Some("若干名"));
    assert_eq!(record.get(5), Some(""));

    let progress = observer.progress.lock().unwrap();
    assert_eq!(progress.last().map(|p| p.rows_emitted), Some(1));
}

#[tokio::test]
async fn test_csv_files_round_trip_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.csv");
    let output_path = dir.path().join("output.csv");

    let mut input = std::fs::File::create(&input_path).unwrap();
    input.write_all(UTF8_BOM).unwrap();
    writeln!(input, "求人タイトル,募集人数,勤務地,休日,公開状態").unwrap();
    writeln!(input, "Javaエンジニア,10人,\"東京都港区, 大阪府\",シフト制,公開").unwrap();
    writeln!(input, "営業,1名,大阪府,,公開").unwrap();
    drop(input);

    assert_eq!(jobconv_core::count_data_rows(&input_path).unwrap(), 2);

    let engine = engine_with(heuristic_subsystem());
    let mut source = CsvRecordSource::open(&input_path).unwrap();
    let mut sink = CsvRecordSink::create(&output_path).unwrap();
    let summary = engine
        .run(&mut source, &mut sink, &NoopObserver, Some(2))
        .await
        .unwrap();
    drop(sink);
    assert_eq!(summary.rows_emitted, 2);

    let bytes = std::fs::read(&output_path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        format!("{},{},Javaエンジニア,正社員,10名,東京都,シフト制", IT_MAJOR, PG_MINOR)
    );
    assert_eq!(
        lines[2],
        "営業,企画営業【法人営業・個人営業】,営業,正社員,1名,大阪府,"
    );
}

struct FailingSink {
    written: usize,
    flushes: usize,
}

impl RecordSink for FailingSink {
    fn write_header(&mut self, _columns: &[&str]) -> jobconv_core::Result<()> {
        Ok(())
    }

    fn write_record(&mut self, _record: &jobconv_core::OutputRecord) -> jobconv_core::Result<()> {
        if self.written == 1 {
            return Err(jobconv_core::Error::Io {
                message: "disk full".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> jobconv_core::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

#[tokio::test]
async fn test_sink_failure_flushes_and_surfaces_error() {
    let engine = engine_with(heuristic_subsystem());
    let mut source = VecRecordSource::new(
        SAMPLE_HEADER,
        vec![
            row(&["経理", "", "", "", "公開"]),
            row(&["人事", "", "", "", "公開"]),
            row(&["総務", "", "", "", "公開"]),
        ],
    );
    let mut sink = FailingSink {
        written: 0,
        flushes: 0,
    };

    let error = engine
        .run(&mut source, &mut sink, &NoopObserver, None)
        .await
        .unwrap_err();

    assert!(error.is_fatal());
    assert_eq!(sink.written, 1);
    assert_eq!(sink.flushes, 1);
}
