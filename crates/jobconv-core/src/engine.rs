//! Transformation engine
//!
//! Per record: filter, resolve the minor category, resolve every other
//! column, emit in declared order. The major category column is computed
//! from the minor category of the same record, so the minor entry is always
//! evaluated first no matter where it is declared.

use crate::classify::{ClassificationStats, ClassificationSubsystem};
use crate::error::Result;
use crate::filter::should_include;
use crate::io::{RecordSink, RecordSource};
use crate::mapping::{MappingSpec, SourceField, DEFAULT_MAJOR_COLUMN, DEFAULT_MINOR_COLUMN};
use crate::progress::{LogLevel, Progress, ProgressObserver};
use crate::record::{FieldValue, Header, OutputRecord, SourceRecord};
use crate::transform::{Rule, RuleDispatcher};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesOrdered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Target column holding the minor job category
    pub minor_column: String,
    /// Target column derived from the minor category
    pub major_column: String,
    /// Records converted concurrently; output order is unaffected
    pub concurrency: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            minor_column: DEFAULT_MINOR_COLUMN.to_string(),
            major_column: DEFAULT_MAJOR_COLUMN.to_string(),
            concurrency: 1,
        }
    }
}

/// Evaluation order over mapping entries, computed once per mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationPlan {
    order: Vec<usize>,
    minor: Option<usize>,
    majors: Vec<usize>,
}

impl EvaluationPlan {
    pub fn new(spec: &MappingSpec, settings: &EngineSettings) -> Self {
        let fields = spec.fields();
        let minor = fields
            .iter()
            .position(|f| f.target_column == settings.minor_column);
        let majors: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(index, f)| {
                Some(*index) != minor
                    && (f.target_column == settings.major_column
                        || f.rule == Rule::MajorCategoryLookup)
            })
            .map(|(index, _)| index)
            .collect();

        let order = minor
            .into_iter()
            .chain((0..fields.len()).filter(|index| Some(*index) != minor))
            .collect();

        Self {
            order,
            minor,
            majors,
        }
    }

    /// Entry indices in evaluation order: minor category first
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn minor_index(&self) -> Option<usize> {
        self.minor
    }

    pub fn is_major(&self, index: usize) -> bool {
        self.majors.contains(&index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundSource {
    /// Mapping names no column
    Unmapped,
    /// Named column is not in the input header
    Missing,
    Column(usize),
}

/// Mapping entries resolved against one input header
#[derive(Debug, Clone)]
pub struct Binding {
    sources: Vec<BoundSource>,
    missing: Vec<String>,
}

impl Binding {
    /// Source columns named by the mapping but absent from the header
    pub fn missing_columns(&self) -> &[String] {
        &self.missing
    }
}

/// Final counters of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub rows_read: u64,
    pub rows_filtered: u64,
    pub rows_emitted: u64,
    pub cache_hits: u64,
    pub pre_filtered: u64,
    pub oracle_calls: u64,
    pub fallbacks: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ConversionSummary {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[derive(Debug, Default)]
struct Counters {
    progress: Progress,
}

pub struct TransformationEngine {
    spec: MappingSpec,
    plan: EvaluationPlan,
    dispatcher: RuleDispatcher,
    classifier: Arc<ClassificationSubsystem>,
    settings: EngineSettings,
}

impl TransformationEngine {
    pub fn new(
        spec: MappingSpec,
        classifier: Arc<ClassificationSubsystem>,
        settings: EngineSettings,
    ) -> Self {
        let plan = EvaluationPlan::new(&spec, &settings);
        if plan.minor_index().is_none() && !plan.majors.is_empty() {
            warn!(
                column = %settings.minor_column,
                "no mapping entry targets the minor category column, major category will be empty"
            );
        }

        Self {
            dispatcher: RuleDispatcher::new(Arc::clone(&classifier)),
            spec,
            plan,
            classifier,
            settings,
        }
    }

    pub fn spec(&self) -> &MappingSpec {
        &self.spec
    }

    pub fn plan(&self) -> &EvaluationPlan {
        &self.plan
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn classifier(&self) -> &ClassificationSubsystem {
        &self.classifier
    }

    pub fn stats(&self) -> ClassificationStats {
        self.classifier.stats()
    }

    /// Resolve source columns against `header`; each missing column is
    /// reported once here rather than once per record.
    pub fn bind(&self, header: &Header, observer: &dyn ProgressObserver) -> Binding {
        let mut missing = Vec::new();
        let sources = self
            .spec
            .fields()
            .iter()
            .map(|field| match &field.source_field {
                SourceField::None => BoundSource::Unmapped,
                SourceField::Column(name) => match header.position(name) {
                    Some(position) => BoundSource::Column(position),
                    None => {
                        if !missing.contains(name) {
                            warn!(column = %name, target = %field.target_column, "source column not found");
                            observer.on_log(
                                LogLevel::Warn,
                                &format!("source column not found: {}", name),
                            );
                            missing.push(name.clone());
                        }
                        BoundSource::Missing
                    }
                },
            })
            .collect();

        Binding { sources, missing }
    }

    /// Convert one record that already passed the filter
    pub async fn convert_record(&self, record: &SourceRecord, binding: &Binding) -> OutputRecord {
        let fields = self.spec.fields();
        let mut values = vec![String::new(); fields.len()];
        let mut minor_category = String::new();

        for &index in self.plan.order() {
            if self.plan.is_major(index) {
                values[index] = self
                    .classifier
                    .taxonomy()
                    .major_for(&minor_category)
                    .unwrap_or_default()
                    .to_string();
                continue;
            }

            let field = &fields[index];
            let value = match binding.sources[index] {
                BoundSource::Unmapped | BoundSource::Missing => {
                    self.dispatcher.apply(FieldValue::Missing, &field.rule).await
                }
                BoundSource::Column(position) => {
                    let cell = record.cell(position).trim();
                    self.dispatcher
                        .apply(FieldValue::Present(cell), &field.rule)
                        .await
                }
            };

            if Some(index) == self.plan.minor_index() {
                minor_category = value.clone();
            }
            values[index] = value;
        }

        OutputRecord::new(values)
    }

    /// Stream every record from `source` to `sink`.
    ///
    /// The sink is flushed even when a read or write fails, so rows written
    /// before the failure are kept.
    #[instrument(skip_all, fields(concurrency = self.settings.concurrency))]
    pub async fn run<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
        observer: &dyn ProgressObserver,
        total_rows: Option<u64>,
    ) -> Result<ConversionSummary>
    where
        S: RecordSource + ?Sized,
        K: RecordSink + ?Sized,
    {
        let started_at = Utc::now();
        let mut counters = Counters::default();
        counters.progress.total_rows = total_rows;

        let result = self.pump(source, sink, observer, &mut counters).await;
        let flushed = sink.flush();
        result?;
        flushed?;

        let stats = self.classifier.stats();
        let summary = ConversionSummary {
            rows_read: counters.progress.rows_read,
            rows_filtered: counters.progress.rows_filtered,
            rows_emitted: counters.progress.rows_emitted,
            cache_hits: stats.cache_hits,
            pre_filtered: stats.pre_filtered,
            oracle_calls: stats.oracle_calls,
            fallbacks: stats.fallbacks,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            rows_read = summary.rows_read,
            rows_filtered = summary.rows_filtered,
            rows_emitted = summary.rows_emitted,
            cache_hits = summary.cache_hits,
            oracle_calls = summary.oracle_calls,
            fallbacks = summary.fallbacks,
            "conversion finished"
        );
        observer.on_log(
            LogLevel::Info,
            &format!(
                "read {} rows, filtered {}, wrote {}, cache hits {}",
                summary.rows_read, summary.rows_filtered, summary.rows_emitted, summary.cache_hits
            ),
        );

        Ok(summary)
    }

    async fn pump<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
        observer: &dyn ProgressObserver,
        counters: &mut Counters,
    ) -> Result<()>
    where
        S: RecordSource + ?Sized,
        K: RecordSink + ?Sized,
    {
        let header = source.header();
        observer.on_log(
            LogLevel::Info,
            &format!("header read: {} columns", header.len()),
        );
        let binding = self.bind(&header, observer);
        sink.write_header(&self.spec.target_columns())?;

        let concurrency = self.settings.concurrency.max(1);
        let mut in_flight = FuturesOrdered::new();

        while let Some(record) = source.next_record()? {
            counters.progress.rows_read += 1;

            if !should_include(&record, self.spec.filter()) {
                counters.progress.rows_filtered += 1;
                debug!(row = counters.progress.rows_read, "record filtered out");
                observer.on_record(&counters.progress);
                continue;
            }

            let binding = &binding;
            in_flight.push_back(async move { self.convert_record(&record, binding).await });

            if in_flight.len() >= concurrency {
                if let Some(output) = in_flight.next().await {
                    sink.write_record(&output)?;
                    counters.progress.rows_emitted += 1;
                }
            }
            observer.on_record(&counters.progress);
        }

        while let Some(output) = in_flight.next().await {
            sink.write_record(&output)?;
            counters.progress.rows_emitted += 1;
            observer.on_record(&counters.progress);
        }

        Ok(())
    }
}

impl std::fmt::Debug for TransformationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformationEngine")
            .field("fields", &self.spec.fields().len())
            .field("plan", &self.plan)
            .field("settings", &self.settings)
            .finish()
    }
}
