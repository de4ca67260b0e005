//! Jobconv Core - mapping-driven conversion of job posting tables
//!
//! This crate converts job posting records from a source CSV layout into a
//! target layout described by a YAML mapping document, assigning each record
//! a two-level job category along the way.
//!
//! # Main Components
//!
//! - **Mapping**: [`MappingSpec`] parsed from YAML, each directive compiled
//!   to a [`Rule`]
//! - **Row Filter**: include/exclude predicates applied before conversion
//! - **Rule Dispatcher**: evaluates one rule against one source value
//! - **Classification**: cache, keyword pre-filter, optional oracle and a
//!   deterministic fallback
//! - **Transformation Engine**: per-record orchestration with the minor
//!   category resolved before the major category derived from it
//!
//! # Example
//!
//! ```no_run
//! use jobconv_core::{
//!     ClassificationSettings, ClassificationSubsystem, CsvRecordSink, CsvRecordSource,
//!     EngineSettings, MappingSpec, NoopObserver, Taxonomy, TransformationEngine,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! async fn example() -> jobconv_core::Result<()> {
//!     let spec = MappingSpec::from_path(Path::new("jobins_yaml_mapping.yaml"))?;
//!     let classifier = Arc::new(ClassificationSubsystem::heuristic_only(
//!         Arc::new(Taxonomy::embedded()),
//!         ClassificationSettings::default(),
//!     ));
//!     let engine = TransformationEngine::new(spec, classifier, EngineSettings::default());
//!
//!     let mut source = CsvRecordSource::open(Path::new("input.csv"))?;
//!     let mut sink = CsvRecordSink::create(Path::new("output.csv"))?;
//!     let summary = engine.run(&mut source, &mut sink, &NoopObserver, None).await?;
//!     println!("{} rows written", summary.rows_emitted);
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod engine;
pub mod error;
pub mod filter;
pub mod http;
pub mod io;
pub mod mapping;
pub mod progress;
pub mod record;
pub mod taxonomy;
pub mod transform;

pub use classify::{
    ClassificationOracle, ClassificationOutcome, ClassificationSettings, ClassificationStats,
    ClassificationSubsystem, FallbackPolicy, FallbackReason, OpenAiOracle, OracleConfig,
    ResolutionSource,
};
pub use engine::{
    Binding, ConversionSummary, EngineSettings, EvaluationPlan, TransformationEngine,
};
pub use error::{Error, ErrorKind, Result};
pub use filter::should_include;
pub use io::{
    count_data_rows, CsvRecordSink, CsvRecordSource, RecordSink, RecordSource, VecRecordSink,
    VecRecordSource,
};
pub use mapping::{
    ExcludeCondition, FieldMapping, FilterRules, MappingSpec, ProcessingRules, SourceField,
    DEFAULT_MAJOR_COLUMN, DEFAULT_MINOR_COLUMN,
};
pub use progress::{LogLevel, NoopObserver, Progress, ProgressObserver};
pub use record::{FieldValue, Header, OutputRecord, SourceRecord};
pub use taxonomy::{CsvTaxonomySource, Taxonomy, TaxonomyEntry, TaxonomySource};
pub use transform::{Rule, RuleDispatcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
