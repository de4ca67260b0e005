//! Classify command handler

use super::utils::build_classifier;
use crate::cli::{ClassifyArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use jobconv_core::{ClassificationOutcome, ClassificationStats};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Classified<'a> {
    text: &'a str,
    major: &'a str,
    #[serde(flatten)]
    outcome: &'a ClassificationOutcome,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    results: Vec<Classified<'a>>,
    stats: ClassificationStats,
}

/// Handle the classify command
pub async fn handle_classify(
    args: ClassifyArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let classifier = build_classifier(config, &args.classifier)?;

    let mut outcomes = Vec::with_capacity(args.texts.len());
    for text in &args.texts {
        outcomes.push(classifier.classify(text).await);
    }

    let taxonomy = classifier.taxonomy();
    let results: Vec<Classified<'_>> = args
        .texts
        .iter()
        .zip(&outcomes)
        .map(|(text, outcome)| Classified {
            text,
            major: taxonomy.major_for(outcome.label()).unwrap_or(""),
            outcome,
        })
        .collect();

    if output.format() != OutputFormat::Human {
        return output.data(&Report {
            results,
            stats: classifier.stats(),
        });
    }

    let rows = results
        .iter()
        .map(|result| {
            vec![
                result.text.to_string(),
                result.major.to_string(),
                result.outcome.label().to_string(),
                describe(result.outcome),
            ]
        })
        .collect();
    output.table(&["text", "major", "minor", "resolved by"], rows)?;
    Ok(())
}

fn describe(outcome: &ClassificationOutcome) -> String {
    match outcome {
        ClassificationOutcome::Resolved { source, .. } => {
            serde_json::to_value(source)
                .ok()
                .and_then(|value| value.as_str().map(str::to_string))
                .unwrap_or_default()
        }
        ClassificationOutcome::Fallback { reason, .. } => format!("fallback ({})", reason),
    }
}
