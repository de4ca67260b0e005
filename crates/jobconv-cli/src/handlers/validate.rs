//! Validate command handler

use super::utils::load_mapping;
use crate::cli::{OutputFormat, ValidateArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use jobconv_core::{EvaluationPlan, ExcludeCondition, FieldMapping, FilterRules, MappingSpec, Rule};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Report<'a> {
    fields: &'a [FieldMapping],
    filter: &'a FilterRules,
    evaluation_order: Vec<&'a str>,
    unknown_rules: Vec<&'a str>,
}

/// Handle the validate command
pub async fn handle_validate(
    args: ValidateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    output.info(&format!("Validating mapping: {}", args.mapping.display()))?;

    let spec = load_mapping(&args.mapping)?;
    let plan = EvaluationPlan::new(&spec, &config.engine_settings());
    let report = Report {
        fields: spec.fields(),
        filter: spec.filter(),
        evaluation_order: evaluation_order(&spec, &plan),
        unknown_rules: unknown_rules(&spec),
    };

    if output.format() != OutputFormat::Human {
        return output.data(&report);
    }

    output.success(&format!(
        "✓ Mapping is valid ({} columns)",
        spec.fields().len()
    ))?;

    output.section("Field Mapping")?;
    let rows = spec
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            vec![
                (index + 1).to_string(),
                field.target_column.clone(),
                field.source_field.to_string(),
                field.rule.to_string(),
            ]
        })
        .collect();
    output.table(&["#", "target", "source", "rule"], rows)?;

    output.section("Evaluation Order")?;
    output.writeln(&report.evaluation_order.join(" → "))?;
    if plan.minor_index().is_none() {
        output.warning(&format!(
            "No entry targets {}; major categories will be blank",
            config.engine.minor_column
        ))?;
    }

    let filter = spec.filter();
    if !filter.is_empty() {
        output.section("Row Filter")?;
        for (column, value) in &filter.include_if {
            output.writeln(&format!("  include when {} = {}", column, value))?;
        }
        for (column, condition) in &filter.exclude_if {
            match condition {
                ExcludeCondition::EmptyOrNull => {
                    output.writeln(&format!("  exclude when {} is empty or null", column))?
                }
                ExcludeCondition::Unsupported(tag) => output.warning(&format!(
                    "exclude condition '{}' on {} is not supported and is ignored",
                    tag, column
                ))?,
            }
        }
    }

    for directive in &report.unknown_rules {
        output.warning(&format!(
            "Unrecognized directive '{}' produces blank cells",
            directive
        ))?;
    }

    Ok(())
}

fn evaluation_order<'a>(spec: &'a MappingSpec, plan: &EvaluationPlan) -> Vec<&'a str> {
    plan.order()
        .iter()
        .map(|&index| spec.fields()[index].target_column.as_str())
        .collect()
}

fn unknown_rules(spec: &MappingSpec) -> Vec<&str> {
    spec.fields()
        .iter()
        .filter_map(|field| match &field.rule {
            Rule::Unknown(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
