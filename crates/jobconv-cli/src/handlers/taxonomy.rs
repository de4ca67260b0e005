//! Taxonomy command handler

use crate::cli::{OutputFormat, TaxonomyArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use jobconv_core::{Taxonomy, TaxonomyEntry};

/// Handle the taxonomy command
pub async fn handle_taxonomy(
    args: TaxonomyArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let path = args.taxonomy.as_deref().or(config.taxonomy.path.as_deref());
    let taxonomy = Taxonomy::from_optional_path(path);

    let entries = select(&taxonomy, args.major.as_deref())?;

    if output.format() != OutputFormat::Human {
        return output.data(&entries);
    }

    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                entry.major.clone(),
                entry.minor.clone(),
                entry.link_key.clone(),
            ]
        })
        .collect();
    output.table(&["major", "minor", "link key"], rows)?;
    output.info(&format!(
        "{} entries in {} major categories",
        entries.len(),
        taxonomy.majors().len()
    ))?;
    Ok(())
}

fn select<'a>(taxonomy: &'a Taxonomy, major: Option<&'a str>) -> Result<Vec<&'a TaxonomyEntry>> {
    let Some(major) = major else {
        return Ok(taxonomy.entries().iter().collect());
    };

    let entries: Vec<_> = taxonomy.entries_for_major(major).collect();
    if entries.is_empty() {
        return Err(Error::invalid_args(format!(
            "unknown major category '{}'; expected one of: {}",
            major,
            taxonomy.majors().join(", ")
        )));
    }
    Ok(entries)
}
