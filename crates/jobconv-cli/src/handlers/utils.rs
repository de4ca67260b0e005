//! Shared utilities for command handlers

use crate::cli::ClassifierArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use jobconv_core::{
    ClassificationOracle, ClassificationSubsystem, MappingSpec, OpenAiOracle, Taxonomy,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Prefix of generated output file names
pub const OUTPUT_FILE_PREFIX: &str = "JOBINS掲載用_";

/// Build the classification subsystem from config and command-line overrides.
///
/// The oracle is attached only when an API key resolves; otherwise the
/// subsystem runs heuristic-only.
pub fn build_classifier(
    config: &Config,
    args: &ClassifierArgs,
) -> Result<Arc<ClassificationSubsystem>> {
    let taxonomy_path = args.taxonomy.as_deref().or(config.taxonomy.path.as_deref());
    let taxonomy = Arc::new(Taxonomy::from_optional_path(taxonomy_path));
    debug!(entries = taxonomy.len(), "taxonomy ready");

    let mut settings = config.classification.settings();
    if let Some(fallback) = args.fallback {
        settings.fallback = fallback.into();
    }
    if let Some(key) = &args.link_key {
        settings.link_filter_key = Some(key.clone()).filter(|k| !k.is_empty());
    }
    if let Some(timeout) = args.timeout {
        settings.oracle_timeout_secs = timeout;
    }

    let oracle: Option<Arc<dyn ClassificationOracle>> = if args.no_oracle {
        info!("oracle disabled on the command line");
        None
    } else {
        OpenAiOracle::from_config(&config.oracle)?
            .map(|oracle| Arc::new(oracle) as Arc<dyn ClassificationOracle>)
    };

    Ok(Arc::new(ClassificationSubsystem::new(taxonomy, oracle, settings)))
}

/// Load a mapping document, reporting a missing file before parsing
pub fn load_mapping(path: &Path) -> Result<MappingSpec> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(MappingSpec::from_path(path)?)
}

/// Where `convert` writes when no explicit output file is given
pub fn default_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let directory = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    directory.join(output_file_name(Local::now()))
}

fn output_file_name(now: DateTime<Local>) -> String {
    format!("{}{}.csv", OUTPUT_FILE_PREFIX, now.format("%Y%m%d_%H%M%S"))
}
