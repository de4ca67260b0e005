//! Convert command handler

use super::utils::{build_classifier, default_output_path, load_mapping};
use crate::cli::ConvertArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use jobconv_core::{count_data_rows, CsvRecordSink, CsvRecordSource, TransformationEngine};
use tracing::{info, warn};

/// Handle the convert command
pub async fn handle_convert(
    args: ConvertArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let timer = Timer::with_details("convert", &args.input.display().to_string());

    if !args.input.exists() {
        return Err(Error::FileNotFound {
            path: args.input.clone(),
        });
    }
    let spec = load_mapping(&args.mapping)?;

    let output_file = match &args.save_to {
        Some(path) => path.clone(),
        None => {
            let dir = args.output_dir.as_deref().or(config.output.directory.as_deref());
            default_output_path(&args.input, dir)
        }
    };
    if output_file == args.input {
        return Err(Error::invalid_args("output file must differ from the input file"));
    }

    let mut settings = config.engine_settings();
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            return Err(Error::invalid_args("--concurrency must be at least 1"));
        }
        settings.concurrency = concurrency;
    }

    let classifier = build_classifier(config, &args.classifier)?;
    if !classifier.has_oracle() {
        output.info("No oracle API key found; job categories use the keyword classifier")?;
    }
    let engine = TransformationEngine::new(spec, classifier, settings);

    output.info(&format!(
        "Converting {} -> {}",
        args.input.display(),
        output_file.display()
    ))?;

    let total = match count_data_rows(&args.input) {
        Ok(total) => Some(total),
        Err(e) => {
            warn!(error = %e, "could not count input rows");
            None
        }
    };

    let mut source = CsvRecordSource::open(&args.input)?;
    let mut sink = CsvRecordSink::create(&output_file)?;

    let reporter = output.progress_reporter(total);
    let result = engine.run(&mut source, &mut sink, &reporter, total).await;
    reporter.finish();
    let summary = result?;

    info!(
        output = %output_file.display(),
        rows_emitted = summary.rows_emitted,
        "conversion finished"
    );
    output.success(&format!("✓ Wrote {} rows", summary.rows_emitted))?;
    output.summary(&summary, &output_file)?;

    timer.finish();
    Ok(())
}
