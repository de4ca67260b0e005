//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), plus the progress bar
//! shown while a conversion runs.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use jobconv_core::{ConversionSummary, LogLevel, Progress, ProgressObserver};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::Duration;
use tracing::trace;

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a conversion summary
    fn format_summary(&self, summary: &ConversionSummary, output_file: &Path) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // For human format, use pretty JSON as fallback
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_summary(&self, summary: &ConversionSummary, output_file: &Path) -> Result<String> {
        #[derive(Serialize)]
        struct Report<'a> {
            output_file: &'a Path,
            #[serde(flatten)]
            summary: &'a ConversionSummary,
            duration_ms: i64,
        }

        match self {
            OutputFormat::Human => Ok(format_summary_human(summary, output_file)),
            other => other.format(&Report {
                output_file,
                summary,
                duration_ms: summary.duration_ms(),
            }),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && std::io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    #[cfg(test)]
    pub fn with_writer(format: OutputFormat, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color: false,
            // No progress bars with custom writers
            show_progress: false,
            quiet: false,
            writer,
        }
    }

    /// Disable progress bars even on a terminal
    pub fn set_show_progress(&mut self, show: bool) {
        self.show_progress = self.show_progress && show;
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        if tracing::enabled!(tracing::Level::TRACE) {
            let mut value_json = serde_json::to_value(value)?;
            redaction::redact_json_value(&mut value_json);
            trace!(data = %value_json, "Outputting data");
        }

        let formatted = self.format.format(value)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a conversion summary in the configured format
    pub fn summary(&mut self, summary: &ConversionSummary, output_file: &Path) -> Result<()> {
        let formatted = self.format.format_summary(summary, output_file)?;
        self.writeln(formatted.trim_end())
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(display_width(cell));
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| pad(h, widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");
        let header_row = header_row.trim_end();

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(width) => pad(cell, *width),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }

    /// Progress reporter for a conversion of `total` rows, if known
    pub fn progress_reporter(&self, total: Option<u64>) -> ProgressReporter {
        let bar = self.show_progress.then(|| match total {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(default_progress_style());
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(default_spinner_style());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        });
        if let Some(bar) = &bar {
            bar.set_message("converting");
        }

        ProgressReporter {
            bar,
            echo: !self.quiet && self.format == OutputFormat::Human,
            use_color: self.use_color,
        }
    }
}

/// Terminal columns taken by `text`; wide characters count as two
fn display_width(text: &str) -> usize {
    text.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

fn pad(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(text));
    format!("{}{}", text, " ".repeat(padding))
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {pos} rows {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Conversion observer drawing an indicatif bar and echoing log lines
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
    echo: bool,
    use_color: bool,
}

impl ProgressReporter {
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    fn render(&self, level: LogLevel, message: &str) -> String {
        match (level, self.use_color) {
            (LogLevel::Warn, true) => format!("{} {}", "⚠".yellow(), message.yellow()),
            (LogLevel::Warn, false) => format!("WARNING: {}", message),
            (LogLevel::Info, _) => message.to_string(),
        }
    }
}

impl ProgressObserver for ProgressReporter {
    fn on_record(&self, progress: &Progress) {
        if let Some(bar) = &self.bar {
            bar.set_position(progress.rows_read);
            bar.set_message(format!(
                "written {}, filtered {}",
                progress.rows_emitted, progress.rows_filtered
            ));
        }
    }

    fn on_log(&self, level: LogLevel, message: &str) {
        if !self.echo && level == LogLevel::Info {
            return;
        }
        let line = self.render(level, message);
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{}", line),
        }
    }
}

/// Format a conversion summary for human reading
fn format_summary_human(summary: &ConversionSummary, output_file: &Path) -> String {
    let mut output = String::new();

    output.push_str("═══ Conversion Summary ═══\n");
    output.push_str(&format!("  Output:        {}\n", output_file.display()));
    output.push_str(&format!("  Rows read:     {}\n", summary.rows_read));
    output.push_str(&format!("  Rows filtered: {}\n", summary.rows_filtered));
    output.push_str(&format!("  Rows written:  {}\n", summary.rows_emitted));
    output.push_str(&format!(
        "  Classification: {} cache hits, {} pre-filtered, {} oracle calls, {} fallbacks\n",
        summary.cache_hits, summary.pre_filtered, summary.oracle_calls, summary.fallbacks
    ));
    output.push_str(&format!(
        "  Duration:      {:.2}s\n",
        summary.duration_ms() as f64 / 1000.0
    ));

    output
}
