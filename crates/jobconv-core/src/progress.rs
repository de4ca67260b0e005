//! Progress and log callbacks for presentation layers

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
}

/// Snapshot sent after every source record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub rows_read: u64,
    pub rows_filtered: u64,
    pub rows_emitted: u64,
    /// Data rows in the input, when the caller counted them up front
    pub total_rows: Option<u64>,
}

/// Receives per-record progress and human-readable log lines.
///
/// Observers must not block; they run on the conversion task.
pub trait ProgressObserver: Send + Sync {
    fn on_record(&self, _progress: &Progress) {}

    fn on_log(&self, _level: LogLevel, _message: &str) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}
