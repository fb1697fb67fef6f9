//! Leveled line logger with single-use operation tracking.
//!
//! Every record is rendered as one line:
//!
//! ```text
//! [2024-01-15T10:30:00.123Z] INFO: completed: translation_request | duration=1.2ms input={...}
//! ```
//!
//! Lines go to a [`LogSink`]. Production uses [`StdoutSink`]; tests capture
//! lines with [`MemorySink`].

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    /// Labelled differently from `Error` but otherwise identical: it never
    /// terminates the process.
    Fatal,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level: '{0}'")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

/// Snapshot of an operation's input or output. Keys render in sorted order.
pub type Snapshot = BTreeMap<String, LogValue>;

/// Build a [`Snapshot`] from key/value pairs.
pub fn snapshot<K, V, I>(pairs: I) -> Snapshot
where
    K: Into<String>,
    V: Into<LogValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A loosely typed log field value.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    Map(Snapshot),
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Text(s) => f.write_str(s),
            LogValue::Int(n) => write!(f, "{}", n),
            LogValue::Float(n) => write!(f, "{}", n),
            LogValue::Bool(b) => write!(f, "{}", b),
            LogValue::Duration(d) => write!(f, "{:?}", d),
            LogValue::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for LogValue {
    fn from(value: &str) -> Self {
        LogValue::Text(value.to_string())
    }
}

impl From<String> for LogValue {
    fn from(value: String) -> Self {
        LogValue::Text(value)
    }
}

impl From<&String> for LogValue {
    fn from(value: &String) -> Self {
        LogValue::Text(value.clone())
    }
}

impl From<i64> for LogValue {
    fn from(value: i64) -> Self {
        LogValue::Int(value)
    }
}

impl From<usize> for LogValue {
    fn from(value: usize) -> Self {
        LogValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u16> for LogValue {
    fn from(value: u16) -> Self {
        LogValue::Int(i64::from(value))
    }
}

impl From<f64> for LogValue {
    fn from(value: f64) -> Self {
        LogValue::Float(value)
    }
}

impl From<bool> for LogValue {
    fn from(value: bool) -> Self {
        LogValue::Bool(value)
    }
}

impl From<Duration> for LogValue {
    fn from(value: Duration) -> Self {
        LogValue::Duration(value)
    }
}

impl From<Snapshot> for LogValue {
    fn from(value: Snapshot) -> Self {
        LogValue::Map(value)
    }
}

/// Destination for rendered log lines.
///
/// Implementations must write each line atomically with respect to other
/// callers so concurrent requests never interleave partial lines.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Writes lines to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_line(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        // Nowhere left to report a failed log write.
        let _ = writeln!(out, "{}", line);
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines written so far, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of lines containing `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.to_string());
    }
}

/// Render one log line.
///
/// Fields are written as ` | k=v k=v`; the separator is omitted when there
/// are no fields.
pub fn format_line<K: AsRef<str>>(
    timestamp: DateTime<Utc>,
    severity: Severity,
    message: &str,
    fields: &[(K, LogValue)],
) -> String {
    let mut line = format!(
        "[{}] {}: {}",
        timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
        severity.label(),
        message
    );

    if !fields.is_empty() {
        line.push_str(" |");
        for (key, value) in fields {
            line.push_str(&format!(" {}={}", key.as_ref(), value));
        }
    }

    line
}

/// Pair up a flat `key, value, key, value, ...` list.
///
/// A trailing key without a value is dropped.
pub fn pair_flat_fields(args: Vec<LogValue>) -> Vec<(String, LogValue)> {
    let mut pairs = Vec::with_capacity(args.len() / 2);
    let mut iter = args.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        pairs.push((key.to_string(), value));
    }
    pairs
}

/// Record of one in-flight operation.
///
/// A tracker is closed by moving it into [`Logger::complete_operation`] or
/// [`Logger::error_operation`], so it can be closed at most once.
#[derive(Debug)]
#[must_use = "an operation tracker must be closed with complete_operation or error_operation"]
pub struct OperationTracker {
    operation: String,
    started_at: Instant,
    input: Snapshot,
}

impl OperationTracker {
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn input(&self) -> &Snapshot {
        &self.input
    }
}

/// Leveled logger writing to a shared sink.
#[derive(Clone)]
pub struct Logger {
    threshold: Severity,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(threshold: Severity, sink: Arc<dyn LogSink>) -> Self {
        Self { threshold, sink }
    }

    /// Logger writing to standard output.
    pub fn stdout(threshold: Severity) -> Self {
        Self::new(threshold, Arc::new(StdoutSink))
    }

    /// Whether a record of this severity would be written.
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.threshold
    }

    pub fn log<K: AsRef<str>>(&self, severity: Severity, message: &str, fields: &[(K, LogValue)]) {
        if !self.enabled(severity) {
            return;
        }
        let line = format_line(Utc::now(), severity, message, fields);
        self.sink.write_line(&line);
    }

    /// Log with a flat alternating key/value argument list.
    ///
    /// An odd-length list loses its final key.
    pub fn log_flat(&self, severity: Severity, message: &str, args: Vec<LogValue>) {
        self.log(severity, message, &pair_flat_fields(args));
    }

    pub fn debug(&self, message: &str, fields: &[(&str, LogValue)]) {
        self.log(Severity::Debug, message, fields);
    }

    pub fn info(&self, message: &str, fields: &[(&str, LogValue)]) {
        self.log(Severity::Info, message, fields);
    }

    pub fn warn(&self, message: &str, fields: &[(&str, LogValue)]) {
        self.log(Severity::Warn, message, fields);
    }

    pub fn error(&self, message: &str, fields: &[(&str, LogValue)]) {
        self.log(Severity::Error, message, fields);
    }

    /// Same as [`Logger::error`] with a `FATAL` label. Does not exit.
    pub fn fatal(&self, message: &str, fields: &[(&str, LogValue)]) {
        self.log(Severity::Fatal, message, fields);
    }

    /// Open a tracked operation and log its start.
    pub fn start_operation(&self, operation: &str, input: Snapshot) -> OperationTracker {
        self.info(
            &format!("started: {}", operation),
            &[("input", LogValue::Map(input.clone()))],
        );
        OperationTracker {
            operation: operation.to_string(),
            started_at: Instant::now(),
            input,
        }
    }

    /// Close a tracker on success. Returns the measured duration.
    pub fn complete_operation(&self, tracker: OperationTracker, output: Snapshot) -> Duration {
        let duration = tracker.started_at.elapsed();
        self.info(
            &format!("completed: {}", tracker.operation),
            &[
                ("duration", duration.into()),
                ("input", LogValue::Map(tracker.input)),
                ("output", LogValue::Map(output)),
            ],
        );
        duration
    }

    /// Close a tracker on failure. Returns the measured duration.
    pub fn error_operation(
        &self,
        tracker: OperationTracker,
        error: &dyn std::error::Error,
        resolution: &str,
    ) -> Duration {
        let duration = tracker.started_at.elapsed();
        self.error(
            &format!("failed: {}", tracker.operation),
            &[
                ("error", error.to_string().into()),
                ("duration", duration.into()),
                ("resolution", resolution.into()),
                ("input", LogValue::Map(tracker.input)),
            ],
        );
        duration
    }
}
