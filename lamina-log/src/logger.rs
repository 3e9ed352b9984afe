//! Structured JSON-lines logger.
//!
//! A [`Logger`] writes one line per entry to a shared [`Sink`]. Every line
//! carries the logger's static fields plus the entry's own fields:
//!
//! ```text
//! {"level":"info","message":"Processing SQS message","queue_arn":"arn:...","time":"2024-01-01T00:00:00Z"}
//! ```

use crate::{Carrier, Format, Level, LogConfig, config};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Shared, thread-safe output for loggers.
///
/// Cloning a sink shares the underlying writer.
#[derive(Clone)]
pub struct Sink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Sink {
    /// Wrap any writer.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Standard output (what Lambda forwards to CloudWatch Logs).
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Write one line. A failing sink never fails the caller's handler; the
    /// error is reported through `tracing` instead.
    fn write_line(&self, line: &str) {
        let mut writer = self.writer.lock();
        if let Err(err) = writeln!(writer, "{}", line).and_then(|()| writer.flush()) {
            tracing::warn!(error = %err, "Failed to write log line");
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}

/// Structured logger with static fields.
#[derive(Clone)]
pub struct Logger {
    sink: Sink,
    fields: Arc<BTreeMap<String, String>>,
    config: LogConfig,
}

impl Logger {
    /// Create a logger using the global configuration.
    pub fn new<I, K, V>(sink: Sink, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_config(sink, fields, config().clone())
    }

    /// Create a logger with an explicit configuration.
    pub fn with_config<I, K, V>(sink: Sink, fields: I, config: LogConfig) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            sink,
            fields: Arc::new(fields),
            config,
        }
    }

    /// Static fields written on every line.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Start an entry at the given level.
    pub fn entry(&self, level: Level) -> Entry<'_> {
        Entry {
            logger: self,
            level,
            fields: Vec::new(),
        }
    }

    /// Start a trace entry.
    pub fn trace(&self) -> Entry<'_> {
        self.entry(Level::Trace)
    }

    /// Start a debug entry.
    pub fn debug(&self) -> Entry<'_> {
        self.entry(Level::Debug)
    }

    /// Start an info entry.
    pub fn info(&self) -> Entry<'_> {
        self.entry(Level::Info)
    }

    /// Start a warning entry.
    pub fn warn(&self) -> Entry<'_> {
        self.entry(Level::Warn)
    }

    /// Start an error entry.
    pub fn error(&self) -> Entry<'_> {
        self.entry(Level::Error)
    }

    fn emit(&self, level: Level, fields: Vec<(String, Value)>, message: &str) {
        if !self.config.is_enabled(level) {
            return;
        }

        let line = match self.config.format {
            Format::Json => self.render_json(level, fields, message),
            Format::Compact => self.render_compact(level, fields, message),
        };
        self.sink.write_line(&line);
    }

    fn render_json(&self, level: Level, fields: Vec<(String, Value)>, message: &str) -> String {
        let mut object = Map::new();
        for (key, value) in self.fields.iter() {
            object.insert(key.clone(), Value::String(value.clone()));
        }
        for (key, value) in fields {
            object.insert(key, value);
        }
        object.insert("level".to_string(), Value::String(level.as_str().to_string()));
        if self.config.timestamps {
            object.insert(
                "time".to_string(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        object.insert("message".to_string(), Value::String(message.to_string()));

        Value::Object(object).to_string()
    }

    fn render_compact(&self, level: Level, fields: Vec<(String, Value)>, message: &str) -> String {
        let mut line = String::new();
        if self.config.timestamps {
            line.push_str(&chrono::Utc::now().format("%H:%M:%S%.3f").to_string());
            line.push(' ');
        }
        line.push_str(&level.as_str().to_uppercase());
        line.push(' ');
        line.push_str(message);

        for (key, value) in self.fields.iter() {
            line.push_str(&format!(" {}={}", key, value));
        }
        for (key, value) in fields {
            match value {
                Value::String(s) => line.push_str(&format!(" {}={}", key, s)),
                other => line.push_str(&format!(" {}={}", key, other)),
            }
        }
        line
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("fields", &self.fields)
            .field("config", &self.config)
            .finish()
    }
}

/// A log line being built.
///
/// Nothing is written until [`Entry::msg`] is called.
#[must_use = "entries are only written by `msg`"]
pub struct Entry<'a> {
    logger: &'a Logger,
    level: Level,
    fields: Vec<(String, Value)>,
}

impl Entry<'_> {
    /// Add a field to this line only.
    pub fn field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.push((key.into(), value));
        self
    }

    /// Write the line.
    pub fn msg(self, message: impl AsRef<str>) {
        self.logger.emit(self.level, self.fields, message.as_ref());
    }
}

/// Return a carrier equal to `carrier` with `logger` attached.
pub fn with_logger(carrier: &Carrier, logger: Logger) -> Carrier {
    carrier.with(logger)
}

/// Logger attached to the carrier, if any.
pub fn logger<'a>(carrier: impl Into<Option<&'a Carrier>>) -> Option<Logger> {
    carrier.into().and_then(|c| c.get::<Logger>()).cloned()
}
