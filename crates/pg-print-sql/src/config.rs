use crate::error::{PrintSqlError, PrintSqlResult};
use crate::sink::{ConsoleSink, FileSink, LogSink, SqlSink};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a scope's output goes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkConfig {
    /// Print to stdout.
    #[default]
    Console,
    /// Emit `tracing` events.
    Log {
        /// Event level (`trace`, `debug`, `info`, `warn`, `error`). Defaults to `debug`.
        #[serde(default)]
        level: Option<String>,
        /// Truncate logged SQL to this many bytes.
        #[serde(default)]
        max_sql_length: Option<usize>,
    },
    /// Write to a file, opened when the scope begins.
    File {
        path: PathBuf,
        /// Write the call stack before every statement.
        #[serde(default)]
        trace: bool,
        /// Only write stack frames whose source path starts with this prefix.
        #[serde(default)]
        path_prefix: Option<String>,
    },
}

impl SinkConfig {
    /// Create the sink this configuration describes.
    ///
    /// For [`SinkConfig::File`] this creates (or truncates) the file.
    pub fn open(&self) -> PrintSqlResult<Arc<dyn SqlSink>> {
        let sink: Arc<dyn SqlSink> = match self {
            SinkConfig::Console => Arc::new(ConsoleSink),
            SinkConfig::Log {
                level,
                max_sql_length,
            } => {
                let mut sink = LogSink::new();
                if let Some(level) = level {
                    sink = sink.level(level.parse().map_err(|_| {
                        PrintSqlError::config(format!("invalid log level: {level}"))
                    })?);
                }
                if let Some(len) = max_sql_length {
                    sink = sink.max_sql_length(*len);
                }
                Arc::new(sink)
            }
            SinkConfig::File {
                path,
                trace,
                path_prefix,
            } => {
                let mut sink = FileSink::create(path)?.with_trace(*trace);
                if let Some(prefix) = path_prefix {
                    sink = sink.with_path_prefix(prefix.clone());
                }
                Arc::new(sink)
            }
        };
        Ok(sink)
    }
}

/// Configuration for SQL printing scopes.
///
/// By default every statement is printed to stdout with its elapsed time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintSqlConfig {
    /// Only report the query count and total time, not the statements.
    pub count_only: bool,
    /// Annotate each statement with its start time relative to the scope's first query.
    pub relative_time: bool,
    /// Output destination.
    pub sink: SinkConfig,
}

impl PrintSqlConfig {
    /// Create a configuration with defaults (all statements, stdout).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML.
    ///
    /// ```toml
    /// count_only = false
    /// relative_time = true
    ///
    /// [sink]
    /// kind = "file"
    /// path = "/tmp/queries.log"
    /// trace = true
    /// path_prefix = "/srv/app/src"
    /// ```
    pub fn from_toml_str(s: &str) -> PrintSqlResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Only report counts and timing.
    pub fn with_count_only(mut self, count_only: bool) -> Self {
        self.count_only = count_only;
        self
    }

    /// Annotate statements with their start offset within the scope.
    pub fn with_relative_time(mut self, relative_time: bool) -> Self {
        self.relative_time = relative_time;
        self
    }

    /// Set the output destination.
    pub fn with_sink(mut self, sink: SinkConfig) -> Self {
        self.sink = sink;
        self
    }
}
