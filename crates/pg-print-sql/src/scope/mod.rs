//! Scoped SQL printing.
//!
//! A [`SqlScope`] wraps an executor for as long as it lives. Every query issued through the
//! scope is counted, timed and (unless counting only) rendered, formatted and written to a
//! sink. When the scope is finished or dropped, a summary line closes the output:
//!
//! ```text
//! SELECT
//!   *
//! FROM
//!   users
//! WHERE
//!   id = 5
//! [Time elapsed: 0.42ms]
//!
//! [1 query executed, total time elapsed 0.42ms]
//! ```
//!
//! The wrapped executor is only borrowed. Code holding it directly is never observed, and
//! once the scope ends it behaves exactly as it did before.
//!
//! # Example
//!
//! ```rust,ignore
//! use pg_print_sql::{Executor, PrintSql, query};
//!
//! let rows = PrintSql::new()
//!     .with_relative_time(true)
//!     .run(&client, async |db| {
//!         db.execute_sql(&query("SELECT * FROM users WHERE id = %s").bind(5)).await
//!     })
//!     .await??;
//! ```

mod recorder;


pub use recorder::ScopeSummary;

use crate::config::{PrintSqlConfig, SinkConfig};
use crate::error::PrintSqlResult;
use crate::executor::Executor;
use crate::format::{SqlFormatter, default_formatter};
use crate::observe::ObservedExecutor;
use crate::query::CompiledQuery;
use crate::sink::SqlSink;
use recorder::Recorder;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Opens SQL printing scopes.
///
/// Holds the settings shared by every scope it opens; it can be kept around and reused.
#[derive(Clone)]
pub struct PrintSql {
    config: PrintSqlConfig,
    formatter: Arc<dyn SqlFormatter>,
    sink: Option<Arc<dyn SqlSink>>,
}

impl fmt::Debug for PrintSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintSql")
            .field("config", &self.config)
            .field("custom_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for PrintSql {
    fn default() -> Self {
        Self::from_config(PrintSqlConfig::default())
    }
}

impl PrintSql {
    /// Print every statement to stdout with the default formatter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: PrintSqlConfig) -> Self {
        Self {
            config,
            formatter: default_formatter(),
            sink: None,
        }
    }

    pub fn config(&self) -> &PrintSqlConfig {
        &self.config
    }

    /// Only report the query count and total time.
    pub fn with_count_only(mut self, count_only: bool) -> Self {
        self.config.count_only = count_only;
        self
    }

    /// Annotate each statement with its start time relative to the scope's first query.
    pub fn with_relative_time(mut self, relative_time: bool) -> Self {
        self.config.relative_time = relative_time;
        self
    }

    /// Use `formatter` instead of [`default_formatter`].
    pub fn with_formatter(mut self, formatter: impl SqlFormatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Write to `sink` instead of the sink described by the configuration.
    pub fn with_sink(self, sink: impl SqlSink + 'static) -> Self {
        self.with_sink_arc(Arc::new(sink))
    }

    /// Write to a shared sink. Scopes opened from this value all write to it.
    pub fn with_sink_arc(mut self, sink: Arc<dyn SqlSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Emit `tracing` events at debug level instead of printing.
    pub fn to_log(mut self) -> Self {
        self.sink = None;
        self.config.sink = SinkConfig::Log {
            level: None,
            max_sql_length: None,
        };
        self
    }

    /// Write to a file, created when each scope begins.
    ///
    /// With `trace`, the call stack of every query is written before it, limited to frames
    /// whose source path starts with `path_prefix` when one is given.
    pub fn to_file(
        mut self,
        path: impl Into<PathBuf>,
        trace: bool,
        path_prefix: Option<String>,
    ) -> Self {
        self.sink = None;
        self.config.sink = SinkConfig::File {
            path: path.into(),
            trace,
            path_prefix,
        };
        self
    }

    /// Open a scope on `executor`.
    ///
    /// Opens the configured sink; for a file sink this creates the file, and failing to do
    /// so is an error.
    pub fn begin<'e, E: Executor>(&self, executor: &'e E) -> PrintSqlResult<SqlScope<'e, E>> {
        let sink = match &self.sink {
            Some(sink) => sink.clone(),
            None => self.config.sink.open()?,
        };
        let recorder = Recorder::new(
            self.config.count_only,
            self.config.relative_time,
            self.formatter.clone(),
            sink,
        );
        Ok(SqlScope {
            inner: ObservedExecutor::new(executor, recorder),
            finished: false,
        })
    }

    /// Run `f` inside a scope on `executor` and return what it returned.
    ///
    /// The scope is finished after `f` completes. The outer `Result` only reports failures
    /// of the scope itself (opening the sink, writing the summary).
    pub async fn run<'e, E, F, T>(&self, executor: &'e E, f: F) -> PrintSqlResult<T>
    where
        E: Executor,
        F: AsyncFnOnce(&SqlScope<'e, E>) -> T,
    {
        let scope = self.begin(executor)?;
        let value = f(&scope).await;
        scope.finish()?;
        Ok(value)
    }
}

/// Open a scope printing to stdout, or only counting when `count_only` is set.
pub fn print_sql<E: Executor>(executor: &E, count_only: bool) -> PrintSqlResult<SqlScope<'_, E>> {
    PrintSql::new().with_count_only(count_only).begin(executor)
}

/// An executor that prints what it runs.
///
/// Created by [`PrintSql::begin`]. Queries go to the original executor unchanged and their
/// results come back unchanged. Call [`SqlScope::finish`] to write the summary and see its
/// errors; dropping the scope writes it too, logging failures instead.
pub struct SqlScope<'e, E: Executor> {
    inner: ObservedExecutor<&'e E, Recorder>,
    finished: bool,
}

impl<'e, E: Executor> SqlScope<'e, E> {
    /// Queries issued so far, failed ones included.
    pub fn query_count(&self) -> u64 {
        self.summary().query_count
    }

    /// Time spent in successful queries so far.
    pub fn total_time(&self) -> Duration {
        self.summary().total_time
    }

    pub fn summary(&self) -> ScopeSummary {
        self.inner.observer.summary()
    }

    /// The executor this scope was opened on.
    pub fn original(&self) -> &'e E {
        self.inner.inner
    }

    /// Write the summary, flush the sink and end the scope.
    pub fn finish(mut self) -> PrintSqlResult<ScopeSummary> {
        self.finished = true;
        self.inner.observer.close()
    }
}

impl<E: Executor> fmt::Debug for SqlScope<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlScope")
            .field("summary", &self.summary())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<E: Executor> Executor for SqlScope<'_, E> {
    type Output = E::Output;

    async fn execute_sql(&self, query: &CompiledQuery) -> PrintSqlResult<E::Output> {
        self.inner.execute_sql(query).await
    }
}

impl<E: Executor> Drop for SqlScope<'_, E> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.inner.observer.close() {
            tracing::warn!(target: "pg_print_sql", error = %err, "failed to write scope summary");
        }
    }
}
