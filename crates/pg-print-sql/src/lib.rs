//! # pg-print-sql
//!
//! See the SQL a block of code sends to PostgreSQL, with per-statement timings and a
//! query count.
//!
//! A [`SqlScope`] decorates any [`Executor`] (a `tokio_postgres::Client`, a transaction, a
//! pooled client, or another scope). Queries issued through it are rendered with their
//! parameters inlined, pretty-printed and written to stdout, a `tracing` event or a file.
//! Nothing global is touched: code that keeps using the original executor is not observed.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use pg_print_sql::{Executor, PrintSql, query};
//!
//! let scope = PrintSql::new().begin(&client)?;
//! scope.execute_sql(&query("SELECT * FROM users WHERE id = %s").bind(5)).await?;
//! scope.execute_sql(&query("SELECT count(*) FROM orders")).await?;
//! scope.finish()?;
//! // SELECT
//! //   *
//! // FROM
//! //   users
//! // WHERE
//! //   id = 5
//! // [Time elapsed: 0.42ms]
//! // ...
//! // [2 queries executed, total time elapsed 0.97ms]
//! ```
//!
//! ## Features
//!
//! - `pretty` (default): format statements with `sqlformat`
//! - `pool` (default): [`Executor`] for `deadpool_postgres` clients and transactions

pub mod config;
pub mod error;
pub mod executor;
pub mod format;
pub mod observe;
pub mod query;
mod render;
pub mod scope;
pub mod sink;
pub mod value;

#[cfg(test)]
mod test_util;

pub use config::{PrintSqlConfig, SinkConfig};
pub use error::{PrintSqlError, PrintSqlResult, SubstitutionError};
pub use executor::Executor;
#[cfg(feature = "pretty")]
pub use format::PrettyFormatter;
pub use format::{PassthroughFormatter, SqlFormatter, default_formatter};
pub use observe::{NoopObserver, ObservedExecutor, QueryObserver};
pub use query::{CompiledQuery, Params, query};
pub use scope::{PrintSql, ScopeSummary, SqlScope, print_sql};
pub use sink::{ConsoleSink, FileSink, LogSink, SqlSink, StackFrame, StatementBlock};
pub use value::SqlValue;

// Re-export tokio_postgres for convenience
pub use tokio_postgres;
