//! Observer hooks around query execution.
//!
//! [`ObservedExecutor`] decorates any [`Executor`] and reports each call to a
//! [`QueryObserver`]. Nothing global is patched: only code that holds the decorated executor
//! is observed, and the wrapped executor is left exactly as it was.
//!
//! # Example
//!
//! ```rust,ignore
//! use pg_print_sql::{CompiledQuery, ObservedExecutor, PrintSqlResult, QueryObserver};
//! use std::time::{Duration, Instant};
//!
//! struct Slow;
//!
//! impl QueryObserver for Slow {
//!     fn after_execute(
//!         &self,
//!         query: &CompiledQuery,
//!         _started: Instant,
//!         elapsed: Duration,
//!     ) -> PrintSqlResult<()> {
//!         if elapsed > Duration::from_millis(100) {
//!             eprintln!("slow: {}", query.template());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let db = ObservedExecutor::new(&client, Slow);
//! ```

use crate::error::{PrintSqlError, PrintSqlResult};
use crate::executor::Executor;
use crate::query::CompiledQuery;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Hooks called around every query an [`ObservedExecutor`] runs.
pub trait QueryObserver: Send + Sync {
    /// Called right before the query is handed to the wrapped executor.
    ///
    /// Default implementation does nothing.
    fn before_execute(&self, _query: &CompiledQuery, _started: Instant) {}

    /// Called after the query returned successfully.
    ///
    /// An error here is returned to the caller in place of the query's result.
    fn after_execute(
        &self,
        query: &CompiledQuery,
        started: Instant,
        elapsed: Duration,
    ) -> PrintSqlResult<()>;

    /// Called when the wrapped executor failed. The error is returned to the caller as is.
    ///
    /// Default implementation does nothing.
    fn on_execute_error(
        &self,
        _query: &CompiledQuery,
        _elapsed: Duration,
        _error: &PrintSqlError,
    ) {
    }
}

impl<O: QueryObserver + ?Sized> QueryObserver for Arc<O> {
    fn before_execute(&self, query: &CompiledQuery, started: Instant) {
        (**self).before_execute(query, started);
    }

    fn after_execute(
        &self,
        query: &CompiledQuery,
        started: Instant,
        elapsed: Duration,
    ) -> PrintSqlResult<()> {
        (**self).after_execute(query, started, elapsed)
    }

    fn on_execute_error(&self, query: &CompiledQuery, elapsed: Duration, error: &PrintSqlError) {
        (**self).on_execute_error(query, elapsed, error);
    }
}

/// An observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl QueryObserver for NoopObserver {
    fn after_execute(&self, _: &CompiledQuery, _: Instant, _: Duration) -> PrintSqlResult<()> {
        Ok(())
    }
}

/// An executor that reports every call to an observer before returning its result.
pub struct ObservedExecutor<E, O> {
    pub(crate) inner: E,
    pub(crate) observer: O,
}

impl<E: Executor, O: QueryObserver> ObservedExecutor<E, O> {
    /// Wrap `inner`, reporting to `observer`.
    pub fn new(inner: E, observer: O) -> Self {
        Self { inner, observer }
    }

    /// Get a reference to the wrapped executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Get a reference to the observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Unwrap into the executor and observer.
    pub fn into_parts(self) -> (E, O) {
        (self.inner, self.observer)
    }
}

impl<E: Executor, O: QueryObserver> Executor for ObservedExecutor<E, O> {
    type Output = E::Output;

    async fn execute_sql(&self, query: &CompiledQuery) -> PrintSqlResult<E::Output> {
        let started = Instant::now();
        self.observer.before_execute(query, started);

        let result = self.inner.execute_sql(query).await;
        let elapsed = started.elapsed();

        match result {
            Ok(output) => {
                self.observer.after_execute(query, started, elapsed)?;
                Ok(output)
            }
            Err(err) => {
                self.observer.on_execute_error(query, elapsed, &err);
                Err(err)
            }
        }
    }
}
