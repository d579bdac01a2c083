use crate::error::PrintSqlResult;
use crate::format::SqlFormatter;
use crate::observe::QueryObserver;
use crate::query::CompiledQuery;
use crate::sink::{SqlSink, StatementBlock, millis};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Totals reported when a scope closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeSummary {
    /// Queries issued through the scope, failed ones included.
    pub query_count: u64,
    /// Sum of the elapsed time of every successful query.
    pub total_time: Duration,
}

/// `[3 queries executed, total time elapsed 1.25ms]`
impl fmt::Display for ScopeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.query_count == 1 {
            "query"
        } else {
            "queries"
        };
        write!(
            f,
            "[{} {noun} executed, total time elapsed {:.2}ms]",
            self.query_count,
            millis(self.total_time)
        )
    }
}

#[derive(Debug, Default)]
struct ScopeState {
    query_count: u64,
    total_time: Duration,
    first_start_time: Option<Instant>,
}

/// The observer behind a scope: counts, times and prints every query it sees.
pub(crate) struct Recorder {
    state: Mutex<ScopeState>,
    count_only: bool,
    relative_time: bool,
    formatter: Arc<dyn SqlFormatter>,
    sink: Arc<dyn SqlSink>,
}

impl Recorder {
    pub(crate) fn new(
        count_only: bool,
        relative_time: bool,
        formatter: Arc<dyn SqlFormatter>,
        sink: Arc<dyn SqlSink>,
    ) -> Self {
        Self {
            state: Mutex::new(ScopeState::default()),
            count_only,
            relative_time,
            formatter,
            sink,
        }
    }

    pub(crate) fn summary(&self) -> ScopeSummary {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        ScopeSummary {
            query_count: state.query_count,
            total_time: state.total_time,
        }
    }

    /// Write the summary and flush the sink.
    pub(crate) fn close(&self) -> PrintSqlResult<ScopeSummary> {
        let summary = self.summary();
        self.sink.write_summary(&summary)?;
        self.sink.flush()?;
        Ok(summary)
    }
}

impl QueryObserver for Recorder {
    fn before_execute(&self, _query: &CompiledQuery, started: Instant) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.query_count += 1;
        state.first_start_time.get_or_insert(started);
    }

    fn after_execute(
        &self,
        query: &CompiledQuery,
        started: Instant,
        elapsed: Duration,
    ) -> PrintSqlResult<()> {
        let first_start_time = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.total_time += elapsed;
            state.first_start_time
        };
        if self.count_only {
            return Ok(());
        }

        let sql = self.formatter.format(&query.render()?);
        let offset = if self.relative_time {
            first_start_time.map(|first| started.saturating_duration_since(first))
        } else {
            None
        };
        self.sink.write_statement(&StatementBlock {
            sql: &sql,
            elapsed,
            offset,
        })?;
        Ok(())
    }
}
