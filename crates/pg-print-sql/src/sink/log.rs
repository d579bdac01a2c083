use super::{SqlSink, StatementBlock, millis};
use crate::scope::ScopeSummary;
use std::io;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Emits statements and summaries as `tracing` events under the `pg_print_sql` target.
///
/// Statement events carry `elapsed_ms` and (with relative timestamps)
/// `offset_ms`; summary events carry `query_count` and `total_ms`.
#[derive(Debug, Clone)]
pub struct LogSink {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for LogSink {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: None,
        }
    }
}

impl LogSink {
    /// Create a sink logging at debug level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub(crate) fn truncate_sql<'s>(&self, sql: &'s str) -> std::borrow::Cow<'s, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }
}

impl SqlSink for LogSink {
    fn write_statement(&self, block: &StatementBlock<'_>) -> io::Result<()> {
        let sql = self.truncate_sql(block.sql);
        emit_at_level!(
            self.level,
            target: "pg_print_sql",
            elapsed_ms = millis(block.elapsed),
            offset_ms = block.offset.map(millis),
            "{}\n{}",
            sql,
            block.timing_line(),
        );
        Ok(())
    }

    fn write_summary(&self, summary: &ScopeSummary) -> io::Result<()> {
        emit_at_level!(
            self.level,
            target: "pg_print_sql",
            query_count = summary.query_count,
            total_ms = millis(summary.total_time),
            "{}",
            summary,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{EventLog, FieldValue};
    use std::time::Duration;

    #[test]
    fn truncation_respects_char_boundaries() {
        let sink = LogSink::new().max_sql_length(8);
        assert_eq!(sink.truncate_sql("SELECT 1"), "SELECT 1");
        assert_eq!(sink.truncate_sql("SELECT * FROM t"), "SELECT *...");

        let sink = LogSink::new().max_sql_length(9);
        assert_eq!(sink.truncate_sql("SELECT 'é'"), "SELECT '...");
    }

    fn assert_ms(value: Option<&FieldValue>, expected: f64) {
        match value {
            Some(FieldValue::F64(ms)) => {
                assert!((ms - expected).abs() < 1e-9, "{ms} != {expected}")
            }
            other => panic!("expected a float field, got {other:?}"),
        }
    }

    fn block(offset: Option<Duration>) -> StatementBlock<'static> {
        StatementBlock {
            sql: "SELECT 1",
            elapsed: Duration::from_micros(1500),
            offset,
        }
    }

    #[test]
    fn one_debug_event_per_statement_and_summary() {
        let log = EventLog::default();
        let sink = LogSink::default();
        log.capture(|| {
            sink.write_statement(&block(Some(Duration::from_millis(4))))
                .unwrap();
            sink.write_summary(&ScopeSummary {
                query_count: 1,
                total_time: Duration::from_micros(1500),
            })
            .unwrap();
        });

        let events = log.events();
        assert_eq!(events.len(), 2);

        let statement = &events[0];
        assert_eq!(statement.level, Level::DEBUG);
        assert_eq!(statement.target, "pg_print_sql");
        assert_eq!(
            statement.message,
            "SELECT 1\n[Time elapsed: 1.50ms, started at +4.00ms]"
        );
        assert_ms(statement.field("elapsed_ms"), 1.5);
        assert_ms(statement.field("offset_ms"), 4.0);

        let summary = &events[1];
        assert_eq!(summary.level, Level::DEBUG);
        assert_eq!(summary.target, "pg_print_sql");
        assert_eq!(
            summary.message,
            "[1 query executed, total time elapsed 1.50ms]"
        );
        assert_eq!(summary.field("query_count"), Some(&FieldValue::U64(1)));
        assert_ms(summary.field("total_ms"), 1.5);
    }

    #[test]
    fn offset_field_absent_without_relative_time() {
        let log = EventLog::default();
        log.capture(|| LogSink::new().write_statement(&block(None)).unwrap());

        let events = log.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].field("offset_ms").is_none());
        assert_eq!(events[0].message, "SELECT 1\n[Time elapsed: 1.50ms]");
    }

    #[test]
    fn configured_level_and_truncation_apply() {
        let log = EventLog::default();
        let sink = LogSink::new().level(Level::INFO).max_sql_length(6);
        log.capture(|| sink.write_statement(&block(None)).unwrap());

        let events = log.events();
        assert_eq!(events[0].level, Level::INFO);
        assert!(events[0].message.starts_with("SELECT...\n"));
    }
}
