//! Where printed statements and scope summaries go.
//!
//! - [`ConsoleSink`]: stdout, blank line after each block
//! - [`LogSink`]: one `tracing` event per statement and per summary
//! - [`FileSink`]: a text file, optionally with the call stack of every query

mod console;
mod file;
mod log;
mod stack;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use log::LogSink;
pub use stack::StackFrame;

use crate::scope::ScopeSummary;
use std::io;
use std::time::Duration;

/// One intercepted statement, ready to print.
#[derive(Debug, Clone)]
pub struct StatementBlock<'a> {
    /// Rendered and formatted SQL.
    pub sql: &'a str,
    /// Time the query took.
    pub elapsed: Duration,
    /// Time between the start of the scope's first query and the start of this one.
    /// Only set when relative timestamps are enabled.
    pub offset: Option<Duration>,
}

impl StatementBlock<'_> {
    /// The annotation printed under the SQL, e.g. `[Time elapsed: 0.42ms]`.
    pub fn timing_line(&self) -> String {
        match self.offset {
            Some(offset) => format!(
                "[Time elapsed: {:.2}ms, started at +{:.2}ms]",
                millis(self.elapsed),
                millis(offset)
            ),
            None => format!("[Time elapsed: {:.2}ms]", millis(self.elapsed)),
        }
    }
}

/// Receives the output of a scope.
///
/// Errors are returned to whoever ran the query (for statements) or closed the scope (for
/// the summary).
pub trait SqlSink: Send + Sync {
    /// Emit one statement block.
    fn write_statement(&self, block: &StatementBlock<'_>) -> io::Result<()>;

    /// Emit the closing summary of a scope.
    fn write_summary(&self, summary: &ScopeSummary) -> io::Result<()>;

    /// Push buffered output to its destination.
    ///
    /// Default implementation does nothing.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_line_formats() {
        let block = StatementBlock {
            sql: "SELECT 1",
            elapsed: Duration::from_micros(1500),
            offset: None,
        };
        assert_eq!(block.timing_line(), "[Time elapsed: 1.50ms]");

        let block = StatementBlock {
            offset: Some(Duration::from_millis(12)),
            ..block
        };
        assert_eq!(
            block.timing_line(),
            "[Time elapsed: 1.50ms, started at +12.00ms]"
        );
    }
}
