use super::{SqlSink, StatementBlock};
use crate::scope::ScopeSummary;
use std::io::{self, Write};

/// Prints to stdout, each block followed by a blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

fn write_block(out: &mut impl Write, block: &StatementBlock<'_>) -> io::Result<()> {
    writeln!(out, "{}", block.sql)?;
    writeln!(out, "{}\n", block.timing_line())
}

fn write_summary_line(out: &mut impl Write, summary: &ScopeSummary) -> io::Result<()> {
    writeln!(out, "{summary}\n")
}

impl SqlSink for ConsoleSink {
    fn write_statement(&self, block: &StatementBlock<'_>) -> io::Result<()> {
        write_block(&mut io::stdout().lock(), block)
    }

    fn write_summary(&self, summary: &ScopeSummary) -> io::Result<()> {
        write_summary_line(&mut io::stdout().lock(), summary)
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().flush()
    }
}
