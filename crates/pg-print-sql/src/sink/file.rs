use super::stack::{self, SourceCache};
use super::{SqlSink, StatementBlock};
use crate::scope::ScopeSummary;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Writes statement blocks to a UTF-8 text file, truncated when the sink is created.
///
/// Each block is the SQL, its timing line and a blank line. With tracing enabled, the call
/// stack of the query is written first, one `file,line,function,code` record per frame,
/// outermost first. The file ends with the scope summary.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    trace: bool,
    path_prefix: Option<String>,
    sources: Mutex<SourceCache>,
}

impl FileSink {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            trace: false,
            path_prefix: None,
            sources: Mutex::new(SourceCache::default()),
        })
    }

    /// Write the call stack before every statement.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Only write stack frames whose source path starts with `prefix`.
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_tracing(&self) -> bool {
        self.trace
    }

    fn frames(&self) -> Vec<stack::StackFrame> {
        let mut sources = self.sources.lock().unwrap_or_else(PoisonError::into_inner);
        let mut frames = stack::capture(&mut sources);
        if let Some(prefix) = &self.path_prefix {
            stack::retain_prefix(&mut frames, prefix);
        }
        frames
    }
}

impl SqlSink for FileSink {
    fn write_statement(&self, block: &StatementBlock<'_>) -> io::Result<()> {
        let frames = if self.trace { self.frames() } else { Vec::new() };

        let mut out = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        for frame in &frames {
            writeln!(out, "{frame}")?;
        }
        writeln!(out, "{}", block.sql)?;
        writeln!(out, "{}\n", block.timing_line())
    }

    fn write_summary(&self, summary: &ScopeSummary) -> io::Result<()> {
        let mut out = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{summary}")
    }

    fn flush(&self) -> io::Result<()> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}
