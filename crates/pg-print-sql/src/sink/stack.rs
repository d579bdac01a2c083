//! Call-stack capture for the file sink.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

const UNKNOWN_FILE: &str = "<unknown>";

/// One resolved frame of the stack that issued a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub file: String,
    pub line: u32,
    pub function: String,
    /// The source line, trimmed. Empty when the file can't be read.
    pub code: String,
}

fn csv_field(f: &mut fmt::Formatter<'_>, field: &str) -> fmt::Result {
    let needs_quotes = field.contains([',', '"', '\n', '\r'])
        || field.starts_with(' ')
        || field.ends_with(' ');
    if !needs_quotes {
        return f.write_str(field);
    }
    f.write_str("\"")?;
    f.write_str(&field.replace('"', "\"\""))?;
    f.write_str("\"")
}

/// Writes the frame as one CSV record: `file,line,function,code`.
impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        csv_field(f, &self.file)?;
        write!(f, ",{},", self.line)?;
        csv_field(f, &self.function)?;
        f.write_str(",")?;
        csv_field(f, &self.code)
    }
}

/// Source lines read so far, keyed by file. `None` marks files that couldn't be read.
#[derive(Debug, Default)]
pub(crate) struct SourceCache {
    files: HashMap<PathBuf, Option<Vec<String>>>,
}

impl SourceCache {
    fn line(&mut self, file: &Path, line: u32) -> String {
        let lines = self.files.entry(file.to_path_buf()).or_insert_with(|| {
            std::fs::read_to_string(file)
                .ok()
                .map(|text| text.lines().map(str::to_string).collect())
        });
        let index = (line as usize).checked_sub(1);
        match (lines, index) {
            (Some(lines), Some(index)) => lines
                .get(index)
                .map(|l| l.trim().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// Capture the current call stack, outermost frame first.
pub(crate) fn capture(sources: &mut SourceCache) -> Vec<StackFrame> {
    let backtrace = backtrace::Backtrace::new();
    let mut frames = Vec::new();
    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            let function = symbol
                .name()
                .map(|name| format!("{name:#}"))
                .unwrap_or_else(|| "<unknown>".to_string());
            let line = symbol.lineno().unwrap_or(0);
            let (file, code) = match symbol.filename() {
                Some(path) => (path.display().to_string(), sources.line(path, line)),
                None => (UNKNOWN_FILE.to_string(), String::new()),
            };
            frames.push(StackFrame {
                file,
                line,
                function,
                code,
            });
        }
    }
    frames.reverse();
    frames
}

/// Keep only frames whose source path starts with `prefix`.
pub(crate) fn retain_prefix(frames: &mut Vec<StackFrame>, prefix: &str) {
    frames.retain(|frame| frame.file.starts_with(prefix));
}
