//! SQL layout for printed statements.
//!
//! With the `pretty` feature (on by default) statements are re-indented and keywords
//! upper-cased by `sqlformat`. Without it, [`default_formatter`] falls back to
//! [`PassthroughFormatter`] and says so once.

use std::sync::Arc;

/// Turns a rendered statement into the text that gets printed.
///
/// Implementations must be pure: same input, same output, no side effects.
pub trait SqlFormatter: Send + Sync {
    fn format(&self, statement: &str) -> String;
}

/// Prints statements exactly as rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFormatter;

impl SqlFormatter for PassthroughFormatter {
    fn format(&self, statement: &str) -> String {
        statement.to_string()
    }
}

/// Re-indents statements and upper-cases keywords.
#[cfg(feature = "pretty")]
#[derive(Debug, Clone)]
pub struct PrettyFormatter {
    /// Spaces per indentation level.
    pub indent: u8,
    /// Upper-case SQL keywords.
    pub uppercase: bool,
}

#[cfg(feature = "pretty")]
impl Default for PrettyFormatter {
    fn default() -> Self {
        Self {
            indent: 2,
            uppercase: true,
        }
    }
}

#[cfg(feature = "pretty")]
impl PrettyFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set spaces per indentation level.
    pub fn indent(mut self, spaces: u8) -> Self {
        self.indent = spaces;
        self
    }

    /// Keep keywords in whatever case the template used.
    pub fn keep_case(mut self) -> Self {
        self.uppercase = false;
        self
    }
}

#[cfg(feature = "pretty")]
impl SqlFormatter for PrettyFormatter {
    fn format(&self, statement: &str) -> String {
        let options = sqlformat::FormatOptions {
            indent: sqlformat::Indent::Spaces(self.indent),
            uppercase: Some(self.uppercase),
            ..Default::default()
        };
        sqlformat::format(statement, &sqlformat::QueryParams::None, &options)
    }
}

/// The formatter scopes use unless told otherwise.
#[cfg(feature = "pretty")]
pub fn default_formatter() -> Arc<dyn SqlFormatter> {
    Arc::new(PrettyFormatter::default())
}

/// The formatter scopes use unless told otherwise.
#[cfg(not(feature = "pretty"))]
pub fn default_formatter() -> Arc<dyn SqlFormatter> {
    static WARN_ONCE: std::sync::Once = std::sync::Once::new();
    passthrough_with_warning(&WARN_ONCE)
}

#[cfg(not(feature = "pretty"))]
fn passthrough_with_warning(warned: &std::sync::Once) -> Arc<dyn SqlFormatter> {
    warned.call_once(|| {
        tracing::warn!(
            target: "pg_print_sql",
            "built without the `pretty` feature; SQL is printed unformatted"
        );
    });
    Arc::new(PassthroughFormatter)
}
