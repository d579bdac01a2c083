//! Compiled queries: a SQL template plus its parameters.

use crate::error::SubstitutionError;
use crate::render;
use crate::value::SqlValue;
use std::collections::BTreeMap;

/// Parameters bound to a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Consumed in order by `%s` placeholders.
    Positional(Vec<SqlValue>),
    /// Looked up by `%(name)s` placeholders.
    Named(BTreeMap<String, SqlValue>),
}

impl Default for Params {
    fn default() -> Self {
        Params::Positional(Vec::new())
    }
}

impl Params {
    /// Number of bound values.
    pub fn len(&self) -> usize {
        match self {
            Params::Positional(v) => v.len(),
            Params::Named(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A SQL template with `%s` / `%(name)s` placeholders and the values that fill them.
///
/// This is the unit every [`Executor`](crate::Executor) receives. The same template drives
/// the printed statement ([`CompiledQuery::render`]) and the executed one
/// ([`CompiledQuery::to_postgres`]).
///
/// # Example
///
/// ```ignore
/// use pg_print_sql::query;
///
/// let q = query("SELECT * FROM users WHERE id = %s").bind(5);
/// assert_eq!(q.render()?, "SELECT * FROM users WHERE id = 5");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    template: String,
    params: Params,
    mixed: bool,
}

/// Start a query from a percent-style SQL template.
pub fn query(template: impl Into<String>) -> CompiledQuery {
    CompiledQuery::new(template)
}

impl CompiledQuery {
    /// Create a query with no parameters.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            params: Params::default(),
            mixed: false,
        }
    }

    /// Create a query from an already assembled template/parameter pair.
    pub fn from_parts(template: impl Into<String>, params: Params) -> Self {
        Self {
            template: template.into(),
            params,
            mixed: false,
        }
    }

    /// Bind the next positional parameter.
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        match &mut self.params {
            Params::Positional(values) => values.push(value.into()),
            Params::Named(_) => self.mixed = true,
        }
        self
    }

    /// Bind a named parameter.
    ///
    /// The first named bind turns an empty positional list into a mapping; binding a name
    /// after positional values makes the query fail to render.
    pub fn bind_named(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        if let Params::Positional(values) = &self.params {
            if values.is_empty() {
                self.params = Params::Named(BTreeMap::new());
            } else {
                self.mixed = true;
                return self;
            }
        }
        if let Params::Named(map) = &mut self.params {
            map.insert(name.into(), value.into());
        }
        self
    }

    /// The template/parameter pair.
    pub fn as_sql(&self) -> (&str, &Params) {
        (&self.template, &self.params)
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Inline the parameters into the template, producing a literal statement for display.
    pub fn render(&self) -> Result<String, SubstitutionError> {
        self.check_mixed()?;
        render::substitute(&self.template, &self.params)
    }

    /// Translate the template to `$N` placeholders and return the values in bind order.
    pub fn to_postgres(&self) -> Result<(String, Vec<&SqlValue>), SubstitutionError> {
        self.check_mixed()?;
        render::number_placeholders(&self.template, &self.params)
    }

    fn check_mixed(&self) -> Result<(), SubstitutionError> {
        if !self.mixed {
            return Ok(());
        }
        Err(match self.params {
            Params::Positional(_) => SubstitutionError::RequiresMapping,
            Params::Named(_) => SubstitutionError::PositionalWithMapping,
        })
    }
}
