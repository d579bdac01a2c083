//! Error types for pg-print-sql

use thiserror::Error;

/// Result type alias for pg-print-sql operations
pub type PrintSqlResult<T> = Result<T, PrintSqlError>;

/// Error types for instrumented query execution
#[derive(Debug, Error)]
pub enum PrintSqlError {
    /// Query execution error, passed through untouched
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// The SQL template and its parameters don't fit together
    #[error("Substitution error: {0}")]
    Substitution(#[from] SubstitutionError),

    /// Writing to the output sink (or opening its file) failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl PrintSqlError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an error from a free-form message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Check if this error came from the database
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Check if this is a substitution error
    pub fn is_substitution(&self) -> bool {
        matches!(self, Self::Substitution(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for PrintSqlError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

impl From<toml::de::Error> for PrintSqlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Failure to combine a percent-style template with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstitutionError {
    /// More `%s` placeholders than positional parameters.
    #[error("not enough arguments for format string")]
    NotEnoughArguments,

    /// Positional parameters left over after the last placeholder.
    #[error("not all arguments converted during string formatting")]
    NotAllConverted,

    /// A `%` followed by something other than `s`, `(name)s` or `%`. `index` counts
    /// characters, not bytes, from the start of the template.
    #[error("unsupported format character '{ch}' at index {index}")]
    UnsupportedFormat { ch: char, index: usize },

    /// Template ends in the middle of a placeholder.
    #[error("incomplete format")]
    Incomplete,

    /// `%(name)s` used without a mapping of parameters.
    #[error("format requires a mapping")]
    RequiresMapping,

    /// `%(name)s` names a key the mapping doesn't have.
    #[error("missing key '{0}' in parameter mapping")]
    MissingKey(String),

    /// Positional `%s` mixed with a mapping of parameters.
    #[error("positional placeholder used with a parameter mapping")]
    PositionalWithMapping,
}
