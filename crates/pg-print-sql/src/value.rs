//! Bindable parameter values.
//!
//! [`SqlValue`] is what a [`CompiledQuery`](crate::CompiledQuery) carries next to its template.
//! It renders as a SQL literal for display and encodes through `ToSql` for execution, so the
//! statement that gets printed is the statement that gets run.

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A single query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`
    Null,
    /// `boolean`
    Bool(bool),
    /// Any integer column (`int2`, `int4`, `int8`, `oid`)
    Int(i64),
    /// `float8`, or `float4` when the column is one
    Float(f64),
    /// `float4`, or `float8` when the column is one
    Float4(f32),
    /// Text-like columns
    Text(String),
    /// `bytea`
    Bytes(Vec<u8>),
    /// `json` / `jsonb`
    Json(serde_json::Value),
    /// `uuid`
    Uuid(uuid::Uuid),
    /// `timestamptz`
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Short name of the variant, used in encoding errors.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::Float(_) | SqlValue::Float4(_) => "float",
            SqlValue::Text(_) => "text",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Json(_) => "json",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Timestamp(_) => "timestamp",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for part in s.split_inclusive('\'') {
        f.write_str(part)?;
        if part.ends_with('\'') {
            f.write_str("'")?;
        }
    }
    f.write_str("'")
}

fn write_float<F>(f: &mut fmt::Formatter<'_>, x: F) -> fmt::Result
where
    F: fmt::Display + Into<f64> + Copy,
{
    let wide: f64 = x.into();
    if wide.is_nan() {
        f.write_str("'NaN'")
    } else if wide.is_infinite() {
        f.write_str(if wide > 0.0 { "'Infinity'" } else { "'-Infinity'" })
    } else {
        write!(f, "{x}")
    }
}

/// Renders the value as a SQL literal.
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(true) => f.write_str("TRUE"),
            SqlValue::Bool(false) => f.write_str("FALSE"),
            SqlValue::Int(n) => write!(f, "{n}"),
            SqlValue::Float(x) => write_float(f, *x),
            SqlValue::Float4(x) => write_float(f, *x),
            SqlValue::Text(s) => write_quoted(f, s),
            SqlValue::Bytes(b) => {
                f.write_str("'\\x")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("'")
            }
            SqlValue::Json(v) => write_quoted(f, &v.to_string()),
            SqlValue::Uuid(u) => write!(f, "'{u}'"),
            SqlValue::Timestamp(ts) => write!(f, "'{}'", ts.to_rfc3339()),
        }
    }
}

fn encode<T: ToSql>(
    value: T,
    kind: &str,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if !T::accepts(ty) {
        return Err(format!("cannot encode {kind} parameter as Postgres type {ty}").into());
    }
    value.to_sql(ty, out)
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        let kind = self.kind();
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => encode(*v, kind, ty, out),
            // Narrow to the column width; out-of-range values are an error, not a wrap.
            SqlValue::Int(v) => match *ty {
                Type::INT2 => encode(i16::try_from(*v)?, kind, ty, out),
                Type::INT4 => encode(i32::try_from(*v)?, kind, ty, out),
                Type::OID => encode(u32::try_from(*v)?, kind, ty, out),
                _ => encode(*v, kind, ty, out),
            },
            SqlValue::Float(v) => match *ty {
                Type::FLOAT4 => encode(*v as f32, kind, ty, out),
                _ => encode(*v, kind, ty, out),
            },
            SqlValue::Float4(v) => match *ty {
                Type::FLOAT8 => encode(f64::from(*v), kind, ty, out),
                _ => encode(*v, kind, ty, out),
            },
            SqlValue::Text(v) => encode(v.as_str(), kind, ty, out),
            SqlValue::Bytes(v) => encode(v.as_slice(), kind, ty, out),
            SqlValue::Json(v) => encode(v, kind, ty, out),
            SqlValue::Uuid(v) => encode(*v, kind, ty, out),
            SqlValue::Timestamp(v) => encode(*v, kind, ty, out),
        }
    }

    // Per-variant checks happen in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(v: $ty) -> Self {
                    SqlValue::$variant((v $(as $cast)?).into())
                }
            }
        )*
    };
}

impl_from!(
    bool => Bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int,
    u8 => Int as i64,
    u16 => Int as i64,
    u32 => Int as i64,
    f32 => Float4,
    f64 => Float,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    serde_json::Value => Json,
    uuid::Uuid => Uuid,
    DateTime<Utc> => Timestamp,
);

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}
