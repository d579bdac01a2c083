//! Percent-style placeholder handling.
//!
//! Templates use `%s` for the next positional parameter, `%(name)s` for a named one and `%%`
//! for a literal percent sign. The same scan drives both display rendering (values inlined as
//! literals) and execution (placeholders rewritten to `$1, $2, ...`).

use crate::error::SubstitutionError;
use crate::query::Params;
use crate::value::SqlValue;
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Percent,
    Positional,
    Named(&'a str),
}

fn char_index(template: &str, byte_offset: usize) -> usize {
    template[..byte_offset].chars().count()
}

fn scan(template: &str) -> Result<Vec<Piece<'_>>, SubstitutionError> {
    let mut pieces = Vec::new();
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find('%') {
        if pos > 0 {
            pieces.push(Piece::Text(&rest[..pos]));
        }
        let after = &rest[pos + 1..];
        let consumed = match after.chars().next() {
            None => return Err(SubstitutionError::Incomplete),
            Some('%') => {
                pieces.push(Piece::Percent);
                1
            }
            Some('s') => {
                pieces.push(Piece::Positional);
                1
            }
            Some('(') => {
                let close = after.find(')').ok_or(SubstitutionError::Incomplete)?;
                match after[close + 1..].chars().next() {
                    Some('s') => {}
                    Some(ch) => {
                        return Err(SubstitutionError::UnsupportedFormat {
                            ch,
                            index: char_index(template, offset + pos + 1 + close + 1),
                        });
                    }
                    None => return Err(SubstitutionError::Incomplete),
                }
                pieces.push(Piece::Named(&after[1..close]));
                close + 2
            }
            Some(ch) => {
                return Err(SubstitutionError::UnsupportedFormat {
                    ch,
                    index: char_index(template, offset + pos + 1),
                });
            }
        };
        let advance = pos + 1 + consumed;
        offset += advance;
        rest = &rest[advance..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    Ok(pieces)
}

enum Emit<'t, 'p> {
    Text(&'t str),
    Param(Option<&'t str>, &'p SqlValue),
}

/// Walks the template, emitting text runs and the value behind each placeholder.
///
/// Positional parameters must be consumed exactly; named parameters may go unused.
fn walk<'t, 'p>(
    template: &'t str,
    params: &'p Params,
    mut emit: impl FnMut(Emit<'t, 'p>),
) -> Result<(), SubstitutionError> {
    let pieces = scan(template)?;
    match params {
        Params::Positional(values) => {
            let mut values = values.iter();
            for piece in pieces {
                match piece {
                    Piece::Text(text) => emit(Emit::Text(text)),
                    Piece::Percent => emit(Emit::Text("%")),
                    Piece::Positional => {
                        let value = values.next().ok_or(SubstitutionError::NotEnoughArguments)?;
                        emit(Emit::Param(None, value));
                    }
                    Piece::Named(_) => return Err(SubstitutionError::RequiresMapping),
                }
            }
            if values.next().is_some() {
                return Err(SubstitutionError::NotAllConverted);
            }
        }
        Params::Named(map) => {
            for piece in pieces {
                match piece {
                    Piece::Text(text) => emit(Emit::Text(text)),
                    Piece::Percent => emit(Emit::Text("%")),
                    Piece::Positional => return Err(SubstitutionError::PositionalWithMapping),
                    Piece::Named(name) => {
                        let value = map
                            .get(name)
                            .ok_or_else(|| SubstitutionError::MissingKey(name.to_string()))?;
                        emit(Emit::Param(Some(name), value));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Inline every parameter into the template as a SQL literal.
pub(crate) fn substitute(template: &str, params: &Params) -> Result<String, SubstitutionError> {
    let mut out = String::with_capacity(template.len() + 16);
    walk(template, params, |emit| match emit {
        Emit::Text(text) => out.push_str(text),
        Emit::Param(_, value) => {
            let _ = write!(out, "{value}");
        }
    })?;
    Ok(out)
}

/// Rewrite placeholders to `$1, $2, ...` and collect the values in bind order.
///
/// Each distinct name gets one index, however often it appears.
pub(crate) fn number_placeholders<'p>(
    template: &str,
    params: &'p Params,
) -> Result<(String, Vec<&'p SqlValue>), SubstitutionError> {
    let mut out = String::with_capacity(template.len() + 8);
    let mut binds: Vec<&'p SqlValue> = Vec::new();
    let mut indexes: BTreeMap<&str, usize> = BTreeMap::new();
    walk(template, params, |emit| match emit {
        Emit::Text(text) => out.push_str(text),
        Emit::Param(name, value) => {
            let index = match name {
                Some(name) => *indexes.entry(name).or_insert_with(|| {
                    binds.push(value);
                    binds.len()
                }),
                None => {
                    binds.push(value);
                    binds.len()
                }
            };
            let _ = write!(out, "${index}");
        }
    })?;
    Ok((out, binds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positional(values: Vec<SqlValue>) -> Params {
        Params::Positional(values)
    }

    fn named(pairs: &[(&str, SqlValue)]) -> Params {
        Params::Named(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn substitutes_positional() {
        let sql = substitute(
            "SELECT * FROM t WHERE id = %s",
            &positional(vec![SqlValue::from(5)]),
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE id = 5");
    }

    #[test]
    fn substitutes_named_and_literal_percent() {
        let sql = substitute(
            "SELECT * FROM t WHERE name LIKE 'a%%' AND id = %(id)s OR parent = %(id)s",
            &named(&[("id", SqlValue::from(3))]),
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM t WHERE name LIKE 'a%' AND id = 3 OR parent = 3"
        );
    }

    #[test]
    fn no_placeholders_no_params() {
        assert_eq!(
            substitute("SELECT 1", &Params::default()).unwrap(),
            "SELECT 1"
        );
    }

    #[test]
    fn count_mismatch() {
        assert_eq!(
            substitute("SELECT %s, %s", &positional(vec![SqlValue::from(1)])),
            Err(SubstitutionError::NotEnoughArguments)
        );
        assert_eq!(
            substitute(
                "SELECT %s",
                &positional(vec![SqlValue::from(1), SqlValue::from(2)])
            ),
            Err(SubstitutionError::NotAllConverted)
        );
    }

    #[test]
    fn malformed_templates() {
        let none = Params::default();
        assert_eq!(
            substitute("SELECT 10 %", &none),
            Err(SubstitutionError::Incomplete)
        );
        assert_eq!(
            substitute("SELECT %(id", &none),
            Err(SubstitutionError::Incomplete)
        );
        assert_eq!(
            substitute("SELECT %d", &none),
            Err(SubstitutionError::UnsupportedFormat { ch: 'd', index: 8 })
        );
        assert_eq!(
            substitute("SELECT %(id)d", &named(&[("id", SqlValue::Null)])),
            Err(SubstitutionError::UnsupportedFormat { ch: 'd', index: 12 })
        );
    }

    #[test]
    fn unsupported_format_index_counts_characters() {
        let none = Params::default();
        assert_eq!(
            substitute("SELECT 'é' %d", &none),
            Err(SubstitutionError::UnsupportedFormat { ch: 'd', index: 12 })
        );
        assert_eq!(
            substitute("SELECT 'é' %(x)d", &named(&[("x", SqlValue::Null)])),
            Err(SubstitutionError::UnsupportedFormat { ch: 'd', index: 15 })
        );
    }

    #[test]
    fn style_mismatch() {
        assert_eq!(
            substitute("SELECT %(id)s", &positional(vec![])),
            Err(SubstitutionError::RequiresMapping)
        );
        assert_eq!(
            substitute("SELECT %s", &named(&[("id", SqlValue::Null)])),
            Err(SubstitutionError::PositionalWithMapping)
        );
        assert_eq!(
            substitute("SELECT %(nope)s", &named(&[("id", SqlValue::Null)])),
            Err(SubstitutionError::MissingKey("nope".into()))
        );
    }

    #[test]
    fn numbers_positional_placeholders() {
        let params = positional(vec![SqlValue::from("a"), SqlValue::from(2)]);
        let (sql, binds) =
            number_placeholders("UPDATE t SET name = %s WHERE id = %s AND pct > 1%%", &params)
                .unwrap();
        assert_eq!(sql, "UPDATE t SET name = $1 WHERE id = $2 AND pct > 1%");
        assert_eq!(binds, vec![&SqlValue::from("a"), &SqlValue::from(2)]);
    }

    #[test]
    fn numbers_repeated_names_once() {
        let params = named(&[("a", SqlValue::from(1)), ("b", SqlValue::from(2))]);
        let (sql, binds) =
            number_placeholders("SELECT %(b)s, %(a)s, %(b)s", &params).unwrap();
        assert_eq!(sql, "SELECT $1, $2, $1");
        assert_eq!(binds, vec![&SqlValue::from(2), &SqlValue::from(1)]);
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let sql = substitute(
            "SELECT 'héllo' || %s",
            &positional(vec![SqlValue::from("wörld")]),
        )
        .unwrap();
        assert_eq!(sql, "SELECT 'héllo' || 'wörld'");
    }
}
