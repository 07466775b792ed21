//! SQL rendering of row mutation operations.

use alloc::string::String;
use core::fmt::{self, Write};

use crate::Value;

/// Quote a SQL identifier (table or column name) with double quotes.
///
/// Escapes any embedded double quotes by doubling them.
pub(crate) fn quote_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push_str("\"\"");
        } else {
            out.push(c);
        }
    }
    out.push('"');
    out
}

/// Writes `UPDATE "t" SET "a" = <p>, ... WHERE "k" = <p> AND ...`.
///
/// `param` renders the n-th (0-based) parameter; SET parameters come first,
/// followed by the restriction parameters in restriction-column order.
pub(crate) fn write_update<'a, W, P>(
    out: &mut W,
    table: &str,
    set_columns: impl IntoIterator<Item = &'a str>,
    restriction_columns: impl IntoIterator<Item = &'a str>,
    mut param: P,
) -> fmt::Result
where
    W: Write,
    P: FnMut(&mut W, usize) -> fmt::Result,
{
    write!(out, "UPDATE {} SET ", quote_identifier(table))?;

    let mut position = 0;
    for (i, column) in set_columns.into_iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write!(out, "{} = ", quote_identifier(column))?;
        param(out, position)?;
        position += 1;
    }

    out.write_str(" WHERE ")?;
    for (i, column) in restriction_columns.into_iter().enumerate() {
        if i > 0 {
            out.write_str(" AND ")?;
        }
        write!(out, "{} = ", quote_identifier(column))?;
        param(out, position)?;
        position += 1;
    }
    Ok(())
}

/// Renders numbered placeholders: `?1`, `?2`, ...
pub(crate) fn placeholder<W: Write>(out: &mut W, position: usize) -> fmt::Result {
    write!(out, "?{}", position + 1)
}

/// Renders parameters inline as SQL literals.
pub(crate) fn literal<W: Write>(
    parameters: &[Value],
) -> impl FnMut(&mut W, usize) -> fmt::Result {
    move |out: &mut W, position: usize| match parameters.get(position) {
        Some(value) => write!(out, "{value}"),
        None => out.write_str("?"),
    }
}
