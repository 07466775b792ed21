//! SQL-literal rendering of values, used when bound operations are displayed.

use core::fmt::{self, Display, Write};

use super::Value;

impl Display for Value {
    /// Renders the literal SQLite would store for this value once bound.
    ///
    /// Reals always carry a fraction or exponent so they read back as REAL;
    /// NaN binds as NULL and is rendered as such.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) if v.is_nan() => f.write_str("NULL"),
            Value::Real(v) if v.is_infinite() => {
                f.write_str(if v.is_sign_positive() { "9e999" } else { "-9e999" })
            }
            Value::Real(v) => write!(f, "{v:?}"),
            Value::Text(text) => {
                f.write_char('\'')?;
                for (i, part) in text.split('\'').enumerate() {
                    if i > 0 {
                        f.write_str("''")?;
                    }
                    f.write_str(part)?;
                }
                f.write_char('\'')
            }
            Value::Blob(bytes) => {
                f.write_str("X'")?;
                bytes.iter().try_for_each(|byte| write!(f, "{byte:02X}"))?;
                f.write_char('\'')
            }
        }
    }
}
