//! Owner keys: the identifier of the entity owning a collection.

use alloc::vec::Vec;
use core::fmt::{self, Display};

use crate::Value;

/// Identifier of the row owning a collection, one value per owning-key column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerKey {
    values: Vec<Value>,
}

impl OwnerKey {
    /// Creates a composite owner key from its column values, in key-column order.
    #[must_use]
    pub fn composite(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// The key values, in key-column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of columns the key spans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the key has no values at all.
    ///
    /// An empty key never identifies a persisted row and is rejected by
    /// [`crate::UpdateRowsCoordinator::update_rows`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Value> for OwnerKey {
    fn from(value: Value) -> Self {
        Self {
            values: alloc::vec![value],
        }
    }
}

macro_rules! single_column_key {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for OwnerKey {
                fn from(value: $ty) -> Self {
                    Self::from(Value::from(value))
                }
            }
        )*
    };
}

single_column_key!(i64, i32, u32, &str, alloc::string::String);

impl Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.values.as_slice() {
            [single] => write!(f, "{single}"),
            values => {
                f.write_str("(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
        }
    }
}
