//! Mappings from in-memory collection indexes and elements to column values.
//!
//! The differencer never compares elements with their own `PartialEq`: it asks
//! the element's [`ElementMapping`] whether two elements persist identically.
//! That is what makes converter-normalized values (e.g. trimmed text) compare
//! equal even though the in-memory values differ.

use alloc::vec::Vec;

use crate::Value;

mod basic;
mod composite;

pub use basic::{BasicElement, Direct, ListIndex, MapKey};
pub use composite::CompositeElement;

/// Converts an attribute value to its column representation.
pub trait Converter<T: ?Sized>: Send + Sync {
    /// Returns the value as it is stored in the column.
    fn to_column(&self, value: &T) -> Value;
}

impl<T: ?Sized, F> Converter<T> for F
where
    F: Fn(&T) -> Value + Send + Sync,
{
    #[inline]
    fn to_column(&self, value: &T) -> Value {
        self(value)
    }
}

/// Number of columns a mapping spans.
pub trait ColumnSpan {
    /// Number of values the mapping pushes per disassembled item.
    fn column_span(&self) -> usize;
}

/// Decomposes collection elements into value columns.
pub trait ElementMapping<E: ?Sized>: ColumnSpan + Send + Sync {
    /// Pushes the column values of `element`, in column order.
    fn disassemble(&self, element: &E, out: &mut Vec<Value>);

    /// Whether two elements have the same persisted form.
    ///
    /// The default compares the disassembled column values.
    fn is_same(&self, left: &E, right: &E) -> bool {
        let span = self.column_span();
        let mut left_values = Vec::with_capacity(span);
        let mut right_values = Vec::with_capacity(span);
        self.disassemble(left, &mut left_values);
        self.disassemble(right, &mut right_values);
        left_values == right_values
    }
}

/// Decomposes collection indexes (list positions, map keys) into index columns.
pub trait IndexMapping<K: ?Sized>: ColumnSpan + Send + Sync {
    /// Pushes the column values of `index`, in column order.
    fn disassemble(&self, index: &K, out: &mut Vec<Value>);
}

impl<M: ColumnSpan + ?Sized> ColumnSpan for &M {
    #[inline]
    fn column_span(&self) -> usize {
        M::column_span(self)
    }
}

impl<E: ?Sized, M: ElementMapping<E> + ?Sized> ElementMapping<E> for &M {
    #[inline]
    fn disassemble(&self, element: &E, out: &mut Vec<Value>) {
        M::disassemble(self, element, out);
    }

    #[inline]
    fn is_same(&self, left: &E, right: &E) -> bool {
        M::is_same(self, left, right)
    }
}
