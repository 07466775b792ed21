//! Single-column mappings for basic elements, list positions and map keys.

use alloc::vec::Vec;

use super::{ColumnSpan, Converter, ElementMapping, IndexMapping};
use crate::Value;

/// Converter storing a value as-is through its `Into<Value>` conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Direct;

impl<T: Clone + Into<Value>> Converter<T> for Direct {
    #[inline]
    fn to_column(&self, value: &T) -> Value {
        value.clone().into()
    }
}

/// An element stored in one column, optionally through a converter.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicElement<C = Direct> {
    converter: C,
}

impl BasicElement {
    /// A basic element stored without conversion.
    #[must_use]
    pub fn direct() -> Self {
        Self { converter: Direct }
    }
}

impl<C> BasicElement<C> {
    /// A basic element stored through `converter`.
    #[must_use]
    pub fn converted(converter: C) -> Self {
        Self { converter }
    }
}

impl<C> ColumnSpan for BasicElement<C> {
    fn column_span(&self) -> usize {
        1
    }
}

impl<E: ?Sized, C: Converter<E>> ElementMapping<E> for BasicElement<C> {
    fn disassemble(&self, element: &E, out: &mut Vec<Value>) {
        out.push(self.converter.to_column(element));
    }
}

/// List positions stored in a single order column, shifted by `base`.
///
/// Lists mapped with a non-zero index base (commonly 1) store position `p`
/// as `p + base`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListIndex {
    base: i64,
}

impl ListIndex {
    /// Positions stored as-is, starting at zero.
    #[must_use]
    pub const fn zero_based() -> Self {
        Self { base: 0 }
    }

    /// Positions stored starting at `base`.
    #[must_use]
    pub const fn with_base(base: i64) -> Self {
        Self { base }
    }

    /// The configured index base.
    #[must_use]
    pub const fn base(self) -> i64 {
        self.base
    }
}

impl ColumnSpan for ListIndex {
    fn column_span(&self) -> usize {
        1
    }
}

impl IndexMapping<usize> for ListIndex {
    fn disassemble(&self, index: &usize, out: &mut Vec<Value>) {
        let position = i64::try_from(*index).map_or(i64::MAX, |p| p.saturating_add(self.base));
        out.push(Value::Integer(position));
    }
}

/// Map keys stored in a single key column, optionally through a converter.
#[derive(Debug, Default, Clone, Copy)]
pub struct MapKey<C = Direct> {
    converter: C,
}

impl MapKey {
    /// Keys stored without conversion.
    #[must_use]
    pub fn direct() -> Self {
        Self { converter: Direct }
    }
}

impl<C> MapKey<C> {
    /// Keys stored through `converter`.
    #[must_use]
    pub fn converted(converter: C) -> Self {
        Self { converter }
    }
}

impl<C> ColumnSpan for MapKey<C> {
    fn column_span(&self) -> usize {
        1
    }
}

impl<K: ?Sized, C: Converter<K>> IndexMapping<K> for MapKey<C> {
    fn disassemble(&self, index: &K, out: &mut Vec<Value>) {
        out.push(self.converter.to_column(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use alloc::vec;

    fn trimmed(value: &String) -> Value {
        Value::Text(value.trim_end().to_string())
    }

    #[test]
    fn test_direct_element() {
        let mapping = BasicElement::direct();
        let mut out = Vec::new();
        ElementMapping::<i64>::disassemble(&mapping, &7, &mut out);
        assert_eq!(out, vec![Value::Integer(7)]);
        assert!(mapping.is_same(&7i64, &7i64));
        assert!(!mapping.is_same(&7i64, &8i64));
    }

    #[test]
    fn test_converted_element_uses_persisted_equality() {
        let mapping = BasicElement::converted(trimmed);
        assert!(mapping.is_same(&"Hello".to_string(), &"Hello ".to_string()));
        assert!(!mapping.is_same(&"Hello".to_string(), &"hello".to_string()));
    }

    #[test]
    fn test_list_index_base() {
        let mut out = Vec::new();
        ListIndex::zero_based().disassemble(&3, &mut out);
        ListIndex::with_base(1).disassemble(&3, &mut out);
        assert_eq!(out, vec![Value::Integer(3), Value::Integer(4)]);
        assert_eq!(ListIndex::with_base(1).base(), 1);
    }

    #[test]
    fn test_map_key_converter() {
        let upper = |key: &str| Value::Text(key.to_uppercase());
        let mapping = MapKey::converted(upper);
        let mut out = Vec::new();
        mapping.disassemble("home", &mut out);
        assert_eq!(out, vec![Value::Text("HOME".into())]);
    }
}
