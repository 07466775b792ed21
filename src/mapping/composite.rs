//! Composite (embeddable) elements flattened into several value columns.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::{self, Debug};

use super::{ColumnSpan, Converter, ElementMapping};
use crate::Value;

type Extractor<E> = Box<dyn Fn(&E, &mut Vec<Value>) + Send + Sync>;

/// An embeddable element whose attributes map to consecutive value columns.
///
/// Attributes are declared in column order. A nested embeddable contributes
/// all of its own columns at the point where it is declared, so
/// `Outer { outer_data, nested: Nested { nested_data } }` flattens to
/// `[outer_data, nested_data]`.
pub struct CompositeElement<E> {
    extractors: Vec<Extractor<E>>,
    span: usize,
}

impl<E: 'static> CompositeElement<E> {
    /// An embeddable with no attributes yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
            span: 0,
        }
    }

    /// Adds an attribute column computed from the element.
    #[must_use]
    pub fn attribute<F>(mut self, extract: F) -> Self
    where
        F: Fn(&E) -> Value + Send + Sync + 'static,
    {
        self.extractors
            .push(Box::new(move |element: &E, out: &mut Vec<Value>| {
                out.push(extract(element));
            }));
        self.span += 1;
        self
    }

    /// Adds an attribute column stored through `converter`.
    #[must_use]
    pub fn converted<T, F, C>(mut self, project: F, converter: C) -> Self
    where
        T: ?Sized,
        F: Fn(&E) -> &T + Send + Sync + 'static,
        C: Converter<T> + 'static,
    {
        self.extractors.push(Box::new(move |element: &E, out: &mut Vec<Value>| {
            out.push(converter.to_column(project(element)));
        }));
        self.span += 1;
        self
    }

    /// Flattens a nested embeddable in place.
    #[must_use]
    pub fn nested<N, F>(mut self, project: F, inner: CompositeElement<N>) -> Self
    where
        N: 'static,
        F: Fn(&E) -> &N + Send + Sync + 'static,
    {
        self.span += inner.span;
        self.extractors.push(Box::new(move |element: &E, out: &mut Vec<Value>| {
            inner.disassemble(project(element), out);
        }));
        self
    }
}

impl<E: 'static> Default for CompositeElement<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Debug for CompositeElement<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeElement")
            .field("span", &self.span)
            .finish_non_exhaustive()
    }
}

impl<E> ColumnSpan for CompositeElement<E> {
    fn column_span(&self) -> usize {
        self.span
    }
}

impl<E> ElementMapping<E> for CompositeElement<E> {
    fn disassemble(&self, element: &E, out: &mut Vec<Value>) {
        for extract in &self.extractors {
            extract(element, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use alloc::vec;

    struct Outer {
        outer_data: String,
        nested: Nested,
    }

    struct Nested {
        nested_data: String,
    }

    fn silly(value: &String) -> Value {
        Value::Text(value.to_uppercase())
    }

    fn outer_mapping() -> CompositeElement<Outer> {
        CompositeElement::new()
            .converted(|outer: &Outer| &outer.outer_data, silly)
            .nested(
                |outer: &Outer| &outer.nested,
                CompositeElement::new().converted(|nested: &Nested| &nested.nested_data, silly),
            )
    }

    fn outer(outer_data: &str, nested_data: &str) -> Outer {
        Outer {
            outer_data: outer_data.to_string(),
            nested: Nested {
                nested_data: nested_data.to_string(),
            },
        }
    }

    #[test]
    fn test_nested_embeddable_flattens_in_order() {
        let mapping = outer_mapping();
        assert_eq!(mapping.column_span(), 2);
        let mut out = Vec::new();
        mapping.disassemble(&outer("a", "b"), &mut out);
        assert_eq!(out, vec![Value::Text("A".into()), Value::Text("B".into())]);
    }

    #[test]
    fn test_composite_equality_goes_through_converters() {
        let mapping = outer_mapping();
        assert!(mapping.is_same(&outer("a", "b"), &outer("A", "B")));
        assert!(!mapping.is_same(&outer("a", "b"), &outer("a", "c")));
    }

    #[test]
    fn test_plain_attributes() {
        let mapping = CompositeElement::new()
            .attribute(|pair: &(i64, i64)| Value::Integer(pair.0))
            .attribute(|pair: &(i64, i64)| Value::Integer(pair.1));
        assert_eq!(mapping.column_span(), 2);
        let mut out = Vec::new();
        mapping.disassemble(&(1, 2), &mut out);
        assert_eq!(out, vec![Value::Integer(1), Value::Integer(2)]);
    }
}
