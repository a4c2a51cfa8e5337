//! A structural path into a JSON value tree / binary layout, attached to
//! every [`crate::abi::error::AbiError`] (spec.md §7). Grounded on the
//! `abi_serializer.cpp`-style error messages of the original implementation
//! (`examples/original_source/src/abieos.hpp`), which prefix decode errors
//! with the field/array/variant context they occurred under.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
    Variant(String),
    Optional,
}

/// An immutable, cheaply-extended path; each `with_*` call returns a new
/// `Path` sharing the parent's segments rather than mutating in place, so
/// the engine's frame stack can hand out a path for an error without
/// disturbing the frames still in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Self(vec![])
    }

    pub fn with_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Field(name.into()));
        Self(segments)
    }

    pub fn with_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    pub fn with_variant(&self, type_name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Variant(type_name.into()));
        Self(segments)
    }

    pub fn with_optional(&self) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Optional);
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$");
        }
        write!(f, "$")?;
        for segment in &self.0 {
            match segment {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(i) => write!(f, "[{i}]")?,
                Segment::Variant(t) => write!(f, "<{t}>")?,
                Segment::Optional => write!(f, "?")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_a_nested_path() {
        let p = Path::root().with_field("transfers").with_index(2).with_field("amount").with_variant("asset");
        assert_eq!(p.to_string(), "$.transfers[2].amount<asset>");
    }

    #[test]
    fn root_path() {
        assert_eq!(Path::root().to_string(), "$");
    }
}
