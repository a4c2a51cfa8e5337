//! Type-name suffix grammar: `X?` (optional), `X[]` (array), `X$` (binary extension).

use std::fmt;

/// An owned ABI type name, with helpers to inspect and peel off the
/// pseudo-type suffixes `?`, `[]`, `$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(pub String);

impl TypeName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_array(&self) -> bool {
        self.0.ends_with("[]")
    }

    pub fn is_optional(&self) -> bool {
        self.0.ends_with('?')
    }

    pub fn has_bin_extension(&self) -> bool {
        self.0.ends_with('$')
    }

    /// Strip exactly one pseudo-type suffix level, non-recursively.
    ///
    /// ```text
    /// "int8[]".fundamental_type()   == "int8"
    /// "int8[][]".fundamental_type() == "int8[]"
    /// ```
    pub fn fundamental_type(&self) -> TypeName {
        let s = &self.0;
        if let Some(stripped) = s.strip_suffix("[]") {
            TypeName::new(stripped)
        }
        else if let Some(stripped) = s.strip_suffix('?') {
            TypeName::new(stripped)
        }
        else if let Some(stripped) = s.strip_suffix('$') {
            TypeName::new(stripped)
        }
        else {
            self.clone()
        }
    }

    pub fn remove_bin_extension(&self) -> TypeName {
        match self.0.strip_suffix('$') {
            Some(stripped) => TypeName::new(stripped),
            None => self.clone(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        TypeName::new(s)
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        TypeName(s)
    }
}

impl From<&String> for TypeName {
    fn from(s: &String) -> Self {
        TypeName::new(s.as_str())
    }
}
