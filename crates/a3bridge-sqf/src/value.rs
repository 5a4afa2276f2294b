//! The dynamic value tree produced by decoding and consumed by encoding.

use std::collections::HashMap;
use std::fmt;

/// Keyed collection decoded from a pair-list literal.
pub type SqfMap = HashMap<String, SqfValue>;

/// A value that can cross the SQF text boundary.
///
/// Numbers are always floating point; the host has no separate integer
/// type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqfValue {
    /// A string literal.
    String(String),
    /// A numeric literal.
    Number(f64),
    /// `true` or `false`.
    Bool(bool),
    /// An ordered array of values.
    Array(Vec<SqfValue>),
    /// A keyed map, written to the host as a list of `[key, value]` pairs.
    Map(SqfMap),
}

impl SqfValue {
    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload, if this is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[SqfValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&SqfMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// True when this value is an array of exactly two elements.
    #[must_use]
    pub fn is_pair(&self) -> bool {
        matches!(self, Self::Array(items) if items.len() == 2)
    }

    /// Short name of the variant, used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }
}

impl fmt::Display for SqfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::encode(self))
    }
}

impl From<&str> for SqfValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for SqfValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for SqfValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for SqfValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for SqfValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for SqfValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<SqfValue>> From<Vec<T>> for SqfValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<SqfMap> for SqfValue {
    fn from(map: SqfMap) -> Self {
        Self::Map(map)
    }
}
