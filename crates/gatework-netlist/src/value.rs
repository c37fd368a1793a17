//! Typed scalar values for scratchpad entries and module attributes.

use serde::{Deserialize, Serialize};

/// A typed scalar stored in the design scratchpad or as a module attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Scalar {
    /// Interpret the value as a boolean.
    ///
    /// Integers are true when non-zero; text is true for `"1"` or `"true"`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::Int(i) => Some(*i != 0),
            Scalar::Text(t) => match t.as_str() {
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                _ => None,
            },
        }
    }

    /// Interpret the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Bool(b) => Some(i64::from(*b)),
            Scalar::Int(i) => Some(*i),
            Scalar::Text(t) => t.parse().ok(),
        }
    }

    /// The text payload, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<&str> for Scalar {
    fn from(t: &str) -> Self {
        Scalar::Text(t.to_string())
    }
}

impl From<String> for Scalar {
    fn from(t: String) -> Self {
        Scalar::Text(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_coercions() {
        assert_eq!(Scalar::Bool(true).as_bool(), Some(true));
        assert_eq!(Scalar::Int(0).as_bool(), Some(false));
        assert_eq!(Scalar::Int(2).as_bool(), Some(true));
        assert_eq!(Scalar::from("true").as_bool(), Some(true));
        assert_eq!(Scalar::from("maybe").as_bool(), None);
    }

    #[test]
    fn int_coercions() {
        assert_eq!(Scalar::Int(42).as_int(), Some(42));
        assert_eq!(Scalar::Bool(true).as_int(), Some(1));
        assert_eq!(Scalar::from("17").as_int(), Some(17));
        assert_eq!(Scalar::from("x").as_int(), None);
    }
}
