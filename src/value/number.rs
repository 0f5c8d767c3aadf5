//! Decimal-safe numbers.

use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;

/// A JSON number kept in its exact lexical form.
///
/// Backed by `serde_json::Number` built with `arbitrary_precision`, so no
/// value is ever narrowed to a fixed-width type on its way through the
/// canonical model. Equality is lexical: `1` != `1.0`.
#[derive(Clone, PartialEq, Eq)]
pub struct Number(serde_json::Number);

impl Number {
    /// Creates a number from a float; `None` for NaN and infinities.
    pub fn from_f64(n: f64) -> Option<Self> {
        serde_json::Number::from_f64(n).map(Number)
    }

    /// Parses a JSON number literal such as `-12`, `0.50` or `6.02e23`.
    pub fn from_literal(literal: &str) -> Result<Self, FormatError> {
        if literal.is_empty() || literal.trim() != literal {
            return Err(FormatError::parse(
                "number",
                format!("'{literal}' is not a number literal"),
            ));
        }
        serde_json::from_str::<serde_json::Number>(literal)
            .map(Number)
            .map_err(|e| FormatError::parse("number", format!("'{literal}': {e}")))
    }

    /// True when the literal has no fraction or exponent part.
    pub fn is_integer(&self) -> bool {
        !self.0.to_string().contains(['.', 'e', 'E'])
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.0.as_u64()
    }

    /// Lossy view as a float, for callers that accept precision loss.
    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number({})", self.0)
    }
}

impl FromStr for Number {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Number::from_literal(s)
    }
}

macro_rules! number_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Number(serde_json::Number::from(n))
                }
            }
        )*
    };
}

number_from_integer!(i32, i64, u32, u64);

impl From<serde_json::Number> for Number {
    fn from(n: serde_json::Number) -> Self {
        Number(n)
    }
}

impl From<Number> for serde_json::Number {
    fn from(n: Number) -> Self {
        n.0
    }
}
