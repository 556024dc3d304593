//! The [`Scalar`] parameter value: a prefixed number or a literal escape hatch.

use crate::prefix::{ParsePrefixedError, Prefixed};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque text passed through to downstream tools verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal(pub String);

impl Literal {
    /// Creates a literal from any string-like value.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the literal text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A dimensioned numeric quantity or an opaque literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scalar {
    /// An exact prefixed decimal.
    Prefixed(Prefixed),
    /// Unparsable text kept as-is.
    Literal(Literal),
}

impl Scalar {
    /// Parses `text` as a prefixed number, falling back to a literal.
    pub fn from_str_lossy(text: &str) -> Self {
        match text.parse::<Prefixed>() {
            Ok(p) => Scalar::Prefixed(p),
            Err(_) => Scalar::Literal(Literal::new(text)),
        }
    }

    /// Converts a float, failing only for NaN and infinities.
    pub fn try_from_f64(value: f64) -> Result<Self, ParsePrefixedError> {
        Prefixed::from_f64(value).map(Scalar::Prefixed)
    }

    /// Returns the numeric form, if any.
    pub fn as_prefixed(&self) -> Option<&Prefixed> {
        match self {
            Scalar::Prefixed(p) => Some(p),
            Scalar::Literal(_) => None,
        }
    }

    /// Returns the literal form, if any.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Scalar::Literal(l) => Some(l),
            Scalar::Prefixed(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Prefixed(p) => write!(f, "{p}"),
            Scalar::Literal(l) => write!(f, "{l}"),
        }
    }
}

impl From<Prefixed> for Scalar {
    fn from(value: Prefixed) -> Self {
        Scalar::Prefixed(value)
    }
}

impl From<Literal> for Scalar {
    fn from(value: Literal) -> Self {
        Scalar::Literal(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Prefixed(Prefixed::from_int(value))
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::from(i64::from(value))
    }
}

impl From<Decimal> for Scalar {
    fn from(value: Decimal) -> Self {
        Scalar::Prefixed(Prefixed::from(value))
    }
}

/// Non-finite floats become literals holding their text form.
impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::try_from_f64(value).unwrap_or_else(|_| Scalar::Literal(Literal::new(value.to_string())))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::from_str_lossy(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefix::Prefix;

    #[test]
    fn numbers_become_prefixed() {
        assert_eq!(Scalar::from(5), Scalar::Prefixed(Prefixed::from_int(5)));
        assert_eq!(Scalar::from(1e-9), Scalar::Prefixed(1 * Prefix::Nano));
        assert_eq!(Scalar::from(Decimal::new(25, 1)).to_string(), "2.5");
    }

    #[test]
    fn strings_parse_or_fall_back() {
        assert_eq!(Scalar::from("10k"), Scalar::Prefixed(10 * Prefix::Kilo));
        let lit = Scalar::from("w/2");
        assert_eq!(lit, Scalar::Literal(Literal::new("w/2")));
        assert!(lit.as_prefixed().is_none());
        assert_eq!(lit.as_literal().map(Literal::as_str), Some("w/2"));
    }

    #[test]
    fn non_finite_float_is_literal() {
        assert!(Scalar::try_from_f64(f64::INFINITY).is_err());
        assert!(matches!(Scalar::from(f64::NAN), Scalar::Literal(_)));
    }

    #[test]
    fn equal_values_are_equal_scalars() {
        assert_eq!(Scalar::from("1000m"), Scalar::from(1));
    }
}
