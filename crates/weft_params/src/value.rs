//! Runtime parameter values.

use crate::class::ParamClass;
use crate::error::{ParamError, ValidationKind};
use std::fmt;
use std::sync::Arc;
use weft_common::{Literal, Prefixed, Scalar};

/// One parameter field value.
///
/// Floats never appear directly: they are converted into [`Scalar`] on entry,
/// keeping every value `Eq + Hash`. Lists are immutable shared slices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamValue {
    /// Absent value of an optional field.
    None,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// Text.
    Str(String),
    /// A prefixed number or literal.
    Scalar(Scalar),
    /// An enumeration variant name.
    Enum(String),
    /// An immutable sequence.
    List(Arc<[ParamValue]>),
    /// A nested parameter record.
    Class(ParamClass),
}

impl ParamValue {
    /// Creates an immutable list value.
    pub fn list(items: Vec<ParamValue>) -> Self {
        ParamValue::List(items.into())
    }

    /// Returns `true` for the leaf kinds that render readably in module names.
    pub fn is_scalar_like(&self) -> bool {
        !matches!(self, ParamValue::List(_) | ParamValue::Class(_))
    }

    /// Returns the integer, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the text of a string or enum value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) | ParamValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the scalar, if this is one.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ParamValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested record, if this is one.
    pub fn as_class(&self) -> Option<&ParamClass> {
        match self {
            ParamValue::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::None => write!(f, "None"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Str(s) | ParamValue::Enum(s) => write!(f, "{s}"),
            ParamValue::Scalar(s) => write!(f, "{s}"),
            ParamValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ParamValue::Class(c) => write!(f, "{c}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl TryFrom<usize> for ParamValue {
    type Error = ParamError;

    fn try_from(value: usize) -> Result<Self, ParamError> {
        i64::try_from(value)
            .map(ParamValue::Int)
            .map_err(|_| ParamError::new("Int", ValidationKind::IntRange(value.to_string())))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Scalar(Scalar::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<Prefixed> for ParamValue {
    fn from(value: Prefixed) -> Self {
        ParamValue::Scalar(value.into())
    }
}

impl From<Literal> for ParamValue {
    fn from(value: Literal) -> Self {
        ParamValue::Scalar(value.into())
    }
}

impl From<ParamClass> for ParamValue {
    fn from(value: ParamClass) -> Self {
        ParamValue::Class(value)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(value: Vec<ParamValue>) -> Self {
        ParamValue::list(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::None, Into::into)
    }
}
