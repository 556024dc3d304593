//! Declared parameter field types.

use crate::schema::ParamSchema;
use crate::value::ParamValue;
use std::fmt;
use std::sync::Arc;
use weft_common::Scalar;

/// The declared type of a parameter field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dtype {
    /// A boolean flag.
    Bool,
    /// A signed integer.
    Int,
    /// Free-form text.
    Str,
    /// A [`Scalar`]; ints, floats and parsable strings convert into it.
    Scalar,
    /// One of a fixed set of named variants.
    Enum {
        /// Name of the enumeration.
        name: String,
        /// Allowed variant names, in declaration order.
        variants: Arc<[String]>,
    },
    /// Either the inner type or [`ParamValue::None`].
    Optional(Box<Dtype>),
    /// An immutable sequence of the inner type.
    List(Box<Dtype>),
    /// A nested parameter record.
    Class(Arc<ParamSchema>),
}

impl Dtype {
    /// Builds an enumeration type from its variant names.
    pub fn enumeration<I, S>(name: &str, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Dtype::Enum {
            name: name.to_string(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Wraps `inner` as optional.
    pub fn optional(inner: Dtype) -> Self {
        Dtype::Optional(Box::new(inner))
    }

    /// Wraps `inner` as a list element type.
    pub fn list(inner: Dtype) -> Self {
        Dtype::List(Box::new(inner))
    }

    /// Converts and checks `value` against this type.
    ///
    /// Applies the scalar conversion chain (ints and strings into
    /// [`Scalar`]) and plain strings into enum variants. Returns the
    /// canonical value, or `None` if it is incompatible.
    pub fn coerce(&self, value: ParamValue) -> Option<ParamValue> {
        match (self, value) {
            (Dtype::Bool, v @ ParamValue::Bool(_)) => Some(v),
            (Dtype::Int, v @ ParamValue::Int(_)) => Some(v),
            (Dtype::Str, v @ ParamValue::Str(_)) => Some(v),
            (Dtype::Scalar, v @ ParamValue::Scalar(_)) => Some(v),
            (Dtype::Scalar, ParamValue::Int(i)) => Some(ParamValue::Scalar(Scalar::from(i))),
            (Dtype::Scalar, ParamValue::Str(s)) => {
                Some(ParamValue::Scalar(Scalar::from_str_lossy(&s)))
            }
            (Dtype::Enum { variants, .. }, ParamValue::Enum(v) | ParamValue::Str(v)) => {
                variants.contains(&v).then_some(ParamValue::Enum(v))
            }
            (Dtype::Optional(_), ParamValue::None) => Some(ParamValue::None),
            (Dtype::Optional(inner), v) => inner.coerce(v),
            (Dtype::List(inner), ParamValue::List(items)) => items
                .iter()
                .cloned()
                .map(|item| inner.coerce(item))
                .collect::<Option<Vec<_>>>()
                .map(ParamValue::list),
            (Dtype::Class(schema), ParamValue::Class(c)) => {
                (c.schema() == schema).then_some(ParamValue::Class(c))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtype::Bool => write!(f, "bool"),
            Dtype::Int => write!(f, "int"),
            Dtype::Str => write!(f, "str"),
            Dtype::Scalar => write!(f, "scalar"),
            Dtype::Enum { name, .. } => write!(f, "enum {name}"),
            Dtype::Optional(inner) => write!(f, "optional {inner}"),
            Dtype::List(inner) => write!(f, "list of {inner}"),
            Dtype::Class(schema) => write!(f, "{}", schema.name()),
        }
    }
}
