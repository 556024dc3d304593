//! Conversion of parameter records to and from plain ordered mappings.

use crate::class::ParamClass;
use crate::dtype::Dtype;
use crate::error::{ParamError, ValidationKind};
use crate::schema::ParamSchema;
use crate::value::ParamValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use weft_common::Scalar;

/// A plain ordered mapping from field names to values.
pub type ParamMap = IndexMap<String, MapValue>;

/// A schema-free value inside a [`ParamMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapValue {
    /// Absent optional value.
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
    /// A sequence.
    List(Vec<MapValue>),
    /// A nested record.
    Map(ParamMap),
}

impl MapValue {
    fn from_value(value: &ParamValue) -> Self {
        match value {
            ParamValue::None => MapValue::None,
            ParamValue::Bool(b) => MapValue::Bool(*b),
            ParamValue::Int(i) => MapValue::Int(*i),
            ParamValue::Str(s) => MapValue::Str(s.clone()),
            ParamValue::Scalar(s) => MapValue::Scalar(s.clone()),
            ParamValue::Enum(s) => MapValue::Enum(s.clone()),
            ParamValue::List(items) => MapValue::List(items.iter().map(MapValue::from_value).collect()),
            ParamValue::Class(c) => MapValue::Map(c.to_mapping()),
        }
    }

    /// Converts a mapping value back, guided by the declared field type.
    ///
    /// Returns `Ok(None)` when the shape of the value cannot fit `dtype`.
    fn to_value(&self, dtype: &Dtype) -> Result<Option<ParamValue>, ParamError> {
        let value = match (dtype, self) {
            (Dtype::Class(schema), MapValue::Map(map)) => {
                ParamValue::Class(ParamClass::from_mapping(schema, map)?)
            }
            (Dtype::Optional(_), MapValue::None) => ParamValue::None,
            (Dtype::Optional(inner), other) => return other.to_value(inner),
            (Dtype::List(inner), MapValue::List(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item.to_value(inner)? {
                        Some(v) => out.push(v),
                        None => return Ok(None),
                    }
                }
                ParamValue::list(out)
            }
            (_, MapValue::None) => ParamValue::None,
            (_, MapValue::Bool(b)) => ParamValue::Bool(*b),
            (_, MapValue::Int(i)) => ParamValue::Int(*i),
            (_, MapValue::Str(s)) => ParamValue::Str(s.clone()),
            (_, MapValue::Scalar(s)) => ParamValue::Scalar(s.clone()),
            (_, MapValue::Enum(s)) => ParamValue::Enum(s.clone()),
            (_, MapValue::List(_) | MapValue::Map(_)) => return Ok(None),
        };
        Ok(Some(value))
    }
}

impl ParamClass {
    /// Converts this record, recursively, into a plain ordered mapping.
    pub fn to_mapping(&self) -> ParamMap {
        self.iter()
            .map(|(k, v)| (k.to_string(), MapValue::from_value(v)))
            .collect()
    }

    /// Rebuilds a record of `schema` from a plain mapping.
    ///
    /// Applies the same validation as [`ParamClass::new`], recursing into
    /// nested record fields.
    pub fn from_mapping(schema: &Arc<ParamSchema>, map: &ParamMap) -> Result<Self, ParamError> {
        let mut slots = vec![None; schema.len()];
        for (name, raw) in map {
            let (index, field) = schema
                .field(name)
                .ok_or_else(|| schema.error(ValidationKind::UnknownField(name.clone())))?;
            let value = raw.to_value(&field.dtype)?.ok_or_else(|| {
                schema.error(ValidationKind::TypeMismatch {
                    field: field.name.clone(),
                    expected: field.dtype.to_string(),
                    got: format!("{raw:?}"),
                })
            })?;
            slots[index] = Some(schema.check(index, value)?);
        }
        ParamClass::fill(schema, slots)
    }
}

impl ParamSchema {
    /// Infers a schema under which `map` is valid, for records whose
    /// declaring schema is unavailable (such as imported external-module
    /// parameters).
    ///
    /// Every field becomes required. Enumerations admit only the variant
    /// present, absent values become optional text, and list element types
    /// follow the first element.
    pub fn infer(name: &str, map: &ParamMap) -> Result<Arc<ParamSchema>, ParamError> {
        let mut builder = ParamSchema::builder(name);
        for (field, value) in map {
            builder = builder.required(field, infer_dtype(field, value)?, "");
        }
        builder.build()
    }
}

fn infer_dtype(field: &str, value: &MapValue) -> Result<Dtype, ParamError> {
    Ok(match value {
        MapValue::None => Dtype::optional(Dtype::Str),
        MapValue::Bool(_) => Dtype::Bool,
        MapValue::Int(_) => Dtype::Int,
        MapValue::Str(_) => Dtype::Str,
        MapValue::Scalar(_) => Dtype::Scalar,
        MapValue::Enum(v) => Dtype::enumeration(field, [v.as_str()]),
        MapValue::List(items) => Dtype::list(match items.first() {
            Some(first) => infer_dtype(field, first)?,
            None => Dtype::Str,
        }),
        MapValue::Map(inner) => Dtype::Class(ParamSchema::infer(field, inner)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_common::Prefix;

    fn inner() -> Arc<ParamSchema> {
        ParamSchema::builder("Inner")
            .required("w", Dtype::Scalar, "Width")
            .optional("tp", Dtype::enumeration("Tp", ["N", "P"]), "Type", "N")
            .build()
            .unwrap()
    }

    fn outer() -> Arc<ParamSchema> {
        ParamSchema::builder("Outer")
            .required("inner", Dtype::Class(inner()), "Nested")
            .optional("taps", Dtype::list(Dtype::Int), "Taps", vec![ParamValue::Int(1)])
            .optional("note", Dtype::optional(Dtype::Str), "Note", ParamValue::None)
            .build()
            .unwrap()
    }

    fn sample() -> ParamClass {
        let i = ParamClass::new(&inner(), [("w", (3 * Prefix::Micro).into()), ("tp", "P".into())]).unwrap();
        ParamClass::new(
            &outer(),
            [
                ("inner", i.into()),
                ("taps", vec![ParamValue::Int(2), ParamValue::Int(5)].into()),
                ("note", "hi".into()),
            ],
        )
        .unwrap()
    }

    #[test]
    fn nested_roundtrip() {
        let p = sample();
        let map = p.to_mapping();
        assert!(matches!(map["inner"], MapValue::Map(_)));
        assert_eq!(ParamClass::from_mapping(&outer(), &map).unwrap(), p);
    }

    #[test]
    fn roundtrip_through_json() {
        let p = sample();
        let json = serde_json::to_string(&p.to_mapping()).unwrap();
        let map: ParamMap = serde_json::from_str(&json).unwrap();
        assert_eq!(ParamClass::from_mapping(&outer(), &map).unwrap(), p);
    }

    #[test]
    fn mapping_preserves_order() {
        let keys: Vec<_> = sample().to_mapping().keys().cloned().collect();
        assert_eq!(keys, ["inner", "taps", "note"]);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let mut map = sample().to_mapping();
        map.insert("inner".into(), MapValue::Int(3));
        let err = ParamClass::from_mapping(&outer(), &map).unwrap_err();
        assert!(matches!(err.kind(), ValidationKind::TypeMismatch { field, .. } if field == "inner"));
    }

    #[test]
    fn inferred_schema_accepts_its_mapping() {
        let map = sample().to_mapping();
        let schema = ParamSchema::infer("Guess", &map).unwrap();
        assert_eq!(schema.len(), 3);
        let back = ParamClass::from_mapping(&schema, &map).unwrap();
        assert_eq!(back.to_mapping(), map);
    }
}
