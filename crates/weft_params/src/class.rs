//! Validated parameter records.

use crate::error::{ParamError, ValidationKind};
use crate::schema::ParamSchema;
use crate::value::ParamValue;
use std::fmt;
use std::sync::Arc;
use weft_common::ContentHash;

/// One immutable, validated value of a [`ParamSchema`].
///
/// Equality and hashing are structural: two records built separately from
/// equal inputs are interchangeable, in particular as cache keys.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ParamClass {
    schema: Arc<ParamSchema>,
    values: Arc<[ParamValue]>,
}

impl ParamClass {
    /// Constructs a record from named values.
    ///
    /// Unnamed optional fields take their defaults. Fails on unknown names,
    /// missing required fields, and values incompatible with their field type.
    pub fn new<'a, I>(schema: &Arc<ParamSchema>, values: I) -> Result<Self, ParamError>
    where
        I: IntoIterator<Item = (&'a str, ParamValue)>,
    {
        let mut slots = vec![None; schema.len()];
        for (name, value) in values {
            let (index, _) = schema
                .field(name)
                .ok_or_else(|| schema.error(ValidationKind::UnknownField(name.to_string())))?;
            slots[index] = Some(schema.check(index, value)?);
        }
        Self::fill(schema, slots)
    }

    /// Constructs a record from values in field declaration order.
    pub fn from_values(schema: &Arc<ParamSchema>, values: Vec<ParamValue>) -> Result<Self, ParamError> {
        if values.len() > schema.len() {
            return Err(schema.error(ValidationKind::Arity {
                expected: schema.len(),
                got: values.len(),
            }));
        }
        let mut slots = vec![None; schema.len()];
        for (index, value) in values.into_iter().enumerate() {
            slots[index] = Some(schema.check(index, value)?);
        }
        Self::fill(schema, slots)
    }

    /// Constructs a record entirely from defaults.
    pub fn with_defaults(schema: &Arc<ParamSchema>) -> Result<Self, ParamError> {
        Self::new(schema, [])
    }

    /// The empty record used by parameterless generators.
    pub fn none() -> Self {
        ParamClass {
            schema: ParamSchema::empty("NoParams"),
            values: Arc::new([]),
        }
    }

    pub(crate) fn fill(
        schema: &Arc<ParamSchema>,
        slots: Vec<Option<ParamValue>>,
    ) -> Result<Self, ParamError> {
        let values = slots
            .into_iter()
            .zip(schema.fields())
            .map(|(slot, field)| match slot {
                Some(v) => Ok(v),
                None => field
                    .default
                    .clone()
                    .ok_or_else(|| schema.error(ValidationKind::MissingField(field.name.clone()))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ParamClass {
            schema: Arc::clone(schema),
            values: values.into(),
        })
    }

    /// The schema this record belongs to.
    pub fn schema(&self) -> &Arc<ParamSchema> {
        &self.schema
    }

    /// Field values in declaration order.
    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    /// Looks up a field value by name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.schema.field(name).map(|(i, _)| &self.values[i])
    }

    /// Iterates over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    /// Returns a copy with field `name` replaced by `value`.
    pub fn with_field(&self, name: &str, value: impl Into<ParamValue>) -> Result<Self, ParamError> {
        let (index, _) = self
            .schema
            .field(name)
            .ok_or_else(|| self.schema.error(ValidationKind::UnknownField(name.to_string())))?;
        let mut values = self.values.to_vec();
        values[index] = self.schema.check(index, value.into())?;
        Ok(ParamClass {
            schema: Arc::clone(&self.schema),
            values: values.into(),
        })
    }

    /// A deterministic name suffix identifying this record.
    ///
    /// Records of only scalar-like fields render as `k1=v1 k2=v2` when that
    /// text is shorter than `max_readable`; anything else is summarized by
    /// the XXH3 hash of its JSON mapping. Empty records yield an empty string.
    pub fn unique_name(&self, max_readable: usize) -> String {
        if self.values.is_empty() {
            return String::new();
        }
        if self.values.iter().all(ParamValue::is_scalar_like) {
            let readable = self
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ");
            if readable.len() < max_readable {
                return readable;
            }
        }
        let json = serde_json::to_string(&self.to_mapping()).unwrap_or_else(|_| self.to_string());
        ContentHash::from_text(&json).to_string()
    }
}

impl fmt::Display for ParamClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.schema.name())?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for ParamClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.schema.name());
        for (k, v) in self.iter() {
            s.field(k, v);
        }
        s.finish()
    }
}
