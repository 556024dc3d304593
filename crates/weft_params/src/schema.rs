//! Parameter schemas: ordered, typed field declarations.

use crate::class::ParamClass;
use crate::dtype::Dtype;
use crate::error::{ParamError, ValidationKind};
use crate::value::ParamValue;
use indexmap::IndexMap;
use std::sync::Arc;

/// One declared field of a [`ParamSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Field name, unique within its schema.
    pub name: String,
    /// Declared type.
    pub dtype: Dtype,
    /// Human-readable description.
    pub desc: String,
    /// Default value; `None` marks the field as required.
    pub default: Option<ParamValue>,
}

impl Field {
    /// Returns `true` if the field has no default.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// An ordered set of typed fields describing a parameter record.
///
/// Schemas are shared behind [`Arc`] and compared structurally. Required
/// fields always precede optional ones; [`SchemaBuilder::build`] rejects
/// any other order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamSchema {
    name: String,
    fields: Vec<Field>,
}

impl ParamSchema {
    /// Starts declaring a schema called `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// A schema with no fields, for parameterless generators.
    pub fn empty(name: impl Into<String>) -> Arc<Self> {
        Arc::new(ParamSchema {
            name: name.into(),
            fields: Vec::new(),
        })
    }

    /// The schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field and its position by name.
    pub fn field(&self, name: &str) -> Option<(usize, &Field)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Field descriptions, keyed by field name.
    pub fn descriptions(&self) -> IndexMap<&str, &str> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.desc.as_str()))
            .collect()
    }

    /// Defaults of the optional fields, keyed by field name.
    pub fn defaults(&self) -> IndexMap<&str, &ParamValue> {
        self.fields
            .iter()
            .filter_map(|f| f.default.as_ref().map(|d| (f.name.as_str(), d)))
            .collect()
    }

    pub(crate) fn error(&self, kind: ValidationKind) -> ParamError {
        ParamError::new(&self.name, kind)
    }

    /// Checks and converts `value` for the field at `index`.
    pub(crate) fn check(&self, index: usize, value: ParamValue) -> Result<ParamValue, ParamError> {
        let field = &self.fields[index];
        let got = value.to_string();
        field.dtype.coerce(value).ok_or_else(|| {
            self.error(ValidationKind::TypeMismatch {
                field: field.name.clone(),
                expected: field.dtype.to_string(),
                got,
            })
        })
    }
}

/// Incremental declaration of a [`ParamSchema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Declares a required field.
    pub fn required(mut self, name: &str, dtype: Dtype, desc: &str) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            dtype,
            desc: desc.to_string(),
            default: None,
        });
        self
    }

    /// Declares an optional field with a default value.
    pub fn optional(
        mut self,
        name: &str,
        dtype: Dtype,
        desc: &str,
        default: impl Into<ParamValue>,
    ) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            dtype,
            desc: desc.to_string(),
            default: Some(default.into()),
        });
        self
    }

    /// Validates the declarations and produces the shared schema.
    ///
    /// Fails on duplicate names, a required field after an optional one, or a
    /// default that does not match its field's type. Defaults are stored in
    /// their converted form.
    pub fn build(self) -> Result<Arc<ParamSchema>, ParamError> {
        let mut schema = ParamSchema {
            name: self.name,
            fields: Vec::with_capacity(self.fields.len()),
        };
        let mut seen_optional = false;
        for mut field in self.fields {
            if schema.field(&field.name).is_some() {
                return Err(schema.error(ValidationKind::DuplicateField(field.name)));
            }
            if field.is_required() && seen_optional {
                return Err(schema.error(ValidationKind::FieldOrder(field.name)));
            }
            seen_optional |= !field.is_required();
            let default = field.default.take();
            schema.fields.push(field);
            if let Some(default) = default {
                let index = schema.fields.len() - 1;
                let checked = schema.check(index, default)?;
                schema.fields[index].default = Some(checked);
            }
        }
        Ok(Arc::new(schema))
    }
}
