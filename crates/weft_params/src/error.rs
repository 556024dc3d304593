//! Error types for parameter declaration and validation.

/// Errors raised while declaring a schema or constructing a [`crate::ParamClass`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    /// A schema declaration or field value failed validation.
    #[error("invalid parameters for '{schema}': {kind}")]
    ParamValidation {
        /// Name of the schema being declared or constructed.
        schema: String,
        /// What exactly was wrong.
        kind: ValidationKind,
    },
}

impl ParamError {
    pub(crate) fn new(schema: &str, kind: ValidationKind) -> Self {
        ParamError::ParamValidation {
            schema: schema.to_string(),
            kind,
        }
    }

    /// The specific validation failure.
    pub fn kind(&self) -> &ValidationKind {
        match self {
            ParamError::ParamValidation { kind, .. } => kind,
        }
    }
}

/// The individual ways a parameter record can be invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationKind {
    /// A required field was not supplied.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A supplied field is not declared by the schema.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A field value does not match its declared type.
    #[error("field '{field}' expects {expected}, got {got}")]
    TypeMismatch {
        /// The field name.
        field: String,
        /// Rendering of the declared type.
        expected: String,
        /// Rendering of the supplied value.
        got: String,
    },

    /// A required field was declared after an optional one.
    #[error("required field '{0}' declared after an optional field")]
    FieldOrder(String),

    /// Two fields share a name.
    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    /// An integer does not fit the 64-bit signed range of `Int` fields.
    #[error("integer {0} is out of range")]
    IntRange(String),

    /// Positional construction received the wrong number of values.
    #[error("expected at most {expected} positional values, got {got}")]
    Arity {
        /// Number of declared fields.
        expected: usize,
        /// Number of supplied values.
        got: usize,
    },
}
