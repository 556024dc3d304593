//! Errors raised while exporting or importing packages.

use weft_elaborate::ElabError;
use weft_params::ParamError;

/// Errors from [`crate::export`] and [`crate::import`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// Two entities share a name within one namespace.
    #[error("duplicate name '{name}' in {path}")]
    DuplicateName {
        /// The namespace: the package domain or a module name.
        path: String,
        /// The repeated name.
        name: String,
    },

    /// A record refers to a module, external, signal or top that does not exist.
    #[error("unresolved reference '{name}' in {path}")]
    UnresolvedReference {
        /// Where the reference appears.
        path: String,
        /// The missing name.
        name: String,
    },

    /// Export was asked for a module that has not been frozen.
    #[error("module '{module}' must be frozen before export")]
    NotFrozen {
        /// The open module.
        module: String,
    },

    /// Package modules instantiate each other in a cycle.
    #[error("circular instantiation involving module '{module}'")]
    CircularInstance {
        /// A module on the cycle.
        module: String,
    },

    /// The package text could not be encoded or decoded.
    #[error("malformed package: {0}")]
    Encoding(String),

    /// Imported parameters failed validation.
    #[error(transparent)]
    Params(#[from] ParamError),

    /// Rebuilding an imported module failed.
    #[error(transparent)]
    Elab(ElabError),
}

impl From<ElabError> for ExportError {
    fn from(err: ElabError) -> Self {
        match err {
            ElabError::DuplicateName { path, name } => ExportError::DuplicateName { path, name },
            ElabError::UnresolvedReference { path, name } => {
                ExportError::UnresolvedReference { path, name }
            }
            ElabError::ParamValidation(err) => ExportError::Params(err),
            other => ExportError::Elab(other),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Encoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_time_name_errors_keep_their_kind() {
        let err: ExportError = ElabError::DuplicateName {
            path: "M".into(),
            name: "x".into(),
        }
        .into();
        assert_eq!(
            err,
            ExportError::DuplicateName {
                path: "M".into(),
                name: "x".into()
            }
        );
        let err: ExportError = ElabError::Frozen { module: "M".into() }.into();
        assert!(matches!(err, ExportError::Elab(_)));
    }
}
