//! Errors raised by PDK compilation.

use weft_config::ConfigError;
use weft_elaborate::ElabError;
use weft_params::ParamError;

/// Errors from mapping primitives or validating installation data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PdkError {
    /// A primitive instance has no mapping in the target technology.
    #[error("unresolved primitive '{kind}' at {path}")]
    UnresolvedPrimitive {
        /// Primitive name.
        kind: String,
        /// `Module.instance`.
        path: String,
    },

    /// A mapping renamed a primitive port onto a port the external module lacks.
    #[error("{path}: mapping to '{target}' names unknown port '{port}'")]
    PortMap {
        /// `Module.instance`.
        path: String,
        /// External module name.
        target: String,
        /// The unknown port.
        port: String,
    },

    /// Installation data is missing or has the wrong type.
    #[error("installation for pdk '{pdk}': {reason}")]
    Installation {
        /// The PDK checking its installation.
        pdk: String,
        /// What was wrong.
        reason: String,
    },

    /// Mapped parameters failed validation.
    #[error(transparent)]
    Params(#[from] ParamError),

    /// Rebuilding or re-validating a module failed.
    #[error(transparent)]
    Elab(#[from] ElabError),
}

impl PdkError {
    /// Wraps a configuration error raised while checking `pdk`'s installation.
    pub fn installation(pdk: &str, err: ConfigError) -> Self {
        PdkError::Installation {
            pdk: pdk.to_string(),
            reason: err.to_string(),
        }
    }
}
