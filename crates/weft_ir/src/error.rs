//! Errors raised while declaring data-model definitions.

/// Errors from bundle and external-module declarations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    /// Two members of one definition share a name.
    #[error("duplicate member '{member}' in '{owner}'")]
    DuplicateMember {
        /// The bundle or external module being declared.
        owner: String,
        /// The repeated name.
        member: String,
    },

    /// A role-directed member names a role its bundle does not declare.
    #[error("bundle '{bundle}' has no role '{role}'")]
    UnknownRole {
        /// The bundle being declared.
        bundle: String,
        /// The undeclared role.
        role: String,
    },

    /// A signal or port width of zero.
    #[error("'{name}' in '{owner}' has zero width")]
    ZeroWidth {
        /// The enclosing definition.
        owner: String,
        /// The offending member.
        name: String,
    },

    /// An external module re-registered with a different interface.
    #[error("external module '{domain}:{name}' is already defined with different ports or parameters")]
    ConflictingExternal {
        /// Domain of the external module.
        domain: String,
        /// Its name.
        name: String,
    },
}
