//! Elaboration error taxonomy and diagnostic codes.
//!
//! Codes `E300`--`E316` are stable across releases. Every variant carries the
//! dot-joined hierarchical path (module, then instance or signal) of the
//! offending entity where one exists.

use weft_ir::IrError;
use weft_params::ParamError;

/// Errors raised while building, elaborating or freezing modules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElabError {
    /// Parameter construction or validation failed.
    #[error(transparent)]
    ParamValidation(#[from] ParamError),

    /// A connected signal's width differs from the target port's width.
    #[error("width mismatch at {path}: port '{port}' is {expected} bits but '{signal}' is {got}")]
    WidthMismatch {
        /// `Module.instance`.
        path: String,
        /// Flattened target port name.
        port: String,
        /// Connected signal name.
        signal: String,
        /// Target port width.
        expected: u32,
        /// Connected signal width.
        got: u32,
    },

    /// A net has more than one driver.
    #[error("multiple drivers on {path}: {}", drivers.join(", "))]
    DirectionConflict {
        /// `Module.signal`.
        path: String,
        /// Every driver found, in discovery order.
        drivers: Vec<String>,
    },

    /// A connection names a port the target does not have.
    #[error("unknown port '{port}' on {path} (target '{target}')")]
    UnknownPort {
        /// `Module.instance`.
        path: String,
        /// Target name.
        target: String,
        /// The unknown port.
        port: String,
    },

    /// A target port was never connected.
    #[error("unconnected port '{port}' on instance {path}")]
    UnconnectedPort {
        /// `Module.instance`.
        path: String,
        /// The missing port.
        port: String,
    },

    /// A generator transitively called itself with equal parameters.
    #[error("recursive generator call: {}", cycle.join(" -> "))]
    RecursiveGenerator {
        /// Generator calls forming the cycle, ending with the repeated one.
        cycle: Vec<String>,
    },

    /// A role-based bundle was exposed without a usable role.
    #[error("bundle {path} of type '{bundle}': {reason}")]
    BundleRole {
        /// `Module.bundle`, or the bundle type for declaration errors.
        path: String,
        /// Bundle type name.
        bundle: String,
        /// What was wrong with the role.
        reason: String,
    },

    /// An explicit-direction bundle port contains an undirected member.
    #[error("bundle port {path}: member '{signal}' has no direction")]
    BundleDirection {
        /// `Module.bundle`.
        path: String,
        /// Relative member path.
        signal: String,
    },

    /// A name is already taken in a namespace.
    #[error("duplicate name '{name}' in {path}")]
    DuplicateName {
        /// The namespace owner.
        path: String,
        /// The repeated name.
        name: String,
    },

    /// A name lookup found nothing.
    #[error("unresolved reference '{name}' in {path}")]
    UnresolvedReference {
        /// The namespace searched.
        path: String,
        /// The missing name.
        name: String,
    },

    /// A module instantiates itself, directly or indirectly.
    #[error("circular instantiation: {}", cycle.join(" -> "))]
    CircularInstance {
        /// Module names forming the cycle.
        cycle: Vec<String>,
    },

    /// A handle from one module was used inside another.
    #[error("{path}: handle belongs to module '{owner}'")]
    ForeignHandle {
        /// Where the handle was used.
        path: String,
        /// The module owning the handle.
        owner: String,
    },

    /// Structural mutation of a frozen module.
    #[error("module '{module}' is frozen")]
    Frozen {
        /// The frozen module.
        module: String,
    },

    /// Parameters do not belong to the target's schema.
    #[error("{path}: parameters for '{target}' {reason}")]
    WrongTargetParams {
        /// Where the target was used.
        path: String,
        /// Target name.
        target: String,
        /// Mismatch description.
        reason: String,
    },

    /// A bundle connection lacks a member the target port needs.
    #[error("{path}: bundle connected to port '{port}' has no member '{member}'")]
    MissingBundleSignal {
        /// `Module.instance`.
        path: String,
        /// Target bundle port.
        port: String,
        /// Missing relative member path.
        member: String,
    },

    /// A signal connected to a bundle port, or a bundle to a scalar port.
    #[error("{path}: port '{port}' expects a {expected}")]
    PortKindMismatch {
        /// `Module.instance`.
        path: String,
        /// Target port.
        port: String,
        /// `"signal"` or `"bundle"`.
        expected: &'static str,
    },

    /// A typed bundle connected to a bundle port of another type.
    #[error("{path}: port '{port}' expects bundle '{expected}', got '{got}'")]
    BundleTypeMismatch {
        /// `Module.instance`.
        path: String,
        /// Target port.
        port: String,
        /// The port's bundle type.
        expected: String,
        /// The connected bundle's type.
        got: String,
    },

    /// A signal or port of width zero.
    #[error("{path} has zero width")]
    ZeroWidth {
        /// `Module.signal`.
        path: String,
    },
}

impl ElabError {
    /// The stable diagnostic code of this error.
    pub fn code(&self) -> &'static str {
        match self {
            ElabError::ParamValidation(_) => "E300",
            ElabError::WidthMismatch { .. } => "E301",
            ElabError::DirectionConflict { .. } => "E302",
            ElabError::UnknownPort { .. } => "E303",
            ElabError::UnconnectedPort { .. } => "E304",
            ElabError::RecursiveGenerator { .. } => "E305",
            ElabError::BundleRole { .. } => "E306",
            ElabError::BundleDirection { .. } => "E307",
            ElabError::DuplicateName { .. } => "E308",
            ElabError::UnresolvedReference { .. } => "E309",
            ElabError::CircularInstance { .. } => "E310",
            ElabError::ForeignHandle { .. } => "E311",
            ElabError::Frozen { .. } => "E312",
            ElabError::WrongTargetParams { .. } => "E313",
            ElabError::MissingBundleSignal { .. } => "E314",
            ElabError::PortKindMismatch { .. } => "E315",
            ElabError::ZeroWidth { .. } => "E316",
            ElabError::BundleTypeMismatch { .. } => "E317",
        }
    }
}

impl From<IrError> for ElabError {
    fn from(err: IrError) -> Self {
        match err {
            IrError::DuplicateMember { owner, member } => ElabError::DuplicateName {
                path: owner,
                name: member,
            },
            IrError::UnknownRole { bundle, role } => ElabError::BundleRole {
                path: bundle.clone(),
                bundle,
                reason: format!("no role '{role}'"),
            },
            IrError::ZeroWidth { owner, name } => ElabError::ZeroWidth {
                path: format!("{owner}.{name}"),
            },
            IrError::ConflictingExternal { domain, name } => ElabError::DuplicateName {
                path: domain,
                name,
            },
        }
    }
}
