//! Instances and their targets.

use crate::ids::{BundleInstId, ExternalModuleId, ModuleId, SignalId};
use crate::primitive::PrimitiveKind;
use indexmap::IndexMap;
use weft_common::Ident;
use weft_params::ParamClass;

/// A primitive together with its parameter values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimitiveCall {
    /// Which primitive.
    pub kind: PrimitiveKind,
    /// Validated parameters of the primitive's schema.
    pub params: ParamClass,
}

/// An external module together with its parameter values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalCall {
    /// Which external module.
    pub module: ExternalModuleId,
    /// Parameter values passed through to the external definition.
    pub params: ParamClass,
}

/// What an [`Instance`] instantiates.
///
/// Generator results are plain modules and use [`Target::Module`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A module in the same design.
    Module(ModuleId),
    /// A technology-independent leaf.
    Primitive(PrimitiveCall),
    /// An externally defined leaf.
    External(ExternalCall),
}

impl Target {
    /// Returns `true` for leaf targets (primitives and external modules).
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Target::Module(_))
    }
}

impl From<ModuleId> for Target {
    fn from(value: ModuleId) -> Self {
        Target::Module(value)
    }
}

impl From<PrimitiveCall> for Target {
    fn from(value: PrimitiveCall) -> Self {
        Target::Primitive(value)
    }
}

impl From<ExternalCall> for Target {
    fn from(value: ExternalCall) -> Self {
        Target::External(value)
    }
}

/// Something in the enclosing module an instance port is connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connection {
    /// A signal or port.
    Signal(SignalId),
    /// A typed or anonymous bundle instance.
    Bundle(BundleInstId),
}

/// A named placement of a target inside a module.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Instance name, unique in the module namespace.
    pub name: Ident,
    /// What is instantiated.
    pub target: Target,
    /// Connections keyed by the target's port names, in connection order.
    pub conns: IndexMap<Ident, Connection>,
    /// Signal-level connections keyed by the target's flattened port names.
    /// Filled in when the enclosing module is frozen.
    pub resolved: IndexMap<Ident, SignalId>,
}

impl Instance {
    /// Creates an unconnected instance.
    pub fn new(name: Ident, target: Target) -> Self {
        Instance {
            name,
            target,
            conns: IndexMap::new(),
            resolved: IndexMap::new(),
        }
    }
}
