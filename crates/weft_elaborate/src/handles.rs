//! Module-qualified handles returned by the building API.
//!
//! Every handle records the module it belongs to, so that using it inside a
//! different module is caught instead of silently aliasing another signal.

use weft_ir::{BundleInstId, Connection, InstanceId, ModuleId, SignalId};

/// A signal or port of a specific module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalRef {
    /// Owning module.
    pub module: ModuleId,
    /// Signal within that module.
    pub id: SignalId,
}

/// An instance in a specific module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceRef {
    /// Owning module.
    pub module: ModuleId,
    /// Instance within that module.
    pub id: InstanceId,
}

/// A bundle instance in a specific module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BundleRef {
    /// Owning module.
    pub module: ModuleId,
    /// Bundle instance within that module.
    pub id: BundleInstId,
}

/// Anything an instance port can be connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connectable {
    /// A signal or port.
    Signal(SignalRef),
    /// A bundle instance.
    Bundle(BundleRef),
}

impl Connectable {
    /// The module owning the connected entity.
    pub fn module(&self) -> ModuleId {
        match self {
            Connectable::Signal(s) => s.module,
            Connectable::Bundle(b) => b.module,
        }
    }

    /// The module-local connection.
    pub fn local(&self) -> Connection {
        match self {
            Connectable::Signal(s) => Connection::Signal(s.id),
            Connectable::Bundle(b) => Connection::Bundle(b.id),
        }
    }
}

impl From<SignalRef> for Connectable {
    fn from(value: SignalRef) -> Self {
        Connectable::Signal(value)
    }
}

impl From<BundleRef> for Connectable {
    fn from(value: BundleRef) -> Self {
        Connectable::Bundle(value)
    }
}
