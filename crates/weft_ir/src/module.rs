//! Modules: named containers of signals, instances and bundles.

use crate::arena::Arena;
use crate::bundle::BundleInstance;
use crate::ids::{BundleInstId, InstanceId, SignalId};
use crate::instance::Instance;
use crate::signal::Signal;
use std::collections::HashMap;
use weft_common::Ident;

/// An entry in a module's namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// A signal or port.
    Signal(SignalId),
    /// An instance.
    Instance(InstanceId),
    /// A bundle instance.
    Bundle(BundleInstId),
}

/// One entry of a module's user-facing port list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortEntry {
    /// A scalar port.
    Signal(SignalId),
    /// A bundle port, flattened into signals of its own.
    Bundle(BundleInstId),
}

/// A hardware module.
///
/// Content is kept in insertion order. Once `frozen`, structural mutation is
/// rejected; literals may still be appended.
#[derive(Debug, Clone)]
pub struct Module {
    /// Module name.
    pub name: Ident,
    /// Signals and ports, including signals flattened from bundles.
    pub signals: Arena<SignalId, Signal>,
    /// Instances of other modules and leaves.
    pub instances: Arena<InstanceId, Instance>,
    /// Typed and anonymous bundle instances.
    pub bundles: Arena<BundleInstId, BundleInstance>,
    /// The boundary as declared: scalar ports and bundle ports in order.
    pub ports: Vec<PortEntry>,
    /// Opaque pass-through text.
    pub literals: Vec<String>,
    /// Defined inside a generator body rather than returned from one.
    pub local: bool,
    /// Validated and closed to structural changes.
    pub frozen: bool,
    names: HashMap<Ident, Slot>,
}

impl Module {
    /// Creates an empty, open module.
    pub fn new(name: Ident) -> Self {
        Module {
            name,
            signals: Arena::new(),
            instances: Arena::new(),
            bundles: Arena::new(),
            ports: Vec::new(),
            literals: Vec::new(),
            local: false,
            frozen: false,
            names: HashMap::new(),
        }
    }

    /// Resolves a name in this module's namespace.
    pub fn lookup(&self, name: Ident) -> Option<Slot> {
        self.names.get(&name).copied()
    }

    /// Returns `true` if `name` is not yet taken.
    pub fn is_free(&self, name: Ident) -> bool {
        !self.names.contains_key(&name)
    }

    /// Adds a signal. The caller checks the name is free.
    pub fn push_signal(&mut self, signal: Signal) -> SignalId {
        let name = signal.name;
        let id = self.signals.alloc(signal);
        self.names.insert(name, Slot::Signal(id));
        id
    }

    /// Adds an instance. The caller checks the name is free.
    pub fn push_instance(&mut self, instance: Instance) -> InstanceId {
        let name = instance.name;
        let id = self.instances.alloc(instance);
        self.names.insert(name, Slot::Instance(id));
        id
    }

    /// Adds a bundle instance. The caller checks the name is free.
    pub fn push_bundle(&mut self, bundle: BundleInstance) -> BundleInstId {
        let name = bundle.name;
        let id = self.bundles.alloc(bundle);
        self.names.insert(name, Slot::Bundle(id));
        id
    }

    /// Port signals in declaration order, bundle ports flattened in place.
    pub fn port_signals(&self) -> impl Iterator<Item = SignalId> + '_ {
        self.ports.iter().flat_map(move |entry| match entry {
            PortEntry::Signal(id) => vec![*id],
            PortEntry::Bundle(b) => self.bundles[*b].members.values().copied().collect(),
        })
    }

    /// Internal signals (not ports) in declaration order.
    pub fn internal_signals(&self) -> impl Iterator<Item = (SignalId, &Signal)> {
        self.signals.iter().filter(|(_, s)| !s.is_port())
    }

    /// Name of a port entry.
    pub fn port_name(&self, entry: PortEntry) -> Ident {
        match entry {
            PortEntry::Signal(id) => self.signals[id].name,
            PortEntry::Bundle(id) => self.bundles[id].name,
        }
    }
}
