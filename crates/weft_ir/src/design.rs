//! Top-level design container.
//!
//! A [`Design`] owns every module and external-module definition created
//! during one elaboration session, together with the identifier interner.

use crate::arena::Arena;
use crate::bundle::{Bundle, BundleKind};
use crate::direction::Direction;
use crate::error::IrError;
use crate::external::ExternalModule;
use crate::ids::{ExternalModuleId, ModuleId, SignalId};
use crate::instance::Target;
use crate::module::{Module, PortEntry};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use weft_common::{Ident, Interner};

/// One flattened signal of a target port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatPort {
    /// Path relative to the port: empty for scalar ports, `inner.p` for bundles.
    pub path: String,
    /// The target-side signal name, such as `bus.inner.p`.
    pub name: Ident,
    /// Bit width.
    pub width: u32,
    /// Direction as seen from inside the target.
    pub direction: Direction,
}

/// Whether a target port is scalar or a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPortKind {
    /// A single signal.
    Signal,
    /// A bundle, connected with a bundle instance.
    Bundle,
}

/// A port of an instance target, as seen by a connecting parent.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPort {
    /// User-facing port name.
    pub name: Ident,
    /// Scalar or bundle.
    pub kind: TargetPortKind,
    /// Flattened signals; exactly one for scalar ports.
    pub flat: Vec<FlatPort>,
    /// The bundle type of a typed bundle port.
    pub of: Option<Arc<Bundle>>,
}

/// A complete hardware design.
#[derive(Debug, Default)]
pub struct Design {
    /// Interner for every name in the design.
    pub interner: Interner,
    /// All modules, keyed by [`ModuleId`].
    pub modules: Arena<ModuleId, Module>,
    /// All external module definitions.
    pub externals: Arena<ExternalModuleId, ExternalModule>,
    external_index: HashMap<(String, String), ExternalModuleId>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a name.
    pub fn intern(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    /// Resolves an interned name.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    /// Returns a module.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Returns a module mutably.
    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id]
    }

    /// Returns a module's name.
    pub fn module_name(&self, id: ModuleId) -> &str {
        self.resolve(self.modules[id].name)
    }

    /// Returns the number of modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// `Module.signal`, for diagnostics.
    pub fn signal_path(&self, module: ModuleId, signal: SignalId) -> String {
        let m = &self.modules[module];
        format!(
            "{}.{}",
            self.resolve(m.name),
            self.resolve(m.signals[signal].name)
        )
    }

    /// Registers an external module, or returns the one already registered
    /// under the same `(domain, name)` if its ports and schema are identical.
    pub fn add_external(&mut self, module: ExternalModule) -> Result<ExternalModuleId, IrError> {
        let key = (module.domain.clone(), module.name.clone());
        if let Some(&id) = self.external_index.get(&key) {
            let existing = &self.externals[id];
            if existing.ports != module.ports || existing.schema != module.schema {
                return Err(IrError::ConflictingExternal {
                    domain: module.domain,
                    name: module.name,
                });
            }
            return Ok(id);
        }
        module.validate()?;
        let id = self.externals.alloc(module);
        self.external_index.insert(key, id);
        Ok(id)
    }

    /// Finds an external module by domain and name.
    pub fn find_external(&self, domain: &str, name: &str) -> Option<ExternalModuleId> {
        self.external_index
            .get(&(domain.to_string(), name.to_string()))
            .copied()
    }

    /// The display name of an instance target.
    pub fn target_name(&self, target: &Target) -> String {
        match target {
            Target::Module(id) => self.module_name(*id).to_string(),
            Target::Primitive(call) => call.kind.name().to_string(),
            Target::External(call) => self.externals[call.module].name.clone(),
        }
    }

    /// The port interface of an instance target, in port order.
    pub fn target_ports(&self, target: &Target) -> Vec<TargetPort> {
        let scalar = |name: Ident, width: u32, direction: Direction| TargetPort {
            name,
            kind: TargetPortKind::Signal,
            flat: vec![FlatPort {
                path: String::new(),
                name,
                width,
                direction,
            }],
            of: None,
        };
        match target {
            Target::Primitive(call) => call
                .kind
                .ports()
                .iter()
                .map(|p| scalar(self.intern(p), 1, Direction::Undirected))
                .collect(),
            Target::External(call) => self.externals[call.module]
                .ports
                .iter()
                .map(|p| scalar(self.intern(&p.name), p.width, p.direction))
                .collect(),
            Target::Module(id) => {
                let m = &self.modules[*id];
                m.ports
                    .iter()
                    .map(|entry| match *entry {
                        PortEntry::Signal(s) => {
                            let sig = &m.signals[s];
                            scalar(
                                sig.name,
                                sig.width,
                                sig.direction().unwrap_or(Direction::Undirected),
                            )
                        }
                        PortEntry::Bundle(b) => {
                            let bundle = &m.bundles[b];
                            TargetPort {
                                name: bundle.name,
                                kind: TargetPortKind::Bundle,
                                flat: bundle
                                    .members
                                    .iter()
                                    .map(|(path, s)| {
                                        let sig = &m.signals[*s];
                                        FlatPort {
                                            path: path.clone(),
                                            name: sig.name,
                                            width: sig.width,
                                            direction: sig
                                                .direction()
                                                .unwrap_or(Direction::Undirected),
                                        }
                                    })
                                    .collect(),
                                of: match &bundle.kind {
                                    BundleKind::Typed { of, .. } => Some(Arc::clone(of)),
                                    BundleKind::Anon(_) => None,
                                },
                            }
                        }
                    })
                    .collect()
            }
        }
    }

    /// Finds one port of a target by name.
    pub fn target_port(&self, target: &Target, name: Ident) -> Option<TargetPort> {
        self.target_ports(target).into_iter().find(|p| p.name == name)
    }

    /// Modules reachable from `top`, children before parents, each once.
    pub fn walk_depth_first(&self, top: ModuleId) -> Vec<ModuleId> {
        fn visit(
            design: &Design,
            id: ModuleId,
            seen: &mut HashSet<ModuleId>,
            out: &mut Vec<ModuleId>,
        ) {
            if !seen.insert(id) {
                return;
            }
            for inst in design.modules[id].instances.values() {
                if let Target::Module(child) = inst.target {
                    visit(design, child, seen, out);
                }
            }
            out.push(id);
        }
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        visit(self, top, &mut seen, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::primitive::PrimitiveKind;
    use crate::signal::{Signal, SignalKind};

    fn leaf(design: &mut Design, name: &str) -> ModuleId {
        let mut m = Module::new(design.intern(name));
        let p = m.push_signal(Signal {
            name: design.intern("p"),
            width: 2,
            kind: SignalKind::Port(Direction::Output),
            bundle: None,
        });
        m.ports.push(PortEntry::Signal(p));
        design.modules.alloc(m)
    }

    #[test]
    fn walk_is_children_first_and_deduplicated() {
        let mut d = Design::new();
        let a = leaf(&mut d, "A");
        let b = leaf(&mut d, "B");
        let mut top = Module::new(d.intern("Top"));
        top.push_instance(Instance::new(d.intern("a0"), Target::Module(a)));
        top.push_instance(Instance::new(d.intern("b0"), Target::Module(b)));
        top.push_instance(Instance::new(d.intern("a1"), Target::Module(a)));
        let top = d.modules.alloc(top);
        assert_eq!(d.walk_depth_first(top), [a, b, top]);
    }

    #[test]
    fn module_target_ports() {
        let mut d = Design::new();
        let a = leaf(&mut d, "A");
        let ports = d.target_ports(&Target::Module(a));
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].kind, TargetPortKind::Signal);
        assert_eq!(ports[0].flat[0].width, 2);
        assert_eq!(ports[0].flat[0].direction, Direction::Output);
    }

    #[test]
    fn primitive_target_ports() {
        let d = Design::new();
        let call = PrimitiveKind::Mos.call([]).unwrap();
        let names: Vec<_> = d
            .target_ports(&Target::Primitive(call))
            .iter()
            .map(|p| d.resolve(p.name).to_string())
            .collect();
        assert_eq!(names, ["d", "g", "s", "b"]);
    }

    #[test]
    fn externals_are_interned_by_domain_and_name() {
        let mut d = Design::new();
        let nmos = || ExternalModule::new("pdk", "nmos").port("d", 1, Direction::Inout);
        let a = d.add_external(nmos()).unwrap();
        let b = d.add_external(nmos().desc("same device")).unwrap();
        let c = d.add_external(ExternalModule::new("other", "nmos")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(d.find_external("pdk", "nmos"), Some(a));
    }

    #[test]
    fn conflicting_external_is_rejected() {
        let mut d = Design::new();
        d.add_external(ExternalModule::new("pdk", "nmos").port("d", 1, Direction::Inout))
            .unwrap();
        let err = d
            .add_external(ExternalModule::new("pdk", "nmos").port("d", 2, Direction::Inout))
            .unwrap_err();
        assert_eq!(
            err,
            IrError::ConflictingExternal {
                domain: "pdk".into(),
                name: "nmos".into(),
            }
        );
        let schema = weft_params::ParamSchema::builder("NmosParams")
            .required("w", weft_params::Dtype::Int, "Width")
            .build()
            .unwrap();
        let with_params = ExternalModule::new("pdk", "nmos")
            .port("d", 1, Direction::Inout)
            .params(&schema);
        assert!(d.add_external(with_params).is_err());
        assert_eq!(d.externals.len(), 1);
    }
}
