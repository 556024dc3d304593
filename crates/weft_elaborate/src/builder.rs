//! The module-building API.
//!
//! Modules are built in two phases: declare signals, ports and instances,
//! then wire them. Connections may be given at instantiation ("call style",
//! [`Context::instance_with`]) or later, one port at a time ("assignment
//! style", [`Context::connect`]); both write the same per-instance map.
//! Reconnecting a port replaces the earlier connection.

use crate::context::Context;
use crate::errors::ElabError;
use crate::handles::{BundleRef, Connectable, InstanceRef, SignalRef};
use tracing::{debug, trace};
use weft_ir::{
    Direction, ExternalCall, ExternalModule, ExternalModuleId, Instance, Module, ModuleId,
    PortEntry, Signal, SignalKind, Slot, Target, TargetPortKind,
};
use weft_params::{ParamClass, ParamValue};

impl Context {
    /// Creates an empty, open module.
    ///
    /// Modules created while a generator runs are local to it: they are never
    /// cached and are reachable only through instances.
    pub fn module(&mut self, name: &str) -> ModuleId {
        let mut module = Module::new(self.design.intern(name));
        module.local = self.in_generator();
        let id = self.design.modules.alloc(module);
        trace!(module = name, id = id.as_raw(), "module created");
        id
    }

    /// Adds a port.
    pub fn port(
        &mut self,
        module: ModuleId,
        name: &str,
        width: u32,
        direction: Direction,
    ) -> Result<SignalRef, ElabError> {
        let id = self.add_signal(module, name, width, SignalKind::Port(direction))?;
        self.design.module_mut(module).ports.push(PortEntry::Signal(id.id));
        Ok(id)
    }

    /// Adds an input port.
    pub fn input(&mut self, module: ModuleId, name: &str, width: u32) -> Result<SignalRef, ElabError> {
        self.port(module, name, width, Direction::Input)
    }

    /// Adds an output port.
    pub fn output(&mut self, module: ModuleId, name: &str, width: u32) -> Result<SignalRef, ElabError> {
        self.port(module, name, width, Direction::Output)
    }

    /// Adds a bidirectional port.
    pub fn inout(&mut self, module: ModuleId, name: &str, width: u32) -> Result<SignalRef, ElabError> {
        self.port(module, name, width, Direction::Inout)
    }

    /// Adds an internal signal.
    pub fn signal(&mut self, module: ModuleId, name: &str, width: u32) -> Result<SignalRef, ElabError> {
        self.add_signal(module, name, width, SignalKind::Internal)
    }

    fn add_signal(
        &mut self,
        module: ModuleId,
        name: &str,
        width: u32,
        kind: SignalKind,
    ) -> Result<SignalRef, ElabError> {
        self.ensure_open(module)?;
        if width == 0 {
            return Err(ElabError::ZeroWidth {
                path: self.path(module, name),
            });
        }
        let ident = self.claim_name(module, name)?;
        let id = self.design.module_mut(module).push_signal(Signal {
            name: ident,
            width,
            kind,
            bundle: None,
        });
        Ok(SignalRef { module, id })
    }

    /// Interns `name`, failing if it is taken in `module`.
    pub(crate) fn claim_name(&self, module: ModuleId, name: &str) -> Result<weft_common::Ident, ElabError> {
        let ident = self.design.intern(name);
        if !self.design.module(module).is_free(ident) {
            return Err(ElabError::DuplicateName {
                path: self.design.module_name(module).to_string(),
                name: name.to_string(),
            });
        }
        Ok(ident)
    }

    /// Adds an unconnected instance of `target`.
    pub fn instance(
        &mut self,
        module: ModuleId,
        name: &str,
        target: impl Into<Target>,
    ) -> Result<InstanceRef, ElabError> {
        let target = target.into();
        self.ensure_open(module)?;
        self.check_target(module, name, &target)?;
        let ident = self.claim_name(module, name)?;
        let id = self
            .design
            .module_mut(module)
            .push_instance(Instance::new(ident, target));
        Ok(InstanceRef { module, id })
    }

    /// Adds an instance and connects it in one step.
    pub fn instance_with<'a, I>(
        &mut self,
        module: ModuleId,
        name: &str,
        target: impl Into<Target>,
        conns: I,
    ) -> Result<InstanceRef, ElabError>
    where
        I: IntoIterator<Item = (&'a str, Connectable)>,
    {
        let inst = self.instance(module, name, target)?;
        for (port, to) in conns {
            self.connect(inst, port, to)?;
        }
        Ok(inst)
    }

    fn check_target(&self, module: ModuleId, name: &str, target: &Target) -> Result<(), ElabError> {
        let wrong_params = |reason: String| ElabError::WrongTargetParams {
            path: self.path(module, name),
            target: self.design.target_name(target),
            reason,
        };
        match target {
            Target::Module(child) => {
                if self.design.modules.try_get(*child).is_none() {
                    return Err(ElabError::UnresolvedReference {
                        path: self.design.module_name(module).to_string(),
                        name: format!("module #{}", child.as_raw()),
                    });
                }
                if *child == module {
                    let name = self.design.module_name(module).to_string();
                    return Err(ElabError::CircularInstance {
                        cycle: vec![name.clone(), name],
                    });
                }
            }
            Target::Primitive(call) => {
                let schema = call.kind.schema()?;
                if call.params.schema() != &schema {
                    return Err(wrong_params(format!(
                        "must be '{}', got '{}'",
                        schema.name(),
                        call.params.schema().name()
                    )));
                }
            }
            Target::External(call) => {
                if let Some(schema) = &self.design.externals[call.module].schema {
                    if call.params.schema() != schema {
                        return Err(wrong_params(format!(
                            "must be '{}', got '{}'",
                            schema.name(),
                            call.params.schema().name()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Connects port `port` of `inst` to `to`, replacing any earlier connection.
    pub fn connect(
        &mut self,
        inst: InstanceRef,
        port: &str,
        to: impl Into<Connectable>,
    ) -> Result<(), ElabError> {
        let to = to.into();
        self.ensure_open(inst.module)?;
        if to.module() != inst.module {
            return Err(ElabError::ForeignHandle {
                path: self.instance_path(inst),
                owner: self.design.module_name(to.module()).to_string(),
            });
        }
        let port_name = self.design.intern(port);
        let target = &self.design.module(inst.module).instances[inst.id].target;
        let target_port = self.design.target_port(target, port_name).ok_or_else(|| {
            ElabError::UnknownPort {
                path: self.instance_path(inst),
                target: self.design.target_name(target),
                port: port.to_string(),
            }
        })?;
        match (target_port.kind, to) {
            (TargetPortKind::Signal, Connectable::Bundle(_)) => {
                return Err(ElabError::PortKindMismatch {
                    path: self.instance_path(inst),
                    port: port.to_string(),
                    expected: "signal",
                });
            }
            (TargetPortKind::Bundle, Connectable::Signal(_)) => {
                return Err(ElabError::PortKindMismatch {
                    path: self.instance_path(inst),
                    port: port.to_string(),
                    expected: "bundle",
                });
            }
            _ => {}
        }
        let conn = to.local();
        let previous = self.design.module_mut(inst.module).instances[inst.id]
            .conns
            .insert(port_name, conn);
        if previous.is_some_and(|p| p != conn) {
            debug!(instance = %self.instance_path(inst), port, "connection replaced");
        }
        Ok(())
    }

    /// Appends opaque pass-through text. Allowed on frozen modules.
    pub fn literal(&mut self, module: ModuleId, text: impl Into<String>) -> Result<(), ElabError> {
        if self.design.modules.try_get(module).is_none() {
            return Err(ElabError::UnresolvedReference {
                path: "design".to_string(),
                name: format!("module #{}", module.as_raw()),
            });
        }
        self.design.module_mut(module).literals.push(text.into());
        Ok(())
    }

    /// Registers an external module, reusing one with the same domain and name.
    pub fn external(&mut self, module: ExternalModule) -> Result<ExternalModuleId, ElabError> {
        Ok(self.design.add_external(module)?)
    }

    /// Builds a call of an external module from named parameter values.
    ///
    /// External modules without a schema take no parameters.
    pub fn external_call<'a, I>(&self, module: ExternalModuleId, values: I) -> Result<ExternalCall, ElabError>
    where
        I: IntoIterator<Item = (&'a str, ParamValue)>,
    {
        let params = match &self.design.externals[module].schema {
            Some(schema) => ParamClass::new(schema, values)?,
            None => ParamClass::new(ParamClass::none().schema(), values)?,
        };
        Ok(ExternalCall { module, params })
    }

    /// Finds a signal, port or bundle of `module` by name.
    pub fn lookup(&self, module: ModuleId, name: &str) -> Result<Connectable, ElabError> {
        let unresolved = || ElabError::UnresolvedReference {
            path: self.design.module_name(module).to_string(),
            name: name.to_string(),
        };
        let ident = self.design.interner.get(name).ok_or_else(unresolved)?;
        match self.design.module(module).lookup(ident) {
            Some(Slot::Signal(id)) => Ok(Connectable::Signal(SignalRef { module, id })),
            Some(Slot::Bundle(id)) => Ok(Connectable::Bundle(BundleRef { module, id })),
            Some(Slot::Instance(_)) | None => Err(unresolved()),
        }
    }

    /// Finds an instance of `module` by name.
    pub fn find_instance(&self, module: ModuleId, name: &str) -> Result<InstanceRef, ElabError> {
        let unresolved = || ElabError::UnresolvedReference {
            path: self.design.module_name(module).to_string(),
            name: name.to_string(),
        };
        let ident = self.design.interner.get(name).ok_or_else(unresolved)?;
        match self.design.module(module).lookup(ident) {
            Some(Slot::Instance(id)) => Ok(InstanceRef { module, id }),
            _ => Err(unresolved()),
        }
    }
}
