//! The connectivity validator.
//!
//! [`Context::freeze`] closes a module to structural change after checking
//! that every instance port is connected with matching widths and kinds,
//! and that no signal has more than one driver. Bundle connections are
//! resolved member by member into [`weft_ir::Instance::resolved`], keyed by
//! the target's flattened signal names.

use crate::context::Context;
use crate::errors::ElabError;
use crate::handles::InstanceRef;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;
use weft_common::Ident;
use weft_ir::{
    BundleKind, Connection, Direction, InstanceId, ModuleId, SignalId, SignalKind, Target,
    TargetPortKind,
};

impl Context {
    /// Validates `module` and marks it frozen.
    ///
    /// Instantiated modules are frozen first. Freezing an already frozen
    /// module is a no-op.
    pub fn freeze(&mut self, module: ModuleId) -> Result<(), ElabError> {
        if self.design.module(module).frozen {
            return Ok(());
        }
        if let Some(pos) = self.freezing.iter().position(|m| *m == module) {
            let mut cycle: Vec<String> = self.freezing[pos..]
                .iter()
                .map(|m| self.design.module_name(*m).to_string())
                .collect();
            cycle.push(self.design.module_name(module).to_string());
            return Err(ElabError::CircularInstance { cycle });
        }

        self.freezing.push(module);
        let children = self.freeze_children(module);
        self.freezing.pop();
        children?;

        let resolved = self.resolve_connections(module)?;
        self.check_drivers(module, &resolved)?;

        let m = self.design.module_mut(module);
        for (id, conns) in resolved {
            m.instances[id].resolved = conns;
        }
        m.frozen = true;
        debug!(module = %self.design.module_name(module), "module frozen");
        Ok(())
    }

    fn freeze_children(&mut self, module: ModuleId) -> Result<(), ElabError> {
        let children: Vec<ModuleId> = self
            .design
            .module(module)
            .instances
            .values()
            .filter_map(|inst| match inst.target {
                Target::Module(child) => Some(child),
                _ => None,
            })
            .collect();
        for child in children {
            self.freeze(child)?;
        }
        Ok(())
    }

    /// Flattens every instance's connections to signal level.
    fn resolve_connections(
        &self,
        module: ModuleId,
    ) -> Result<Vec<(InstanceId, IndexMap<Ident, SignalId>)>, ElabError> {
        let m = self.design.module(module);
        let mut out = Vec::with_capacity(m.instances.len());
        for (id, inst) in m.instances.iter() {
            let at = InstanceRef { module, id };
            let mut resolved = IndexMap::new();
            for port in self.design.target_ports(&inst.target) {
                let port_name = self.design.resolve(port.name);
                let conn = inst.conns.get(&port.name).ok_or_else(|| ElabError::UnconnectedPort {
                    path: self.instance_path(at),
                    port: port_name.to_string(),
                })?;
                let kind_mismatch = |expected| ElabError::PortKindMismatch {
                    path: self.instance_path(at),
                    port: port_name.to_string(),
                    expected,
                };
                match (port.kind, *conn) {
                    (TargetPortKind::Signal, Connection::Signal(sid)) => {
                        for flat in &port.flat {
                            self.check_width(at, flat.name, flat.width, sid)?;
                            resolved.insert(flat.name, sid);
                        }
                    }
                    (TargetPortKind::Bundle, Connection::Bundle(bid)) => {
                        let connected = &m.bundles[bid];
                        if let (Some(expected), BundleKind::Typed { of: got, .. }) =
                            (&port.of, &connected.kind)
                        {
                            if !Arc::ptr_eq(expected, got) {
                                return Err(ElabError::BundleTypeMismatch {
                                    path: self.instance_path(at),
                                    port: port_name.to_string(),
                                    expected: expected.name().to_string(),
                                    got: got.name().to_string(),
                                });
                            }
                        }
                        let members = &connected.members;
                        for flat in &port.flat {
                            let sid = members.get(&flat.path).copied().ok_or_else(|| {
                                ElabError::MissingBundleSignal {
                                    path: self.instance_path(at),
                                    port: port_name.to_string(),
                                    member: flat.path.clone(),
                                }
                            })?;
                            self.check_width(at, flat.name, flat.width, sid)?;
                            resolved.insert(flat.name, sid);
                        }
                    }
                    (TargetPortKind::Signal, Connection::Bundle(_)) => {
                        return Err(kind_mismatch("signal"));
                    }
                    (TargetPortKind::Bundle, Connection::Signal(_)) => {
                        return Err(kind_mismatch("bundle"));
                    }
                }
            }
            out.push((id, resolved));
        }
        Ok(out)
    }

    fn check_width(&self, at: InstanceRef, port: Ident, expected: u32, signal: SignalId) -> Result<(), ElabError> {
        let sig = &self.design.module(at.module).signals[signal];
        if sig.width != expected {
            return Err(ElabError::WidthMismatch {
                path: self.instance_path(at),
                port: self.design.resolve(port).to_string(),
                signal: self.design.resolve(sig.name).to_string(),
                expected,
                got: sig.width,
            });
        }
        Ok(())
    }

    /// Drivers are the module's input ports and instance output ports.
    fn check_drivers(
        &self,
        module: ModuleId,
        resolved: &[(InstanceId, IndexMap<Ident, SignalId>)],
    ) -> Result<(), ElabError> {
        let m = self.design.module(module);
        let mut drivers: IndexMap<SignalId, Vec<String>> = IndexMap::new();
        for (id, sig) in m.signals.iter() {
            if sig.kind == SignalKind::Port(Direction::Input) {
                drivers
                    .entry(id)
                    .or_default()
                    .push(format!("input port {}", self.design.signal_path(module, id)));
            }
        }
        for (id, conns) in resolved {
            let inst = &m.instances[*id];
            let at = InstanceRef { module, id: *id };
            for port in self.design.target_ports(&inst.target) {
                for flat in port.flat.iter().filter(|f| f.direction == Direction::Output) {
                    if let Some(sid) = conns.get(&flat.name) {
                        drivers.entry(*sid).or_default().push(format!(
                            "{}.{}",
                            self.instance_path(at),
                            self.design.resolve(flat.name)
                        ));
                    }
                }
            }
        }
        match drivers.into_iter().find(|(_, d)| d.len() > 1) {
            Some((sid, drivers)) => Err(ElabError::DirectionConflict {
                path: self.design.signal_path(module, sid),
                drivers,
            }),
            None => Ok(()),
        }
    }
}
