//! The primitive-to-technology compile pass.
//!
//! Compilation rebuilds the instance hierarchy bottom-up. A module whose
//! subtree contains a replaced primitive is copied with its instances
//! retargeted and then frozen again, so the copy goes through the same
//! connectivity checks as hand-built modules. Modules with nothing to
//! replace are reused as they are. Each module is compiled once and each
//! distinct primitive call is mapped once, so shared hierarchy stays shared.

use crate::error::PdkError;
use crate::pdk::{Mapping, Pdk};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, trace};
use weft_common::Ident;
use weft_config::PdkConfig;
use weft_elaborate::{Context, ElabError};
use weft_ir::{ExternalCall, InstanceId, ModuleId, PrimitiveCall, Target};

/// A mapping decision, with port names already interned.
#[derive(Debug, Clone)]
enum Resolved {
    External {
        call: ExternalCall,
        ports: IndexMap<Ident, Ident>,
    },
    Keep,
}

/// Reusable compile state for one technology.
///
/// Compiling several tops with the same `Compiler` shares both the module
/// memo and the primitive-mapping memo between them.
pub struct Compiler<'p> {
    pdk: &'p dyn Pdk,
    modules: HashMap<ModuleId, ModuleId>,
    calls: HashMap<PrimitiveCall, Resolved>,
}

impl<'p> Compiler<'p> {
    /// Creates a compiler targeting `pdk`.
    pub fn new(pdk: &'p dyn Pdk) -> Self {
        Compiler {
            pdk,
            modules: HashMap::new(),
            calls: HashMap::new(),
        }
    }

    /// Creates a compiler after checking `config` selects `pdk` and carries
    /// the installation data it needs.
    pub fn configured(pdk: &'p dyn Pdk, config: &PdkConfig) -> Result<Self, PdkError> {
        if let Some(name) = &config.name {
            if name != pdk.name() {
                return Err(PdkError::Installation {
                    pdk: pdk.name().to_string(),
                    reason: format!("configuration selects pdk '{name}'"),
                });
            }
        }
        pdk.check_installation(&config.install)?;
        Ok(Self::new(pdk))
    }

    /// Number of distinct primitive calls mapped so far.
    pub fn mapped_count(&self) -> usize {
        self.calls.len()
    }

    /// Freezes `top` if needed and compiles its whole tree.
    ///
    /// A rebuilt module keeps the name of the module it was copied from, so
    /// the compiled tree exports under the source names. The source and the
    /// compiled tree therefore cannot be exported in one package.
    pub fn compile(&mut self, ctx: &mut Context, top: ModuleId) -> Result<ModuleId, PdkError> {
        ctx.freeze(top)?;
        let out = self.module(ctx, top)?;
        debug!(
            pdk = self.pdk.name(),
            top = %ctx.design.module_name(top),
            reused = out == top,
            "compiled module tree"
        );
        Ok(out)
    }

    fn module(&mut self, ctx: &mut Context, id: ModuleId) -> Result<ModuleId, PdkError> {
        if let Some(&done) = self.modules.get(&id) {
            return Ok(done);
        }
        let mut module = ctx.design.module(id).clone();
        let ids: Vec<InstanceId> = module.instances.iter().map(|(i, _)| i).collect();
        let mut changed = false;
        for inst_id in ids {
            match module.instances[inst_id].target.clone() {
                Target::Module(child) => {
                    let compiled = self.module(ctx, child)?;
                    if compiled != child {
                        module.instances[inst_id].target = Target::Module(compiled);
                        changed = true;
                    }
                }
                Target::Primitive(call) => {
                    let path = format!(
                        "{}.{}",
                        ctx.design.module_name(id),
                        ctx.design.resolve(module.instances[inst_id].name)
                    );
                    if let Resolved::External { call, ports } = self.resolve(ctx, &call, &path)? {
                        let inst = &mut module.instances[inst_id];
                        inst.conns = inst
                            .conns
                            .iter()
                            .map(|(port, conn)| (ports.get(port).copied().unwrap_or(*port), *conn))
                            .collect();
                        inst.target = Target::External(call);
                        changed = true;
                        trace!(instance = %path, "primitive instance replaced");
                    }
                }
                Target::External(_) => {}
            }
        }
        if !changed {
            self.modules.insert(id, id);
            return Ok(id);
        }
        module.frozen = false;
        for (_, inst) in module.instances.iter_mut() {
            inst.resolved.clear();
        }
        let new = ctx.design.modules.alloc(module);
        ctx.freeze(new)?;
        self.modules.insert(id, new);
        Ok(new)
    }

    fn resolve(&mut self, ctx: &mut Context, call: &PrimitiveCall, path: &str) -> Result<Resolved, PdkError> {
        if let Some(done) = self.calls.get(call) {
            return Ok(done.clone());
        }
        let mapping = self
            .pdk
            .map_primitive(call)?
            .ok_or_else(|| PdkError::UnresolvedPrimitive {
                kind: call.kind.name().to_string(),
                path: path.to_string(),
            })?;
        let resolved = match mapping {
            Mapping::Keep => {
                debug!(pdk = self.pdk.name(), primitive = call.kind.name(), "primitive kept");
                Resolved::Keep
            }
            Mapping::External(mapping) => {
                let target = mapping.module.name.clone();
                let mut ports = IndexMap::new();
                for port in call.kind.ports() {
                    let to = mapping.port(port);
                    if mapping.module.find_port(to).is_none() {
                        return Err(PdkError::PortMap {
                            path: path.to_string(),
                            target,
                            port: to.to_string(),
                        });
                    }
                    ports.insert(ctx.design.intern(port), ctx.design.intern(to));
                }
                let module = ctx.external(mapping.module)?;
                if let Some(schema) = &ctx.design.externals[module].schema {
                    if mapping.params.schema() != schema {
                        return Err(ElabError::WrongTargetParams {
                            path: path.to_string(),
                            target,
                            reason: format!(
                                "must be '{}', got '{}'",
                                schema.name(),
                                mapping.params.schema().name()
                            ),
                        }
                        .into());
                    }
                }
                debug!(
                    pdk = self.pdk.name(),
                    primitive = call.kind.name(),
                    params = %call.params,
                    target = %target,
                    "primitive mapped"
                );
                Resolved::External {
                    call: ExternalCall {
                        module,
                        params: mapping.params,
                    },
                    ports,
                }
            }
        };
        self.calls.insert(call.clone(), resolved.clone());
        Ok(resolved)
    }
}

/// Compiles the tree rooted at `top` for `pdk`, returning the new top.
///
/// The result is frozen. Primitive instances are replaced by instances of
/// the technology's external modules with connections carried over through
/// any port renaming; everything else keeps its shape.
pub fn compile(ctx: &mut Context, top: ModuleId, pdk: &dyn Pdk) -> Result<ModuleId, PdkError> {
    Compiler::new(pdk).compile(ctx, top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdk::{pdk_fn, ExternalMapping};
    use std::cell::Cell;
    use weft_config::Installation;
    use weft_ir::{Direction, ExternalModule, PrimitiveKind};
    use weft_params::ParamClass;

    fn ext(name: &str, ports: &[&str]) -> ExternalModule {
        ports.iter().fold(ExternalModule::new("test", name), |m, p| {
            m.port(p, 1, Direction::Undirected)
        })
    }

    fn map_resistors(call: &PrimitiveCall) -> Result<Option<Mapping>, PdkError> {
        Ok(match call.kind {
            PrimitiveKind::IdealResistor => Some(Mapping::External(
                ExternalMapping::new(ext("rpoly", &["plus", "minus"]), ParamClass::none())
                    .rename("p", "plus")
                    .rename("n", "minus"),
            )),
            PrimitiveKind::DcVoltageSource => Some(Mapping::Keep),
            _ => None,
        })
    }

    /// `Divider` with two resistors between `top` and `gnd`, midpoint `mid`.
    fn divider(ctx: &mut Context, r: i64) -> ModuleId {
        let m = ctx.module("Divider");
        let top = ctx.inout(m, "top", 1).unwrap();
        let mid = ctx.inout(m, "mid", 1).unwrap();
        let gnd = ctx.inout(m, "gnd", 1).unwrap();
        let res = PrimitiveKind::IdealResistor.call([("r", r.into())]).unwrap();
        ctx.instance_with(m, "r0", res.clone(), [("p", top.into()), ("n", mid.into())])
            .unwrap();
        ctx.instance_with(m, "r1", res, [("p", mid.into()), ("n", gnd.into())])
            .unwrap();
        m
    }

    #[test]
    fn each_unique_call_is_mapped_once() {
        let count = Cell::new(0);
        let pdk = pdk_fn("counting", |call| {
            count.set(count.get() + 1);
            map_resistors(call)
        });
        let mut ctx = Context::new();
        let div = divider(&mut ctx, 1000);
        let mut compiler = Compiler::new(&pdk);
        let out = compiler.compile(&mut ctx, div).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(compiler.mapped_count(), 1);
        assert_ne!(out, div);

        let m = ctx.design.module(out);
        assert!(m.frozen);
        let targets: Vec<_> = m.instances.values().map(|i| i.target.clone()).collect();
        assert_eq!(targets[0], targets[1]);
        let r0 = m.instances.values().next().unwrap();
        let ports: Vec<_> = r0.conns.keys().map(|p| ctx.design.resolve(*p)).collect();
        assert_eq!(ports, ["plus", "minus"]);
        // The source tree is untouched.
        assert!(matches!(
            ctx.design.module(div).instances.values().next().unwrap().target,
            Target::Primitive(_)
        ));
    }

    #[test]
    fn shared_children_are_compiled_once() {
        let mut ctx = Context::new();
        let div = divider(&mut ctx, 50);
        let top = ctx.module("Top");
        let a = ctx.inout(top, "a", 1).unwrap();
        let b = ctx.inout(top, "b", 1).unwrap();
        let c = ctx.inout(top, "c", 1).unwrap();
        for name in ["d0", "d1"] {
            ctx.instance_with(top, name, div, [("top", a.into()), ("mid", b.into()), ("gnd", c.into())])
                .unwrap();
        }
        let pdk = pdk_fn("res", map_resistors);
        let out = compile(&mut ctx, top, &pdk).unwrap();
        let targets: Vec<_> = ctx
            .design
            .module(out)
            .instances
            .values()
            .map(|i| i.target.clone())
            .collect();
        assert_eq!(targets[0], targets[1]);
        assert_ne!(targets[0], Target::Module(div));
    }

    #[test]
    fn unmapped_primitive_names_kind_and_location() {
        let mut ctx = Context::new();
        let m = ctx.module("Top");
        let a = ctx.inout(m, "a", 1).unwrap();
        let b = ctx.inout(m, "b", 1).unwrap();
        let cap = PrimitiveKind::IdealCapacitor.call([("c", 1.into())]).unwrap();
        ctx.instance_with(m, "c0", cap, [("p", a.into()), ("n", b.into())])
            .unwrap();
        let err = compile(&mut ctx, m, &pdk_fn("res", map_resistors)).unwrap_err();
        assert_eq!(
            err,
            PdkError::UnresolvedPrimitive {
                kind: "IdealCapacitor".into(),
                path: "Top.c0".into()
            }
        );
    }

    #[test]
    fn kept_primitives_reuse_the_module() {
        let mut ctx = Context::new();
        let m = ctx.module("Supply");
        let p = ctx.inout(m, "p", 1).unwrap();
        let n = ctx.inout(m, "n", 1).unwrap();
        let vdc = PrimitiveKind::DcVoltageSource.call([("dc", 1.into())]).unwrap();
        ctx.instance_with(m, "v0", vdc, [("p", p.into()), ("n", n.into())])
            .unwrap();
        let out = compile(&mut ctx, m, &pdk_fn("res", map_resistors)).unwrap();
        assert_eq!(out, m);
    }

    #[test]
    fn rename_onto_missing_port_fails() {
        let pdk = pdk_fn("broken", |_| {
            Ok(Some(Mapping::External(
                ExternalMapping::new(ext("rpoly", &["plus", "minus"]), ParamClass::none())
                    .rename("p", "plus"),
            )))
        });
        let mut ctx = Context::new();
        let div = divider(&mut ctx, 1);
        let err = compile(&mut ctx, div, &pdk).unwrap_err();
        assert!(matches!(err, PdkError::PortMap { port, .. } if port == "n"));
    }

    #[test]
    fn configuration_must_select_this_pdk() {
        let pdk = pdk_fn("res", map_resistors);
        let config = weft_config::PdkConfig {
            name: Some("other".into()),
            install: Installation::new(),
        };
        assert!(matches!(
            Compiler::configured(&pdk, &config),
            Err(PdkError::Installation { .. })
        ));
        let config = weft_config::PdkConfig {
            name: Some("res".into()),
            install: Installation::new(),
        };
        assert!(Compiler::configured(&pdk, &config).is_ok());
    }
}
