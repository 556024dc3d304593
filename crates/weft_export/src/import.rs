//! Interchange to design.

use crate::error::ExportError;
use crate::records::{ModuleRecord, Package, TargetRef};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};
use weft_elaborate::Context;
use weft_ir::{ExternalCall, ExternalModule, ExternalModuleId, ModuleId, PrimitiveCall, PrimitiveKind, Target};
use weft_params::{ParamClass, ParamMap, ParamSchema};

/// Rebuilds the modules of `package` in `ctx`, returning the tops in order.
///
/// Modules may appear in any order; they are built after everything they
/// instantiate. Each module is frozen, so imported designs are checked like
/// hand-built ones. Instances naming the same module record share one module.
pub fn import(ctx: &mut Context, package: &Package) -> Result<Vec<ModuleId>, ExportError> {
    let namespace = if package.domain.is_empty() {
        "package"
    } else {
        package.domain.as_str()
    };

    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, m) in package.modules.iter().enumerate() {
        if index.insert(m.name.as_str(), i).is_some() {
            return Err(ExportError::DuplicateName {
                path: namespace.to_string(),
                name: m.name.clone(),
            });
        }
    }

    let mut externals: HashMap<(&str, &str), ExternalModuleId> = HashMap::new();
    for ext in &package.externals {
        let key = (ext.domain.as_str(), ext.name.as_str());
        if externals.contains_key(&key) {
            return Err(ExportError::DuplicateName {
                path: namespace.to_string(),
                name: format!("{}:{}", ext.domain, ext.name),
            });
        }
        let module = ext.ports.iter().fold(
            ExternalModule::new(&ext.domain, &ext.name).desc(&ext.desc),
            |m, p| m.port(&p.name, p.width, p.direction),
        );
        let id = match ctx.design.find_external(&ext.domain, &ext.name) {
            Some(id) if ctx.design.externals[id].ports == module.ports => id,
            Some(_) => {
                return Err(ExportError::DuplicateName {
                    path: ext.domain.clone(),
                    name: ext.name.clone(),
                })
            }
            None => ctx.external(module)?,
        };
        externals.insert(key, id);
    }

    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..package.modules.len()).map(|i| graph.add_node(i)).collect();
    for (i, m) in package.modules.iter().enumerate() {
        for inst in &m.instances {
            if let TargetRef::Module { name } = &inst.target {
                let child = index.get(name.as_str()).ok_or_else(|| ExportError::UnresolvedReference {
                    path: format!("{}.{}", m.name, inst.name),
                    name: name.clone(),
                })?;
                graph.add_edge(nodes[*child], nodes[i], ());
            }
        }
    }
    let order = toposort(&graph, None).map_err(|cycle| ExportError::CircularInstance {
        module: package.modules[graph[cycle.node_id()]].name.clone(),
    })?;

    let mut built: HashMap<&str, ModuleId> = HashMap::new();
    for node in order {
        let record = &package.modules[graph[node]];
        let id = build_module(ctx, record, &built, &externals)?;
        built.insert(record.name.as_str(), id);
    }

    let tops = package
        .tops
        .iter()
        .map(|t| {
            built
                .get(t.as_str())
                .copied()
                .ok_or_else(|| ExportError::UnresolvedReference {
                    path: namespace.to_string(),
                    name: t.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(domain = %package.domain, modules = built.len(), "imported package");
    Ok(tops)
}

fn build_module(
    ctx: &mut Context,
    record: &ModuleRecord,
    built: &HashMap<&str, ModuleId>,
    externals: &HashMap<(&str, &str), ExternalModuleId>,
) -> Result<ModuleId, ExportError> {
    let mut names = HashSet::new();
    let all_names = record
        .ports
        .iter()
        .map(|p| &p.name)
        .chain(record.signals.iter().map(|s| &s.name))
        .chain(record.instances.iter().map(|i| &i.name));
    for name in all_names {
        if !names.insert(name.as_str()) {
            return Err(ExportError::DuplicateName {
                path: record.name.clone(),
                name: name.clone(),
            });
        }
    }

    let m = ctx.module(&record.name);
    for p in &record.ports {
        ctx.port(m, &p.name, p.width, p.direction)?;
    }
    for s in &record.signals {
        ctx.signal(m, &s.name, s.width)?;
    }
    for inst in &record.instances {
        let path = format!("{}.{}", record.name, inst.name);
        let target = match &inst.target {
            TargetRef::Module { name } => {
                Target::Module(*built.get(name.as_str()).ok_or_else(|| {
                    ExportError::UnresolvedReference {
                        path: path.clone(),
                        name: name.clone(),
                    }
                })?)
            }
            TargetRef::External { domain, name, params } => {
                let module = *externals.get(&(domain.as_str(), name.as_str())).ok_or_else(|| {
                    ExportError::UnresolvedReference {
                        path: path.clone(),
                        name: format!("{domain}:{name}"),
                    }
                })?;
                Target::External(ExternalCall {
                    module,
                    params: external_params(ctx, module, params)?,
                })
            }
            TargetRef::Primitive { name, params } => {
                let kind = PrimitiveKind::from_name(name).ok_or_else(|| {
                    ExportError::UnresolvedReference {
                        path: path.clone(),
                        name: name.clone(),
                    }
                })?;
                Target::Primitive(PrimitiveCall {
                    kind,
                    params: ParamClass::from_mapping(&kind.schema()?, params)?,
                })
            }
        };
        let handle = ctx.instance(m, &inst.name, target)?;
        for conn in &inst.connections {
            let signal = ctx.lookup(m, &conn.signal)?;
            ctx.connect(handle, &conn.port, signal)?;
        }
        trace!(instance = %path, "instance imported");
    }
    for literal in &record.literals {
        ctx.literal(m, literal.clone())?;
    }
    ctx.freeze(m)?;
    Ok(m)
}

/// External parameter values under the external's own schema, or under one
/// inferred from the values when the external does not declare a schema.
fn external_params(
    ctx: &Context,
    module: ExternalModuleId,
    params: &ParamMap,
) -> Result<ParamClass, ExportError> {
    let ext = &ctx.design.externals[module];
    if let Some(schema) = &ext.schema {
        return Ok(ParamClass::from_mapping(schema, params)?);
    }
    if params.is_empty() {
        return Ok(ParamClass::none());
    }
    let schema = ParamSchema::infer(&format!("{}Params", ext.name), params)?;
    Ok(ParamClass::from_mapping(&schema, params)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::export;
    use crate::records::{ConnectionRecord, InstanceRecord, PortRecord, SignalRecord};
    use weft_config::ExportOptions;
    use weft_ir::Direction;

    fn port(name: &str, direction: Direction) -> PortRecord {
        PortRecord {
            name: name.into(),
            direction,
            width: 1,
        }
    }

    fn conn(port: &str, signal: &str) -> ConnectionRecord {
        ConnectionRecord {
            port: port.into(),
            signal: signal.into(),
        }
    }

    fn leaf() -> ModuleRecord {
        ModuleRecord {
            name: "Leaf".into(),
            ports: vec![port("a", Direction::Input), port("y", Direction::Output)],
            signals: vec![],
            instances: vec![],
            literals: vec![],
        }
    }

    fn top(instances: Vec<InstanceRecord>) -> ModuleRecord {
        ModuleRecord {
            name: "Top".into(),
            ports: vec![port("a", Direction::Input), port("y", Direction::Output)],
            signals: vec![SignalRecord {
                name: "mid".into(),
                width: 1,
            }],
            instances,
            literals: vec!["* imported".into()],
        }
    }

    fn leaf_instance(name: &str, a: &str, y: &str) -> InstanceRecord {
        InstanceRecord {
            name: name.into(),
            target: TargetRef::Module {
                name: "Leaf".into(),
            },
            connections: vec![conn("a", a), conn("y", y)],
        }
    }

    #[test]
    fn records_in_any_order_are_rebuilt_with_sharing() {
        let package = Package {
            domain: "demo".into(),
            modules: vec![
                top(vec![
                    leaf_instance("l0", "a", "mid"),
                    leaf_instance("l1", "mid", "y"),
                ]),
                leaf(),
            ],
            externals: vec![],
            tops: vec!["Top".into()],
        };
        let mut ctx = Context::new();
        let tops = import(&mut ctx, &package).unwrap();
        let m = ctx.design.module(tops[0]);
        assert!(m.frozen);
        let targets: Vec<_> = m.instances.values().map(|i| i.target.clone()).collect();
        assert_eq!(targets[0], targets[1]);
        assert_eq!(ctx.design.module_count(), 2);

        let options = ExportOptions {
            domain: "demo".into(),
        };
        let again = export(&ctx.design, &tops, &options).unwrap();
        assert_eq!(again.modules[0], leaf());
        assert_eq!(again.modules[1], package.modules[0]);
    }

    #[test]
    fn dangling_module_reference_is_rejected() {
        let mut bad = leaf_instance("l0", "a", "mid");
        bad.target = TargetRef::Module {
            name: "Ghost".into(),
        };
        let package = Package {
            modules: vec![top(vec![bad])],
            tops: vec!["Top".into()],
            ..Package::default()
        };
        let err = import(&mut Context::new(), &package).unwrap_err();
        assert_eq!(
            err,
            ExportError::UnresolvedReference {
                path: "Top.l0".into(),
                name: "Ghost".into()
            }
        );
    }

    #[test]
    fn dangling_signal_reference_is_rejected() {
        let package = Package {
            modules: vec![leaf(), top(vec![leaf_instance("l0", "a", "nowhere")])],
            tops: vec!["Top".into()],
            ..Package::default()
        };
        let err = import(&mut Context::new(), &package).unwrap_err();
        assert!(matches!(err, ExportError::UnresolvedReference { name, .. } if name == "nowhere"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let package = Package {
            modules: vec![leaf(), leaf()],
            tops: vec![],
            ..Package::default()
        };
        let err = import(&mut Context::new(), &package).unwrap_err();
        assert_eq!(
            err,
            ExportError::DuplicateName {
                path: "package".into(),
                name: "Leaf".into()
            }
        );

        let mut clash = top(vec![leaf_instance("mid", "a", "y")]);
        clash.name = "Clash".into();
        let package = Package {
            modules: vec![leaf(), clash],
            tops: vec![],
            ..Package::default()
        };
        let err = import(&mut Context::new(), &package).unwrap_err();
        assert!(matches!(err, ExportError::DuplicateName { path, name } if path == "Clash" && name == "mid"));
    }

    #[test]
    fn instantiation_cycles_are_rejected() {
        let mut a = leaf();
        a.name = "A".into();
        a.instances = vec![InstanceRecord {
            name: "b".into(),
            target: TargetRef::Module { name: "B".into() },
            connections: vec![],
        }];
        let mut b = leaf();
        b.name = "B".into();
        b.instances = vec![InstanceRecord {
            name: "a".into(),
            target: TargetRef::Module { name: "A".into() },
            connections: vec![],
        }];
        let package = Package {
            modules: vec![a, b],
            tops: vec!["A".into()],
            ..Package::default()
        };
        let err = import(&mut Context::new(), &package).unwrap_err();
        assert!(matches!(err, ExportError::CircularInstance { .. }));
    }

    #[test]
    fn unknown_top_is_rejected() {
        let package = Package {
            modules: vec![leaf()],
            tops: vec!["Nope".into()],
            ..Package::default()
        };
        let err = import(&mut Context::new(), &package).unwrap_err();
        assert!(matches!(err, ExportError::UnresolvedReference { name, .. } if name == "Nope"));
    }
}
