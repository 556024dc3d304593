//! Design to interchange.

use crate::error::ExportError;
use crate::records::{
    ConnectionRecord, ExternalRecord, InstanceRecord, ModuleRecord, Package, PortRecord,
    SignalRecord, TargetRef,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use weft_config::ExportOptions;
use weft_ir::{Design, ExternalModuleId, ModuleId, Target};

/// Exports the trees rooted at `tops`.
///
/// Every module must be frozen. Modules are written children first, each
/// once however many instances refer to it. A module name used by two
/// different non-local modules is an error. A module local to a generator
/// keeps its name when it is free and otherwise takes the first of `_1`,
/// `_2`, ... that no other exported module uses.
pub fn export(design: &Design, tops: &[ModuleId], options: &ExportOptions) -> Result<Package, ExportError> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    for top in tops {
        for id in design.walk_depth_first(*top) {
            if seen.insert(id) {
                order.push(id);
            }
        }
    }

    let namespace = if options.domain.is_empty() {
        "package"
    } else {
        options.domain.as_str()
    };
    let mut names: HashMap<ModuleId, String> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    for id in &order {
        let module = design.module(*id);
        if !module.frozen {
            return Err(ExportError::NotFrozen {
                module: design.module_name(*id).to_string(),
            });
        }
        if module.local {
            continue;
        }
        let name = design.module_name(*id).to_string();
        if !taken.insert(name.clone()) {
            return Err(ExportError::DuplicateName {
                path: namespace.to_string(),
                name,
            });
        }
        names.insert(*id, name);
    }
    // Local modules take their own name if free, else the first free suffix.
    for id in order.iter().filter(|id| design.module(**id).local) {
        let base = design.module_name(*id);
        let mut name = base.to_string();
        let mut n = 1;
        while taken.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        taken.insert(name.clone());
        names.insert(*id, name);
    }

    let mut externals: Vec<ExternalModuleId> = Vec::new();
    let mut modules = Vec::with_capacity(order.len());
    for id in &order {
        modules.push(module_record(design, *id, &names, &mut externals));
    }
    let externals = externals
        .into_iter()
        .map(|id| {
            let ext = &design.externals[id];
            ExternalRecord {
                domain: ext.domain.clone(),
                name: ext.name.clone(),
                desc: ext.desc.clone(),
                ports: ext
                    .ports
                    .iter()
                    .map(|p| PortRecord {
                        name: p.name.clone(),
                        direction: p.direction,
                        width: p.width,
                    })
                    .collect(),
            }
        })
        .collect();
    let tops = tops.iter().filter_map(|t| names.get(t).cloned()).collect();
    debug!(
        domain = %options.domain,
        modules = modules.len(),
        "exported package"
    );
    Ok(Package {
        domain: options.domain.clone(),
        modules,
        externals,
        tops,
    })
}

fn module_record(
    design: &Design,
    id: ModuleId,
    names: &HashMap<ModuleId, String>,
    externals: &mut Vec<ExternalModuleId>,
) -> ModuleRecord {
    let m = design.module(id);
    let text = |ident| design.resolve(ident).to_string();
    let ports = m
        .port_signals()
        .map(|sid| {
            let sig = &m.signals[sid];
            PortRecord {
                name: text(sig.name),
                direction: sig.direction().unwrap_or(weft_ir::Direction::Undirected),
                width: sig.width,
            }
        })
        .collect();
    let signals = m
        .internal_signals()
        .map(|(_, sig)| SignalRecord {
            name: text(sig.name),
            width: sig.width,
        })
        .collect();
    let instances = m
        .instances
        .values()
        .map(|inst| {
            let target = match &inst.target {
                Target::Module(child) => TargetRef::Module {
                    name: names
                        .get(child)
                        .cloned()
                        .unwrap_or_else(|| design.module_name(*child).to_string()),
                },
                Target::External(call) => {
                    if !externals.contains(&call.module) {
                        externals.push(call.module);
                    }
                    let ext = &design.externals[call.module];
                    TargetRef::External {
                        domain: ext.domain.clone(),
                        name: ext.name.clone(),
                        params: call.params.to_mapping(),
                    }
                }
                Target::Primitive(call) => TargetRef::Primitive {
                    name: call.kind.name().to_string(),
                    params: call.params.to_mapping(),
                },
            };
            InstanceRecord {
                name: text(inst.name),
                target,
                connections: inst
                    .resolved
                    .iter()
                    .map(|(port, sid)| ConnectionRecord {
                        port: text(*port),
                        signal: text(m.signals[*sid].name),
                    })
                    .collect(),
            }
        })
        .collect();
    ModuleRecord {
        name: names[&id].clone(),
        ports,
        signals,
        instances,
        literals: m.literals.clone(),
    }
}
