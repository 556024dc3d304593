//! Compiling primitives into technology-specific external modules.

use weft_conformance::{export_tree, inverter, inverter_chain, make_config, mos, CountingPdk};
use weft_config::ExportOptions;
use weft_elaborate::Context;
use weft_export::{export, ExportError, Package, TargetRef};
use weft_ir::{PrimitiveKind, Target};
use weft_params::ParamValue;
use weft_pdk::{compile, Compiler, PdkError, SamplePdk};

#[test]
fn inverter_compiles_to_sample_devices() {
    let pdk = SamplePdk::new().unwrap();
    let mut ctx = Context::new();
    let inv = inverter(&mut ctx).unwrap();
    let compiled = compile(&mut ctx, inv, &pdk).unwrap();

    let pkg = export_tree(&ctx.design, compiled).unwrap();
    let rec = pkg.module("Inverter").unwrap();
    assert_eq!(rec.instances.len(), 2);
    for (inst, device, rail) in [("p0", "pmos", "vdd"), ("n0", "nmos", "vss")] {
        let inst = rec.instances.iter().find(|i| i.name == inst).unwrap();
        match &inst.target {
            TargetRef::External { domain, name, .. } => {
                assert_eq!(domain, "sample_pdk");
                assert_eq!(name, device);
            }
            other => panic!("expected an external target, got {other:?}"),
        }
        let conns: Vec<_> = inst
            .connections
            .iter()
            .map(|c| (c.port.as_str(), c.signal.as_str()))
            .collect();
        assert_eq!(conns, [("d", "o"), ("g", "i"), ("s", rail), ("b", rail)]);
    }
    let externals: Vec<_> = pkg.externals.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(externals, ["pmos", "nmos"]);
}

#[test]
fn each_distinct_call_is_mapped_once() {
    let pdk = CountingPdk::new().unwrap();
    let mut ctx = Context::new();
    let top = ctx.module("Pair");
    let d = ctx.inout(top, "d", 1).unwrap();
    let g = ctx.inout(top, "g", 1).unwrap();
    let s = ctx.inout(top, "s", 1).unwrap();
    for name in ["n0", "n1"] {
        ctx.instance_with(
            top,
            name,
            mos("NMOS").unwrap(),
            [("d", d.into()), ("g", g.into()), ("s", s.into()), ("b", s.into())],
        )
        .unwrap();
    }
    ctx.freeze(top).unwrap();

    let mut compiler = Compiler::new(&pdk);
    let compiled = compiler.compile(&mut ctx, top).unwrap();
    assert_eq!(pdk.calls(), 1);
    assert_eq!(compiler.mapped_count(), 1);

    let targets: Vec<_> = ctx
        .design
        .module(compiled)
        .instances
        .values()
        .map(|i| i.target.clone())
        .collect();
    assert!(matches!(targets[0], Target::External(_)));
    assert_eq!(targets[0], targets[1]);
}

#[test]
fn shared_hierarchy_stays_shared() {
    let pdk = CountingPdk::new().unwrap();
    let mut ctx = Context::new();
    let chain = inverter_chain(&mut ctx, 3).unwrap();
    let compiled = compile(&mut ctx, chain, &pdk).unwrap();
    assert_ne!(compiled, chain);
    assert_eq!(pdk.calls(), 2);

    let pkg = export_tree(&ctx.design, compiled).unwrap();
    let names: Vec<_> = pkg.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["Inverter", "Chain"]);
    assert_eq!(pkg.externals.len(), 2);
}

#[test]
fn compiled_tree_keeps_source_names() {
    let pdk = SamplePdk::new().unwrap();
    let mut ctx = Context::new();
    let chain = inverter_chain(&mut ctx, 2).unwrap();
    let compiled = compile(&mut ctx, chain, &pdk).unwrap();

    let source = export_tree(&ctx.design, chain).unwrap();
    let target = export_tree(&ctx.design, compiled).unwrap();
    let names = |pkg: &Package| -> Vec<String> { pkg.modules.iter().map(|m| m.name.clone()).collect() };
    assert_eq!(names(&source), names(&target));

    let err = export(&ctx.design, &[chain, compiled], &ExportOptions::default()).unwrap_err();
    assert!(
        matches!(&err, ExportError::DuplicateName { name, .. } if name == "Inverter"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn unsupported_primitive_is_reported_with_its_path() {
    let pdk = SamplePdk::new().unwrap();
    let mut ctx = Context::new();
    let top = ctx.module("Top");
    let p = ctx.inout(top, "p", 1).unwrap();
    let n = ctx.inout(top, "n", 1).unwrap();
    let diode = PrimitiveKind::Diode
        .call(std::iter::empty::<(&str, ParamValue)>())
        .unwrap();
    ctx.instance_with(top, "d0", diode, [("p", p.into()), ("n", n.into())])
        .unwrap();
    let err = compile(&mut ctx, top, &pdk).unwrap_err();
    assert_eq!(
        err,
        PdkError::UnresolvedPrimitive {
            kind: "Diode".into(),
            path: "Top.d0".into(),
        }
    );
}

#[test]
fn configuration_selects_and_installs_the_pdk() {
    let pdk = SamplePdk::new().unwrap();
    let config = make_config("inv").unwrap();
    assert!(Compiler::configured(&pdk, &config.pdk).is_ok());

    let mut missing = config.pdk.clone();
    missing.install = Default::default();
    assert!(matches!(
        Compiler::configured(&pdk, &missing),
        Err(PdkError::Installation { .. })
    ));

    let mut other = config.pdk;
    other.name = Some("asap7".into());
    assert!(matches!(
        Compiler::configured(&pdk, &other),
        Err(PdkError::Installation { .. })
    ));
}
