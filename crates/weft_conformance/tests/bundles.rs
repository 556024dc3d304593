//! Bundle flattening, roles and flipping across a module hierarchy.

use weft_conformance::{diff_bundle, export_tree, spi_bundle};
use weft_elaborate::{BundleRef, Context, ElabError};
use weft_ir::{Bundle, Direction};

fn directions(ctx: &Context, b: BundleRef) -> Vec<Option<Direction>> {
    let m = ctx.design.module(b.module);
    m.bundles[b.id]
        .members
        .values()
        .map(|sid| m.signals[*sid].direction())
        .collect()
}

#[test]
fn double_flip_is_identity() {
    let mixed = Bundle::builder("Mixed")
        .input("a", 1)
        .output("b", 2)
        .inout("c", 1)
        .bundle("d", &diff_bundle().unwrap())
        .build()
        .unwrap();
    let mut ctx = Context::new();
    let m = ctx.module("M");
    let b = ctx.bundle_port(m, "x", &mixed, None).unwrap();
    let before = directions(&ctx, b);
    ctx.flip(b).unwrap();
    assert_ne!(directions(&ctx, b), before);
    ctx.flip(b).unwrap();
    assert_eq!(directions(&ctx, b), before);
}

#[test]
fn host_drives_device_through_a_parent() {
    let spi = spi_bundle().unwrap();
    let mut ctx = Context::new();

    let host = ctx.module("Host");
    ctx.bundle_port(host, "bus", &spi, Some("HOST")).unwrap();
    let device = ctx.module("Device");
    ctx.bundle_port(device, "bus", &spi, Some("DEVICE")).unwrap();

    let top = ctx.module("Top");
    let wire = ctx.bundle(top, "spi", &spi).unwrap();
    ctx.instance_with(top, "h", host, [("bus", wire.into())]).unwrap();
    ctx.instance_with(top, "d", device, [("bus", wire.into())]).unwrap();
    ctx.freeze(top).unwrap();

    let pkg = export_tree(&ctx.design, top).unwrap();
    let host_rec = pkg.module("Host").unwrap();
    let ports: Vec<_> = host_rec
        .ports
        .iter()
        .map(|p| (p.name.as_str(), p.direction))
        .collect();
    assert_eq!(
        ports,
        [
            ("bus.sck", Direction::Output),
            ("bus.mosi", Direction::Output),
            ("bus.miso", Direction::Input),
        ]
    );
    let top_rec = pkg.module("Top").unwrap();
    let conns: Vec<_> = top_rec.instances[1]
        .connections
        .iter()
        .map(|c| (c.port.as_str(), c.signal.as_str()))
        .collect();
    assert_eq!(
        conns,
        [("bus.sck", "spi.sck"), ("bus.mosi", "spi.mosi"), ("bus.miso", "spi.miso")]
    );
}

#[test]
fn two_hosts_on_one_bus_conflict() {
    let spi = spi_bundle().unwrap();
    let mut ctx = Context::new();
    let host = ctx.module("Host");
    ctx.bundle_port(host, "bus", &spi, Some("HOST")).unwrap();
    let top = ctx.module("Top");
    let wire = ctx.bundle(top, "spi", &spi).unwrap();
    ctx.instance_with(top, "h0", host, [("bus", wire.into())]).unwrap();
    ctx.instance_with(top, "h1", host, [("bus", wire.into())]).unwrap();
    let err = ctx.freeze(top).unwrap_err();
    assert!(matches!(err, ElabError::DirectionConflict { path, .. } if path == "Top.spi.sck"));
}

#[test]
fn bundle_port_requires_a_bundle_connection() {
    let mut ctx = Context::new();
    let src = ctx.module("Src");
    ctx.bundle_port(src, "out", &diff_bundle().unwrap(), None).unwrap();
    let top = ctx.module("Top");
    let s = ctx.signal(top, "s", 1).unwrap();
    let inst = ctx.instance(top, "s0", src).unwrap();
    let err = ctx.connect(inst, "out", s).unwrap_err();
    assert_eq!(err.code(), "E315");
}

#[test]
fn anonymous_bundles_rename_on_the_way_in() {
    let mut ctx = Context::new();
    let src = ctx.module("Src");
    ctx.bundle_port(src, "out", &diff_bundle().unwrap(), None).unwrap();
    let top = ctx.module("Top");
    let plus = ctx.signal(top, "vout_p", 1).unwrap();
    let minus = ctx.signal(top, "vout_n", 1).unwrap();
    let anon = ctx
        .bundlize(top, "vout", [("p", plus.into()), ("n", minus.into())])
        .unwrap();
    ctx.instance_with(top, "s0", src, [("out", anon.into())]).unwrap();
    ctx.freeze(top).unwrap();
    let pkg = export_tree(&ctx.design, top).unwrap();
    let conns: Vec<_> = pkg.module("Top").unwrap().instances[0]
        .connections
        .iter()
        .map(|c| (c.port.clone(), c.signal.clone()))
        .collect();
    assert_eq!(
        conns,
        [
            ("out.p".to_string(), "vout_p".to_string()),
            ("out.n".to_string(), "vout_n".to_string())
        ]
    );
}

#[test]
fn role_required_for_role_based_ports() {
    let mut ctx = Context::new();
    let m = ctx.module("M");
    let err = ctx.bundle_port(m, "bus", &spi_bundle().unwrap(), None).unwrap_err();
    assert_eq!(err.code(), "E306");
}
