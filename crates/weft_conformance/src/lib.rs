//! Conformance test helpers for the Weft hardware-graph library.
//!
//! Provides shared fixtures (an inverter, bundle types, a parametrized
//! buffer generator, a call-counting PDK) and the end-to-end helpers used by
//! the integration tests under `tests/`.

#![warn(missing_docs)]

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use weft_config::{load_config_from_str, ConfigError, ExportOptions, Installation, WeftConfig};
use weft_elaborate::{Context, ElabError, Generator};
use weft_export::{ExportError, Package};
use weft_ir::{Bundle, Design, IrError, ModuleId, PrimitiveCall, PrimitiveKind};
use weft_params::{Dtype, ParamSchema, ParamValue};
use weft_pdk::{Mapping, Pdk, PdkError, SamplePdk};

/// Creates a configuration for project `name` with the sample PDK selected.
pub fn make_config(name: &str) -> Result<WeftConfig, ConfigError> {
    load_config_from_str(&format!(
        r#"
[project]
name = "{name}"
version = "0.1.0"

[export]
domain = "{name}"

[pdk]
name = "sample_pdk"

[pdk.install]
models = "/pdks/sample/models.sp"
"#
    ))
}

/// A `Mos` call of type `tp` (`"NMOS"` or `"PMOS"`) with default geometry.
pub fn mos(tp: &str) -> Result<PrimitiveCall, ElabError> {
    Ok(PrimitiveKind::Mos.call([("tp", tp.into())])?)
}

/// Builds the two-transistor `Inverter`.
///
/// Ports are `i` (input), `o` (output) and the rails `vdd` and `vss`. Both
/// transistors connect `d` to `o` and `g` to `i`; their `s` and `b` go to
/// their rail.
pub fn inverter(ctx: &mut Context) -> Result<ModuleId, ElabError> {
    let m = ctx.module("Inverter");
    let i = ctx.input(m, "i", 1)?;
    let o = ctx.output(m, "o", 1)?;
    let vdd = ctx.inout(m, "vdd", 1)?;
    let vss = ctx.inout(m, "vss", 1)?;
    ctx.instance_with(
        m,
        "p0",
        mos("PMOS")?,
        [("d", o.into()), ("g", i.into()), ("s", vdd.into()), ("b", vdd.into())],
    )?;
    let n0 = ctx.instance(m, "n0", mos("NMOS")?)?;
    ctx.connect(n0, "d", o)?;
    ctx.connect(n0, "g", i)?;
    ctx.connect(n0, "s", vss)?;
    ctx.connect(n0, "b", vss)?;
    ctx.freeze(m)?;
    Ok(m)
}

/// Builds `Chain`: `stages` inverters in series sharing one `Inverter` module.
pub fn inverter_chain(ctx: &mut Context, stages: usize) -> Result<ModuleId, ElabError> {
    let inv = inverter(ctx)?;
    let m = ctx.module("Chain");
    let input = ctx.input(m, "i", 1)?;
    let output = ctx.output(m, "o", 1)?;
    let vdd = ctx.inout(m, "vdd", 1)?;
    let vss = ctx.inout(m, "vss", 1)?;
    let mut prev = input;
    for k in 0..stages {
        let next = if k + 1 == stages {
            output
        } else {
            ctx.signal(m, &format!("n{k}"), 1)?
        };
        ctx.instance_with(
            m,
            &format!("inv{k}"),
            inv,
            [("i", prev.into()), ("o", next.into()), ("vdd", vdd.into()), ("vss", vss.into())],
        )?;
        prev = next;
    }
    ctx.freeze(m)?;
    Ok(m)
}

/// A differential pair with explicit directions.
pub fn diff_bundle() -> Result<Arc<Bundle>, IrError> {
    Bundle::builder("Diff").output("p", 1).output("n", 1).build()
}

/// A role-based serial bus with `HOST` and `DEVICE` roles.
pub fn spi_bundle() -> Result<Arc<Bundle>, IrError> {
    Bundle::builder("Spi")
        .roles(["HOST", "DEVICE"])
        .role_signal("sck", 1, "HOST", "DEVICE")
        .role_signal("mosi", 1, "HOST", "DEVICE")
        .role_signal("miso", 1, "DEVICE", "HOST")
        .build()
}

/// Parameters of [`buffer_generator`]: a required `width`.
pub fn width_params() -> Result<Arc<ParamSchema>, weft_params::ParamError> {
    ParamSchema::builder("BufferParams")
        .required("width", Dtype::Int, "Bus width in bits")
        .build()
}

/// A `Buffer` generator with ports `i` and `o` of the requested width,
/// counting its invocations in `calls`.
pub fn buffer_generator(calls: Arc<AtomicUsize>) -> Result<Arc<Generator>, weft_params::ParamError> {
    Ok(Generator::new("Buffer", &width_params()?, move |ctx, params| {
        calls.fetch_add(1, Ordering::SeqCst);
        let width = params
            .get("width")
            .and_then(ParamValue::as_int)
            .and_then(|w| u32::try_from(w).ok())
            .unwrap_or(1);
        let m = ctx.module("Buffer");
        ctx.input(m, "i", width)?;
        ctx.output(m, "o", width)?;
        Ok(m)
    }))
}

/// The sample PDK, counting how often its mapping is consulted.
#[derive(Debug)]
pub struct CountingPdk {
    inner: SamplePdk,
    calls: Cell<usize>,
}

impl CountingPdk {
    /// Wraps a fresh [`SamplePdk`].
    pub fn new() -> Result<Self, PdkError> {
        Ok(CountingPdk {
            inner: SamplePdk::new()?,
            calls: Cell::new(0),
        })
    }

    /// Number of `map_primitive` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Pdk for CountingPdk {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn map_primitive(&self, call: &PrimitiveCall) -> Result<Option<Mapping>, PdkError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.map_primitive(call)
    }

    fn check_installation(&self, install: &Installation) -> Result<(), PdkError> {
        self.inner.check_installation(install)
    }
}

/// Exports the tree rooted at `top` with default options.
pub fn export_tree(design: &Design, top: ModuleId) -> Result<Package, ExportError> {
    weft_export::export(design, &[top], &ExportOptions::default())
}

/// Returns `true` if both trees export to the same package.
pub fn structurally_equal(a: (&Design, ModuleId), b: (&Design, ModuleId)) -> Result<bool, ExportError> {
    Ok(export_tree(a.0, a.1)? == export_tree(b.0, b.1)?)
}
