//! A made-up technology for demonstrating and testing the PDK interface.
//!
//! `Mos` primitives become the external `nmos` and `pmos` modules of domain
//! `sample_pdk`, with [`SamplePdk::MOS_PARAMS`] parameters. Ideal elements
//! every simulator understands are kept; physical passives and diodes have
//! no sample equivalent. Installations must provide a `models` path.

use crate::error::PdkError;
use crate::pdk::{ExternalMapping, Mapping, Pdk};
use std::sync::Arc;
use weft_common::{Prefix, Prefixed, Scalar};
use weft_config::Installation;
use weft_ir::{Direction, ExternalModule, PrimitiveCall, PrimitiveKind};
use weft_params::{Dtype, ParamClass, ParamSchema, ParamValue};

/// The sample technology.
#[derive(Debug, Clone)]
pub struct SamplePdk {
    schema: Arc<ParamSchema>,
    nmos: ExternalModule,
    pmos: ExternalModule,
}

impl SamplePdk {
    /// Domain of the sample external modules.
    pub const DOMAIN: &'static str = "sample_pdk";
    /// Name of the transistor parameter schema.
    pub const MOS_PARAMS: &'static str = "SamplePdkMosParams";
    /// Installation key naming the model file.
    pub const MODELS_KEY: &'static str = "models";

    /// Builds the sample technology's devices.
    pub fn new() -> Result<Self, PdkError> {
        let micron = || Prefixed::new(1, Prefix::Micro);
        let schema = ParamSchema::builder(Self::MOS_PARAMS)
            .optional("w", Dtype::Scalar, "Width in resolution units", micron())
            .optional("l", Dtype::Scalar, "Length in resolution units", micron())
            .optional("nf", Dtype::Scalar, "Number of parallel fingers", 1)
            .optional("m", Dtype::Scalar, "Multiplier", 1)
            .build()?;
        let device = |name: &str, desc: &str| {
            PrimitiveKind::Mos
                .ports()
                .iter()
                .fold(ExternalModule::new(Self::DOMAIN, name), |m, p| {
                    m.port(p, 1, Direction::Undirected)
                })
                .desc(desc)
                .params(&schema)
        };
        Ok(SamplePdk {
            nmos: device("nmos", "Sample PDK Nmos"),
            pmos: device("pmos", "Sample PDK Pmos"),
            schema,
        })
    }

    /// The NMOS device.
    pub fn nmos(&self) -> &ExternalModule {
        &self.nmos
    }

    /// The PMOS device.
    pub fn pmos(&self) -> &ExternalModule {
        &self.pmos
    }

    /// Converts generic `MosParams` into this technology's parameters.
    fn mos_params(&self, params: &ParamClass) -> Result<ParamClass, PdkError> {
        let scalar = |name: &str| params.get(name).and_then(ParamValue::as_scalar).cloned();
        let count = |name: &str| params.get(name).and_then(ParamValue::as_int).unwrap_or(1);
        let mut values = vec![
            ("nf", ParamValue::from(Scalar::from(count("npar")))),
            ("m", ParamValue::from(Scalar::from(count("mult")))),
        ];
        for dim in ["w", "l"] {
            if let Some(value) = scalar(dim) {
                values.push((dim, value.into()));
            }
        }
        Ok(ParamClass::new(&self.schema, values)?)
    }
}

impl Pdk for SamplePdk {
    fn name(&self) -> &str {
        Self::DOMAIN
    }

    fn map_primitive(&self, call: &PrimitiveCall) -> Result<Option<Mapping>, PdkError> {
        Ok(match call.kind {
            PrimitiveKind::Mos => {
                let device = match call.params.get("tp").and_then(ParamValue::as_str) {
                    Some("PMOS") => &self.pmos,
                    _ => &self.nmos,
                };
                let params = self.mos_params(&call.params)?;
                Some(Mapping::External(ExternalMapping::new(device.clone(), params)))
            }
            PrimitiveKind::IdealResistor
            | PrimitiveKind::IdealCapacitor
            | PrimitiveKind::IdealInductor
            | PrimitiveKind::DcVoltageSource
            | PrimitiveKind::CurrentSource
            | PrimitiveKind::Short => Some(Mapping::Keep),
            PrimitiveKind::PhysicalResistor | PrimitiveKind::PhysicalCapacitor | PrimitiveKind::Diode => None,
        })
    }

    fn check_installation(&self, install: &Installation) -> Result<(), PdkError> {
        install
            .require_str(Self::MODELS_KEY)
            .map(|_| ())
            .map_err(|err| PdkError::installation(self.name(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mos(tp: &str) -> PrimitiveCall {
        PrimitiveKind::Mos
            .call([("tp", tp.into()), ("npar", 2.into())])
            .unwrap()
    }

    #[test]
    fn mos_maps_by_type() {
        let pdk = SamplePdk::new().unwrap();
        for (tp, name) in [("NMOS", "nmos"), ("PMOS", "pmos")] {
            match pdk.map_primitive(&mos(tp)).unwrap() {
                Some(Mapping::External(m)) => {
                    assert_eq!(m.module.name, name);
                    assert_eq!(m.module.domain, "sample_pdk");
                    assert_eq!(m.params.schema().name(), "SamplePdkMosParams");
                    assert_eq!(m.params.get("nf"), Some(&ParamValue::from(Scalar::from(2))));
                    assert_eq!(
                        m.params.get("w"),
                        Some(&ParamValue::from(Prefixed::new(1, Prefix::Micro)))
                    );
                }
                other => panic!("unexpected mapping {other:?}"),
            }
        }
    }

    #[test]
    fn explicit_dimensions_carry_over() {
        let pdk = SamplePdk::new().unwrap();
        let w: Prefixed = "2u".parse().unwrap();
        let call = PrimitiveKind::Mos.call([("w", w.into())]).unwrap();
        let Some(Mapping::External(m)) = pdk.map_primitive(&call).unwrap() else {
            panic!("mos must map to an external module");
        };
        assert_eq!(m.params.get("w"), Some(&ParamValue::from(w)));
    }

    #[test]
    fn ideal_elements_are_kept_and_physical_ones_unmapped() {
        let pdk = SamplePdk::new().unwrap();
        let vdc = PrimitiveKind::DcVoltageSource.call([]).unwrap();
        assert_eq!(pdk.map_primitive(&vdc).unwrap(), Some(Mapping::Keep));
        let res = PrimitiveKind::PhysicalResistor.call([("r", 10.into())]).unwrap();
        assert_eq!(pdk.map_primitive(&res).unwrap(), None);
    }

    #[test]
    fn installation_needs_models() {
        let pdk = SamplePdk::new().unwrap();
        let err = pdk.check_installation(&Installation::new()).unwrap_err();
        assert!(matches!(err, PdkError::Installation { ref pdk, .. } if pdk == "sample_pdk"));
        let install = Installation::new().with("models", "/pdks/sample/models.sp");
        assert!(pdk.check_installation(&install).is_ok());
        let install = Installation::new().with("models", 3);
        assert!(pdk.check_installation(&install).is_err());
    }
}
