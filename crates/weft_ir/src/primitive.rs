//! The library of technology-independent primitives.
//!
//! Every primitive has a fixed ordered list of single-bit, undirected ports and
//! a parameter schema. PDK compilation replaces primitive instances with
//! technology-specific external modules.

use crate::instance::PrimitiveCall;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use weft_params::{Dtype, ParamClass, ParamError, ParamSchema, ParamValue};

/// A technology-independent leaf component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// MOS transistor.
    Mos,
    /// Ideal (simulation-only) resistor.
    IdealResistor,
    /// Physical resistor.
    PhysicalResistor,
    /// Ideal capacitor.
    IdealCapacitor,
    /// Physical capacitor.
    PhysicalCapacitor,
    /// Ideal inductor.
    IdealInductor,
    /// Diode.
    Diode,
    /// Zero-ohm tie between two nets.
    Short,
    /// DC voltage source.
    DcVoltageSource,
    /// DC current source.
    CurrentSource,
}

const MOS_PORTS: &[&str] = &["d", "g", "s", "b"];
const TWO_TERMINAL: &[&str] = &["p", "n"];

impl PrimitiveKind {
    /// Every primitive kind.
    pub const ALL: [PrimitiveKind; 10] = [
        PrimitiveKind::Mos,
        PrimitiveKind::IdealResistor,
        PrimitiveKind::PhysicalResistor,
        PrimitiveKind::IdealCapacitor,
        PrimitiveKind::PhysicalCapacitor,
        PrimitiveKind::IdealInductor,
        PrimitiveKind::Diode,
        PrimitiveKind::Short,
        PrimitiveKind::DcVoltageSource,
        PrimitiveKind::CurrentSource,
    ];

    /// The primitive's name.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Mos => "Mos",
            PrimitiveKind::IdealResistor => "IdealResistor",
            PrimitiveKind::PhysicalResistor => "PhysicalResistor",
            PrimitiveKind::IdealCapacitor => "IdealCapacitor",
            PrimitiveKind::PhysicalCapacitor => "PhysicalCapacitor",
            PrimitiveKind::IdealInductor => "IdealInductor",
            PrimitiveKind::Diode => "Diode",
            PrimitiveKind::Short => "Short",
            PrimitiveKind::DcVoltageSource => "DcVoltageSource",
            PrimitiveKind::CurrentSource => "CurrentSource",
        }
    }

    /// Looks a primitive up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Port names in order.
    pub fn ports(self) -> &'static [&'static str] {
        match self {
            PrimitiveKind::Mos => MOS_PORTS,
            _ => TWO_TERMINAL,
        }
    }

    /// The parameter schema.
    pub fn schema(self) -> Result<Arc<ParamSchema>, ParamError> {
        let opt_scalar = || Dtype::optional(Dtype::Scalar);
        let builder = match self {
            PrimitiveKind::Mos => ParamSchema::builder("MosParams")
                .optional(
                    "tp",
                    Dtype::enumeration("MosType", ["NMOS", "PMOS"]),
                    "Transistor type",
                    "NMOS",
                )
                .optional(
                    "family",
                    Dtype::enumeration("MosFamily", ["NONE", "CORE", "IO", "LVT", "HVT"]),
                    "Device family",
                    "NONE",
                )
                .optional("w", opt_scalar(), "Width", ParamValue::None)
                .optional("l", opt_scalar(), "Length", ParamValue::None)
                .optional("npar", Dtype::Int, "Number of parallel fingers", 1)
                .optional("mult", Dtype::Int, "Multiplier", 1),
            PrimitiveKind::IdealResistor => ParamSchema::builder("ResistorParams")
                .required("r", Dtype::Scalar, "Resistance (ohms)"),
            PrimitiveKind::PhysicalResistor => ParamSchema::builder("PhysicalResistorParams")
                .required("r", Dtype::Scalar, "Resistance (ohms)"),
            PrimitiveKind::IdealCapacitor => ParamSchema::builder("CapacitorParams")
                .required("c", Dtype::Scalar, "Capacitance (F)"),
            PrimitiveKind::PhysicalCapacitor => ParamSchema::builder("PhysicalCapacitorParams")
                .required("c", Dtype::Scalar, "Capacitance (F)"),
            PrimitiveKind::IdealInductor => ParamSchema::builder("InductorParams")
                .required("l", Dtype::Scalar, "Inductance (H)"),
            PrimitiveKind::Diode => ParamSchema::builder("DiodeParams")
                .optional("w", opt_scalar(), "Width", ParamValue::None)
                .optional("l", opt_scalar(), "Length", ParamValue::None),
            PrimitiveKind::Short => ParamSchema::builder("ShortParams")
                .optional("layer", Dtype::optional(Dtype::Int), "Metal layer", ParamValue::None)
                .optional("w", opt_scalar(), "Width", ParamValue::None)
                .optional("l", opt_scalar(), "Length", ParamValue::None),
            PrimitiveKind::DcVoltageSource => ParamSchema::builder("VdcParams")
                .optional("dc", Dtype::Scalar, "DC value (V)", 0)
                .optional("ac", opt_scalar(), "AC amplitude (V)", ParamValue::None),
            PrimitiveKind::CurrentSource => ParamSchema::builder("IsrcParams")
                .optional("dc", Dtype::Scalar, "DC value (A)", 0),
        };
        builder.build()
    }

    /// Builds a validated call of this primitive from named values.
    pub fn call<'a, I>(self, values: I) -> Result<PrimitiveCall, ParamError>
    where
        I: IntoIterator<Item = (&'a str, ParamValue)>,
    {
        let params = ParamClass::new(&self.schema()?, values)?;
        Ok(PrimitiveCall { kind: self, params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for k in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_name(k.name()), Some(k));
            assert!(k.schema().is_ok());
        }
        assert_eq!(PrimitiveKind::from_name("Bjt"), None);
    }

    #[test]
    fn mos_ports_and_defaults() {
        assert_eq!(PrimitiveKind::Mos.ports(), ["d", "g", "s", "b"]);
        let call = PrimitiveKind::Mos.call([("tp", "PMOS".into())]).unwrap();
        assert_eq!(call.params.get("tp").and_then(ParamValue::as_str), Some("PMOS"));
        assert_eq!(call.params.get("npar"), Some(&ParamValue::Int(1)));
    }

    #[test]
    fn equal_calls_hash_equal() {
        use std::collections::HashSet;
        let a = PrimitiveKind::IdealResistor.call([("r", "1k".into())]).unwrap();
        let b = PrimitiveKind::IdealResistor.call([("r", 1000.into())]).unwrap();
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn resistor_requires_value() {
        assert!(PrimitiveKind::IdealResistor.call([]).is_err());
    }
}
