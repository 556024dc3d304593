//! Parameter records: validation, value semantics and mapping round-trips.

use std::collections::HashSet;
use std::sync::Arc;
use weft_common::{Prefix, Prefixed, Scalar};
use weft_params::{Dtype, MapValue, ParamClass, ParamError, ParamMap, ParamSchema, ParamValue, ValidationKind};

fn geometry() -> Arc<ParamSchema> {
    ParamSchema::builder("Geometry")
        .required("w", Dtype::Scalar, "Width")
        .optional("l", Dtype::Scalar, "Length", Prefixed::new(150, Prefix::Nano))
        .build()
        .unwrap()
}

fn device() -> Arc<ParamSchema> {
    ParamSchema::builder("Device")
        .required("geo", Dtype::Class(geometry()), "Geometry")
        .optional("tp", Dtype::enumeration("Tp", ["N", "P"]), "Flavor", "N")
        .optional("fingers", Dtype::list(Dtype::Int), "Finger counts", vec![ParamValue::Int(1)])
        .optional("tag", Dtype::optional(Dtype::Str), "Label", ParamValue::None)
        .build()
        .unwrap()
}

fn sample(w: &str) -> ParamClass {
    let geo = ParamClass::new(&geometry(), [("w", w.into())]).unwrap();
    ParamClass::new(&device(), [("geo", geo.into()), ("tp", "P".into())]).unwrap()
}

#[test]
fn mapping_roundtrip_including_nested_records() {
    for w in ["1u", "2.5u", "300n", "not-a-number"] {
        let p = sample(w);
        let back = ParamClass::from_mapping(&device(), &p.to_mapping()).unwrap();
        assert_eq!(back, p);
    }
}

#[test]
fn mapping_roundtrip_through_json_text() {
    let p = sample("1u");
    let json = serde_json::to_string(&p.to_mapping()).unwrap();
    let map: ParamMap = serde_json::from_str(&json).unwrap();
    assert_eq!(ParamClass::from_mapping(&device(), &map).unwrap(), p);
}

#[test]
fn equality_and_hash_are_by_value() {
    let mut seen = HashSet::new();
    assert!(seen.insert(sample("1u")));
    assert!(!seen.insert(sample("1000n")));
    assert!(seen.insert(sample("2u")));
}

#[test]
fn strings_fall_back_to_literals() {
    let p = sample("w_param_from_netlist");
    let geo = p.get("geo").and_then(ParamValue::as_class).unwrap();
    let w = geo.get("w").and_then(ParamValue::as_scalar).unwrap();
    assert!(matches!(w, Scalar::Literal(_)));
}

#[test]
fn missing_and_unknown_fields_fail() {
    let err = ParamClass::new(&geometry(), []).unwrap_err();
    assert!(matches!(err.kind(), ValidationKind::MissingField(f) if f == "w"));
    let err = ParamClass::new(&geometry(), [("w", 1.into()), ("h", 1.into())]).unwrap_err();
    assert!(matches!(err.kind(), ValidationKind::UnknownField(f) if f == "h"));
}

#[test]
fn type_mismatch_fails() {
    let err: ParamError = ParamClass::new(&geometry(), [("w", true.into())]).unwrap_err();
    assert!(matches!(err.kind(), ValidationKind::TypeMismatch { .. }));
    let err = ParamClass::new(&device(), [("geo", 3.into())]).unwrap_err();
    assert!(matches!(err.kind(), ValidationKind::TypeMismatch { .. }));
}

#[test]
fn required_after_optional_is_rejected_at_declaration() {
    let err = ParamSchema::builder("Bad")
        .optional("a", Dtype::Int, "", 1)
        .required("b", Dtype::Int, "")
        .build()
        .unwrap_err();
    assert!(matches!(err.kind(), ValidationKind::FieldOrder(f) if f == "b"));
}

#[test]
fn defaults_fill_unspecified_fields() {
    let p = sample("1u");
    assert_eq!(p.get("fingers"), Some(&ParamValue::list(vec![ParamValue::Int(1)])));
    assert_eq!(p.get("tag"), Some(&ParamValue::None));
    let map = p.to_mapping();
    assert_eq!(map["tag"], MapValue::None);
}

#[test]
fn with_field_leaves_the_original_untouched() {
    let p = sample("1u");
    let q = p.with_field("tp", "N").unwrap();
    assert_eq!(p.get("tp"), Some(&ParamValue::Enum("P".into())));
    assert_eq!(q.get("tp"), Some(&ParamValue::Enum("N".into())));
    assert_ne!(p, q);
}
