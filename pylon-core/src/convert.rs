//! Convert - Scalar and container rules between wire and config values
//!
//! Wire to config:
//! - every integer width becomes `Int64` (`u64` above `i64::MAX` overflows)
//! - every float becomes a `Number` rounded to `float_precision` digits
//! - an absent or null value becomes a typed null
//!
//! Config to wire:
//! - null and unknown values produce nothing, leaving the wire field as is
//! - integers are range-checked against the destination width
//! - floats are rounded before they are written

use std::collections::BTreeMap;

use crate::context::Context;
use crate::error::MapResult;
use crate::model::ConfigType;
use crate::value::{
    AttrType, AttrValue, CaseInsensitive, ListValue, Number, ObjectType, ObjectValue, SetValue,
    TriState,
};
use crate::wire::{StructType, WireType, WireValue};

/// Round `value` to `digits` decimal places
/// e.g., round_float(1.23456789, 4) -> 1.2346
pub fn round_float(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(digits.min(i32::MAX as u32) as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() { rounded } else { value }
}

/// Config attribute type produced for a wire type
///
/// Struct types come from the per-type cache of [`StructType::attr_types`].
pub fn attr_type_of(ty: &WireType) -> AttrType {
    match ty {
        WireType::Nullable(inner) | WireType::Optional(inner) => attr_type_of(inner),
        WireType::List(inner) => AttrType::list(attr_type_of(inner)),
        WireType::Struct(st) => AttrType::Object(st.attr_types().clone()),
        scalar => scalar_attr_type(scalar),
    }
}

/// Attribute types of a struct's fields, derived once per type by
/// [`wire_model!`](crate::wire_model)
///
/// A struct reached again through its own fields is described as `Missing`,
/// which accepts any value of that field.
pub fn struct_attr_types(st: &StructType) -> ObjectType {
    describe_struct(st, &mut Vec::new())
}

fn describe_struct(st: &StructType, enclosing: &mut Vec<StructType>) -> ObjectType {
    enclosing.push(*st);
    let attr_types = st
        .fields()
        .iter()
        .map(|spec| (spec.tag.to_string(), describe(&spec.ty, enclosing)))
        .collect();
    enclosing.pop();
    attr_types
}

fn describe(ty: &WireType, enclosing: &mut Vec<StructType>) -> AttrType {
    match ty {
        WireType::Nullable(inner) | WireType::Optional(inner) => describe(inner, enclosing),
        WireType::List(inner) => AttrType::list(describe(inner, enclosing)),
        WireType::Struct(st) if enclosing.contains(st) => AttrType::Missing,
        WireType::Struct(st) => AttrType::Object(describe_struct(st, enclosing)),
        scalar => scalar_attr_type(scalar),
    }
}

fn scalar_attr_type(ty: &WireType) -> AttrType {
    match ty {
        WireType::String => AttrType::String,
        WireType::CaseInsensitive => AttrType::CaseInsensitiveString,
        WireType::Bool => AttrType::Bool,
        WireType::Int { .. } | WireType::UInt { .. } => AttrType::Int64,
        WireType::Float { .. } => AttrType::Number,
        WireType::Nullable(_) | WireType::Optional(_) | WireType::List(_) | WireType::Struct(_) => {
            AttrType::Missing
        }
    }
}

/// Convert a wire value of declared type `ty` into a config value
pub fn wire_to_attr(value: &WireValue, ty: &WireType, cx: &mut Context) -> MapResult<AttrValue> {
    let ty = ty.base();
    match value {
        WireValue::Absent | WireValue::Null => {
            AttrValue::null(&attr_type_of(ty)).map_err(|e| cx.locate(e))
        }
        WireValue::String(s) => Ok(match ty {
            WireType::CaseInsensitive => {
                AttrValue::CaseInsensitiveString(TriState::Known(CaseInsensitive::new(s.clone())))
            }
            _ => AttrValue::String(TriState::Known(s.clone())),
        }),
        WireValue::Bool(b) => Ok(AttrValue::Bool(TriState::Known(*b))),
        WireValue::Int(n) => Ok(AttrValue::Int64(TriState::Known(*n))),
        WireValue::UInt(n) => {
            let n = i64::try_from(*n).map_err(|_| cx.overflow(n, "i64"))?;
            Ok(AttrValue::Int64(TriState::Known(n)))
        }
        WireValue::Float(x) => Ok(AttrValue::Number(TriState::Known(Number::new(round_float(
            *x,
            cx.config().float_precision,
        ))))),
        WireValue::List(items) => {
            let WireType::List(elem_ty) = ty else {
                return Err(cx.shape(ty, "list"));
            };
            let elem_type = attr_type_of(elem_ty);
            let mut elements = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                elements.push(cx.element(index, |cx| wire_to_attr(item, elem_ty, cx))?);
            }
            ListValue::known(elem_type, elements)
                .map(AttrValue::List)
                .map_err(|e| cx.locate(e))
        }
        WireValue::Struct(entries) => {
            let WireType::Struct(st) = ty else {
                return Err(cx.shape(ty, "struct"));
            };
            let specs = st.fields();
            let mut attributes = BTreeMap::new();
            for (tag, value) in entries {
                let Some(spec) = specs.iter().find(|s| s.tag == tag) else {
                    continue;
                };
                let attr = cx.scoped(tag.as_str(), |cx| wire_to_attr(value, &spec.ty, cx))?;
                attributes.insert(tag.clone(), attr);
            }
            for spec in specs {
                if !attributes.contains_key(spec.tag) {
                    let attr = cx.scoped(spec.tag, |cx| wire_to_attr(&WireValue::Absent, &spec.ty, cx))?;
                    attributes.insert(spec.tag.to_string(), attr);
                }
            }
            ObjectValue::known(st.attr_types().clone(), attributes)
                .map(AttrValue::Object)
                .map_err(|e| cx.locate(e))
        }
    }
}

/// Convert between compatible config kinds for a destination of type `target`
///
/// `Int64` narrows to `Int32` with a range check, `Number` and `Float64`
/// interconvert, strings gain or lose case-insensitivity, and lists and sets
/// interconvert. Any other combination is returned unchanged for the
/// destination to accept or reject.
pub fn coerce(value: AttrValue, target: &ConfigType, cx: &mut Context) -> MapResult<AttrValue> {
    Ok(match (value, target) {
        (AttrValue::Int64(v), ConfigType::Int32) => AttrValue::Int32(
            v.try_map(|n| i32::try_from(n).map_err(|_| cx.overflow(n, "i32")))?,
        ),
        (AttrValue::Int32(v), ConfigType::Int64) => AttrValue::Int64(v.map(i64::from)),
        (AttrValue::Number(v), ConfigType::Float64) => AttrValue::Float64(v.map(|n| n.as_f64())),
        (AttrValue::Float64(v), ConfigType::Number) => AttrValue::Number(v.map(Number::new)),
        (AttrValue::String(v), ConfigType::CaseInsensitiveString) => {
            AttrValue::CaseInsensitiveString(v.map(CaseInsensitive::new))
        }
        (AttrValue::CaseInsensitiveString(v), ConfigType::String) => {
            AttrValue::String(v.map(CaseInsensitive::into_string))
        }
        (AttrValue::List(list), ConfigType::Set) => {
            let (elem_type, state) = list.into_parts();
            AttrValue::Set(SetValue::from_parts(elem_type, state))
        }
        (AttrValue::Set(set), ConfigType::List) => {
            let (elem_type, state) = set.into_parts();
            AttrValue::List(ListValue::from_parts(elem_type, state))
        }
        (value, _) => value,
    })
}

/// Convert a config value into a wire value of declared type `ty`
///
/// Returns `None` for null and unknown values: nothing is written.
pub fn attr_to_wire(
    value: &AttrValue,
    ty: &WireType,
    cx: &mut Context,
) -> MapResult<Option<WireValue>> {
    if !value.is_known() {
        return Ok(None);
    }
    let ty = ty.base();
    let wire = match (value, ty) {
        (
            AttrValue::String(TriState::Known(s)),
            WireType::String | WireType::CaseInsensitive,
        ) => WireValue::String(s.clone()),
        (
            AttrValue::CaseInsensitiveString(TriState::Known(s)),
            WireType::String | WireType::CaseInsensitive,
        ) => WireValue::String(s.as_str().to_string()),
        (AttrValue::Bool(TriState::Known(b)), WireType::Bool) => WireValue::Bool(*b),
        (AttrValue::Int64(TriState::Known(n)), _) => integer_to_wire(*n, ty, cx)?,
        (AttrValue::Int32(TriState::Known(n)), _) => integer_to_wire(i64::from(*n), ty, cx)?,
        (AttrValue::Float64(TriState::Known(x)), _) => float_to_wire(*x, ty, cx)?,
        (AttrValue::Number(TriState::Known(x)), _) => float_to_wire(x.as_f64(), ty, cx)?,
        (AttrValue::List(list), WireType::List(elem_ty)) => {
            elements_to_wire(list.elements().unwrap_or_default(), elem_ty, cx)?
        }
        (AttrValue::Set(set), WireType::List(elem_ty)) => {
            elements_to_wire(set.elements().unwrap_or_default(), elem_ty, cx)?
        }
        (AttrValue::Object(object), WireType::Struct(st)) => object_to_wire(object, st, cx)?,
        (AttrValue::List(_) | AttrValue::Set(_) | AttrValue::Object(_), other) => {
            return Err(cx.shape(other, value.attr_type().kind()));
        }
        (_, other @ (WireType::List(_) | WireType::Struct(_))) => {
            return Err(cx.shape(other, value.attr_type().kind()));
        }
        (_, other) => return Err(cx.mismatch(other, value.attr_type())),
    };
    Ok(Some(wire))
}

fn integer_to_wire(n: i64, ty: &WireType, cx: &mut Context) -> MapResult<WireValue> {
    match ty {
        WireType::Int { bits } => {
            let (min, max) = if *bits >= 64 {
                (i64::MIN, i64::MAX)
            } else {
                (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
            };
            if n < min || n > max {
                return Err(cx.overflow(n, signed_name(*bits)));
            }
            Ok(WireValue::Int(n))
        }
        WireType::UInt { bits } => {
            let max = if *bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
            match u64::try_from(n) {
                Ok(u) if u <= max => Ok(WireValue::UInt(u)),
                _ => Err(cx.overflow(n, unsigned_name(*bits))),
            }
        }
        WireType::Float { bits } => {
            let exact = if *bits <= 32 {
                n as f32 as i128 == i128::from(n)
            } else {
                n as f64 as i128 == i128::from(n)
            };
            if !exact {
                return Err(cx.overflow(n, float_name(*bits)));
            }
            Ok(WireValue::Float(n as f64))
        }
        other => Err(cx.mismatch(other, "Int64")),
    }
}

fn float_to_wire(x: f64, ty: &WireType, cx: &mut Context) -> MapResult<WireValue> {
    match ty {
        WireType::Float { bits } => {
            let x = round_float(x, cx.config().float_precision);
            if *bits <= 32 && x.is_finite() && !(x as f32).is_finite() {
                return Err(cx.overflow(x, "f32"));
            }
            Ok(WireValue::Float(x))
        }
        other => Err(cx.mismatch(other, "Number")),
    }
}

fn float_name(bits: u8) -> &'static str {
    if bits <= 32 { "f32" } else { "f64" }
}

fn signed_name(bits: u8) -> &'static str {
    match bits {
        8 => "i8",
        16 => "i16",
        32 => "i32",
        _ => "i64",
    }
}

fn unsigned_name(bits: u8) -> &'static str {
    match bits {
        8 => "u8",
        16 => "u16",
        32 => "u32",
        _ => "u64",
    }
}

/// Null or unknown elements become the element's zero value
fn elements_to_wire(
    elements: &[AttrValue],
    elem_ty: &WireType,
    cx: &mut Context,
) -> MapResult<WireValue> {
    let mut items = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        let result = cx.element(index, |cx| attr_to_wire(element, elem_ty, cx));
        let item = cx.tolerate(result)?;
        items.push(item.unwrap_or(WireValue::Absent));
    }
    Ok(WireValue::List(items))
}

fn object_to_wire(object: &ObjectValue, st: &StructType, cx: &mut Context) -> MapResult<WireValue> {
    let specs = st.fields();
    let mut entries = Vec::new();
    for (name, attr) in object.attributes().into_iter().flatten() {
        let Some(spec) = specs.iter().find(|s| s.tag == name) else {
            log::trace!("{}: no field tagged '{}', skipping", st.name(), name);
            continue;
        };
        let result = cx.scoped(name.as_str(), |cx| attr_to_wire(attr, &spec.ty, cx));
        if let Some(wire) = cx.tolerate(result)? {
            entries.push((name.clone(), wire));
        }
    }
    Ok(WireValue::Struct(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::settings::MapperConfig;
    use crate::wire::{Wire, WireModel};

    #[test]
    fn test_round_float() {
        assert_eq!(round_float(1.23456789, 4), 1.2346);
        assert_eq!(round_float(-0.00004, 4), -0.0);
        assert_eq!(round_float(2.5, 0), 3.0);
        assert!(round_float(f64::NAN, 4).is_nan());
        assert_eq!(round_float(f64::MAX, 4), f64::MAX);
    }

    #[test]
    fn unsigned_above_i64_overflows() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let err = wire_to_attr(&WireValue::UInt(u64::MAX), &WireType::UInt { bits: 64 }, &mut cx)
            .unwrap_err();
        assert!(matches!(err, MapError::Overflow { target: "i64", .. }));
    }

    #[test]
    fn absent_becomes_typed_null() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let ty = WireType::Optional(Box::new(WireType::List(Box::new(WireType::Int { bits: 32 }))));
        let attr = wire_to_attr(&WireValue::Absent, &ty, &mut cx).unwrap();
        assert!(attr.is_null());
        assert_eq!(attr.attr_type(), AttrType::list(AttrType::Int64));
    }

    #[test]
    fn floats_are_rounded_both_ways() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let attr = wire_to_attr(&WireValue::Float(1.23456789), &WireType::Float { bits: 64 }, &mut cx)
            .unwrap();
        assert_eq!(attr, AttrValue::Number(TriState::Known(Number::new(1.2346))));

        let wire = attr_to_wire(
            &AttrValue::Float64(TriState::Known(0.123456)),
            &WireType::Float { bits: 32 },
            &mut cx,
        )
        .unwrap();
        assert_eq!(wire, Some(WireValue::Float(0.1235)));
    }

    #[test]
    fn integer_width_is_checked() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let i32_ty = WireType::Int { bits: 32 };
        assert_eq!(
            attr_to_wire(&AttrValue::from(2147483647i64), &i32_ty, &mut cx).unwrap(),
            Some(WireValue::Int(2147483647))
        );
        let err = attr_to_wire(&AttrValue::from(2147483648i64), &i32_ty, &mut cx).unwrap_err();
        assert!(matches!(err, MapError::Overflow { target: "i32", .. }));

        let u8_ty = WireType::UInt { bits: 8 };
        assert!(attr_to_wire(&AttrValue::from(-1i64), &u8_ty, &mut cx).is_err());
        assert!(attr_to_wire(&AttrValue::from(256i64), &u8_ty, &mut cx).is_err());
    }

    #[test]
    fn null_and_unknown_write_nothing() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let null = AttrValue::String(TriState::Null);
        let unknown = AttrValue::Int64(TriState::Unknown);
        assert_eq!(attr_to_wire(&null, &WireType::String, &mut cx).unwrap(), None);
        assert_eq!(
            attr_to_wire(&unknown, &WireType::Int { bits: 64 }, &mut cx).unwrap(),
            None
        );
    }

    #[test]
    fn coerce_narrows_with_check() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let ok = coerce(AttrValue::from(7i64), &ConfigType::Int32, &mut cx).unwrap();
        assert_eq!(ok, AttrValue::from(7i32));
        let err = coerce(AttrValue::from(1i64 << 33), &ConfigType::Int32, &mut cx).unwrap_err();
        assert!(matches!(err, MapError::Overflow { .. }));
    }

    #[test]
    fn coerce_list_to_set_deduplicates() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let list = ListValue::known(AttrType::String, vec!["a".into(), "a".into()]).unwrap();
        let AttrValue::Set(set) = coerce(AttrValue::List(list), &ConfigType::Set, &mut cx).unwrap()
        else {
            panic!("expected a set");
        };
        assert_eq!(set.elements().unwrap().len(), 1);
    }

    #[derive(Debug, Default)]
    struct Node {
        name: Option<String>,
        children: Option<Vec<Node>>,
        next: Option<Box<Node>>,
    }
    crate::wire_model!(Node {
        "name,omitempty" => name,
        "children,omitempty" => children,
        "next,omitempty" => next,
    });

    fn chain(len: usize) -> Node {
        let mut node = Node::default();
        for _ in 0..len {
            node = Node {
                next: Some(Box::new(node)),
                ..Default::default()
            };
        }
        node
    }

    #[test]
    fn recursive_type_with_shallow_data() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let node = Node {
            name: Some("root".to_string()),
            children: Some(vec![]),
            next: None,
        };
        let attr = wire_to_attr(&node.to_wire(), &Node::wire_type(), &mut cx).unwrap();
        let AttrValue::Object(object) = attr else {
            panic!("expected an object");
        };
        assert_eq!(object.get("name"), Some(&AttrValue::from("root")));
        assert!(object.get("children").is_some_and(AttrValue::is_known));
        assert!(object.get("next").is_some_and(AttrValue::is_null));

        let types = Node::attr_types();
        assert_eq!(types.get("children"), Some(&AttrType::list(AttrType::Missing)));
        assert!(std::ptr::eq(types, Node::attr_types()));
    }

    #[test]
    fn recursive_data_past_the_limit_is_rejected() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        assert!(wire_to_attr(&chain(20).to_wire(), &Node::wire_type(), &mut cx).is_ok());
        let err = wire_to_attr(&chain(40).to_wire(), &Node::wire_type(), &mut cx).unwrap_err();
        assert!(matches!(err, MapError::DepthExceeded { limit: 32, .. }));
    }

    #[test]
    fn float_width_is_checked() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let f32_ty = WireType::Float { bits: 32 };
        let huge = AttrValue::Number(TriState::Known(Number::new(1e300)));
        let err = attr_to_wire(&huge, &f32_ty, &mut cx).unwrap_err();
        assert!(matches!(err, MapError::Overflow { target: "f32", .. }));
        assert!(attr_to_wire(&huge, &WireType::Float { bits: 64 }, &mut cx).is_ok());

        assert_eq!(
            attr_to_wire(&AttrValue::from(16_777_216i64), &f32_ty, &mut cx).unwrap(),
            Some(WireValue::Float(16_777_216.0))
        );
        let err = attr_to_wire(&AttrValue::from(16_777_217i64), &f32_ty, &mut cx).unwrap_err();
        assert!(matches!(err, MapError::Overflow { target: "f32", .. }));
    }

    #[test]
    fn string_into_integer_is_a_mismatch() {
        let config = MapperConfig::default();
        let mut cx = Context::new(&config);
        let err = attr_to_wire(&AttrValue::from("ten"), &WireType::Int { bits: 64 }, &mut cx)
            .unwrap_err();
        assert!(err.is_type_mismatch());
    }
}
